//! Structural parsing of `pom.xml` into a [`DescriptorNode`]
//!
//! No resolution happens here: placeholders stay verbatim and missing
//! versions stay missing. Only the project's own group and version fall back
//! to the `<parent>` reference, as Maven does for coordinates.

use super::coordinate::{Coordinate, Dependency};
use crate::error::{DescriptorParseError, DetectError};
use crate::fs::FileSystem;
use roxmltree::{Document, Node};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Canonical descriptor file name, matched case-insensitively
pub const DESCRIPTOR_FILE_NAME: &str = "pom.xml";

pub fn is_descriptor_file_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(DESCRIPTOR_FILE_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub coordinate: Coordinate,
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorNode {
    pub file_path: PathBuf,
    pub coordinate: Coordinate,
    pub parent: Option<ParentRef>,
    pub packaging: Option<String>,
    pub modules: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub managed_dependencies: Vec<Dependency>,
    pub build_plugins: Vec<Coordinate>,
    pub properties: BTreeMap<String, String>,
}

impl DescriptorNode {
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self, DetectError> {
        let path = path.into();
        parse_document(&path, content).map_err(|source| DetectError::MalformedDescriptor {
            path: path.clone(),
            source,
        })
    }

    pub fn read(fs: &dyn FileSystem, path: &Path) -> Result<Self, DetectError> {
        let content = fs.read_to_string(path).map_err(|e| {
            let invalid_data = e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::InvalidData);
            if invalid_data {
                DetectError::MalformedDescriptor {
                    path: path.to_path_buf(),
                    source: DescriptorParseError::Encoding(e.root_cause().to_string()),
                }
            } else {
                DetectError::Io {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            }
        })?;
        Self::parse(path, &content)
    }

    /// Declares sub-modules, so it is never a runnable unit itself
    pub fn is_aggregator(&self) -> bool {
        !self.modules.is_empty()
    }

    /// `packaging=pom` without modules: a parent or BOM, not an application
    pub fn is_parent_only(&self) -> bool {
        !self.is_aggregator() && self.packaging.as_deref() == Some("pom")
    }

    pub fn parent_coordinate(&self) -> Option<&Coordinate> {
        self.parent.as_ref().map(|p| &p.coordinate)
    }

    pub fn directory(&self) -> &Path {
        self.file_path.parent().unwrap_or(Path::new(""))
    }

    pub fn has_dependency(&self, group_id: &str, artifact_id: &str) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.coordinate.matches(group_id, artifact_id))
    }
}

fn parse_document(path: &Path, content: &str) -> Result<DescriptorNode, DescriptorParseError> {
    let doc = Document::parse(content)?;
    let root = doc.root_element();

    if !root.has_tag_name("project") {
        return Err(DescriptorParseError::NotAProject(
            root.tag_name().name().to_string(),
        ));
    }

    let parent = child(root, "parent").map(|p| ParentRef {
        coordinate: parse_coordinate(p),
        relative_path: child_text(p, "relativePath"),
    });

    let mut coordinate = parse_coordinate(root);
    if let Some(parent) = &parent {
        if coordinate.group_id.is_empty() {
            coordinate.group_id = parent.coordinate.group_id.clone();
        }
        if coordinate.version.is_none() {
            coordinate.version = parent.coordinate.version.clone();
        }
    }

    let modules: Vec<String> = child(root, "modules")
        .map(|m| children(m, "module").filter_map(text_of).collect())
        .unwrap_or_default();

    let dependencies = child(root, "dependencies")
        .map(parse_dependencies)
        .unwrap_or_default();

    let managed_dependencies = child(root, "dependencyManagement")
        .and_then(|dm| child(dm, "dependencies"))
        .map(parse_dependencies)
        .unwrap_or_default();

    let build_plugins: Vec<Coordinate> = child(root, "build")
        .and_then(|b| child(b, "plugins"))
        .map(|plugins| children(plugins, "plugin").map(parse_coordinate).collect())
        .unwrap_or_default();

    let properties: BTreeMap<String, String> = child(root, "properties")
        .map(|props| {
            props
                .children()
                .filter(|n| n.is_element())
                .map(|n| {
                    (
                        n.tag_name().name().to_string(),
                        n.text().map(|t| t.trim().to_string()).unwrap_or_default(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(DescriptorNode {
        file_path: path.to_path_buf(),
        coordinate,
        parent,
        packaging: child_text(root, "packaging"),
        modules,
        dependencies,
        managed_dependencies,
        build_plugins,
        properties,
    })
}

fn parse_dependencies(node: Node) -> Vec<Dependency> {
    children(node, "dependency")
        .map(|dep| Dependency {
            coordinate: parse_coordinate(dep),
            scope: child_text(dep, "scope"),
            dep_type: child_text(dep, "type"),
        })
        .collect()
}

fn parse_coordinate(node: Node) -> Coordinate {
    Coordinate {
        group_id: child_text(node, "groupId").unwrap_or_default(),
        artifact_id: child_text(node, "artifactId").unwrap_or_default(),
        version: child_text(node, "version"),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(name))
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).and_then(text_of)
}

fn text_of(node: Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
