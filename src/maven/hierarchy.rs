//! Incremental reconstruction of the descriptor forest
//!
//! Descriptors arrive in traversal order, which does not guarantee parents
//! before children. The resolver keeps every node in an arena, indexes the
//! modules each aggregator declares, and answers ownership queries lazily so
//! a leaf registered before its aggregator still resolves once both are known.

use super::coordinate::{Coordinate, CoordinateKey};
use super::descriptor::{is_descriptor_file_name, DescriptorNode, DESCRIPTOR_FILE_NAME};
use crate::error::DetectError;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Parent that marks a project as inheriting straight from the framework,
/// so there is no project-owned parent to look for
pub const FRAMEWORK_DEFAULT_PARENT: (&str, &str) =
    ("org.springframework.boot", "spring-boot-starter-parent");

pub fn is_framework_default_parent(coordinate: &Coordinate) -> bool {
    coordinate.matches(FRAMEWORK_DEFAULT_PARENT.0, FRAMEWORK_DEFAULT_PARENT.1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Aggregator(NodeId),
    Leaf(NodeId),
}

impl Registration {
    pub fn id(&self) -> NodeId {
        match self {
            Registration::Aggregator(id) | Registration::Leaf(id) => *id,
        }
    }

    pub fn is_aggregator(&self) -> bool {
        matches!(self, Registration::Aggregator(_))
    }
}

/// Where a leaf sits in the forest. `chain` lists in-repository parents,
/// nearest first; `owner` is the nearest of them that declares the leaf
/// through its module tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineage {
    pub owner: Option<NodeId>,
    pub chain: Vec<NodeId>,
}

impl Lineage {
    pub fn chain_root_first(&self) -> Vec<NodeId> {
        self.chain.iter().rev().copied().collect()
    }
}

#[derive(Debug, Default)]
pub struct HierarchyResolver {
    nodes: Vec<DescriptorNode>,
    by_path: HashMap<PathBuf, NodeId>,
    aggregators: Vec<NodeId>,
    /// declared module descriptor path -> aggregator that declared it
    registry: HashMap<PathBuf, NodeId>,
}

impl HierarchyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &DescriptorNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DescriptorNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn get_by_path(&self, path: &Path) -> Option<NodeId> {
        self.by_path.get(&descriptor_key(path)).copied()
    }

    /// Adds a parsed descriptor. A path seen before keeps its first node.
    pub fn register(&mut self, node: DescriptorNode) -> Registration {
        let key = descriptor_key(&node.file_path);
        if let Some(&existing) = self.by_path.get(&key) {
            debug!(path = ?key, "descriptor already registered");
            return self.registration_for(existing);
        }

        let id = NodeId(self.nodes.len());
        let is_aggregator = node.is_aggregator();

        if is_aggregator {
            let dir = node.directory().to_path_buf();
            for module in &node.modules {
                let module_path = module_descriptor_path(&dir, module);
                if let Some(previous) = self.registry.insert(module_path.clone(), id) {
                    debug!(
                        module = ?module_path,
                        previous = ?self.nodes[previous.0].file_path,
                        current = ?node.file_path,
                        "module declared by more than one aggregator, newest registration wins"
                    );
                }
            }
            self.aggregators.push(id);
        }

        debug!(
            path = ?key,
            coordinate = %node.coordinate,
            aggregator = is_aggregator,
            "registered descriptor"
        );
        self.by_path.insert(key, id);
        self.nodes.push(node);

        self.registration_for(id)
    }

    fn registration_for(&self, id: NodeId) -> Registration {
        if self.node(id).is_aggregator() {
            Registration::Aggregator(id)
        } else {
            Registration::Leaf(id)
        }
    }

    /// Aggregator whose `<modules>` names this descriptor path
    pub fn declaring_aggregator(&self, descriptor_path: &Path) -> Option<NodeId> {
        self.registry.get(&descriptor_key(descriptor_path)).copied()
    }

    /// First descriptor with the coordinate's `(group, artifact)`, searching
    /// aggregators in registration order before any other descriptor
    pub fn find_by_coordinate(&self, coordinate: &Coordinate) -> Option<NodeId> {
        let key = coordinate.key();
        self.aggregators
            .iter()
            .copied()
            .find(|&id| self.node(id).coordinate.key() == key)
            .or_else(|| {
                self.nodes()
                    .find(|(_, n)| !n.is_aggregator() && n.coordinate.key() == key)
                    .map(|(id, _)| id)
            })
    }

    /// In-repository parents of `id`, nearest first. The walk stops at the
    /// framework default parent or at the first parent not known locally.
    pub fn parent_chain(&self, id: NodeId) -> Result<Vec<NodeId>, DetectError> {
        let start = self.node(id);
        let mut visited: HashSet<CoordinateKey> = HashSet::new();
        visited.insert(start.coordinate.key());

        let mut chain = Vec::new();
        let mut current = start.parent_coordinate();

        while let Some(parent) = current {
            if is_framework_default_parent(parent) {
                break;
            }
            let Some(parent_id) = self.find_by_coordinate(parent) else {
                debug!(parent = %parent, "parent not in repository, chain ends");
                break;
            };

            let parent_node = self.node(parent_id);
            if !visited.insert(parent_node.coordinate.key()) || chain.len() >= self.nodes.len() {
                return Err(DetectError::CyclicParentChain {
                    path: start.file_path.clone(),
                    coordinate: parent_node.coordinate.key().to_string(),
                });
            }

            chain.push(parent_id);
            current = parent_node.parent_coordinate();
        }

        Ok(chain)
    }

    /// True when `aggregator` declares `leaf`, directly or through a chain of
    /// registered aggregators
    pub fn is_descendant(&self, leaf: NodeId, aggregator: NodeId) -> bool {
        if self.declares(aggregator, leaf) {
            return true;
        }

        let mut visited = HashSet::new();
        let mut current = leaf;
        while let Some(declarer) = self.declaring_aggregator(&self.node(current).file_path) {
            if declarer == aggregator {
                return true;
            }
            if !visited.insert(declarer) {
                return false;
            }
            current = declarer;
        }
        false
    }

    fn declares(&self, aggregator: NodeId, leaf: NodeId) -> bool {
        let agg = self.node(aggregator);
        let leaf_node = self.node(leaf);
        let leaf_key = descriptor_key(&leaf_node.file_path);

        agg.modules.iter().any(|module| {
            let module_path = module_descriptor_path(agg.directory(), module);
            module_path == leaf_key
                || self
                    .by_path
                    .get(&module_path)
                    .map(|&id| self.node(id).coordinate.key() == leaf_node.coordinate.key())
                    .unwrap_or(false)
        })
    }

    /// Parent chain plus owning aggregator of a leaf. A cyclic chain is
    /// reported as an error; callers treat it as "no parent resolved".
    pub fn lineage(&self, leaf: NodeId) -> Result<Lineage, DetectError> {
        let node = self.node(leaf);
        match node.parent_coordinate() {
            None => return Ok(Lineage::default()),
            Some(p) if is_framework_default_parent(p) => {
                debug!(path = ?node.file_path, "framework default parent, no project-owned parent");
                return Ok(Lineage::default());
            }
            Some(_) => {}
        }

        let chain = self.parent_chain(leaf)?;
        let owner = chain
            .iter()
            .copied()
            .find(|&a| self.node(a).is_aggregator() && self.is_descendant(leaf, a));

        Ok(Lineage { owner, chain })
    }
}

/// Descriptor path a `<module>` entry refers to: entries ending in `.xml`
/// are literal files, anything else is a directory holding `pom.xml`
pub fn module_descriptor_path(aggregator_dir: &Path, module: &str) -> PathBuf {
    let module = module.trim();
    let path = if module.to_ascii_lowercase().ends_with(".xml") {
        aggregator_dir.join(module)
    } else {
        aggregator_dir.join(module).join(DESCRIPTOR_FILE_NAME)
    };
    descriptor_key(&path)
}

/// Lexically normalized path with the descriptor file name case-folded
pub fn descriptor_key(path: &Path) -> PathBuf {
    let mut normalized = normalize_path(path);
    let fold = normalized
        .file_name()
        .and_then(|n| n.to_str())
        .map(is_descriptor_file_name)
        .unwrap_or(false);
    if fold {
        normalized.set_file_name(DESCRIPTOR_FILE_NAME);
    }
    normalized
}

pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
