//! Effective view synthesis: inherited properties substituted and
//! dependency versions resolved through the managed-dependency chain
//!
//! Version precedence for each `(group, artifact)`, first hit wins:
//!
//! 1. version declared on the dependency
//! 2. the leaf's own `<dependencyManagement>`
//! 3. ancestors' `<dependencyManagement>`, nearest first
//! 4. BOM imports reachable from the leaf and its ancestors, resolved
//!    recursively with the same rules against the imported descriptor
//! 5. the externally rendered effective descriptor, when one was supplied
//!
//! Anything still unpinned keeps an empty version.

use super::coordinate::{Coordinate, CoordinateKey, Dependency, ResolvedDependency};
use super::descriptor::DescriptorNode;
use super::properties::{has_placeholder, PropertyMap, PropertyScope};
use super::repository::{load_from, DescriptorSource};
use crate::error::DetectError;
use roxmltree::Document;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

pub const DEFAULT_SCOPE: &str = "compile";
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveView {
    pub coordinate: Coordinate,
    pub dependencies: Vec<ResolvedDependency>,
    pub properties: PropertyMap,
}

impl EffectiveView {
    pub fn dependency(&self, group_id: &str, artifact_id: &str) -> Option<&ResolvedDependency> {
        self.dependencies
            .iter()
            .find(|d| d.matches(group_id, artifact_id))
    }

    pub fn has_dependency(&self, group_id: &str, artifact_id: &str) -> bool {
        self.dependency(group_id, artifact_id).is_some()
    }
}

/// The parts of an externally rendered effective descriptor that feed
/// synthesis: its properties and every concrete version it pins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDescriptor {
    pub properties: PropertyMap,
    pub versions: HashMap<CoordinateKey, String>,
}

impl RenderedDescriptor {
    /// Accepts a single `<project>` or a `<projects>` wrapper, in which case
    /// the project matching `coordinate` is used. Unusable text is reported
    /// as [`DetectError::ResolutionUnavailable`].
    pub fn parse(path: &Path, text: &str, coordinate: &Coordinate) -> Result<Self, DetectError> {
        let unavailable = |reason: String| DetectError::ResolutionUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let doc = Document::parse(text).map_err(|e| unavailable(format!("malformed output: {e}")))?;
        let root = doc.root_element();

        let project_text = if root.has_tag_name("projects") {
            let project = root
                .children()
                .filter(|n| n.has_tag_name("project"))
                .find(|p| {
                    p.children()
                        .find(|c| c.has_tag_name("artifactId"))
                        .and_then(|c| c.text())
                        .map(str::trim)
                        == Some(coordinate.artifact_id.as_str())
                })
                .ok_or_else(|| unavailable(format!("no project for {coordinate} in output")))?;
            &text[project.range()]
        } else {
            text
        };

        let node = DescriptorNode::parse(path, project_text)
            .map_err(|e| unavailable(format!("malformed output: {e}")))?;

        let mut versions = HashMap::new();
        for dep in node.managed_dependencies.iter().chain(node.dependencies.iter()) {
            if let Some(version) = dep.coordinate.version.as_deref() {
                if !has_placeholder(version) {
                    versions
                        .entry(dep.coordinate.key())
                        .or_insert_with(|| version.to_string());
                }
            }
        }

        Ok(Self {
            properties: node.properties,
            versions,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Managed {
    version: String,
    scope: Option<String>,
}

/// An imported BOM with the parents only the sources could supply,
/// nearest first
struct ImportedDescriptor {
    node: DescriptorNode,
    parents: Vec<DescriptorNode>,
}

pub struct EffectiveViewSynthesizer<'a> {
    sources: Vec<&'a dyn DescriptorSource>,
    max_import_depth: usize,
    imports: RefCell<HashMap<Coordinate, Option<Rc<ImportedDescriptor>>>>,
}

impl<'a> EffectiveViewSynthesizer<'a> {
    pub fn new(sources: Vec<&'a dyn DescriptorSource>) -> Self {
        Self {
            sources,
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
            imports: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth.max(1);
        self
    }

    /// `chain_root_first` holds the in-repository parents. Parents beyond
    /// the root-most one are looked up in the configured sources.
    pub fn synthesize(
        &self,
        leaf: &DescriptorNode,
        chain_root_first: &[&DescriptorNode],
        rendered: Option<&RenderedDescriptor>,
    ) -> EffectiveView {
        let externals = self.external_parents(leaf, chain_root_first);

        let mut ancestors: Vec<&DescriptorNode> = externals.iter().rev().collect();
        ancestors.extend(chain_root_first.iter().copied());

        self.build(leaf, &ancestors, rendered)
    }

    /// Synthesis with no inheritance at all, for leaves whose parent chain
    /// could not be resolved
    pub fn synthesize_detached(
        &self,
        leaf: &DescriptorNode,
        rendered: Option<&RenderedDescriptor>,
    ) -> EffectiveView {
        self.build(leaf, &[], rendered)
    }

    fn build(
        &self,
        leaf: &DescriptorNode,
        ancestors_root_first: &[&DescriptorNode],
        rendered: Option<&RenderedDescriptor>,
    ) -> EffectiveView {
        let scope =
            PropertyScope::for_descriptor(leaf, ancestors_root_first, rendered.map(|r| &r.properties));

        let mut layers: Vec<&DescriptorNode> = vec![leaf];
        layers.extend(ancestors_root_first.iter().rev().copied());

        let mut seen = HashSet::new();
        let mut dependencies = Vec::new();

        for dep in layers.iter().flat_map(|n| n.dependencies.iter()) {
            let group_id = scope.resolve(&dep.coordinate.group_id);
            let artifact_id = scope.resolve(&dep.coordinate.artifact_id);
            let key = CoordinateKey::new(group_id.clone(), artifact_id.clone());
            if !seen.insert(key.clone()) {
                continue;
            }

            let managed = self.managed_for(&key, &layers, &scope, rendered);
            let version = match &dep.coordinate.version {
                Some(v) => scope.resolve(v),
                None => managed
                    .as_ref()
                    .map(|m| m.version.clone())
                    .unwrap_or_default(),
            };
            let dep_scope = dep
                .scope
                .as_ref()
                .map(|s| scope.resolve(s))
                .or_else(|| managed.and_then(|m| m.scope))
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string());

            if version.is_empty() {
                debug!(dependency = %key, "no version pinned for dependency");
            } else if has_placeholder(&version) {
                debug!(dependency = %key, version = %version, "version keeps an unresolved placeholder");
            }

            dependencies.push(ResolvedDependency {
                group_id,
                artifact_id,
                version,
                scope: dep_scope,
            });
        }

        EffectiveView {
            coordinate: Coordinate {
                group_id: scope.resolve(&leaf.coordinate.group_id),
                artifact_id: scope.resolve(&leaf.coordinate.artifact_id),
                version: leaf.coordinate.version.as_ref().map(|v| scope.resolve(v)),
            },
            dependencies,
            properties: scope.into_map(),
        }
    }

    fn managed_for(
        &self,
        key: &CoordinateKey,
        layers: &[&DescriptorNode],
        scope: &PropertyScope,
        rendered: Option<&RenderedDescriptor>,
    ) -> Option<Managed> {
        let mut visited = HashSet::new();
        self.lookup_managed(key, layers, scope, &mut visited, 0)
            .or_else(|| {
                rendered
                    .and_then(|r| r.versions.get(key))
                    .map(|v| Managed {
                        version: v.clone(),
                        scope: None,
                    })
            })
    }

    /// Steps 2–4 over `layers` (nearest first), substituting with `scope`
    fn lookup_managed(
        &self,
        key: &CoordinateKey,
        layers: &[&DescriptorNode],
        scope: &PropertyScope,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Option<Managed> {
        for node in layers {
            for managed in node.managed_dependencies.iter().filter(|m| !m.is_bom_import()) {
                if resolved_key(managed, scope) != *key {
                    continue;
                }
                if let Some(version) = &managed.coordinate.version {
                    return Some(Managed {
                        version: scope.resolve(version),
                        scope: managed.scope.as_ref().map(|s| scope.resolve(s)),
                    });
                }
            }
        }

        for node in layers {
            for import in node.managed_dependencies.iter().filter(|m| m.is_bom_import()) {
                let coordinate = Coordinate {
                    group_id: scope.resolve(&import.coordinate.group_id),
                    artifact_id: scope.resolve(&import.coordinate.artifact_id),
                    version: import.coordinate.version.as_ref().map(|v| scope.resolve(v)),
                };
                if let Some(found) = self.lookup_in_import(key, &coordinate, visited, depth + 1) {
                    return Some(found);
                }
            }
        }

        None
    }

    fn lookup_in_import(
        &self,
        key: &CoordinateKey,
        import: &Coordinate,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Option<Managed> {
        if depth > self.max_import_depth {
            debug!(import = %import, "import depth limit reached");
            return None;
        }
        if !visited.insert(import.to_string()) {
            return None;
        }

        let imported = self.load_import(import)?;

        let parents_root_first: Vec<&DescriptorNode> = imported.parents.iter().rev().collect();
        let scope = PropertyScope::for_descriptor(&imported.node, &parents_root_first, None);

        let mut layers: Vec<&DescriptorNode> = vec![&imported.node];
        layers.extend(imported.parents.iter());

        self.lookup_managed(key, &layers, &scope, visited, depth)
    }

    /// Loads each imported descriptor once per synthesizer, misses included
    fn load_import(&self, import: &Coordinate) -> Option<Rc<ImportedDescriptor>> {
        if let Some(cached) = self.imports.borrow().get(import) {
            return cached.clone();
        }

        let loaded = match load_from(&self.sources, import) {
            Some(node) => {
                let parents = self.external_parents(&node, &[]);
                Some(Rc::new(ImportedDescriptor { node, parents }))
            }
            None => {
                debug!(import = %import, "imported descriptor not available locally");
                None
            }
        };

        self.imports
            .borrow_mut()
            .insert(import.clone(), loaded.clone());
        loaded
    }

    /// Parents of the root-most known node that only the sources can supply,
    /// nearest first
    fn external_parents(
        &self,
        start: &DescriptorNode,
        known_root_first: &[&DescriptorNode],
    ) -> Vec<DescriptorNode> {
        let mut visited: HashSet<CoordinateKey> = known_root_first
            .iter()
            .map(|n| n.coordinate.key())
            .collect();
        visited.insert(start.coordinate.key());

        let top = known_root_first.first().copied().unwrap_or(start);
        let mut current = top.parent_coordinate().cloned();
        let mut parents = Vec::new();

        while let Some(parent) = current {
            if parents.len() >= self.max_import_depth || !visited.insert(parent.key()) {
                break;
            }
            let Some(node) = load_from(&self.sources, &parent) else {
                break;
            };
            current = node.parent_coordinate().cloned();
            parents.push(node);
        }

        parents
    }
}

fn resolved_key(dep: &Dependency, scope: &PropertyScope) -> CoordinateKey {
    CoordinateKey::new(
        scope.resolve(&dep.coordinate.group_id),
        scope.resolve(&dep.coordinate.artifact_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::maven::repository::LocalRepository;
    use std::path::PathBuf;
    use std::sync::Arc;

    const SPRING_BOOT_DEPENDENCIES: &str = r#"<project>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-dependencies</artifactId>
        <version>3.0.0</version>
        <packaging>pom</packaging>
        <properties>
            <slf4j.version>2.0.4</slf4j.version>
        </properties>
        <dependencyManagement>
            <dependencies>
                <dependency>
                    <groupId>org.slf4j</groupId>
                    <artifactId>slf4j-api</artifactId>
                    <version>${slf4j.version}</version>
                </dependency>
            </dependencies>
        </dependencyManagement>
    </project>"#;

    const SPRING_BOOT_STARTER_PARENT: &str = r#"<project>
        <parent>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-dependencies</artifactId>
            <version>3.0.0</version>
        </parent>
        <artifactId>spring-boot-starter-parent</artifactId>
        <packaging>pom</packaging>
    </project>"#;

    fn local_repository() -> LocalRepository {
        let fs = MockFileSystem::with_root(PathBuf::from("/m2"));
        fs.add_file(
            "org/springframework/boot/spring-boot-dependencies/3.0.0/spring-boot-dependencies-3.0.0.pom",
            SPRING_BOOT_DEPENDENCIES,
        );
        fs.add_file(
            "org/springframework/boot/spring-boot-starter-parent/3.0.0/spring-boot-starter-parent-3.0.0.pom",
            SPRING_BOOT_STARTER_PARENT,
        );
        LocalRepository::new("/m2", Arc::new(fs))
    }

    fn pom(path: &str, content: &str) -> DescriptorNode {
        DescriptorNode::parse(path, content).unwrap()
    }

    #[test]
    fn test_explicit_versions_and_scopes() {
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project>
                <modelVersion>4.0.0</modelVersion>
                <groupId>com.example</groupId>
                <artifactId>example-project</artifactId>
                <version>1.0.0</version>
                <dependencies>
                    <dependency>
                        <groupId>org.springframework</groupId>
                        <artifactId>spring-core</artifactId>
                        <version>5.3.8</version>
                        <scope>compile</scope>
                    </dependency>
                    <dependency>
                        <groupId>junit</groupId>
                        <artifactId>junit</artifactId>
                        <version>4.13.2</version>
                        <scope>test</scope>
                    </dependency>
                </dependencies>
            </project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![]).synthesize(&leaf, &[], None);

        assert_eq!(
            view.dependencies,
            vec![
                ResolvedDependency::new("org.springframework", "spring-core", "5.3.8", "compile"),
                ResolvedDependency::new("junit", "junit", "4.13.2", "test"),
            ]
        );
    }

    #[test]
    fn test_no_dependencies_resolves_to_empty() {
        let leaf = pom(
            "/repo/pom.xml",
            "<project><groupId>g</groupId><artifactId>a</artifactId><dependencies></dependencies></project>",
        );
        let view = EffectiveViewSynthesizer::new(vec![]).synthesize(&leaf, &[], None);
        assert!(view.dependencies.is_empty());
    }

    #[test]
    fn test_leaf_managed_version_beats_grandparent() {
        let grandparent = pom(
            "/repo/pom.xml",
            r#"<project>
                <groupId>g</groupId><artifactId>grand</artifactId><version>1</version>
                <modules><module>mid</module></modules>
                <dependencyManagement><dependencies>
                    <dependency><groupId>org.slf4j</groupId><artifactId>slf4j-api</artifactId><version>2.0.4</version></dependency>
                    <dependency><groupId>g</groupId><artifactId>only-grand</artifactId><version>7</version><scope>runtime</scope></dependency>
                </dependencies></dependencyManagement>
            </project>"#,
        );
        let parent = pom(
            "/repo/mid/pom.xml",
            r#"<project>
                <parent><groupId>g</groupId><artifactId>grand</artifactId><version>1</version></parent>
                <artifactId>mid</artifactId>
                <modules><module>leaf</module></modules>
            </project>"#,
        );
        let leaf = pom(
            "/repo/mid/leaf/pom.xml",
            r#"<project>
                <parent><groupId>g</groupId><artifactId>mid</artifactId><version>1</version></parent>
                <artifactId>leaf</artifactId>
                <dependencies>
                    <dependency><groupId>org.slf4j</groupId><artifactId>slf4j-api</artifactId></dependency>
                    <dependency><groupId>g</groupId><artifactId>only-grand</artifactId></dependency>
                </dependencies>
                <dependencyManagement><dependencies>
                    <dependency><groupId>org.slf4j</groupId><artifactId>slf4j-api</artifactId><version>2.0.5</version></dependency>
                </dependencies></dependencyManagement>
            </project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![]).synthesize(&leaf, &[&grandparent, &parent], None);

        assert_eq!(view.dependency("org.slf4j", "slf4j-api").unwrap().version, "2.0.5");
        let grand_only = view.dependency("g", "only-grand").unwrap();
        assert_eq!(grand_only.version, "7");
        assert_eq!(grand_only.scope, "runtime");
    }

    #[test]
    fn test_nearest_ancestor_wins_over_root() {
        let root = pom(
            "/r/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>root</artifactId>
                <dependencyManagement><dependencies>
                    <dependency><groupId>x</groupId><artifactId>y</artifactId><version>1</version></dependency>
                </dependencies></dependencyManagement></project>"#,
        );
        let mid = pom(
            "/r/m/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>mid</artifactId>
                <dependencyManagement><dependencies>
                    <dependency><groupId>x</groupId><artifactId>y</artifactId><version>2</version></dependency>
                </dependencies></dependencyManagement></project>"#,
        );
        let leaf = pom(
            "/r/m/l/pom.xml",
            "<project><artifactId>l</artifactId><dependencies><dependency><groupId>x</groupId><artifactId>y</artifactId></dependency></dependencies></project>",
        );

        let view = EffectiveViewSynthesizer::new(vec![]).synthesize(&leaf, &[&root, &mid], None);
        assert_eq!(view.dependency("x", "y").unwrap().version, "2");
    }

    #[test]
    fn test_version_from_bom_import() {
        let repo = local_repository();
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project>
                <modelVersion>4.0.0</modelVersion>
                <groupId>com.example</groupId>
                <artifactId>example-project</artifactId>
                <version>1.0.0</version>
                <dependencies>
                    <dependency>
                        <groupId>org.slf4j</groupId>
                        <artifactId>slf4j-api</artifactId>
                    </dependency>
                </dependencies>
                <dependencyManagement>
                    <dependencies>
                        <dependency>
                            <groupId>org.springframework.boot</groupId>
                            <artifactId>spring-boot-dependencies</artifactId>
                            <version>3.0.0</version>
                            <type>pom</type>
                            <scope>import</scope>
                        </dependency>
                    </dependencies>
                </dependencyManagement>
            </project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![&repo as &dyn DescriptorSource]).synthesize(&leaf, &[], None);

        assert_eq!(
            view.dependencies,
            vec![ResolvedDependency::new("org.slf4j", "slf4j-api", "2.0.4", "compile")]
        );
    }

    struct CountingSource {
        inner: LocalRepository,
        loads: std::cell::Cell<usize>,
    }

    impl DescriptorSource for CountingSource {
        fn load(&self, coordinate: &Coordinate) -> Option<DescriptorNode> {
            self.loads.set(self.loads.get() + 1);
            self.inner.load(coordinate)
        }
    }

    #[test]
    fn test_imported_descriptor_loaded_once_per_synthesis() {
        let source = CountingSource {
            inner: local_repository(),
            loads: std::cell::Cell::new(0),
        };
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project><groupId>com.example</groupId><artifactId>app</artifactId><version>1</version>
                <dependencies>
                    <dependency><groupId>org.slf4j</groupId><artifactId>slf4j-api</artifactId></dependency>
                    <dependency><groupId>x</groupId><artifactId>unmanaged-one</artifactId></dependency>
                    <dependency><groupId>x</groupId><artifactId>unmanaged-two</artifactId></dependency>
                </dependencies>
                <dependencyManagement><dependencies>
                    <dependency><groupId>org.springframework.boot</groupId><artifactId>spring-boot-dependencies</artifactId><version>3.0.0</version><type>pom</type><scope>import</scope></dependency>
                    <dependency><groupId>org.example</groupId><artifactId>missing-bom</artifactId><version>1</version><type>pom</type><scope>import</scope></dependency>
                </dependencies></dependencyManagement>
            </project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![&source as &dyn DescriptorSource]).synthesize(&leaf, &[], None);

        assert_eq!(view.dependency("org.slf4j", "slf4j-api").unwrap().version, "2.0.4");
        assert_eq!(view.dependency("x", "unmanaged-two").unwrap().version, "");
        // one load per imported BOM, hit or miss
        assert_eq!(source.loads.get(), 2);
    }

    #[test]
    fn test_version_from_external_parent() {
        let repo = local_repository();
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project>
                <parent>
                    <groupId>org.springframework.boot</groupId>
                    <artifactId>spring-boot-starter-parent</artifactId>
                    <version>3.0.0</version>
                    <relativePath/>
                </parent>
                <groupId>com.example</groupId>
                <artifactId>example-project</artifactId>
                <version>1.0.0</version>
                <dependencies>
                    <dependency>
                        <groupId>org.slf4j</groupId>
                        <artifactId>slf4j-api</artifactId>
                    </dependency>
                </dependencies>
            </project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![&repo as &dyn DescriptorSource]).synthesize(&leaf, &[], None);

        assert_eq!(
            view.dependencies,
            vec![ResolvedDependency::new("org.slf4j", "slf4j-api", "2.0.4", "compile")]
        );
        assert_eq!(view.properties.get("slf4j.version").map(String::as_str), Some("2.0.4"));
    }

    #[test]
    fn test_direct_management_beats_import() {
        let repo = local_repository();
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>a</artifactId>
                <dependencies><dependency><groupId>org.slf4j</groupId><artifactId>slf4j-api</artifactId></dependency></dependencies>
                <dependencyManagement><dependencies>
                    <dependency><groupId>org.springframework.boot</groupId><artifactId>spring-boot-dependencies</artifactId><version>3.0.0</version><type>pom</type><scope>import</scope></dependency>
                </dependencies></dependencyManagement></project>"#,
        );
        let parent = pom(
            "/repo/parent/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>p</artifactId>
                <dependencyManagement><dependencies>
                    <dependency><groupId>org.slf4j</groupId><artifactId>slf4j-api</artifactId><version>1.7.36</version></dependency>
                </dependencies></dependencyManagement></project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![&repo as &dyn DescriptorSource]).synthesize(&leaf, &[&parent], None);
        assert_eq!(view.dependency("org.slf4j", "slf4j-api").unwrap().version, "1.7.36");
    }

    #[test]
    fn test_unresolved_placeholder_is_reported_literally() {
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>a</artifactId>
                <properties><known>1.0</known></properties>
                <dependencies>
                    <dependency><groupId>x</groupId><artifactId>known</artifactId><version>${known}</version></dependency>
                    <dependency><groupId>x</groupId><artifactId>unknown</artifactId><version>${missing.version}</version></dependency>
                </dependencies></project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![]).synthesize(&leaf, &[], None);
        assert_eq!(view.dependency("x", "known").unwrap().version, "1.0");
        assert_eq!(view.dependency("x", "unknown").unwrap().version, "${missing.version}");
    }

    #[test]
    fn test_unmanaged_dependency_keeps_empty_version() {
        let leaf = pom(
            "/repo/pom.xml",
            "<project><artifactId>a</artifactId><dependencies><dependency><groupId>x</groupId><artifactId>y</artifactId></dependency></dependencies></project>",
        );
        let view = EffectiveViewSynthesizer::new(vec![]).synthesize(&leaf, &[], None);
        let dep = view.dependency("x", "y").unwrap();
        assert_eq!(dep.version, "");
        assert_eq!(dep.scope, "compile");
    }

    #[test]
    fn test_inherited_dependencies_are_included_once() {
        let parent = pom(
            "/r/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>p</artifactId>
                <dependencies>
                    <dependency><groupId>x</groupId><artifactId>shared</artifactId><version>1</version></dependency>
                    <dependency><groupId>x</groupId><artifactId>parent-only</artifactId><version>3</version></dependency>
                </dependencies></project>"#,
        );
        let leaf = pom(
            "/r/l/pom.xml",
            r#"<project><artifactId>l</artifactId><dependencies>
                <dependency><groupId>x</groupId><artifactId>shared</artifactId><version>2</version></dependency>
            </dependencies></project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![]).synthesize(&leaf, &[&parent], None);
        assert_eq!(view.dependencies.len(), 2);
        assert_eq!(view.dependency("x", "shared").unwrap().version, "2");
        assert_eq!(view.dependency("x", "parent-only").unwrap().version, "3");
    }

    #[test]
    fn test_rendered_descriptor_fills_remaining_versions() {
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>app</artifactId>
                <dependencies><dependency><groupId>x</groupId><artifactId>y</artifactId><version>${rendered.prop}</version></dependency>
                <dependency><groupId>x</groupId><artifactId>z</artifactId></dependency></dependencies></project>"#,
        );
        let rendered = RenderedDescriptor::parse(
            Path::new("/repo/pom.xml"),
            r#"<projects>
                <project><groupId>g</groupId><artifactId>other</artifactId></project>
                <project><groupId>g</groupId><artifactId>app</artifactId>
                    <properties><rendered.prop>4.2</rendered.prop></properties>
                    <dependencies><dependency><groupId>x</groupId><artifactId>z</artifactId><version>9.9</version></dependency></dependencies>
                </project>
            </projects>"#,
            &leaf.coordinate,
        )
        .unwrap();

        let view = EffectiveViewSynthesizer::new(vec![]).synthesize(&leaf, &[], Some(&rendered));
        assert_eq!(view.dependency("x", "y").unwrap().version, "4.2");
        assert_eq!(view.dependency("x", "z").unwrap().version, "9.9");
    }

    #[test]
    fn test_malformed_rendered_output_is_unavailable() {
        let err = RenderedDescriptor::parse(
            Path::new("/repo/pom.xml"),
            "[INFO] BUILD FAILURE",
            &Coordinate::new("g", "a"),
        )
        .unwrap_err();
        assert!(matches!(err, DetectError::ResolutionUnavailable { .. }));
    }

    #[test]
    fn test_self_importing_bom_terminates() {
        let fs = MockFileSystem::with_root(PathBuf::from("/m2"));
        fs.add_file(
            "g/loop/1/loop-1.pom",
            r#"<project><groupId>g</groupId><artifactId>loop</artifactId><version>1</version>
                <dependencyManagement><dependencies>
                    <dependency><groupId>g</groupId><artifactId>loop</artifactId><version>1</version><type>pom</type><scope>import</scope></dependency>
                </dependencies></dependencyManagement></project>"#,
        );
        let repo = LocalRepository::new("/m2", Arc::new(fs));
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>a</artifactId>
                <dependencies><dependency><groupId>x</groupId><artifactId>y</artifactId></dependency></dependencies>
                <dependencyManagement><dependencies>
                    <dependency><groupId>g</groupId><artifactId>loop</artifactId><version>1</version><type>pom</type><scope>import</scope></dependency>
                </dependencies></dependencyManagement></project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![&repo as &dyn DescriptorSource]).synthesize(&leaf, &[], None);
        assert_eq!(view.dependency("x", "y").unwrap().version, "");
    }

    #[test]
    fn test_detached_synthesis_ignores_parents() {
        let repo = local_repository();
        let leaf = pom(
            "/repo/pom.xml",
            r#"<project>
                <parent><groupId>org.springframework.boot</groupId><artifactId>spring-boot-starter-parent</artifactId><version>3.0.0</version></parent>
                <artifactId>a</artifactId>
                <dependencies><dependency><groupId>org.slf4j</groupId><artifactId>slf4j-api</artifactId></dependency></dependencies>
            </project>"#,
        );

        let view = EffectiveViewSynthesizer::new(vec![&repo as &dyn DescriptorSource]).synthesize_detached(&leaf, None);
        assert_eq!(view.dependency("org.slf4j", "slf4j-api").unwrap().version, "");
    }
}
