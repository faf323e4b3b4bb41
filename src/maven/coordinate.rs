//! Maven coordinates and dependency declarations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an artifact: `(groupId, artifactId)`, version excluded
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoordinateKey {
    pub group_id: String,
    pub artifact_id: String,
}

impl CoordinateKey {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
}

impl Coordinate {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn key(&self) -> CoordinateKey {
        CoordinateKey::new(self.group_id.clone(), self.artifact_id.clone())
    }

    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }

    pub fn same_key(&self, other: &Coordinate) -> bool {
        self.matches(&other.group_id, &other.artifact_id)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}:{}", self.group_id, self.artifact_id, v),
            None => write!(f, "{}:{}", self.group_id, self.artifact_id),
        }
    }
}

/// A `<dependency>` entry, either declared or managed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dependency {
    pub coordinate: Coordinate,
    pub scope: Option<String>,
    pub dep_type: Option<String>,
}

impl Dependency {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            scope: None,
            dep_type: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// `<type>pom</type><scope>import</scope>` in a managed block pulls in
    /// another descriptor's whole managed set
    pub fn is_bom_import(&self) -> bool {
        self.scope.as_deref() == Some("import") && self.dep_type.as_deref() == Some("pom")
    }
}

/// A dependency after effective-view synthesis. An empty `version` means no
/// source pinned it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub scope: String,
}

impl ResolvedDependency {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            scope: scope.into(),
        }
    }

    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }

    pub fn is_versioned(&self) -> bool {
        !self.version.is_empty()
    }
}

impl fmt::Display for ResolvedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} ({})",
            self.group_id, self.artifact_id, self.version, self.scope
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_display() {
        let c = Coordinate::new("org.slf4j", "slf4j-api");
        assert_eq!(c.to_string(), "org.slf4j:slf4j-api");
        assert_eq!(c.with_version("2.0.4").to_string(), "org.slf4j:slf4j-api:2.0.4");
    }

    #[test]
    fn test_key_ignores_version() {
        let a = Coordinate::new("g", "a").with_version("1");
        let b = Coordinate::new("g", "a").with_version("2");
        assert_eq!(a.key(), b.key());
        assert!(a.same_key(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_bom_import_requires_type_and_scope() {
        let mut dep = Dependency::new(Coordinate::new("g", "bom")).with_scope("import");
        assert!(!dep.is_bom_import());
        dep.dep_type = Some("pom".to_string());
        assert!(dep.is_bom_import());
    }

    #[test]
    fn test_resolved_dependency_versioned() {
        let dep = ResolvedDependency::new("g", "a", "", "compile");
        assert!(!dep.is_versioned());
        assert!(dep.matches("g", "a"));
        assert_eq!(dep.to_string(), "g:a: (compile)");
    }
}
