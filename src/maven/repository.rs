//! Sources of descriptors that are referenced by coordinate rather than by
//! path: BOM imports and parents outside the scanned tree
//!
//! Only local data is consulted. The local repository is read from disk as
//! it is; nothing is ever downloaded.

use super::coordinate::Coordinate;
use super::descriptor::DescriptorNode;
use super::hierarchy::HierarchyResolver;
use super::properties::has_placeholder;
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub trait DescriptorSource {
    /// Descriptor for `coordinate`, if this source has it
    fn load(&self, coordinate: &Coordinate) -> Option<DescriptorNode>;
}

/// First source that can supply the coordinate wins
pub fn load_from(sources: &[&dyn DescriptorSource], coordinate: &Coordinate) -> Option<DescriptorNode> {
    sources.iter().find_map(|s| s.load(coordinate))
}

impl DescriptorSource for HierarchyResolver {
    fn load(&self, coordinate: &Coordinate) -> Option<DescriptorNode> {
        let id = self.find_by_coordinate(coordinate)?;
        let node = self.node(id);
        match (&coordinate.version, &node.coordinate.version) {
            (Some(wanted), Some(have)) if wanted != have && !has_placeholder(have) => None,
            _ => Some(node.clone()),
        }
    }
}

/// A Maven local repository laid out as
/// `<root>/<group path>/<artifact>/<version>/<artifact>-<version>.pom`
pub struct LocalRepository {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    /// `~/.m2/repository`, when a home directory exists
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".m2").join("repository"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn descriptor_path(&self, coordinate: &Coordinate) -> Option<PathBuf> {
        let version = coordinate.version.as_deref()?;
        if version.is_empty()
            || has_placeholder(version)
            || coordinate.group_id.is_empty()
            || coordinate.artifact_id.is_empty()
        {
            return None;
        }

        let mut path = self.root.clone();
        for segment in coordinate.group_id.split('.') {
            path.push(segment);
        }
        path.push(&coordinate.artifact_id);
        path.push(version);
        path.push(format!("{}-{}.pom", coordinate.artifact_id, version));
        Some(path)
    }
}

impl DescriptorSource for LocalRepository {
    fn load(&self, coordinate: &Coordinate) -> Option<DescriptorNode> {
        let path = self.descriptor_path(coordinate)?;
        if !self.fs.is_file(&path) {
            debug!(coordinate = %coordinate, "not present in local repository");
            return None;
        }

        match DescriptorNode::read(self.fs.as_ref(), &path) {
            Ok(node) => Some(node),
            Err(e) => {
                warn!("Ignoring unreadable repository descriptor: {}", e);
                None
            }
        }
    }
}
