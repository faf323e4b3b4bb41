//! pomdetect - Maven multi-module resolution and platform resource inference
//!
//! Given a directory tree of `pom.xml` files arranged in parent/child and
//! aggregator/module relationships, this library parses every descriptor,
//! reconstructs the hierarchy, computes each runnable module's effective
//! dependency set and infers the external resources (databases, message
//! queues, event streams, storage) the module needs.
//!
//! # Example Usage
//!
//! ```no_run
//! use pomdetect::detect::{detect_tree, JavaDetector};
//! use pomdetect::fs::RealFileSystem;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut detector = JavaDetector::new(Arc::new(RealFileSystem::new()));
//! for project in detect_tree(Path::new("."), &mut detector)? {
//!     println!("{}: {:?}", project.coordinate, project.requirements);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`maven`]: descriptor model, property substitution, hierarchy and
//!   effective view synthesis
//! - [`overlay`]: application configuration flattening
//! - [`classify`]: rule table, resource classification and metadata
//! - [`detect`]: per-directory detection and tree traversal

pub mod classify;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod fs;
pub mod maven;
pub mod overlay;
pub mod util;

pub use classify::{Classifier, ResourceRequirement};
pub use config::{ConfigError, DetectorConfig};
pub use detect::{detect_tree, JavaDetector, Project};
pub use error::{DescriptorParseError, DetectError};
pub use overlay::ConfigurationOverlay;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_pomdetect() {
        assert_eq!(NAME, "pomdetect");
    }
}
