//! Tree traversal driving [`JavaDetector`]
//!
//! Directories are discovered with `ignore`, so `.gitignore` rules and the
//! fixed build-output exclusions both apply. They are visited in
//! lexicographic pre-order in two passes: the first registers every
//! descriptor, the second detects projects. A module whose aggregator sorts
//! after it is therefore still attributed to it.
//!
//! Discovery walks the real file system; directory listings and descriptor
//! reads go through the detector's [`FileSystem`](crate::fs::FileSystem).

use super::{JavaDetector, Project};
use crate::fs::DirEntry;
use crate::maven::is_descriptor_file_name;
use anyhow::{bail, Context, Result};
use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const EXCLUDED_DIRS: &[&str] = &["target", "build", ".git", ".gradle", ".m2", "node_modules"];

pub const DEFAULT_MAX_DEPTH: usize = 32;

pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

/// Detects every runnable project under `root`. Only an unusable `root`
/// is an error; problems with individual descriptors are logged and skipped.
pub fn detect_tree(root: &Path, detector: &mut JavaDetector) -> Result<Vec<Project>> {
    if !root.is_dir() {
        bail!("Failed to read directory {}: not a directory", root.display());
    }

    let fs = detector.fs().clone();
    let mut directories = Vec::new();
    for dir in collect_directories(root)? {
        match fs.read_dir(&dir) {
            Ok(entries) => directories.push((dir, entries)),
            Err(e) => warn!("Skipping unreadable directory {}: {}", dir.display(), e),
        }
    }
    debug!(directories = directories.len(), "Collected directories");

    for (dir, entries) in &directories {
        if let Some(entry) = descriptor_entry(entries) {
            let descriptor_path = dir.join(entry.file_name());
            if let Err(e) = detector.preload(&descriptor_path) {
                warn!("Skipping descriptor: {}", e);
            }
        }
    }

    let mut projects = Vec::new();
    for (dir, entries) in &directories {
        if detector.cancel_token().is_cancelled() {
            warn!("Detection cancelled");
            break;
        }
        match detector.detect_project(dir, entries) {
            Ok(Some(project)) => projects.push(project),
            Ok(None) => {}
            Err(e) => warn!("Skipping descriptor: {}", e),
        }
    }

    info!(
        root = %root.display(),
        projects = projects.len(),
        descriptors = detector.resolver().len(),
        "Detection complete"
    );

    Ok(projects)
}

fn descriptor_entry(entries: &[DirEntry]) -> Option<&DirEntry> {
    entries
        .iter()
        .find(|e| !e.is_dir() && is_descriptor_file_name(e.file_name()))
}

fn excluded_overrides(root: &Path) -> Result<Override> {
    let mut builder = OverrideBuilder::new(root);
    for excluded in EXCLUDED_DIRS {
        builder
            .add(&format!("!{}/", excluded))
            .with_context(|| format!("Invalid exclusion pattern for {}", excluded))?;
    }
    builder.build().context("Failed to build directory exclusions")
}

/// Pre-order, siblings sorted by name, ignored directories pruned
fn collect_directories(root: &Path) -> Result<Vec<PathBuf>> {
    let overrides = excluded_overrides(root)?;

    let mut directories = Vec::new();
    for result in WalkBuilder::new(root)
        .max_depth(Some(DEFAULT_MAX_DEPTH))
        .hidden(false)
        .git_ignore(true)
        .overrides(overrides)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
    {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };

        if entry.file_type().is_some_and(|t| t.is_dir()) {
            directories.push(entry.into_path());
        }
    }

    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn pom(artifact_id: &str) -> String {
        format!("<project><groupId>g</groupId><artifactId>{artifact_id}</artifactId></project>")
    }

    fn detect(root: &Path) -> Vec<Project> {
        let mut detector = JavaDetector::new(Arc::new(RealFileSystem::new()));
        detect_tree(root, &mut detector).unwrap()
    }

    fn names(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.coordinate.artifact_id.as_str()).collect()
    }

    #[test]
    fn test_excluded_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "target/classes/pom.xml", &pom("copy"));
        write(dir.path(), "node_modules/x/pom.xml", &pom("dep"));
        write(dir.path(), "app/pom.xml", &pom("app"));

        assert_eq!(names(&detect(dir.path())), vec!["app"]);
    }

    #[test]
    fn test_gitignored_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        write(dir.path(), ".gitignore", "generated/\n");
        write(dir.path(), "app/pom.xml", &pom("app"));
        write(dir.path(), "generated/copy/pom.xml", &pom("generated-copy"));

        assert_eq!(names(&detect(dir.path())), vec!["app"]);
    }

    #[test]
    fn test_projects_in_lexicographic_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "zeta/pom.xml", &pom("zeta"));
        write(dir.path(), "alpha/pom.xml", &pom("alpha"));
        write(dir.path(), "mid/pom.xml", &pom("mid"));
        write(dir.path(), "alpha/nested/pom.xml", &pom("alpha-nested"));

        assert_eq!(
            names(&detect(dir.path())),
            vec!["alpha", "alpha-nested", "mid", "zeta"]
        );
    }

    #[test]
    fn test_aggregator_after_module_still_owns_it() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "a-service/pom.xml",
            r#"<project><parent><groupId>g</groupId><artifactId>z-parent</artifactId><version>1</version><relativePath>../z-parent</relativePath></parent>
                <artifactId>a-service</artifactId></project>"#,
        );
        write(
            dir.path(),
            "z-parent/pom.xml",
            r#"<project><groupId>g</groupId><artifactId>z-parent</artifactId><version>1</version>
                <modules><module>../a-service</module></modules></project>"#,
        );

        let projects = detect(dir.path());
        assert_eq!(projects.len(), 1);
        assert_eq!(
            projects[0].parent_aggregator,
            Some(dir.path().join("z-parent").join("pom.xml"))
        );
    }

    #[test]
    fn test_malformed_descriptor_does_not_abort() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "bad/pom.xml", "<project>");
        write(dir.path(), "good/pom.xml", &pom("good"));

        assert_eq!(names(&detect(dir.path())), vec!["good"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut detector = JavaDetector::new(Arc::new(RealFileSystem::new()));
        assert!(detect_tree(&dir.path().join("missing"), &mut detector).is_err());
    }

    #[test]
    fn test_excluded_names() {
        assert!(is_excluded_dir("target"));
        assert!(is_excluded_dir(".git"));
        assert!(!is_excluded_dir("src"));
    }

    #[test]
    fn test_overrides_exclude_build_directories() {
        let dir = TempDir::new().unwrap();
        let overrides = excluded_overrides(dir.path()).unwrap();
        assert!(overrides.matched(dir.path().join("target"), true).is_ignore());
        assert!(!overrides.matched(dir.path().join("src"), true).is_ignore());
    }
}
