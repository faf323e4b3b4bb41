//! Configuration management for pomdetect
//!
//! Settings are loaded from environment variables with sensible defaults.
//! Command line flags override them after loading.
//!
//! # Environment Variables
//!
//! - `POMDETECT_RENDER_EFFECTIVE`: Render effective descriptors with Maven (true|false) - default: "false"
//! - `POMDETECT_MAVEN_COMMAND`: Maven executable used for rendering - default: "mvn"
//! - `POMDETECT_RENDER_TIMEOUT`: Rendering timeout in seconds - default: "60"
//! - `POMDETECT_LOCAL_REPOSITORY`: Local repository consulted for BOM imports and
//!   external parents - default: `~/.m2/repository`
//! - `POMDETECT_LOG_LEVEL`: Logging level - default: "info"
//! - `POMDETECT_MAX_IMPORT_DEPTH`: Maximum nesting of BOM imports - default: "8"
//!
//! # Example
//!
//! ```no_run
//! use pomdetect::DetectorConfig;
//!
//! let config = DetectorConfig::default();
//! config.validate().expect("Invalid configuration");
//! ```

use crate::maven::repository::LocalRepository;
use crate::util::logging::{level_from_name, VALID_LEVELS};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAVEN_COMMAND: &str = "mvn";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_RENDER_EFFECTIVE: bool = false;
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_IMPORT_DEPTH: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Shell out to Maven for the effective descriptor before local synthesis
    pub render_effective: bool,

    pub maven_command: String,

    pub render_timeout_secs: u64,

    /// `None` when no home directory could be determined
    pub local_repository: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub max_import_depth: usize,
}

impl Default for DetectorConfig {
    /// Loads from `POMDETECT_*` environment variables, falling back to
    /// defaults for anything missing or unparsable
    fn default() -> Self {
        let render_effective = env::var("POMDETECT_RENDER_EFFECTIVE")
            .ok()
            .and_then(|v| v.to_lowercase().parse::<bool>().ok())
            .unwrap_or(DEFAULT_RENDER_EFFECTIVE);

        let maven_command = env::var("POMDETECT_MAVEN_COMMAND")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MAVEN_COMMAND.to_string());

        let render_timeout_secs = env::var("POMDETECT_RENDER_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RENDER_TIMEOUT_SECS);

        let local_repository = env::var("POMDETECT_LOCAL_REPOSITORY")
            .ok()
            .map(PathBuf::from)
            .or_else(LocalRepository::default_root);

        let log_level = env::var("POMDETECT_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let max_import_depth = env::var("POMDETECT_MAX_IMPORT_DEPTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_IMPORT_DEPTH);

        Self {
            render_effective,
            maven_command,
            render_timeout_secs,
            local_repository,
            log_level,
            max_import_depth,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Render timeout must be at least 1 second".to_string(),
            ));
        }
        if self.render_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Render timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if !(1..=64).contains(&self.max_import_depth) {
            return Err(ConfigError::ValidationFailed(format!(
                "Max import depth must be between 1 and 64, got {}",
                self.max_import_depth
            )));
        }

        if self.maven_command.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Maven command cannot be empty".to_string(),
            ));
        }

        if level_from_name(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: {}",
                self.log_level,
                VALID_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// Parses a timeout given on the command line
    pub fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::ParseError {
                field: "render timeout".to_string(),
                error: e.to_string(),
            })
    }
}

impl fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pomdetect Configuration:")?;
        writeln!(f, "  Render Effective: {}", self.render_effective)?;
        writeln!(f, "  Maven Command: {}", self.maven_command)?;
        writeln!(f, "  Render Timeout: {}s", self.render_timeout_secs)?;
        match &self.local_repository {
            Some(dir) => writeln!(f, "  Local Repository: {}", dir.display())?,
            None => writeln!(f, "  Local Repository: (none)")?,
        }
        writeln!(f, "  Max Import Depth: {}", self.max_import_depth)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
