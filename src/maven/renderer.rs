//! Optional external rendering of a descriptor's effective form
//!
//! Rendering shells out to the Maven CLI (`help:effective-pom`) and is the
//! only step that may touch the network. It is bounded by a timeout and can
//! be cancelled. Every failure is reported as
//! [`DetectError::ResolutionUnavailable`] so callers can fall back to local
//! synthesis.

use crate::error::DetectError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared flag that aborts an in-flight render
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub trait EffectiveRenderer: Send + Sync {
    /// Effective descriptor text for the descriptor at `descriptor_path`
    fn render(&self, descriptor_path: &Path, cancel: &CancelToken) -> Result<String, DetectError>;
}

pub struct MavenRenderer {
    command: String,
    timeout: Duration,
}

impl MavenRenderer {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn output_path() -> PathBuf {
        std::env::temp_dir().join(format!("pomdetect-effective-{}.xml", Uuid::new_v4()))
    }
}

impl EffectiveRenderer for MavenRenderer {
    fn render(&self, descriptor_path: &Path, cancel: &CancelToken) -> Result<String, DetectError> {
        let unavailable = |reason: String| DetectError::ResolutionUnavailable {
            path: descriptor_path.to_path_buf(),
            reason,
        };

        if cancel.is_cancelled() {
            return Err(unavailable("cancelled".to_string()));
        }

        let output = Self::output_path();
        debug!(
            descriptor = %descriptor_path.display(),
            command = %self.command,
            "Rendering effective descriptor"
        );

        let mut child = Command::new(&self.command)
            .arg("-q")
            .arg("-f")
            .arg(descriptor_path)
            .arg("help:effective-pom")
            .arg(format!("-Doutput={}", output.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| unavailable(format!("failed to start {}: {}", self.command, e)))?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => return Err(unavailable(format!("failed to wait for {}: {}", self.command, e))),
            }

            if cancel.is_cancelled() || Instant::now() >= deadline {
                let reason = if cancel.is_cancelled() {
                    "cancelled".to_string()
                } else {
                    format!("timed out after {}s", self.timeout.as_secs())
                };
                if let Err(e) = child.kill() {
                    warn!("Failed to stop {}: {}", self.command, e);
                }
                let _ = child.wait();
                let _ = std::fs::remove_file(&output);
                return Err(unavailable(reason));
            }

            std::thread::sleep(POLL_INTERVAL);
        };

        let text = std::fs::read_to_string(&output);
        let _ = std::fs::remove_file(&output);

        if !status.success() {
            return Err(unavailable(format!("{} exited with {}", self.command, status)));
        }

        text.map_err(|e| unavailable(format!("no effective output: {e}")))
    }
}
