//! Error taxonomy for descriptor resolution
//!
//! Every variant is scoped to the single descriptor that triggered it. None of
//! them aborts a traversal: callers log, skip or fall back and keep going.

use std::path::PathBuf;
use thiserror::Error;

/// Why a descriptor could not be turned into a [`DescriptorNode`](crate::maven::DescriptorNode)
#[derive(Debug, Error)]
pub enum DescriptorParseError {
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("root element is <{0}>, expected <project>")]
    NotAProject(String),

    #[error("content is not valid UTF-8: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Malformed descriptor {path:?}: {source}")]
    MalformedDescriptor {
        path: PathBuf,
        #[source]
        source: DescriptorParseError,
    },

    #[error("Effective descriptor unavailable for {path:?}: {reason}")]
    ResolutionUnavailable { path: PathBuf, reason: String },

    #[error("Cyclic parent chain at {coordinate} while resolving {path:?}")]
    CyclicParentChain { path: PathBuf, coordinate: String },

    #[error("Failed to read descriptor {path:?}: {message}")]
    Io { path: PathBuf, message: String },
}

impl DetectError {
    /// Path of the descriptor the error is scoped to
    pub fn path(&self) -> &PathBuf {
        match self {
            DetectError::MalformedDescriptor { path, .. }
            | DetectError::ResolutionUnavailable { path, .. }
            | DetectError::CyclicParentChain { path, .. }
            | DetectError::Io { path, .. } => path,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, DetectError::MalformedDescriptor { .. })
    }
}
