use crate::classify::{ProjectMetadata, ResourceRequirement};
use crate::maven::{Coordinate, ResolvedDependency};
use serde::Serialize;
use std::path::PathBuf;

pub const DETECTION_RULE: &str = "Inferred by presence of: pom.xml";

crate::define_id_enum! {
    Language {
        Java => "java": "Java",
    }
}

/// A runnable module and everything inferred about it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub language: Language,
    pub path: PathBuf,
    pub detection_rule: String,
    pub coordinate: Coordinate,
    /// Descriptor of the aggregator that owns this module, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_aggregator: Option<PathBuf>,
    pub dependencies: Vec<ResolvedDependency>,
    pub requirements: Vec<ResourceRequirement>,
    pub metadata: ProjectMetadata,
}

impl Project {
    pub fn name(&self) -> &str {
        self.metadata
            .application_name
            .as_deref()
            .unwrap_or(&self.coordinate.artifact_id)
    }
}
