//! Aggregation of classified resources and project metadata

use super::{Classifier, DatabaseKind, MetadataFlag, ResourceRequirement};
use crate::maven::{substitute, Coordinate, DescriptorNode, EffectiveView};
use crate::overlay::ConfigurationOverlay;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::debug;

pub const APPLICATION_NAME_KEY: &str = "spring.application.name";
pub const DATASOURCE_URL_KEY: &str = "spring.datasource.url";

const BOOT_STARTER_PARENT: &str = "spring-boot-starter-parent";
const BOOT_DEPENDENCIES: &str = "spring-boot-dependencies";

static DATABASE_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn database_name_re() -> &'static Regex {
    DATABASE_NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub database_names: BTreeMap<DatabaseKind, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spring_boot_version: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<MetadataFlag>,
}

impl ProjectMetadata {
    pub fn has_flag(&self, flag: MetadataFlag) -> bool {
        self.flags.contains(&flag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inference {
    pub requirements: Vec<ResourceRequirement>,
    pub metadata: ProjectMetadata,
}

/// Descriptors the framework version is read from, leaf first
pub struct InferenceContext<'a> {
    pub classifier: &'a Classifier,
    pub leaf: &'a DescriptorNode,
    pub owner: Option<&'a DescriptorNode>,
}

pub fn infer(
    view: &EffectiveView,
    plugins: &[Coordinate],
    overlay: &ConfigurationOverlay,
    context: &InferenceContext<'_>,
) -> Inference {
    let requirements = context
        .classifier
        .classify(&view.dependencies, overlay)
        .into_iter()
        .collect();

    let mut metadata = ProjectMetadata {
        application_name: overlay.get(APPLICATION_NAME_KEY).map(str::to_string),
        flags: context.classifier.flags(&view.dependencies, plugins),
        spring_boot_version: spring_boot_version(context.leaf, &view.properties)
            .or_else(|| context.owner.and_then(|owner| spring_boot_version(owner, &owner.properties))),
        ..ProjectMetadata::default()
    };

    match overlay.get(DATASOURCE_URL_KEY) {
        Some(url) => match database_name_from_url(url) {
            Some((kind, name)) => {
                metadata.database_names.insert(kind, name);
            }
            None => debug!("can not get database name from {}", DATASOURCE_URL_KEY),
        },
        None => debug!("{} not set", DATASOURCE_URL_KEY),
    }

    Inference {
        requirements,
        metadata,
    }
}

/// Parent starter version, else the imported `spring-boot-dependencies`
/// version
pub fn spring_boot_version(node: &DescriptorNode, properties: &BTreeMap<String, String>) -> Option<String> {
    let from_parent = node
        .parent_coordinate()
        .filter(|p| p.artifact_id == BOOT_STARTER_PARENT)
        .and_then(|p| p.version.as_deref());

    let version = from_parent.or_else(|| {
        node.managed_dependencies
            .iter()
            .find(|d| d.coordinate.artifact_id == BOOT_DEPENDENCIES)
            .and_then(|d| d.coordinate.version.as_deref())
    })?;

    Some(substitute(version, properties))
}

/// Database name from a PostgreSQL or MySQL JDBC URL: the last path segment
/// without its query string, if it is a valid name
pub fn database_name_from_url(url: &str) -> Option<(DatabaseKind, String)> {
    let kind = if url.starts_with("jdbc:postgresql") {
        DatabaseKind::Postgres
    } else if url.starts_with("jdbc:mysql") {
        DatabaseKind::MySql
    } else {
        return None;
    };

    let (_, last) = url.rsplit_once('/')?;
    let name = last.split('?').next().unwrap_or_default();
    is_valid_database_name(name).then(|| (kind, name.to_string()))
}

pub fn is_valid_database_name(name: &str) -> bool {
    (3..=63).contains(&name.len()) && database_name_re().is_match(name)
}
