//! Platform resource classification of a resolved dependency set

pub mod bindings;
mod id_enum_macro;
pub mod inference;
pub mod rules;

pub use inference::{infer, Inference, InferenceContext, ProjectMetadata};
pub use rules::{
    Artifact, Bindings, MatchTarget, MetadataRule, RequirementTemplate, ResourceRule,
    DEFAULT_METADATA_RULES, DEFAULT_RESOURCE_RULES,
};

use crate::maven::{Coordinate, ResolvedDependency};
use crate::overlay::ConfigurationOverlay;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

crate::define_id_enum! {
    DatabaseKind {
        Postgres => "postgres": "PostgreSQL",
        MySql => "mysql": "MySQL",
        Redis => "redis": "Redis",
        Mongo => "mongo": "MongoDB",
        Cosmos => "cosmos": "Cosmos DB",
    }
}

crate::define_id_enum! {
    QueueKind {
        ServiceBus => "servicebus": "Service Bus",
        ServiceBusJms => "servicebus-jms": "Service Bus (JMS)",
    }
}

crate::define_id_enum! {
    StreamKind {
        EventHubs => "eventhubs": "Event Hubs",
    }
}

crate::define_id_enum! {
    /// Facts about a project that do not map to a provisioned resource
    MetadataFlag {
        SpringCloudAzureStarter => "spring-cloud-azure-starter": "Spring Cloud Azure starter",
        JdbcPostgresqlStarter => "spring-cloud-azure-starter-jdbc-postgresql": "Spring Cloud Azure JDBC PostgreSQL starter",
        JdbcMysqlStarter => "spring-cloud-azure-starter-jdbc-mysql": "Spring Cloud Azure JDBC MySQL starter",
        EurekaServer => "eureka-server": "Eureka server",
        EurekaClient => "eureka-client": "Eureka client",
        ConfigServer => "config-server": "Spring Cloud Config server",
        ConfigClient => "config-client": "Spring Cloud Config client",
        SpringFrontend => "spring-frontend": "Frontend build plugin",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRequirement {
    Database(DatabaseKind),
    MessageQueue {
        kind: QueueKind,
        destinations: BTreeSet<String>,
    },
    EventStream {
        kind: StreamKind,
        names: BTreeSet<String>,
        uses_alternate_protocol: bool,
    },
    ObjectStorage {
        container_names: BTreeSet<String>,
    },
}

impl std::fmt::Display for ResourceRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn list(items: &BTreeSet<String>) -> String {
            items.iter().cloned().collect::<Vec<_>>().join(", ")
        }

        match self {
            ResourceRequirement::Database(kind) => write!(f, "{kind}"),
            ResourceRequirement::MessageQueue { kind, destinations } if destinations.is_empty() => {
                write!(f, "{kind}")
            }
            ResourceRequirement::MessageQueue { kind, destinations } => {
                write!(f, "{kind} [{}]", list(destinations))
            }
            ResourceRequirement::EventStream {
                kind,
                names,
                uses_alternate_protocol,
            } => {
                write!(f, "{kind} [{}]", list(names))?;
                if *uses_alternate_protocol {
                    write!(f, " (Kafka)")?;
                }
                Ok(())
            }
            ResourceRequirement::ObjectStorage { container_names } => {
                write!(f, "Storage Account [{}]", list(container_names))
            }
        }
    }
}

/// Applies a rule table to resolved dependencies
#[derive(Debug, Clone)]
pub struct Classifier {
    resource_rules: Vec<ResourceRule>,
    metadata_rules: Vec<MetadataRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_RULES.to_vec(), DEFAULT_METADATA_RULES.to_vec())
    }
}

impl Classifier {
    pub fn new(resource_rules: Vec<ResourceRule>, metadata_rules: Vec<MetadataRule>) -> Self {
        Self {
            resource_rules,
            metadata_rules,
        }
    }

    pub fn resource_rules(&self) -> &[ResourceRule] {
        &self.resource_rules
    }

    /// The result depends only on the set of dependency keys and the overlay,
    /// never on dependency order
    pub fn classify(
        &self,
        dependencies: &[ResolvedDependency],
        overlay: &ConfigurationOverlay,
    ) -> BTreeSet<ResourceRequirement> {
        let mut requirements = BTreeSet::new();

        for rule in &self.resource_rules {
            let Some(dep) = rule.matched(dependencies) else {
                continue;
            };

            let produced = instantiate(&rule.template, overlay);
            for requirement in &produced {
                info!(
                    "Detected '{}' because found dependency '{}:{}' (rule {})",
                    requirement, dep.group_id, dep.artifact_id, rule.name
                );
            }
            requirements.extend(produced);
        }

        requirements
    }

    pub fn flags(
        &self,
        dependencies: &[ResolvedDependency],
        build_plugins: &[Coordinate],
    ) -> BTreeSet<MetadataFlag> {
        let dependency_keys: HashSet<(&str, &str)> = dependencies
            .iter()
            .map(|d| (d.group_id.as_str(), d.artifact_id.as_str()))
            .collect();
        let plugin_keys: HashSet<(&str, &str)> = build_plugins
            .iter()
            .map(|p| (p.group_id.as_str(), p.artifact_id.as_str()))
            .collect();

        let mut flags = BTreeSet::new();
        for rule in &self.metadata_rules {
            let keys = match rule.target {
                MatchTarget::Dependency => &dependency_keys,
                MatchTarget::BuildPlugin => &plugin_keys,
            };
            if rule
                .alternatives
                .iter()
                .any(|alt| keys.contains(&(alt.group_id, alt.artifact_id)))
            {
                debug!(flag = %rule.flag, "Metadata flag set");
                flags.insert(rule.flag);
            }
        }
        flags
    }
}

fn instantiate(template: &RequirementTemplate, overlay: &ConfigurationOverlay) -> Vec<ResourceRequirement> {
    match template {
        RequirementTemplate::Database(kind) => vec![ResourceRequirement::Database(*kind)],
        RequirementTemplate::MessageQueue { kind, bindings } => {
            let Some(bindings) = bindings else {
                return vec![ResourceRequirement::MessageQueue {
                    kind: *kind,
                    destinations: BTreeSet::new(),
                }];
            };
            let (destinations, storage) = read_bindings(bindings, overlay, kind.display_name());
            let mut produced = vec![ResourceRequirement::MessageQueue {
                kind: *kind,
                destinations,
            }];
            produced.extend(storage);
            produced
        }
        RequirementTemplate::EventStream {
            kind,
            uses_alternate_protocol,
            bindings,
        } => {
            let (names, storage) = read_bindings(bindings, overlay, kind.display_name());
            let mut produced = vec![ResourceRequirement::EventStream {
                kind: *kind,
                names,
                uses_alternate_protocol: *uses_alternate_protocol,
            }];
            produced.extend(storage);
            produced
        }
    }
}

/// Distinct destinations plus the checkpoint storage requirement, if any
fn read_bindings(
    template: &Bindings,
    overlay: &ConfigurationOverlay,
    resource: &str,
) -> (BTreeSet<String>, Option<ResourceRequirement>) {
    let channels = bindings::binding_destinations(overlay, template.namespace);
    for (channel, destination) in &channels {
        info!("  Detected {} [{}] for binding [{}]", resource, destination, channel);
    }

    let storage = template.checkpoint_container_key.and_then(|key| {
        let channel = bindings::input_channel(&channels)?;
        let container_names: BTreeSet<String> = overlay
            .get(key)
            .filter(|name| !name.is_empty())
            .map(|name| BTreeSet::from([name.to_string()]))
            .unwrap_or_default();
        debug!(channel = %channel, "input channel implies a checkpoint store");
        Some(ResourceRequirement::ObjectStorage { container_names })
    });

    (bindings::distinct_destinations(&channels), storage)
}
