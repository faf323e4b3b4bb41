//! Rule table mapping dependency coordinates to platform resources
//!
//! Rules are plain data. A rule fires when any of its alternatives is present
//! in the resolved dependency set (or among the build plugins, for metadata
//! rules targeting them).

use super::{DatabaseKind, MetadataFlag, QueueKind, StreamKind};
use crate::maven::ResolvedDependency;

pub const DEFAULT_BINDING_NAMESPACE: &str = "spring.cloud.stream";
pub const EVENT_HUBS_CHECKPOINT_CONTAINER_KEY: &str =
    "spring.cloud.azure.eventhubs.processor.checkpoint-store.container-name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Artifact {
    pub group_id: &'static str,
    pub artifact_id: &'static str,
}

impl Artifact {
    pub const fn new(group_id: &'static str, artifact_id: &'static str) -> Self {
        Self {
            group_id,
            artifact_id,
        }
    }

    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }
}

/// Where binding destinations are read from, and whether an input channel
/// implies a checkpoint store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bindings {
    pub namespace: &'static str,
    /// Configuration key holding the checkpoint container name. When set, any
    /// channel containing `-in-` adds an object storage requirement.
    pub checkpoint_container_key: Option<&'static str>,
}

impl Bindings {
    pub const fn new(namespace: &'static str) -> Self {
        Self {
            namespace,
            checkpoint_container_key: None,
        }
    }

    pub const fn with_checkpoint(mut self, key: &'static str) -> Self {
        self.checkpoint_container_key = Some(key);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementTemplate {
    Database(DatabaseKind),
    MessageQueue {
        kind: QueueKind,
        bindings: Option<Bindings>,
    },
    EventStream {
        kind: StreamKind,
        uses_alternate_protocol: bool,
        bindings: Bindings,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRule {
    pub name: &'static str,
    pub alternatives: &'static [Artifact],
    pub template: RequirementTemplate,
}

impl ResourceRule {
    /// First alternative present in `dependencies`
    pub fn matched<'d>(&self, dependencies: &'d [ResolvedDependency]) -> Option<&'d ResolvedDependency> {
        self.alternatives.iter().find_map(|alt| {
            dependencies
                .iter()
                .find(|d| alt.matches(&d.group_id, &d.artifact_id))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
    Dependency,
    BuildPlugin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataRule {
    pub alternatives: &'static [Artifact],
    pub target: MatchTarget,
    pub flag: MetadataFlag,
}

const SPRING_BOOT: &str = "org.springframework.boot";
const SPRING_CLOUD: &str = "org.springframework.cloud";
const AZURE_SPRING: &str = "com.azure.spring";

pub const DEFAULT_RESOURCE_RULES: &[ResourceRule] = &[
    ResourceRule {
        name: "postgresql",
        alternatives: &[Artifact::new("org.postgresql", "postgresql")],
        template: RequirementTemplate::Database(DatabaseKind::Postgres),
    },
    ResourceRule {
        name: "mysql",
        alternatives: &[Artifact::new("com.mysql", "mysql-connector-j")],
        template: RequirementTemplate::Database(DatabaseKind::MySql),
    },
    ResourceRule {
        name: "redis",
        alternatives: &[
            Artifact::new(SPRING_BOOT, "spring-boot-starter-data-redis"),
            Artifact::new(SPRING_BOOT, "spring-boot-starter-data-redis-reactive"),
        ],
        template: RequirementTemplate::Database(DatabaseKind::Redis),
    },
    ResourceRule {
        name: "mongodb",
        alternatives: &[
            Artifact::new(SPRING_BOOT, "spring-boot-starter-data-mongodb"),
            Artifact::new(SPRING_BOOT, "spring-boot-starter-data-mongodb-reactive"),
        ],
        template: RequirementTemplate::Database(DatabaseKind::Mongo),
    },
    ResourceRule {
        name: "cosmos",
        alternatives: &[Artifact::new(AZURE_SPRING, "spring-cloud-azure-starter-data-cosmos")],
        template: RequirementTemplate::Database(DatabaseKind::Cosmos),
    },
    ResourceRule {
        name: "service-bus-jms",
        alternatives: &[Artifact::new(AZURE_SPRING, "spring-cloud-azure-starter-servicebus-jms")],
        template: RequirementTemplate::MessageQueue {
            kind: QueueKind::ServiceBusJms,
            bindings: None,
        },
    },
    ResourceRule {
        name: "service-bus-binder",
        alternatives: &[Artifact::new(AZURE_SPRING, "spring-cloud-azure-stream-binder-servicebus")],
        template: RequirementTemplate::MessageQueue {
            kind: QueueKind::ServiceBus,
            bindings: Some(Bindings::new(DEFAULT_BINDING_NAMESPACE)),
        },
    },
    ResourceRule {
        name: "event-hubs-binder",
        alternatives: &[Artifact::new(AZURE_SPRING, "spring-cloud-azure-stream-binder-eventhubs")],
        template: RequirementTemplate::EventStream {
            kind: StreamKind::EventHubs,
            uses_alternate_protocol: false,
            bindings: Bindings::new(DEFAULT_BINDING_NAMESPACE)
                .with_checkpoint(EVENT_HUBS_CHECKPOINT_CONTAINER_KEY),
        },
    },
    ResourceRule {
        name: "kafka-binder",
        alternatives: &[Artifact::new(SPRING_CLOUD, "spring-cloud-starter-stream-kafka")],
        template: RequirementTemplate::EventStream {
            kind: StreamKind::EventHubs,
            uses_alternate_protocol: true,
            bindings: Bindings::new(DEFAULT_BINDING_NAMESPACE),
        },
    },
];

pub const DEFAULT_METADATA_RULES: &[MetadataRule] = &[
    MetadataRule {
        alternatives: &[Artifact::new(AZURE_SPRING, "spring-cloud-azure-starter")],
        target: MatchTarget::Dependency,
        flag: MetadataFlag::SpringCloudAzureStarter,
    },
    MetadataRule {
        alternatives: &[Artifact::new(AZURE_SPRING, "spring-cloud-azure-starter-jdbc-postgresql")],
        target: MatchTarget::Dependency,
        flag: MetadataFlag::JdbcPostgresqlStarter,
    },
    MetadataRule {
        alternatives: &[Artifact::new(AZURE_SPRING, "spring-cloud-azure-starter-jdbc-mysql")],
        target: MatchTarget::Dependency,
        flag: MetadataFlag::JdbcMysqlStarter,
    },
    MetadataRule {
        alternatives: &[Artifact::new(SPRING_CLOUD, "spring-cloud-starter-netflix-eureka-server")],
        target: MatchTarget::Dependency,
        flag: MetadataFlag::EurekaServer,
    },
    MetadataRule {
        alternatives: &[Artifact::new(SPRING_CLOUD, "spring-cloud-starter-netflix-eureka-client")],
        target: MatchTarget::Dependency,
        flag: MetadataFlag::EurekaClient,
    },
    MetadataRule {
        alternatives: &[Artifact::new(SPRING_CLOUD, "spring-cloud-config-server")],
        target: MatchTarget::Dependency,
        flag: MetadataFlag::ConfigServer,
    },
    MetadataRule {
        alternatives: &[Artifact::new(SPRING_CLOUD, "spring-cloud-starter-config")],
        target: MatchTarget::Dependency,
        flag: MetadataFlag::ConfigClient,
    },
    MetadataRule {
        alternatives: &[Artifact::new("com.github.eirslett", "frontend-maven-plugin")],
        target: MatchTarget::BuildPlugin,
        flag: MetadataFlag::SpringFrontend,
    },
];
