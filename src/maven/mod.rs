//! Maven descriptor model, inheritance and effective resolution

pub mod coordinate;
pub mod descriptor;
pub mod effective;
pub mod hierarchy;
pub mod properties;
pub mod renderer;
pub mod repository;

pub use coordinate::{Coordinate, CoordinateKey, Dependency, ResolvedDependency};
pub use descriptor::{is_descriptor_file_name, DescriptorNode, ParentRef, DESCRIPTOR_FILE_NAME};
pub use effective::{EffectiveView, EffectiveViewSynthesizer, RenderedDescriptor};
pub use hierarchy::{HierarchyResolver, Lineage, NodeId, Registration, FRAMEWORK_DEFAULT_PARENT};
pub use properties::{substitute, PropertyMap, PropertyScope};
pub use renderer::{CancelToken, EffectiveRenderer, MavenRenderer};
pub use repository::{DescriptorSource, LocalRepository};
