//! Plugin sidecars: descriptors, their validation and the machine config a
//! sidecar resolves to.

pub mod loader;
pub mod resolver;
pub mod types;

pub use loader::{load_descriptor, validate_descriptor, DescriptorError};
pub use resolver::{MachineResolver, ProjectsMount};
pub use types::{EndpointDeclaration, PluginDescriptor, SidecarSpec, SidecarVolume};
