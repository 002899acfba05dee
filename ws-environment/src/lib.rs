//! Environment resolution: recipe content in, validated [`Environment`] out.
//!
//! [`EnvironmentFactory`] drives the pipeline. Parsing, memory defaults and
//! final consistency checks are separate collaborators so that each can be
//! swapped or tested on its own.
//!
//! [`Environment`]: ws_model::Environment

pub mod factory;
pub mod manifest;
pub mod provisioner;
pub mod validator;

pub use factory::EnvironmentFactory;
pub use manifest::{ManifestClient, ManifestError, YamlManifestClient};
pub use provisioner::MemoryAttributeProvisioner;
pub use validator::{EnvironmentValidator, RecipeEnvironmentValidator};
