//! Model shared by the wsenv resolvers.
//!
//! Cluster objects are the `k8s-openapi` types, extended with the OpenShift
//! kinds in [`openshift`]. [`environment::Environment`] is the resolved
//! result; [`machine::MachineConfig`] and [`machine::ServerConfig`] describe
//! what each logical machine needs at runtime.

pub mod annotations;
pub mod containers;
pub mod environment;
pub mod machine;
pub mod names;
pub mod objects;
pub mod openshift;

pub use environment::{Environment, EnvironmentBuilder, Recipe, Warning};
pub use machine::{MachineConfig, ServerConfig, Volume};
pub use objects::{ClusterObject, UnknownObject};
pub use openshift::{DeploymentConfig, Route};

// Re-export so dependants name the same cluster types
pub use k8s_openapi;
