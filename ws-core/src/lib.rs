//! Foundation types for the wsenv resolvers.
//!
//! Holds the two error kinds that cross crate boundaries, the Kubernetes
//! quantity parser and the attribute/volume names the resolvers agree on.

pub mod constants;
pub mod error;
pub mod quantity;

pub use error::{InfrastructureError, Result, ValidationError, WsError};
