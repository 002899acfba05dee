//! Server resolution for running machines.
//!
//! Services and Routes created for a workspace carry the servers they expose
//! in their annotations (see [`ws_model::annotations`]). [`ServerResolver`]
//! reads them back for one machine.

pub mod resolver;

pub use resolver::ServerResolver;
