use thiserror::Error;

use crate::quantity::QuantityError;

/// The recipe or one of its objects is structurally invalid.
///
/// Never retryable. The message is reported to the caller verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Failure while turning a sidecar into a runtime machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InfrastructureError {
    #[error("{0}")]
    Policy(String),

    #[error("Invalid memory quantity: {0}")]
    Quantity(#[from] QuantityError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Umbrella error for callers that drive several resolution stages.
#[derive(Error, Debug)]
pub enum WsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(#[from] InfrastructureError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml_ng::Error> for WsError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        WsError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for WsError {
    fn from(err: serde_json::Error) -> Self {
        WsError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WsError>;
