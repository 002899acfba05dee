//! Annotation codec that lets one Service or Route carry many servers.
//!
//! A Service or Route exposes exactly one port, but a machine may declare
//! several logical servers behind it. The servers are written onto the
//! object's annotations:
//!
//! ```text
//! che.eclipse.org/machine.name            = <machine name>
//! che.eclipse.org/server.<name>.port      = 8080/tcp
//! che.eclipse.org/server.<name>.protocol  = http
//! che.eclipse.org/server.<name>.path      = /api
//! che.eclipse.org/server.<name>.attributes = {"internal":"false"}
//! ```
//!
//! The name part of every key must stay within 63 characters and use only
//! `[-A-Za-z0-9_.]`, so server names are restricted accordingly.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::machine::ServerConfig;

pub const ANNOTATION_PREFIX: &str = "che.eclipse.org";
pub const MACHINE_NAME_ANNOTATION: &str = "che.eclipse.org/machine.name";

const SERVER_KEY_PREFIX: &str = "che.eclipse.org/server.";
const PORT_SUFFIX: &str = ".port";
const PROTOCOL_SUFFIX: &str = ".protocol";
const PATH_SUFFIX: &str = ".path";
const ATTRIBUTES_SUFFIX: &str = ".attributes";

/// Longest allowed name segment of an annotation key
const MAX_KEY_NAME_LENGTH: usize = 63;
/// Total size limit Kubernetes enforces on an object's annotations
const MAX_TOTAL_SIZE: usize = 256 * 1024;

static SERVER_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_]*[A-Za-z0-9])?$").expect("valid server name regex")
});

static SERVER_PORT_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^che\.eclipse\.org/server\.([A-Za-z0-9](?:[-A-Za-z0-9_]*[A-Za-z0-9])?)\.port$")
        .expect("valid server port key regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("Server name '{0}' cannot be used in an annotation key")]
    InvalidServerName(String),

    #[error("Annotation key '{0}' exceeds the Kubernetes key length limit")]
    KeyTooLong(String),

    #[error("Annotations are {0} bytes, above the Kubernetes limit of 256KiB")]
    TooLarge(usize),

    #[error("Attributes of server '{server}' are not a JSON string map: {reason}")]
    InvalidAttributes { server: String, reason: String },
}

/// Annotation key for the machine a container of a pod belongs to
pub fn container_machine_name_annotation(container_name: &str) -> String {
    format!("{}/container.{}.machine_name", ANNOTATION_PREFIX, container_name)
}

fn server_key(name: &str, suffix: &str) -> Result<String, AnnotationError> {
    let key = format!("{}{}{}", SERVER_KEY_PREFIX, name, suffix);
    let name_segment = &key[ANNOTATION_PREFIX.len() + 1..];
    if name_segment.len() > MAX_KEY_NAME_LENGTH {
        return Err(AnnotationError::KeyTooLong(key));
    }
    Ok(key)
}

pub fn new_serializer() -> Serializer {
    Serializer::default()
}

pub fn new_deserializer(annotations: Option<&BTreeMap<String, String>>) -> Deserializer<'_> {
    Deserializer { annotations }
}

/// Builds the annotations for one object
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    annotations: BTreeMap<String, String>,
}

impl Serializer {
    pub fn machine_name(mut self, machine_name: impl Into<String>) -> Self {
        self.annotations
            .insert(MACHINE_NAME_ANNOTATION.to_string(), machine_name.into());
        self
    }

    /// Encode one server. `host` is not encoded; it belongs to the object.
    pub fn server(mut self, name: &str, config: &ServerConfig) -> Result<Self, AnnotationError> {
        if !SERVER_NAME_REGEX.is_match(name) {
            return Err(AnnotationError::InvalidServerName(name.to_string()));
        }

        self.annotations
            .insert(server_key(name, PORT_SUFFIX)?, config.port.clone());
        if let Some(protocol) = &config.protocol {
            self.annotations
                .insert(server_key(name, PROTOCOL_SUFFIX)?, protocol.clone());
        }
        if let Some(path) = &config.path {
            self.annotations
                .insert(server_key(name, PATH_SUFFIX)?, path.clone());
        }
        if !config.attributes.is_empty() {
            let encoded = serde_json::to_string(&config.attributes).map_err(|e| {
                AnnotationError::InvalidAttributes {
                    server: name.to_string(),
                    reason: e.to_string(),
                }
            })?;
            self.annotations
                .insert(server_key(name, ATTRIBUTES_SUFFIX)?, encoded);
        }
        Ok(self)
    }

    pub fn servers(
        self,
        servers: &BTreeMap<String, ServerConfig>,
    ) -> Result<Self, AnnotationError> {
        servers
            .iter()
            .try_fold(self, |serializer, (name, config)| serializer.server(name, config))
    }

    pub fn annotations(self) -> Result<BTreeMap<String, String>, AnnotationError> {
        let size: usize = self
            .annotations
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum();
        if size > MAX_TOTAL_SIZE {
            return Err(AnnotationError::TooLarge(size));
        }
        Ok(self.annotations)
    }
}

/// Reads machine name and servers back from an object's annotations
#[derive(Debug, Clone, Copy)]
pub struct Deserializer<'a> {
    annotations: Option<&'a BTreeMap<String, String>>,
}

impl<'a> Deserializer<'a> {
    fn get(&self, key: &str) -> Option<&'a String> {
        self.annotations.and_then(|a| a.get(key))
    }

    pub fn machine_name(&self) -> Option<&'a str> {
        self.get(MACHINE_NAME_ANNOTATION).map(String::as_str)
    }

    pub fn servers(&self) -> Result<BTreeMap<String, ServerConfig>, AnnotationError> {
        let mut servers = BTreeMap::new();
        let Some(annotations) = self.annotations else {
            return Ok(servers);
        };

        for (key, port) in annotations {
            let Some(captures) = SERVER_PORT_KEY_REGEX.captures(key) else {
                continue;
            };
            let name = &captures[1];
            let lookup = |suffix: &str| {
                annotations.get(&format!("{}{}{}", SERVER_KEY_PREFIX, name, suffix))
            };

            let attributes = match lookup(ATTRIBUTES_SUFFIX) {
                Some(raw) => serde_json::from_str::<BTreeMap<String, String>>(raw).map_err(
                    |e| AnnotationError::InvalidAttributes {
                        server: name.to_string(),
                        reason: e.to_string(),
                    },
                )?,
                None => BTreeMap::new(),
            };

            servers.insert(
                name.to_string(),
                ServerConfig {
                    port: port.clone(),
                    protocol: lookup(PROTOCOL_SUFFIX).cloned(),
                    path: lookup(PATH_SUFFIX).cloned(),
                    attributes,
                    host: None,
                },
            );
        }

        Ok(servers)
    }
}
