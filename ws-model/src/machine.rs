use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ws_core::constants::{MEMORY_LIMIT_ATTRIBUTE, MEMORY_REQUEST_ATTRIBUTE, SERVER_INTERNAL_ATTRIBUTE};

/// Mount point of a named workspace volume inside a machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub path: String,
}

impl Volume {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A reachable endpoint of a machine.
///
/// `port` is rendered as `"<number>/tcp"`. `host` stays empty until a server
/// resolver binds the server to a Service or Route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl ServerConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Server on a TCP port, e.g. `ServerConfig::tcp(8080)` has port `"8080/tcp"`
    pub fn tcp(port: u16) -> Self {
        Self::new(format!("{}/tcp", port))
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether the server is only reachable from inside the cluster
    pub fn is_internal(&self) -> bool {
        self.attributes
            .get(SERVER_INTERNAL_ATTRIBUTE)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

/// Runtime facts about one logical machine of a workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(default)]
    pub volumes: BTreeMap<String, Volume>,

    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl MachineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory_limit(&self) -> Option<&str> {
        self.attributes.get(MEMORY_LIMIT_ATTRIBUTE).map(String::as_str)
    }

    pub fn memory_request(&self) -> Option<&str> {
        self.attributes
            .get(MEMORY_REQUEST_ATTRIBUTE)
            .map(String::as_str)
    }
}
