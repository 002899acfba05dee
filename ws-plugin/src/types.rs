use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ws_model::k8s_openapi::api::core::v1::{Container, ResourceRequirements};
use ws_model::k8s_openapi::apimachinery::pkg::api::resource::Quantity;

/// Plugin descriptor (stored in plugin.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub id: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    pub sidecar: SidecarSpec,

    #[serde(default)]
    pub endpoints: Vec<EndpointDeclaration>,
}

/// Container a plugin runs in next to the workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarSpec {
    pub name: String,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub volumes: Vec<SidecarVolume>,

    /// Mount the workspace sources at the projects mount path
    #[serde(default)]
    pub mount_sources: bool,

    /// Memory limit of the sidecar container, as a Kubernetes quantity
    #[serde(default)]
    pub memory_limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidecarVolume {
    pub name: String,
    pub mount_path: String,
}

impl SidecarVolume {
    pub fn new(name: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount_path: mount_path.into(),
        }
    }
}

/// A port a plugin exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDeclaration {
    pub name: String,

    pub target_port: u16,

    /// Whether clients outside the cluster may reach the endpoint
    #[serde(default)]
    pub public: bool,

    /// `protocol` and `path` are reserved; the rest is passed through
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl EndpointDeclaration {
    pub fn new(name: impl Into<String>, target_port: u16) -> Self {
        Self {
            name: name.into(),
            target_port,
            public: false,
            attributes: BTreeMap::new(),
        }
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl SidecarSpec {
    /// Kubernetes container for this sidecar, carrying its memory limit
    pub fn to_container(&self) -> Container {
        let resources = self.memory_limit.as_ref().map(|limit| {
            let mut limits = BTreeMap::new();
            limits.insert("memory".to_string(), Quantity(limit.clone()));
            ResourceRequirements {
                limits: Some(limits),
                ..ResourceRequirements::default()
            }
        });

        Container {
            name: self.name.clone(),
            image: self.image.clone(),
            resources,
            ..Container::default()
        }
    }
}
