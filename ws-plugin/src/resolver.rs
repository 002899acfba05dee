use std::collections::BTreeMap;
use tracing::debug;
use ws_core::constants::{
    sidecar_memory_limit_attribute, MEMORY_LIMIT_ATTRIBUTE, PROJECTS_VOLUME_NAME,
    SERVER_INTERNAL_ATTRIBUTE,
};
use ws_core::quantity;
use ws_core::InfrastructureError;
use ws_model::containers;
use ws_model::k8s_openapi::api::core::v1::Container;
use ws_model::{MachineConfig, ServerConfig, Volume};

use crate::types::{EndpointDeclaration, SidecarSpec};

const PROTOCOL_ATTRIBUTE: &str = "protocol";
const PATH_ATTRIBUTE: &str = "path";

/// Where workspace sources are mounted: the env var that advertises the
/// location and the mount path itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectsMount {
    pub env_var: String,
    pub mount_path: String,
}

impl ProjectsMount {
    pub fn new(env_var: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
            mount_path: mount_path.into(),
        }
    }
}

/// Turns one plugin sidecar into the machine config the runtime needs
pub struct MachineResolver<'a> {
    plugin_id: &'a str,
    projects: &'a ProjectsMount,
    container: &'a Container,
    sidecar: &'a SidecarSpec,
    default_memory_limit: &'a str,
    endpoints: &'a [EndpointDeclaration],
    workspace_attributes: &'a BTreeMap<String, String>,
}

impl<'a> MachineResolver<'a> {
    /// `default_memory_limit` is used verbatim, so it must already be a
    /// byte count.
    pub fn new(
        plugin_id: &'a str,
        projects: &'a ProjectsMount,
        container: &'a Container,
        sidecar: &'a SidecarSpec,
        default_memory_limit: &'a str,
        endpoints: &'a [EndpointDeclaration],
        workspace_attributes: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            plugin_id,
            projects,
            container,
            sidecar,
            default_memory_limit,
            endpoints,
            workspace_attributes,
        }
    }

    pub fn resolve(&self) -> Result<MachineConfig, InfrastructureError> {
        let mut machine = MachineConfig::new();
        self.add_volumes(&mut machine)?;
        machine.servers = self.servers();
        self.normalize_memory(&mut machine)?;
        Ok(machine)
    }

    fn add_volumes(&self, machine: &mut MachineConfig) -> Result<(), InfrastructureError> {
        for volume in &self.sidecar.volumes {
            machine
                .volumes
                .insert(volume.name.clone(), Volume::new(&volume.mount_path));
        }

        if self.sidecar.mount_sources {
            machine.volumes.insert(
                PROJECTS_VOLUME_NAME.to_string(),
                Volume::new(&self.projects.mount_path),
            );
            machine
                .env
                .insert(self.projects.env_var.clone(), self.projects.mount_path.clone());
        } else if machine.volumes.contains_key(PROJECTS_VOLUME_NAME) {
            return Err(InfrastructureError::Policy(format!(
                "Plugin '{}' contains volume '{}' which is reserved for workspace sources. \
                 Use 'mount_sources' to get the sources mounted",
                self.plugin_id, PROJECTS_VOLUME_NAME
            )));
        }
        Ok(())
    }

    fn servers(&self) -> BTreeMap<String, ServerConfig> {
        self.endpoints
            .iter()
            .map(|endpoint| (endpoint.name.clone(), to_server(endpoint)))
            .collect()
    }

    fn normalize_memory(&self, machine: &mut MachineConfig) -> Result<(), InfrastructureError> {
        // The container's own limit applies as is
        if containers::ram_limit(self.container)?.is_some() {
            return Ok(());
        }

        let key = sidecar_memory_limit_attribute(self.plugin_id);
        let limit = match self
            .workspace_attributes
            .get(&key)
            .filter(|v| !v.is_empty())
        {
            Some(overridden) => {
                debug!(plugin = self.plugin_id, limit = %overridden, "Sidecar memory limit overridden");
                quantity::to_bytes_string(overridden)?
            }
            None => self.default_memory_limit.to_string(),
        };
        machine
            .attributes
            .insert(MEMORY_LIMIT_ATTRIBUTE.to_string(), limit);
        Ok(())
    }
}

fn to_server(endpoint: &EndpointDeclaration) -> ServerConfig {
    let mut server = ServerConfig::tcp(endpoint.target_port);
    for (key, value) in &endpoint.attributes {
        match key.as_str() {
            PROTOCOL_ATTRIBUTE => server.protocol = Some(value.clone()),
            PATH_ATTRIBUTE => server.path = Some(value.clone()),
            _ => {
                server.attributes.insert(key.clone(), value.clone());
            }
        }
    }
    server.attributes.insert(
        SERVER_INTERNAL_ATTRIBUTE.to_string(),
        (!endpoint.public).to_string(),
    );
    server
}
