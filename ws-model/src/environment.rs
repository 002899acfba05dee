use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolumeClaim, Pod, Secret, Service};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::machine::MachineConfig;
use crate::openshift::Route;

/// Raw recipe as supplied by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe {
    content: Vec<u8>,
    content_type: String,
}

impl Recipe {
    pub fn new(content: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Non-fatal problem noticed while preparing a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub code: i32,
    pub message: String,
}

impl Warning {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Resolved workspace environment.
///
/// Built once through [`EnvironmentBuilder`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(skip)]
    recipe: Recipe,
    machines: BTreeMap<String, MachineConfig>,
    warnings: Vec<Warning>,
    pods: BTreeMap<String, Pod>,
    deployments: BTreeMap<String, Deployment>,
    services: BTreeMap<String, Service>,
    config_maps: BTreeMap<String, ConfigMap>,
    persistent_volume_claims: BTreeMap<String, PersistentVolumeClaim>,
    routes: BTreeMap<String, Route>,
    secrets: BTreeMap<String, Secret>,
}

impl Environment {
    pub fn builder(recipe: Recipe) -> EnvironmentBuilder {
        EnvironmentBuilder::new(recipe)
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn machines(&self) -> &BTreeMap<String, MachineConfig> {
        &self.machines
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn pods(&self) -> &BTreeMap<String, Pod> {
        &self.pods
    }

    pub fn deployments(&self) -> &BTreeMap<String, Deployment> {
        &self.deployments
    }

    pub fn services(&self) -> &BTreeMap<String, Service> {
        &self.services
    }

    pub fn config_maps(&self) -> &BTreeMap<String, ConfigMap> {
        &self.config_maps
    }

    pub fn persistent_volume_claims(&self) -> &BTreeMap<String, PersistentVolumeClaim> {
        &self.persistent_volume_claims
    }

    pub fn routes(&self) -> &BTreeMap<String, Route> {
        &self.routes
    }

    pub fn secrets(&self) -> &BTreeMap<String, Secret> {
        &self.secrets
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentBuilder {
    recipe: Recipe,
    machines: BTreeMap<String, MachineConfig>,
    warnings: Vec<Warning>,
    pods: BTreeMap<String, Pod>,
    deployments: BTreeMap<String, Deployment>,
    services: BTreeMap<String, Service>,
    config_maps: BTreeMap<String, ConfigMap>,
    persistent_volume_claims: BTreeMap<String, PersistentVolumeClaim>,
    routes: BTreeMap<String, Route>,
    secrets: BTreeMap<String, Secret>,
}

impl EnvironmentBuilder {
    pub fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            ..Self::default()
        }
    }

    pub fn machines(mut self, machines: BTreeMap<String, MachineConfig>) -> Self {
        self.machines = machines;
        self
    }

    pub fn warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn pods(mut self, pods: BTreeMap<String, Pod>) -> Self {
        self.pods = pods;
        self
    }

    pub fn deployments(mut self, deployments: BTreeMap<String, Deployment>) -> Self {
        self.deployments = deployments;
        self
    }

    pub fn services(mut self, services: BTreeMap<String, Service>) -> Self {
        self.services = services;
        self
    }

    pub fn config_maps(mut self, config_maps: BTreeMap<String, ConfigMap>) -> Self {
        self.config_maps = config_maps;
        self
    }

    pub fn persistent_volume_claims(
        mut self,
        pvcs: BTreeMap<String, PersistentVolumeClaim>,
    ) -> Self {
        self.persistent_volume_claims = pvcs;
        self
    }

    pub fn routes(mut self, routes: BTreeMap<String, Route>) -> Self {
        self.routes = routes;
        self
    }

    pub fn secrets(mut self, secrets: BTreeMap<String, Secret>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn build(self) -> Environment {
        Environment {
            recipe: self.recipe,
            machines: self.machines,
            warnings: self.warnings,
            pods: self.pods,
            deployments: self.deployments,
            services: self.services,
            config_maps: self.config_maps,
            persistent_volume_claims: self.persistent_volume_claims,
            routes: self.routes,
            secrets: self.secrets,
        }
    }
}
