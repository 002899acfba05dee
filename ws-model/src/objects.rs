//! Typed union over the cluster object kinds a recipe may contain.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolumeClaim, Pod, Secret, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::openshift::{DeploymentConfig, Route, DEPLOYMENT_CONFIG_KIND, ROUTE_KIND};

/// An object whose kind is not one of the typed variants, or whose kind or
/// metadata is missing altogether
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,

    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClusterObject {
    Pod(Pod),
    Deployment(Deployment),
    Service(Service),
    Route(Route),
    PersistentVolumeClaim(PersistentVolumeClaim),
    Secret(Secret),
    ConfigMap(ConfigMap),
    DeploymentConfig(DeploymentConfig),
    Unknown(UnknownObject),
}

impl ClusterObject {
    /// Decode one manifest document.
    ///
    /// Documents without a `kind`, or without `metadata`, are kept as
    /// [`ClusterObject::Unknown`] so that the caller can report exactly
    /// which field is missing. Typed decoding errors are returned as-is.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let kind = value.get("kind").and_then(Value::as_str).map(str::to_string);
        let has_metadata = value.get("metadata").is_some_and(|m| !m.is_null());

        let Some(kind) = kind.filter(|_| has_metadata) else {
            return serde_json::from_value(value).map(ClusterObject::Unknown);
        };

        let object = match kind.as_str() {
            "Pod" => ClusterObject::Pod(serde_json::from_value(value)?),
            "Deployment" => ClusterObject::Deployment(serde_json::from_value(value)?),
            "Service" => ClusterObject::Service(serde_json::from_value(value)?),
            "PersistentVolumeClaim" => {
                ClusterObject::PersistentVolumeClaim(serde_json::from_value(value)?)
            }
            "Secret" => ClusterObject::Secret(serde_json::from_value(value)?),
            "ConfigMap" => ClusterObject::ConfigMap(serde_json::from_value(value)?),
            ROUTE_KIND => ClusterObject::Route(serde_json::from_value(value)?),
            DEPLOYMENT_CONFIG_KIND => {
                ClusterObject::DeploymentConfig(serde_json::from_value(value)?)
            }
            _ => ClusterObject::Unknown(serde_json::from_value(value)?),
        };
        Ok(object)
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            ClusterObject::Pod(_) => Some("Pod"),
            ClusterObject::Deployment(_) => Some("Deployment"),
            ClusterObject::Service(_) => Some("Service"),
            ClusterObject::Route(_) => Some(ROUTE_KIND),
            ClusterObject::PersistentVolumeClaim(_) => Some("PersistentVolumeClaim"),
            ClusterObject::Secret(_) => Some("Secret"),
            ClusterObject::ConfigMap(_) => Some("ConfigMap"),
            ClusterObject::DeploymentConfig(_) => Some(DEPLOYMENT_CONFIG_KIND),
            ClusterObject::Unknown(unknown) => unknown.kind.as_deref(),
        }
    }

    pub fn metadata(&self) -> Option<&ObjectMeta> {
        match self {
            ClusterObject::Pod(o) => Some(&o.metadata),
            ClusterObject::Deployment(o) => Some(&o.metadata),
            ClusterObject::Service(o) => Some(&o.metadata),
            ClusterObject::Route(o) => Some(&o.metadata),
            ClusterObject::PersistentVolumeClaim(o) => Some(&o.metadata),
            ClusterObject::Secret(o) => Some(&o.metadata),
            ClusterObject::ConfigMap(o) => Some(&o.metadata),
            ClusterObject::DeploymentConfig(o) => Some(&o.metadata),
            ClusterObject::Unknown(o) => o.metadata.as_ref(),
        }
    }

    pub fn metadata_mut(&mut self) -> Option<&mut ObjectMeta> {
        match self {
            ClusterObject::Pod(o) => Some(&mut o.metadata),
            ClusterObject::Deployment(o) => Some(&mut o.metadata),
            ClusterObject::Service(o) => Some(&mut o.metadata),
            ClusterObject::Route(o) => Some(&mut o.metadata),
            ClusterObject::PersistentVolumeClaim(o) => Some(&mut o.metadata),
            ClusterObject::Secret(o) => Some(&mut o.metadata),
            ClusterObject::ConfigMap(o) => Some(&mut o.metadata),
            ClusterObject::DeploymentConfig(o) => Some(&mut o.metadata),
            ClusterObject::Unknown(o) => o.metadata.as_mut(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.name.as_deref())
    }
}
