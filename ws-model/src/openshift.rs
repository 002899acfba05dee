//! OpenShift object kinds that `k8s-openapi` does not ship.
//!
//! Only the fields the resolvers read are typed; everything else a recipe
//! carries on these objects is preserved in `extra` so that re-serialising
//! an environment does not lose user data.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ROUTE_API_VERSION: &str = "route.openshift.io/v1";
pub const ROUTE_KIND: &str = "Route";
pub const DEPLOYMENT_CONFIG_API_VERSION: &str = "apps.openshift.io/v1";
pub const DEPLOYMENT_CONFIG_KIND: &str = "DeploymentConfig";

fn route_api_version() -> String {
    ROUTE_API_VERSION.to_string()
}

fn route_kind() -> String {
    ROUTE_KIND.to_string()
}

/// An externally routable host in front of one Service port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default = "route_api_version")]
    pub api_version: String,

    #[serde(default = "route_kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: RouteSpec,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            api_version: route_api_version(),
            kind: route_kind(),
            metadata: ObjectMeta::default(),
            spec: RouteSpec::default(),
            status: None,
        }
    }
}

impl Route {
    /// Host advertised to clients outside the cluster
    pub fn host(&self) -> Option<&str> {
        self.spec.host.as_deref()
    }

    /// Name of the Service this route sends traffic to
    pub fn target_service(&self) -> &str {
        &self.spec.to.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub to: RouteTargetReference,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<RoutePort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTargetReference {
    #[serde(default = "service_kind")]
    pub kind: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}

fn service_kind() -> String {
    "Service".to_string()
}

impl Default for RouteTargetReference {
    fn default() -> Self {
        Self {
            kind: service_kind(),
            name: String::new(),
            weight: None,
        }
    }
}

/// The single Service port a route exposes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePort {
    pub target_port: IntOrString,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_edge_termination_policy: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deployment_config_api_version() -> String {
    DEPLOYMENT_CONFIG_API_VERSION.to_string()
}

fn deployment_config_kind() -> String {
    DEPLOYMENT_CONFIG_KIND.to_string()
}

/// Recognised so that recipes using it get a precise rejection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    #[serde(default = "deployment_config_api_version")]
    pub api_version: String,

    #[serde(default = "deployment_config_kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub spec: Value,
}
