use k8s_openapi::api::core::v1::{Container, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeSet;
use ws_core::ValidationError;
use ws_model::k8s_openapi;
use ws_model::names::machine_name_from_meta;
use ws_model::Environment;

/// Final consistency check over an assembled environment
pub trait EnvironmentValidator: Send + Sync {
    fn validate(&self, env: &Environment) -> Result<(), ValidationError>;
}

/// Checks that the recipe objects and the machine configs agree with each
/// other:
/// - at least one pod or deployment exists;
/// - every pod and deployment template declares containers;
/// - every machine config belongs to a container of the recipe;
/// - every route targets a Service of the recipe.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeEnvironmentValidator;

/// Pod metadata and spec of every pod and deployment template
fn pod_specs(env: &Environment) -> Vec<(String, ObjectMeta, Option<&PodSpec>)> {
    let pods = env
        .pods()
        .iter()
        .map(|(name, pod)| (name.clone(), pod.metadata.clone(), pod.spec.as_ref()));

    let templates = env.deployments().iter().map(|(name, deployment)| {
        let template = deployment.spec.as_ref().map(|s| &s.template);
        // Machines of a deployment are named after the deployment
        let meta = ObjectMeta {
            name: Some(name.clone()),
            ..template
                .and_then(|t| t.metadata.clone())
                .unwrap_or_default()
        };
        (name.clone(), meta, template.and_then(|t| t.spec.as_ref()))
    });

    pods.chain(templates).collect()
}

fn containers(spec: Option<&PodSpec>) -> &[Container] {
    spec.map(|s| s.containers.as_slice()).unwrap_or_default()
}

impl RecipeEnvironmentValidator {
    fn validate_pods(&self, env: &Environment) -> Result<(), ValidationError> {
        if env.pods().is_empty() && env.deployments().is_empty() {
            return Err(ValidationError::new(
                "Environment should contain at least 1 pod or deployment",
            ));
        }

        for (name, _, spec) in pod_specs(env) {
            if spec.is_none() {
                return Err(ValidationError::new(format!(
                    "Pod '{}' spec must not be null",
                    name
                )));
            }
            if containers(spec).is_empty() {
                return Err(ValidationError::new(format!(
                    "Pod '{}' must contain at least one container",
                    name
                )));
            }
        }
        Ok(())
    }

    fn validate_machines(&self, env: &Environment) -> Result<(), ValidationError> {
        let known: BTreeSet<String> = pod_specs(env)
            .into_iter()
            .flat_map(|(_, meta, spec)| {
                containers(spec)
                    .iter()
                    .map(|c| machine_name_from_meta(&meta, c))
                    .collect::<Vec<_>>()
            })
            .collect();

        let missing: Vec<&str> = env
            .machines()
            .keys()
            .filter(|name| !known.contains(*name))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            return Err(ValidationError::new(format!(
                "Environment contains machines that are missing in recipe: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    fn validate_routes(&self, env: &Environment) -> Result<(), ValidationError> {
        for (name, route) in env.routes() {
            let target = route.target_service();
            if target.is_empty() {
                return Err(ValidationError::new(format!(
                    "Route '{}' does not specify a target Service",
                    name
                )));
            }
            if !env.services().contains_key(target) {
                return Err(ValidationError::new(format!(
                    "Route '{}' refers to Service '{}'. Routes must refer to Services included in recipe",
                    name, target
                )));
            }
        }
        Ok(())
    }
}

impl EnvironmentValidator for RecipeEnvironmentValidator {
    fn validate(&self, env: &Environment) -> Result<(), ValidationError> {
        self.validate_pods(env)?;
        self.validate_machines(env)?;
        self.validate_routes(env)
    }
}
