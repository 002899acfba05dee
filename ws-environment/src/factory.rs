use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::error::Error;
use tracing::{debug, info, warn};
use ws_core::constants::SUPPORTED_RECIPE_CONTENT_TYPES;
use ws_core::quantity::QuantityError;
use ws_core::ValidationError;
use ws_model::k8s_openapi::api::core::v1::Pod;
use ws_model::names::machine_name;
use ws_model::{containers, ClusterObject, Environment, MachineConfig, Recipe, Warning};

use crate::manifest::{ManifestClient, ManifestError};
use crate::provisioner::MemoryAttributeProvisioner;
use crate::validator::EnvironmentValidator;

const DEPLOYMENT_CONFIG_UNSUPPORTED: &str =
    "Supporting of deployment configs is not implemented yet.";

/// Builds an [`Environment`] from a recipe and the machine configs the
/// workspace already declares.
///
/// Collaborators are injected so that callers decide how manifests are
/// parsed, how memory defaults are chosen and which consistency rules apply.
pub struct EnvironmentFactory<C, V> {
    client: C,
    validator: V,
    memory_provisioner: MemoryAttributeProvisioner,
}

fn insert_unique<T>(
    bucket: &mut BTreeMap<String, T>,
    kind: &str,
    name: String,
    object: T,
) -> Result<(), ValidationError> {
    match bucket.entry(name) {
        Entry::Occupied(entry) => Err(ValidationError::new(format!(
            "Environment contains duplicate {} '{}'",
            kind,
            entry.key()
        ))),
        Entry::Vacant(entry) => {
            entry.insert(object);
            Ok(())
        }
    }
}

/// First line of the most specific message the manifest error carries
fn parse_failure_message(err: &ManifestError) -> String {
    let message = match err.source() {
        Some(cause) => cause.to_string(),
        None => err.to_string(),
    };
    message.lines().next().unwrap_or_default().to_string()
}

/// Reject objects without kind, metadata or name before anything is stored
fn check_required_fields(objects: &[ClusterObject]) -> Result<(), ValidationError> {
    for object in objects {
        let Some(kind) = object.kind() else {
            return Err(ValidationError::new(
                "Environment contains object without specified kind field",
            ));
        };
        let Some(metadata) = object.metadata() else {
            return Err(ValidationError::new(format!(
                "{} metadata must not be null",
                kind
            )));
        };
        if metadata.name.is_none() {
            return Err(ValidationError::new(format!(
                "{} name must not be null",
                kind
            )));
        }
    }
    Ok(())
}

impl<C, V> EnvironmentFactory<C, V>
where
    C: ManifestClient,
    V: EnvironmentValidator,
{
    pub fn new(client: C, validator: V, memory_provisioner: MemoryAttributeProvisioner) -> Self {
        Self {
            client,
            validator,
            memory_provisioner,
        }
    }

    pub fn create(
        &self,
        recipe: Recipe,
        machines: BTreeMap<String, MachineConfig>,
        source_warnings: &[Warning],
    ) -> Result<Environment, ValidationError> {
        let supported = SUPPORTED_RECIPE_CONTENT_TYPES
            .iter()
            .any(|t| *t == recipe.content_type());
        if !supported {
            return Err(ValidationError::new(format!(
                "Provided environment recipe content type '{}' is unsupported. Supported values are: {}",
                recipe.content_type(),
                SUPPORTED_RECIPE_CONTENT_TYPES.join(", ")
            )));
        }

        let mut objects = self.client.parse(recipe.content()).map_err(|e| {
            warn!("Failed to parse recipe: {}", e);
            ValidationError::new(format!(
                "Could not parse OpenShift recipe: {}",
                parse_failure_message(&e)
            ))
        })?;

        check_required_fields(&objects)?;

        if objects
            .iter()
            .any(|o| matches!(o, ClusterObject::DeploymentConfig(_)))
        {
            return Err(ValidationError::new(DEPLOYMENT_CONFIG_UNSUPPORTED));
        }

        // Objects are created in the workspace namespace, whatever the recipe says
        for object in &mut objects {
            if let Some(metadata) = object.metadata_mut() {
                metadata.namespace = None;
            }
        }

        let mut pods = BTreeMap::new();
        let mut deployments = BTreeMap::new();
        let mut services = BTreeMap::new();
        let mut config_maps = BTreeMap::new();
        let mut pvcs = BTreeMap::new();
        let mut routes = BTreeMap::new();
        let mut secrets = BTreeMap::new();

        for object in objects {
            let kind = object.kind().unwrap_or_default().to_string();
            let name = object.name().unwrap_or_default().to_string();
            debug!(kind = %kind, name = %name, "Classifying recipe object");

            match object {
                ClusterObject::Pod(pod) => insert_unique(&mut pods, &kind, name, pod)?,
                ClusterObject::Deployment(deployment) => {
                    insert_unique(&mut deployments, &kind, name, deployment)?
                }
                ClusterObject::Service(service) => {
                    insert_unique(&mut services, &kind, name, service)?
                }
                ClusterObject::Route(route) => insert_unique(&mut routes, &kind, name, route)?,
                ClusterObject::PersistentVolumeClaim(pvc) => {
                    insert_unique(&mut pvcs, &kind, name, pvc)?
                }
                ClusterObject::Secret(secret) => insert_unique(&mut secrets, &kind, name, secret)?,
                ClusterObject::ConfigMap(config_map) => {
                    insert_unique(&mut config_maps, &kind, name, config_map)?
                }
                ClusterObject::DeploymentConfig(_) => {
                    return Err(ValidationError::new(DEPLOYMENT_CONFIG_UNSUPPORTED));
                }
                ClusterObject::Unknown(_) => {
                    return Err(ValidationError::new(format!(
                        "Found unknown object type in recipe -- name: '{}', kind: '{}'",
                        name, kind
                    )));
                }
            }
        }

        let mut machines = machines;
        self.add_ram_attributes(&mut machines, &pods)?;

        info!(
            pods = pods.len(),
            deployments = deployments.len(),
            services = services.len(),
            routes = routes.len(),
            machines = machines.len(),
            "Resolved recipe objects"
        );

        let environment = Environment::builder(recipe)
            .machines(machines)
            .warnings(source_warnings.to_vec())
            .pods(pods)
            .deployments(deployments)
            .services(services)
            .config_maps(config_maps)
            .persistent_volume_claims(pvcs)
            .routes(routes)
            .secrets(secrets)
            .build();

        self.validator.validate(&environment)?;
        Ok(environment)
    }

    fn add_ram_attributes(
        &self,
        machines: &mut BTreeMap<String, MachineConfig>,
        pods: &BTreeMap<String, Pod>,
    ) -> Result<(), ValidationError> {
        for pod in pods.values() {
            let Some(spec) = pod.spec.as_ref() else {
                continue;
            };
            for container in &spec.containers {
                let invalid = |e: QuantityError| {
                    ValidationError::new(format!(
                        "Container '{}' declares an invalid memory quantity: {}",
                        container.name, e
                    ))
                };
                let ram_limit = containers::ram_limit(container).map_err(invalid)?;
                let ram_request = containers::ram_request(container).map_err(invalid)?;

                let name = machine_name(pod, container);
                let machine = machines.entry(name.clone()).or_default();
                self.memory_provisioner
                    .provision(machine, ram_limit, ram_request)
                    .map_err(|e| {
                        ValidationError::new(format!(
                            "Machine '{}' declares an invalid memory limit attribute: {}",
                            name, e
                        ))
                    })?;
            }
        }
        Ok(())
    }
}
