//! Memory limit and request helpers over container resource requirements.

use k8s_openapi::api::core::v1::{Container, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use ws_core::quantity::{self, QuantityError};

const MEMORY_RESOURCE: &str = "memory";

fn memory_of(resources: Option<&BTreeMap<String, Quantity>>) -> Result<Option<u64>, QuantityError> {
    let Some(Quantity(value)) = resources.and_then(|r| r.get(MEMORY_RESOURCE)) else {
        return Ok(None);
    };
    // A zero quantity means "not set", same as an absent one
    Ok(Some(quantity::to_bytes(value)?).filter(|bytes| *bytes > 0))
}

/// Memory limit of the container in bytes, if it declares one
pub fn ram_limit(container: &Container) -> Result<Option<u64>, QuantityError> {
    memory_of(container.resources.as_ref().and_then(|r| r.limits.as_ref()))
}

/// Memory request of the container in bytes, if it declares one
pub fn ram_request(container: &Container) -> Result<Option<u64>, QuantityError> {
    memory_of(container.resources.as_ref().and_then(|r| r.requests.as_ref()))
}

fn resources_mut(container: &mut Container) -> &mut ResourceRequirements {
    container
        .resources
        .get_or_insert_with(ResourceRequirements::default)
}

pub fn add_ram_limit(container: &mut Container, bytes: u64) {
    resources_mut(container)
        .limits
        .get_or_insert_with(BTreeMap::new)
        .insert(MEMORY_RESOURCE.to_string(), Quantity(bytes.to_string()));
}

pub fn add_ram_request(container: &mut Container, bytes: u64) {
    resources_mut(container)
        .requests
        .get_or_insert_with(BTreeMap::new)
        .insert(MEMORY_RESOURCE.to_string(), Quantity(bytes.to_string()));
}
