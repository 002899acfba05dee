use tracing::debug;
use ws_core::constants::{MEMORY_LIMIT_ATTRIBUTE, MEMORY_REQUEST_ATTRIBUTE};
use ws_core::quantity::{self, QuantityError};
use ws_model::MachineConfig;

/// Writes memory limit and request attributes onto machine configs.
///
/// Merge rule: an attribute already present on the machine is never
/// replaced. When several containers share one machine name the first
/// container provisioned decides the machine's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAttributeProvisioner {
    default_limit_bytes: u64,
    default_request_bytes: u64,
}

impl MemoryAttributeProvisioner {
    pub fn new(default_limit_bytes: u64, default_request_bytes: u64) -> Self {
        Self {
            default_limit_bytes,
            default_request_bytes,
        }
    }

    /// Fails when the machine already carries a limit attribute that is not
    /// a memory quantity.
    pub fn provision(
        &self,
        machine: &mut MachineConfig,
        ram_limit: Option<u64>,
        ram_request: Option<u64>,
    ) -> Result<(), QuantityError> {
        let attributes = &mut machine.attributes;
        let has_limit = attributes.contains_key(MEMORY_LIMIT_ATTRIBUTE);
        let has_request = attributes.contains_key(MEMORY_REQUEST_ATTRIBUTE);
        if has_limit && has_request {
            return Ok(());
        }

        let limit = match attributes.get(MEMORY_LIMIT_ATTRIBUTE) {
            Some(existing) => quantity::to_bytes(existing)?,
            None => ram_limit.unwrap_or(self.default_limit_bytes),
        };
        // Request never exceeds the limit
        let request = ram_request.unwrap_or(self.default_request_bytes).min(limit);

        if !has_limit {
            debug!(limit, "Provisioning memory limit");
            attributes.insert(MEMORY_LIMIT_ATTRIBUTE.to_string(), limit.to_string());
        }
        if !has_request {
            debug!(request, "Provisioning memory request");
            attributes.insert(MEMORY_REQUEST_ATTRIBUTE.to_string(), request.to_string());
        }
        Ok(())
    }
}
