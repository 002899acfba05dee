//! Names shared between the environment, machine and server resolvers.

/// Volume that carries the workspace sources into mount-sources sidecars
pub const PROJECTS_VOLUME_NAME: &str = "projects";

/// Machine attribute holding the memory limit in bytes
pub const MEMORY_LIMIT_ATTRIBUTE: &str = "memoryLimitBytes";

/// Machine attribute holding the memory request in bytes
pub const MEMORY_REQUEST_ATTRIBUTE: &str = "memoryRequestBytes";

/// Server attribute flagging servers reachable only inside the cluster
pub const SERVER_INTERNAL_ATTRIBUTE: &str = "internal";

/// Recipe content types the environment factory accepts
pub const SUPPORTED_RECIPE_CONTENT_TYPES: [&str; 3] =
    ["application/x-yaml", "text/yaml", "text/x-yaml"];

const SIDECAR_MEMORY_LIMIT_ATTR_PREFIX: &str = "sidecar.";
const SIDECAR_MEMORY_LIMIT_ATTR_SUFFIX: &str = ".memory_limit";

/// Workspace attribute overriding the memory limit of one plugin's sidecar,
/// `sidecar.<plugin id>.memory_limit`
pub fn sidecar_memory_limit_attribute(plugin_id: &str) -> String {
    format!(
        "{}{}{}",
        SIDECAR_MEMORY_LIMIT_ATTR_PREFIX, plugin_id, SIDECAR_MEMORY_LIMIT_ATTR_SUFFIX
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_memory_limit_attribute() {
        assert_eq!(
            sidecar_memory_limit_attribute("testplugin"),
            "sidecar.testplugin.memory_limit"
        );
    }

    #[test]
    fn test_supported_content_types_listing() {
        assert_eq!(
            SUPPORTED_RECIPE_CONTENT_TYPES.join(", "),
            "application/x-yaml, text/yaml, text/x-yaml"
        );
    }
}
