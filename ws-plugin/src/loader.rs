use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::types::PluginDescriptor;

/// Problem found in a plugin descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError {
    pub field: String,
    pub message: String,
}

impl DescriptorError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a descriptor for problems that would only surface at runtime.
///
/// A `projects` volume on a sidecar without `mount_sources` is not reported
/// here; the machine resolver rejects it as a policy violation.
pub fn validate_descriptor(descriptor: &PluginDescriptor) -> Vec<DescriptorError> {
    let mut errors = Vec::new();

    if descriptor.id.trim().is_empty() {
        errors.push(DescriptorError::new("id", "Plugin id must not be empty"));
    }
    if descriptor.sidecar.name.trim().is_empty() {
        errors.push(DescriptorError::new(
            "sidecar.name",
            "Sidecar name must not be empty",
        ));
    }

    let mut volume_names = HashSet::new();
    for volume in &descriptor.sidecar.volumes {
        if !volume_names.insert(volume.name.as_str()) {
            errors.push(DescriptorError::new(
                "sidecar.volumes",
                format!("Volume '{}' is declared more than once", volume.name),
            ));
        }
        if !volume.mount_path.starts_with('/') {
            errors.push(DescriptorError::new(
                "sidecar.volumes",
                format!(
                    "Volume '{}' mount path '{}' must be absolute",
                    volume.name, volume.mount_path
                ),
            ));
        }
    }

    let mut endpoint_names = HashSet::new();
    for endpoint in &descriptor.endpoints {
        if !endpoint_names.insert(endpoint.name.as_str()) {
            errors.push(DescriptorError::new(
                "endpoints",
                format!("Endpoint '{}' is declared more than once", endpoint.name),
            ));
        }
        if endpoint.target_port == 0 {
            errors.push(DescriptorError::new(
                "endpoints",
                format!("Endpoint '{}' must declare a non-zero target port", endpoint.name),
            ));
        }
    }

    errors
}

/// Load and validate a plugin descriptor file
pub fn load_descriptor(path: &Path) -> Result<PluginDescriptor> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plugin descriptor: {path:?}"))?;

    let descriptor: PluginDescriptor = serde_yaml_ng::from_str(&content)
        .with_context(|| format!("Failed to parse plugin descriptor: {path:?}"))?;

    let errors = validate_descriptor(&descriptor);
    if !errors.is_empty() {
        let details: Vec<String> = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        anyhow::bail!(
            "Invalid plugin descriptor {path:?}:\n  {}",
            details.join("\n  ")
        );
    }

    tracing::debug!("Loaded plugin '{}' from {path:?}", descriptor.id);
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EndpointDeclaration, SidecarSpec, SidecarVolume};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn descriptor() -> PluginDescriptor {
        PluginDescriptor {
            id: "testplugin".to_string(),
            version: None,
            description: None,
            sidecar: SidecarSpec {
                name: "tools".to_string(),
                ..SidecarSpec::default()
            },
            endpoints: vec![EndpointDeclaration::new("web", 8080)],
        }
    }

    #[test]
    fn test_valid_descriptor() {
        assert!(validate_descriptor(&descriptor()).is_empty());
    }

    #[test]
    fn test_reports_duplicates_and_bad_ports() {
        let mut descriptor = descriptor();
        descriptor.endpoints.push(EndpointDeclaration::new("web", 0));
        descriptor.sidecar.volumes = vec![
            SidecarVolume::new("data", "/data"),
            SidecarVolume::new("data", "relative"),
        ];

        let errors = validate_descriptor(&descriptor);
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Volume 'data' is declared more than once",
                "Volume 'data' mount path 'relative' must be absolute",
                "Endpoint 'web' is declared more than once",
                "Endpoint 'web' must declare a non-zero target port",
            ]
        );
    }

    #[test]
    fn test_load_descriptor_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "id: testplugin\nsidecar:\n  name: tools\nendpoints:\n  - name: web\n    target_port: 8080\n"
        )
        .unwrap();

        let loaded = load_descriptor(file.path()).unwrap();
        assert_eq!(loaded, descriptor());
    }

    #[test]
    fn test_load_rejects_invalid_descriptor() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "id: ''\nsidecar:\n  name: tools\n").unwrap();

        let err = load_descriptor(file.path()).unwrap_err();
        assert!(err.to_string().contains("Plugin id must not be empty"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_descriptor(Path::new("/nonexistent/plugin.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read plugin descriptor"));
    }
}
