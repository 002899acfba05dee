use k8s_openapi::api::core::v1::{Container, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::annotations::container_machine_name_annotation;

/// Stable machine name of a container inside a pod.
///
/// A pod may pin the name through the container's machine-name annotation;
/// otherwise it is `<pod name>/<container name>`.
pub fn machine_name(pod: &Pod, container: &Container) -> String {
    machine_name_from_meta(&pod.metadata, container)
}

/// Same as [`machine_name`] for pod metadata that is not wrapped in a
/// `Pod`, e.g. a deployment's pod template with the deployment's name.
pub fn machine_name_from_meta(pod_meta: &ObjectMeta, container: &Container) -> String {
    let annotated = pod_meta
        .annotations
        .as_ref()
        .and_then(|a| a.get(&container_machine_name_annotation(&container.name)));

    match annotated {
        Some(name) => name.clone(),
        None => format!(
            "{}/{}",
            pod_meta.name.as_deref().unwrap_or_default(),
            container.name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn pod(name: &str, annotations: Option<BTreeMap<String, String>>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                annotations,
                ..ObjectMeta::default()
            },
            ..Pod::default()
        }
    }

    fn container(name: &str) -> Container {
        Container {
            name: name.to_string(),
            ..Container::default()
        }
    }

    #[test]
    fn test_default_machine_name() {
        assert_eq!(machine_name(&pod("ws", None), &container("dev")), "ws/dev");
    }

    #[test]
    fn test_annotated_machine_name_wins() {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            container_machine_name_annotation("dev"),
            "dev-machine".to_string(),
        );
        let pod = pod("ws", Some(annotations));
        assert_eq!(machine_name(&pod, &container("dev")), "dev-machine");
        assert_eq!(machine_name(&pod, &container("db")), "ws/db");
    }

    #[test]
    fn test_machine_name_is_deterministic() {
        let pod = pod("ws", None);
        let container = container("dev");
        assert_eq!(machine_name(&pod, &container), machine_name(&pod, &container));
    }
}
