use std::collections::BTreeMap;
use ws_core::constants::{sidecar_memory_limit_attribute, MEMORY_LIMIT_ATTRIBUTE, PROJECTS_VOLUME_NAME};
use ws_core::quantity::to_bytes_string;
use ws_core::InfrastructureError;
use ws_model::containers::add_ram_limit;
use ws_model::k8s_openapi::api::core::v1::Container;
use ws_model::{MachineConfig, ServerConfig, Volume};
use ws_plugin::{EndpointDeclaration, MachineResolver, ProjectsMount, SidecarSpec, SidecarVolume};

const DEFAULT_MEM_LIMIT: &str = "100001";
const PLUGIN_ID: &str = "testplugin";
const PROJECTS_ENV_VAR: &str = "env_with_with_location_of_projects";
const PROJECTS_MOUNT_PATH: &str = "/wherever/i/may/roam";

/// Inputs of one resolution, defaults matching an empty sidecar
struct Fixture {
    projects: ProjectsMount,
    container: Container,
    sidecar: SidecarSpec,
    endpoints: Vec<EndpointDeclaration>,
    workspace_attributes: BTreeMap<String, String>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            projects: ProjectsMount::new(PROJECTS_ENV_VAR, PROJECTS_MOUNT_PATH),
            container: Container::default(),
            sidecar: SidecarSpec::default(),
            endpoints: Vec::new(),
            workspace_attributes: BTreeMap::new(),
        }
    }

    fn override_memory(&mut self, value: &str) {
        self.workspace_attributes
            .insert(sidecar_memory_limit_attribute(PLUGIN_ID), value.to_string());
    }

    fn resolve(&self) -> Result<MachineConfig, InfrastructureError> {
        MachineResolver::new(
            PLUGIN_ID,
            &self.projects,
            &self.container,
            &self.sidecar,
            DEFAULT_MEM_LIMIT,
            &self.endpoints,
            &self.workspace_attributes,
        )
        .resolve()
    }
}

fn server(port: u16, public: bool) -> ServerConfig {
    ServerConfig::tcp(port).with_attribute("internal", (!public).to_string())
}

fn servers(entries: Vec<(&str, ServerConfig)>) -> BTreeMap<String, ServerConfig> {
    entries
        .into_iter()
        .map(|(name, server)| (name.to_string(), server))
        .collect()
}

fn resolved_servers(endpoints: Vec<EndpointDeclaration>) -> BTreeMap<String, ServerConfig> {
    let mut fixture = Fixture::new();
    fixture.endpoints = endpoints;
    fixture.resolve().expect("should resolve").servers
}

#[test]
fn test_sets_volumes() {
    let mut fixture = Fixture::new();
    fixture.sidecar.volumes = vec![
        SidecarVolume::new("vol1", "/path1"),
        SidecarVolume::new("vol2", "/path2"),
    ];

    let machine = fixture.resolve().expect("should resolve");

    let mut expected = BTreeMap::new();
    expected.insert("vol1".to_string(), Volume::new("/path1"));
    expected.insert("vol2".to_string(), Volume::new("/path2"));
    assert_eq!(machine.volumes, expected);
}

#[test]
fn test_servers_default_to_internal() {
    assert_eq!(
        resolved_servers(vec![
            EndpointDeclaration::new("endp1", 8080),
            EndpointDeclaration::new("endp2", 10000),
        ]),
        servers(vec![("endp1", server(8080, false)), ("endp2", server(10000, false))])
    );
}

#[test]
fn test_servers_follow_publicity() {
    let resolved = resolved_servers(vec![
        EndpointDeclaration::new("endp1", 8080).public(false),
        EndpointDeclaration::new("endp2", 10000).public(true),
    ]);
    assert_eq!(
        resolved,
        servers(vec![("endp1", server(8080, false)), ("endp2", server(10000, true))])
    );
    assert!(resolved["endp1"].is_internal());
    assert!(!resolved["endp2"].is_internal());
}

#[test]
fn test_protocol_attribute_becomes_server_protocol() {
    assert_eq!(
        resolved_servers(vec![
            EndpointDeclaration::new("endp1", 8080).with_attribute("protocol", "http"),
            EndpointDeclaration::new("endp2", 10000).with_attribute("protocol", "ws"),
        ]),
        servers(vec![
            ("endp1", server(8080, false).with_protocol("http")),
            ("endp2", server(10000, false).with_protocol("ws")),
        ])
    );
}

#[test]
fn test_path_attribute_becomes_server_path() {
    assert_eq!(
        resolved_servers(vec![
            EndpointDeclaration::new("endp1", 8080).with_attribute("path", "/"),
            EndpointDeclaration::new("endp2", 10000).with_attribute("path", "/some/thing"),
        ]),
        servers(vec![
            ("endp1", server(8080, false).with_path("/")),
            ("endp2", server(10000, false).with_path("/some/thing")),
        ])
    );
}

#[test]
fn test_other_attributes_are_copied() {
    assert_eq!(
        resolved_servers(vec![
            EndpointDeclaration::new("endp1", 8080).with_attribute("a1", "v1"),
            EndpointDeclaration::new("endp2", 10000)
                .with_attribute("a2", "v1")
                .with_attribute("a3", "v3"),
        ]),
        servers(vec![
            ("endp1", server(8080, false).with_attribute("a1", "v1")),
            (
                "endp2",
                server(10000, false)
                    .with_attribute("a2", "v1")
                    .with_attribute("a3", "v3")
            ),
        ])
    );
}

#[test]
fn test_default_memory_limit_when_sidecar_has_none() {
    let machine = Fixture::new().resolve().expect("should resolve");
    assert_eq!(machine.memory_limit(), Some(DEFAULT_MEM_LIMIT));
}

#[test]
fn test_workspace_attribute_sets_memory_limit() {
    let cases = [
        ("", DEFAULT_MEM_LIMIT.to_string()),
        ("100Ki", to_bytes_string("100Ki").unwrap()),
        ("1M", to_bytes_string("1M").unwrap()),
        ("10Gi", to_bytes_string("10Gi").unwrap()),
    ];
    for (attribute, expected) in cases {
        let mut fixture = Fixture::new();
        fixture.override_memory(attribute);
        let machine = fixture.resolve().expect("should resolve");
        assert_eq!(
            machine.memory_limit(),
            Some(expected.as_str()),
            "attribute {:?}",
            attribute
        );
    }
}

#[test]
fn test_override_values_in_bytes() {
    let mut fixture = Fixture::new();
    fixture.override_memory("300Mi");
    let machine = fixture.resolve().expect("should resolve");
    assert_eq!(machine.memory_limit(), Some("314572800"));
}

#[test]
fn test_invalid_override_is_an_infrastructure_error() {
    let mut fixture = Fixture::new();
    fixture.override_memory("a bit");
    assert!(matches!(
        fixture.resolve(),
        Err(InfrastructureError::Quantity(_))
    ));
}

#[test]
fn test_no_memory_attribute_when_container_has_limit() {
    let mut fixture = Fixture::new();
    add_ram_limit(&mut fixture.container, 123_456_789);

    let machine = fixture.resolve().expect("should resolve");
    assert_eq!(machine.attributes.get(MEMORY_LIMIT_ATTRIBUTE), None);
}

#[test]
fn test_container_limit_wins_over_workspace_attribute() {
    let mut fixture = Fixture::new();
    add_ram_limit(&mut fixture.container, 123_456_789);
    fixture.override_memory("300Mi");

    let machine = fixture.resolve().expect("should resolve");
    assert_eq!(machine.memory_limit(), None);
}

#[test]
fn test_refuses_manual_projects_volume() {
    let mut fixture = Fixture::new();
    fixture.sidecar.mount_sources = false;
    fixture.sidecar.volumes = vec![SidecarVolume::new(PROJECTS_VOLUME_NAME, "anything, like")];

    assert!(matches!(
        fixture.resolve(),
        Err(InfrastructureError::Policy(_))
    ));
}

#[test]
fn test_mount_sources_adds_projects_volume() {
    let mut fixture = Fixture::new();
    fixture.sidecar.mount_sources = true;

    let machine = fixture.resolve().expect("should resolve");

    assert_eq!(machine.volumes.len(), 1);
    assert_eq!(
        machine.volumes[PROJECTS_VOLUME_NAME],
        Volume::new(PROJECTS_MOUNT_PATH)
    );
    assert_eq!(
        machine.env.get(PROJECTS_ENV_VAR).map(String::as_str),
        Some(PROJECTS_MOUNT_PATH)
    );
}

#[test]
fn test_mount_sources_overrides_declared_projects_volume() {
    let mut fixture = Fixture::new();
    fixture.sidecar.mount_sources = true;
    fixture.sidecar.volumes = vec![SidecarVolume::new(PROJECTS_VOLUME_NAME, "/elsewhere")];

    let machine = fixture.resolve().expect("should resolve");
    assert_eq!(machine.volumes[PROJECTS_VOLUME_NAME].path, PROJECTS_MOUNT_PATH);
}

#[test]
fn test_sidecar_descriptor_limit_suppresses_default() {
    let mut fixture = Fixture::new();
    fixture.sidecar.memory_limit = Some("256Mi".to_string());
    fixture.container = fixture.sidecar.to_container();

    let machine = fixture.resolve().expect("should resolve");
    assert_eq!(machine.memory_limit(), None);
}
