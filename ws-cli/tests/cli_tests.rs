use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const RECIPE: &str = r#"
apiVersion: v1
kind: Pod
metadata:
  name: ws
spec:
  containers:
    - name: dev
      image: quay.io/eclipse/che-dev
      resources:
        limits:
          memory: 2Gi
"#;

const PLUGIN: &str = r#"
id: testplugin
sidecar:
  name: tools
  image: quay.io/eclipse/che-tools
  mount_sources: true
endpoints:
  - name: web
    target_port: 8080
    public: true
    attributes:
      protocol: http
"#;

const ANNOTATED_OBJECTS: &str = r#"
apiVersion: v1
kind: Service
metadata:
  name: ws-svc
  annotations:
    che.eclipse.org/machine.name: ws/dev
    che.eclipse.org/server.debug.port: 5005/tcp
---
apiVersion: route.openshift.io/v1
kind: Route
metadata:
  name: ws-route
  annotations:
    che.eclipse.org/machine.name: ws/dev
    che.eclipse.org/server.web.port: 8080/tcp
    che.eclipse.org/server.web.protocol: http
spec:
  host: ws.apps.example.com
  to:
    kind: Service
    name: ws-svc
"#;

fn wsenv(config_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("wsenv"));
    cmd.env_remove("WSENV_CONFIG")
        .env_remove("WSENV_DEFAULT_MEMORY_LIMIT")
        .env_remove("WSENV_DEFAULT_MEMORY_REQUEST")
        .env_remove("WSENV_SIDECAR_MEMORY_LIMIT")
        .env_remove("WSENV_PROJECTS_MOUNT_PATH")
        .env("LOG_OUTPUT", "none")
        .current_dir(config_dir);
    cmd
}

#[test]
fn test_resolve_prints_environment() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("recipe.yaml"), RECIPE).unwrap();

    wsenv(dir.path())
        .args(["resolve", "recipe.yaml", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ws/dev\""))
        .stdout(predicate::str::contains("\"memoryLimitBytes\":\"2147483648\""));
}

#[test]
fn test_resolve_reports_validation_errors() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("recipe.yaml"), RECIPE).unwrap();

    wsenv(dir.path())
        .args(["resolve", "recipe.yaml", "--content-type", "application/json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Provided environment recipe content type 'application/json' is unsupported",
        ));
}

#[test]
fn test_sidecar_uses_configured_defaults() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("plugin.yaml"), PLUGIN).unwrap();
    fs::write(
        dir.path().join("wsenv.yaml"),
        "memory:\n  sidecar_default_limit: 64Mi\nprojects:\n  mount_path: /src\n",
    )
    .unwrap();

    wsenv(dir.path())
        .args(["sidecar", "plugin.yaml", "--config", "wsenv.yaml", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"memoryLimitBytes\":\"67108864\""))
        .stdout(predicate::str::contains("\"projects\":{\"path\":\"/src\"}"))
        .stdout(predicate::str::contains("\"internal\":\"false\""));
}

#[test]
fn test_sidecar_memory_override_attribute() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("plugin.yaml"), PLUGIN).unwrap();

    wsenv(dir.path())
        .args([
            "sidecar",
            "plugin.yaml",
            "-a",
            "sidecar.testplugin.memory_limit=300Mi",
            "-f",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"memoryLimitBytes\":\"314572800\""));
}

#[test]
fn test_servers_for_machine() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("objects.yaml"), ANNOTATED_OBJECTS).unwrap();

    wsenv(dir.path())
        .args(["servers", "objects.yaml", "--machine", "ws/dev", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"host\":\"ws.apps.example.com\""))
        .stdout(predicate::str::contains("\"host\":\"ws-svc\""));
}

#[test]
fn test_missing_recipe_file() {
    let dir = tempdir().unwrap();

    wsenv(dir.path())
        .args(["resolve", "absent.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read recipe"));
}
