//! Resolver configuration
//!
//! Settings live in a YAML file (explicit path, or `$WSENV_CONFIG`) and can be
//! overridden from the environment. Every field has a default so an absent
//! file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use ws_core::error::{Result, WsError};
use ws_core::quantity;

pub const CONFIG_PATH_ENV: &str = "WSENV_CONFIG";
pub const DEFAULT_MEMORY_LIMIT_ENV: &str = "WSENV_DEFAULT_MEMORY_LIMIT";
pub const DEFAULT_MEMORY_REQUEST_ENV: &str = "WSENV_DEFAULT_MEMORY_REQUEST";
pub const SIDECAR_MEMORY_LIMIT_ENV: &str = "WSENV_SIDECAR_MEMORY_LIMIT";
pub const PROJECTS_MOUNT_PATH_ENV: &str = "WSENV_PROJECTS_MOUNT_PATH";

/// Root of the resolver configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub memory: MemorySettings,

    #[serde(default)]
    pub projects: ProjectsSettings,
}

/// Memory defaults, as Kubernetes quantities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySettings {
    /// Limit for machines whose containers declare none
    #[serde(default = "default_limit")]
    pub default_limit: String,

    /// Request for machines whose containers declare none
    #[serde(default = "default_request")]
    pub default_request: String,

    /// Limit for plugin sidecars without their own limit or override
    #[serde(default = "default_sidecar_limit")]
    pub sidecar_default_limit: String,
}

fn default_limit() -> String {
    "1Gi".to_string()
}

fn default_request() -> String {
    "512Mi".to_string()
}

fn default_sidecar_limit() -> String {
    "128Mi".to_string()
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_request: default_request(),
            sidecar_default_limit: default_sidecar_limit(),
        }
    }
}

/// Where workspace sources are mounted in mount-sources sidecars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectsSettings {
    #[serde(default = "default_projects_env_var")]
    pub env_var: String,

    #[serde(default = "default_projects_mount_path")]
    pub mount_path: String,
}

fn default_projects_env_var() -> String {
    "CHE_PROJECTS_ROOT".to_string()
}

fn default_projects_mount_path() -> String {
    "/projects".to_string()
}

impl Default for ProjectsSettings {
    fn default() -> Self {
        Self {
            env_var: default_projects_env_var(),
            mount_path: default_projects_mount_path(),
        }
    }
}

fn quantity_bytes(field: &str, value: &str) -> Result<u64> {
    quantity::to_bytes(value)
        .map_err(|e| WsError::Config(format!("'{}' is not a valid memory size: {}", field, e)))
}

impl ResolverConfig {
    /// Load configuration.
    ///
    /// Resolution order: `path` if given, then `$WSENV_CONFIG`, then defaults.
    /// Environment overrides are applied last and the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::load_from_path(&path)?,
            None => {
                debug!("No resolver config file given, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading resolver config from: {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WsError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_yaml_ng::from_str(&contents)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = lookup(DEFAULT_MEMORY_LIMIT_ENV) {
            self.memory.default_limit = value;
        }
        if let Some(value) = lookup(DEFAULT_MEMORY_REQUEST_ENV) {
            self.memory.default_request = value;
        }
        if let Some(value) = lookup(SIDECAR_MEMORY_LIMIT_ENV) {
            self.memory.sidecar_default_limit = value;
        }
        if let Some(value) = lookup(PROJECTS_MOUNT_PATH_ENV) {
            self.projects.mount_path = value;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.default_limit_bytes()?;
        self.default_request_bytes()?;
        self.sidecar_default_limit_bytes()?;

        if !self.projects.mount_path.starts_with('/') {
            return Err(WsError::Config(format!(
                "'projects.mount_path' must be absolute, got '{}'",
                self.projects.mount_path
            )));
        }
        if self.projects.env_var.trim().is_empty() {
            return Err(WsError::Config(
                "'projects.env_var' must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_limit_bytes(&self) -> Result<u64> {
        quantity_bytes("memory.default_limit", &self.memory.default_limit)
    }

    pub fn default_request_bytes(&self) -> Result<u64> {
        quantity_bytes("memory.default_request", &self.memory.default_request)
    }

    pub fn sidecar_default_limit_bytes(&self) -> Result<u64> {
        quantity_bytes(
            "memory.sidecar_default_limit",
            &self.memory.sidecar_default_limit,
        )
    }
}
