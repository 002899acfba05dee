use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use ws_config::ResolverConfig;
use ws_environment::{
    EnvironmentFactory, ManifestClient, MemoryAttributeProvisioner, RecipeEnvironmentValidator,
    YamlManifestClient,
};
use ws_model::{ClusterObject, MachineConfig, Recipe};
use ws_plugin::{MachineResolver, ProjectsMount};
use ws_server::ServerResolver;

#[derive(Parser)]
#[command(name = "wsenv")]
#[command(about = "Resolves workspace recipes, plugin sidecars and machine servers")]
#[command(version)]
pub struct Args {
    /// Resolver config file (defaults to $WSENV_CONFIG, then built-in defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve a recipe into a validated environment
    Resolve {
        /// Recipe file
        recipe: PathBuf,

        /// Recipe content type
        #[arg(long, default_value = "application/x-yaml")]
        content_type: String,

        /// YAML map of machine name to machine config the workspace declares
        #[arg(short, long)]
        machines: Option<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Resolve the machine config of a plugin sidecar
    Sidecar {
        /// Plugin descriptor file
        plugin: PathBuf,

        /// Plugin id (defaults to the descriptor's id)
        #[arg(long)]
        plugin_id: Option<String>,

        /// Workspace attribute as KEY=VALUE (can specify multiple)
        #[arg(short = 'a', long = "attribute", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,

        /// Output format
        #[arg(short = 'f', long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// List the servers a machine exposes through annotated Services and Routes
    Servers {
        /// Manifest with the Services and Routes created for the workspace
        manifest: PathBuf,

        /// Machine name
        #[arg(short, long)]
        machine: String,

        /// Output format
        #[arg(short = 'f', long, default_value = "yaml")]
        format: OutputFormat,
    },
}

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Yaml,
    Json,
    JsonPretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" => Ok(OutputFormat::JsonPretty),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

fn parse_attribute(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Expected KEY=VALUE, got '{}'", s)),
    }
}

pub fn execute(args: Args) -> Result<()> {
    let config = ResolverConfig::load(args.config.as_deref())
        .context("Failed to load resolver config")?;

    match args.command {
        Command::Resolve {
            recipe,
            content_type,
            machines,
            format,
        } => {
            let content =
                fs::read(&recipe).with_context(|| format!("Failed to read recipe: {:?}", recipe))?;
            let machines = match machines {
                Some(path) => load_machines(&path)?,
                None => BTreeMap::new(),
            };

            let provisioner = MemoryAttributeProvisioner::new(
                config.default_limit_bytes()?,
                config.default_request_bytes()?,
            );
            let factory =
                EnvironmentFactory::new(YamlManifestClient, RecipeEnvironmentValidator, provisioner);
            let environment = factory.create(Recipe::new(content, content_type), machines, &[])?;

            info!(
                "Resolved {} machines from {:?}",
                environment.machines().len(),
                recipe
            );
            output(&environment, &format)?;
        }

        Command::Sidecar {
            plugin,
            plugin_id,
            attributes,
            format,
        } => {
            let descriptor = ws_plugin::load_descriptor(&plugin)?;
            let plugin_id = plugin_id.unwrap_or_else(|| descriptor.id.clone());
            let workspace_attributes: BTreeMap<String, String> = attributes.into_iter().collect();

            let projects =
                ProjectsMount::new(&config.projects.env_var, &config.projects.mount_path);
            let container = descriptor.sidecar.to_container();
            let default_limit = config.sidecar_default_limit_bytes()?.to_string();

            let machine = MachineResolver::new(
                &plugin_id,
                &projects,
                &container,
                &descriptor.sidecar,
                &default_limit,
                &descriptor.endpoints,
                &workspace_attributes,
            )
            .resolve()?;
            output(&machine, &format)?;
        }

        Command::Servers {
            manifest,
            machine,
            format,
        } => {
            let content = fs::read(&manifest)
                .with_context(|| format!("Failed to read manifest: {:?}", manifest))?;
            let objects = YamlManifestClient
                .parse(&content)
                .with_context(|| format!("Failed to parse manifest: {:?}", manifest))?;

            let mut services = Vec::new();
            let mut routes = Vec::new();
            for object in objects {
                match object {
                    ClusterObject::Service(service) => services.push(service),
                    ClusterObject::Route(route) => routes.push(route),
                    _ => {}
                }
            }

            let servers = ServerResolver::new(services, routes).resolve(&machine)?;
            output(&servers, &format)?;
        }
    }

    Ok(())
}

fn load_machines(path: &Path) -> Result<BTreeMap<String, MachineConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read machines: {:?}", path))?;
    serde_yaml_ng::from_str(&content)
        .with_context(|| format!("Failed to parse machines: {:?}", path))
}

fn output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(value)?;
            print!("{}", yaml);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string(value)?;
            println!("{}", json);
        }
        OutputFormat::JsonPretty => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
        }
    }
    Ok(())
}
