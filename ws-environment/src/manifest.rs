//! Manifest client: recipe bytes to typed cluster objects.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;
use ws_model::ClusterObject;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read YAML manifest")]
    Yaml(#[source] serde_yaml_ng::Error),

    #[error("Failed to decode {kind} '{name}'")]
    Decode {
        kind: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Template(String),
}

/// Turns recipe content into cluster objects
pub trait ManifestClient: Send + Sync {
    fn parse(&self, content: &[u8]) -> Result<Vec<ClusterObject>, ManifestError>;
}

/// Parses multi-document YAML.
///
/// `List` documents contribute their `items`. OpenShift `Template`
/// documents contribute their `objects` with `${PARAM}` references replaced
/// by the template's parameter values.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlManifestClient;

impl ManifestClient for YamlManifestClient {
    fn parse(&self, content: &[u8]) -> Result<Vec<ClusterObject>, ManifestError> {
        let mut documents = Vec::new();
        for document in serde_yaml_ng::Deserializer::from_slice(content) {
            let value = Value::deserialize(document).map_err(ManifestError::Yaml)?;
            if !value.is_null() {
                documents.push(value);
            }
        }

        let mut values = Vec::new();
        for document in documents {
            expand(document, &mut values)?;
        }
        debug!("Manifest contains {} objects", values.len());

        values.into_iter().map(decode).collect()
    }
}

fn kind_of(value: &Value) -> Option<&str> {
    value.get("kind").and_then(Value::as_str)
}

fn expand(value: Value, out: &mut Vec<Value>) -> Result<(), ManifestError> {
    let kind = kind_of(&value).map(str::to_string);
    let is_list = kind
        .as_deref()
        .is_some_and(|k| k == "List" || (k.ends_with("List") && value.get("items").is_some()));

    match kind.as_deref() {
        Some(_) if is_list => {
            let Value::Object(mut list) = value else {
                return Ok(());
            };
            if let Some(Value::Array(items)) = list.remove("items") {
                for item in items {
                    expand(item, out)?;
                }
            }
        }
        Some("Template") => {
            for object in process_template(value)? {
                expand(object, out)?;
            }
        }
        _ => out.push(value),
    }
    Ok(())
}

fn process_template(template: Value) -> Result<Vec<Value>, ManifestError> {
    let mut parameters = HashMap::new();
    if let Some(Value::Array(declared)) = template.get("parameters") {
        for parameter in declared {
            let Some(name) = parameter.get("name").and_then(Value::as_str) else {
                return Err(ManifestError::Template(
                    "Template parameter without a name".to_string(),
                ));
            };
            let value = parameter.get("value").and_then(scalar_string);
            let required = parameter
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            match value {
                Some(value) => {
                    parameters.insert(name.to_string(), value);
                }
                None if required => {
                    return Err(ManifestError::Template(format!(
                        "Required template parameter '{}' has no value",
                        name
                    )));
                }
                None => {
                    parameters.insert(name.to_string(), String::new());
                }
            }
        }
    }

    let Value::Object(mut template) = template else {
        return Ok(Vec::new());
    };
    let objects = match template.remove("objects") {
        Some(Value::Array(objects)) => objects,
        _ => Vec::new(),
    };
    Ok(objects
        .into_iter()
        .map(|object| substitute(object, &parameters))
        .collect())
}

/// Parameter value as text; `None` for null and non-scalar values
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn substitute(value: Value, parameters: &HashMap<String, String>) -> Value {
    match value {
        Value::String(s) if s.contains("${") => {
            let mut replaced = s;
            for (name, parameter) in parameters {
                replaced = replaced.replace(&format!("${{{}}}", name), parameter);
            }
            Value::String(replaced)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| substitute(item, parameters))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, substitute(v, parameters)))
                .collect(),
        ),
        other => other,
    }
}

fn decode(value: Value) -> Result<ClusterObject, ManifestError> {
    let kind = kind_of(&value).unwrap_or("<none>").to_string();
    let name = value
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("<none>")
        .to_string();
    ClusterObject::from_value(value).map_err(|source| ManifestError::Decode { kind, name, source })
}
