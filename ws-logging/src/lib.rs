use std::{env, path::PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Console,
    File,
    Both,
    None,
}

/// Log line rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

/// Subscriber settings, normally read from the process environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub output: LogOutput,
    pub format: LogFormat,
    pub file_path: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            output: LogOutput::Console,
            format: LogFormat::Human,
            file_path: PathBuf::from("/tmp/wsenv.log"),
        }
    }
}

impl LogSettings {
    /// Read `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT` and `LOG_FILE_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unknown values fall back
    /// to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let output = match lookup("LOG_OUTPUT").as_deref() {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            Some("none") => LogOutput::None,
            _ => defaults.output,
        };
        let format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => defaults.format,
        };

        Self {
            level: lookup("LOG_LEVEL").unwrap_or(defaults.level),
            output,
            format,
            file_path: lookup("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.file_path),
        }
    }

    fn writes_console(&self) -> bool {
        matches!(self.output, LogOutput::Console | LogOutput::Both)
    }

    fn writes_file(&self) -> bool {
        matches!(self.output, LogOutput::File | LogOutput::Both)
    }
}

fn format_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Human => layer.compact().boxed(),
    }
}

/// Install the global tracing subscriber.
///
/// Console output goes to stderr so that resolved models printed on stdout
/// stay machine-readable. The returned guard must be held for as long as
/// file logging should keep flushing.
pub fn init_subscriber(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let mut guard = None;
    let mut layers = Vec::new();

    if settings.writes_console() {
        layers.push(format_layer(settings.format, std::io::stderr));
    }

    if settings.writes_file() {
        let dir = settings
            .file_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        let file_name = settings
            .file_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("wsenv.log"));
        let appender = tracing_appender::rolling::daily(dir, file_name);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);
        layers.push(format_layer(settings.format, non_blocking));
    }

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = registry().with(env_filter).with(layers).try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = LogSettings::from_lookup(lookup_from(&[]));
        assert_eq!(settings, LogSettings::default());
    }

    #[test]
    fn test_reads_all_keys() {
        let settings = LogSettings::from_lookup(lookup_from(&[
            ("LOG_LEVEL", "debug"),
            ("LOG_OUTPUT", "both"),
            ("LOG_FORMAT", "json"),
            ("LOG_FILE_PATH", "/var/log/wsenv.log"),
        ]));
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.output, LogOutput::Both);
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.file_path, PathBuf::from("/var/log/wsenv.log"));
        assert!(settings.writes_console());
        assert!(settings.writes_file());
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let settings = LogSettings::from_lookup(lookup_from(&[
            ("LOG_OUTPUT", "syslog"),
            ("LOG_FORMAT", "xml"),
        ]));
        assert_eq!(settings.output, LogOutput::Console);
        assert_eq!(settings.format, LogFormat::Human);
    }

    #[test]
    fn test_init_with_no_output_is_harmless() {
        let settings = LogSettings {
            output: LogOutput::None,
            ..LogSettings::default()
        };
        assert!(init_subscriber(&settings).is_none());
    }
}
