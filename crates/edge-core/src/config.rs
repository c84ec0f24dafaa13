//! Responder configuration.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ResponderConfig::runtime`].
pub const ENV_RUNTIME: &str = "EDGE_BENCH_RUNTIME";
/// Environment variable overriding [`ResponderConfig::message`].
pub const ENV_MESSAGE: &str = "EDGE_BENCH_MESSAGE";
/// Environment variable overriding [`ResponderConfig::temp_dir`].
pub const ENV_TEMP_DIR: &str = "EDGE_BENCH_TEMP_DIR";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["json", "human"];

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for one responder instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Identifies which transport served the request (`runtime` field and
    /// `x-runtime` header).
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Fixed descriptive message included in every response.
    #[serde(default = "default_message")]
    pub message: String,

    /// Fallbacks for absent or malformed integer parameters.
    #[serde(default)]
    pub defaults: ParameterDefaults,

    /// Directory for `io` workload temp files (default: OS temp dir).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,

    /// Per-invocation log settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_runtime() -> String {
    "native".to_string()
}

fn default_message() -> String {
    "Rust example function".to_string()
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            message: default_message(),
            defaults: ParameterDefaults::default(),
            temp_dir: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ResponderConfig {
    /// Create a configuration for the given runtime identifier.
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            ..Default::default()
        }
    }

    /// Set the temp directory used by the `io` workload.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Apply `EDGE_BENCH_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (used by `with_env_overrides`).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(runtime) = lookup(ENV_RUNTIME).filter(|v| !v.trim().is_empty()) {
            self.runtime = runtime;
        }
        if let Some(message) = lookup(ENV_MESSAGE) {
            self.message = message;
        }
        if let Some(dir) = lookup(ENV_TEMP_DIR).filter(|v| !v.trim().is_empty()) {
            self.temp_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Check field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.trim().is_empty() {
            return Err(ConfigError::Invalid("runtime must not be empty".into()));
        }
        if !self
            .runtime
            .bytes()
            .all(|b| b.is_ascii_graphic() || b == b' ')
        {
            return Err(ConfigError::Invalid(format!(
                "runtime '{}' is not a valid header value",
                self.runtime
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log format '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Directory for `io` temp files.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Fallback values for integer query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefaults {
    #[serde(default = "default_iterations")]
    pub iterations: i64,
    #[serde(default = "default_size_kb")]
    pub size_kb: i64,
    #[serde(default)]
    pub delay_ms: i64,
}

fn default_iterations() -> i64 {
    250_000
}

fn default_size_kb() -> i64 {
    128
}

impl Default for ParameterDefaults {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            size_kb: default_size_kb(),
            delay_ms: 0,
        }
    }
}

/// Log settings applied to each invocation's logger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn or error.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format: json or human.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

/// Read and deserialize a config file. `.json` files are JSON, anything else TOML.
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        toml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Generate a default `edge-bench.toml` file.
pub fn generate_default_config(runtime: &str) -> String {
    format!(
        r#"# Workload responder configuration

runtime = "{runtime}"
message = "Rust example function"
# temp_dir = "/tmp"

[defaults]
iterations = 250000
size_kb = 128
delay_ms = 0

[logging]
level = "info"
format = "json"
"#,
        runtime = runtime
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResponderConfig::default();
        assert_eq!(config.runtime, "native");
        assert_eq!(config.message, "Rust example function");
        assert_eq!(config.defaults.iterations, 250_000);
        assert_eq!(config.defaults.size_kb, 128);
        assert_eq!(config.defaults.delay_ms, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_round_trips() {
        let config: ResponderConfig = toml::from_str(&generate_default_config("spin")).unwrap();
        assert_eq!(config.runtime, "spin");
        assert_eq!(config.defaults, ParameterDefaults::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ResponderConfig = toml::from_str("runtime = \"spin\"\n[defaults]\nsize_kb = 8\n").unwrap();
        assert_eq!(config.defaults.size_kb, 8);
        assert_eq!(config.defaults.iterations, 250_000);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = ResponderConfig::default().with_overrides(|key| match key {
            ENV_RUNTIME => Some("azure".to_string()),
            ENV_TEMP_DIR => Some("/var/tmp".to_string()),
            _ => None,
        });
        assert_eq!(config.runtime, "azure");
        assert_eq!(config.temp_dir(), PathBuf::from("/var/tmp"));
        assert_eq!(config.message, "Rust example function");
    }

    #[test]
    fn test_blank_runtime_override_ignored() {
        let config = ResponderConfig::default().with_overrides(|key| match key {
            ENV_RUNTIME => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.runtime, "native");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ResponderConfig::new("");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.runtime = "native".into();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());

        config.logging.level = "debug".into();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("edge-config-{}", uuid::Uuid::now_v7().simple()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config_file::<ResponderConfig>("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_toml_and_json_by_extension() {
        let toml_path = scratch_file("edge-bench.toml", "runtime = \"spin\"\n");
        let config: ResponderConfig = load_config_file(&toml_path).unwrap();
        assert_eq!(config.runtime, "spin");

        let json_path = scratch_file("edge-bench.json", r#"{"message": "from json"}"#);
        let config: ResponderConfig = load_config_file(&json_path).unwrap();
        assert_eq!(config.message, "from json");
        assert_eq!(config.runtime, "native");

        for path in [toml_path, json_path] {
            std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
        }
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let path = scratch_file("broken.toml", "runtime = [");
        let err = load_config_file::<ResponderConfig>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
