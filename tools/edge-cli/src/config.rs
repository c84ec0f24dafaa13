//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use edge_core::{load_config_file, ResponderConfig};
use serde::{Deserialize, Serialize};

/// Config file names searched from the working directory upwards.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["edge-bench.toml", ".edge-bench.toml", "edge-bench.json"];

/// CLI configuration file.
///
/// Responder settings sit at the top level; `[serve]` configures the native host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Responder configuration.
    #[serde(flatten)]
    pub responder: ResponderConfig,

    /// Native host configuration.
    #[serde(default)]
    pub serve: ServeConfig,
}

impl CliConfig {
    /// Load config from a file (TOML, or JSON by extension).
    pub fn load(path: &Path) -> Result<Self> {
        load_config_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Check every section, collecting errors rather than stopping at the first.
    pub fn problems(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Err(e) = self.responder.validate() {
            errors.push(e.to_string());
        }
        if !self.serve.route.starts_with('/') {
            errors.push(format!("serve.route '{}' must start with '/'", self.serve.route));
        }
        if self.serve.addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!("serve.addr '{}' is not a socket address", self.serve.addr));
        }

        errors
    }
}

/// Native host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Listen address.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Route the responder is mounted on.
    #[serde(default = "default_route")]
    pub route: String,
}

fn default_addr() -> String {
    "127.0.0.1:7071".to_string()
}

fn default_route() -> String {
    "/api/workload".to_string()
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            route: default_route(),
        }
    }
}

/// Generate a default `edge-bench.toml` with a `[serve]` section.
pub fn generate_default_config(runtime: &str) -> String {
    format!(
        r#"{}
[serve]
addr = "{}"
route = "{}"
"#,
        edge_core::generate_default_config(runtime),
        default_addr(),
        default_route()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config("native")).unwrap();
        assert_eq!(config.responder.runtime, "native");
        assert_eq!(config.serve, ServeConfig::default());
        assert!(config.problems().is_empty());
    }

    #[test]
    fn test_flattened_responder_fields() {
        let config: CliConfig = toml::from_str(
            r#"
runtime = "azure"
message = "hi"

[serve]
route = "/bench"
"#,
        )
        .unwrap();
        assert_eq!(config.responder.runtime, "azure");
        assert_eq!(config.responder.message, "hi");
        assert_eq!(config.serve.route, "/bench");
        assert_eq!(config.serve.addr, "127.0.0.1:7071");
    }

    #[test]
    fn test_json_config() {
        let config: CliConfig =
            serde_json::from_str(r#"{"runtime": "native", "serve": {"addr": "0.0.0.0:80"}}"#).unwrap();
        assert_eq!(config.serve.addr, "0.0.0.0:80");
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("edge-cli-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("edge-bench.toml");
        std::fs::write(&path, "runtime = \"native-test\"\n\n[serve]\naddr = \"0.0.0.0:9000\"\n").unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.responder.runtime, "native-test");
        assert_eq!(config.serve.addr, "0.0.0.0:9000");

        let err = CliConfig::load(&dir.join("missing.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_problems_collected() {
        let mut config = CliConfig::default();
        config.serve.route = "bench".to_string();
        config.serve.addr = "nowhere".to_string();
        config.responder.logging.level = "chatty".to_string();
        assert_eq!(config.problems().len(), 3);
    }
}
