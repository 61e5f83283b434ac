//! Service configuration loading.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults ([`ServiceConfig::default`]).
//! 2. An optional file; format detected from the extension (`.toml`,
//!    `.yaml`/`.yml`, `.json`). `${VAR}` references in the file are
//!    substituted from the environment before parsing.
//! 3. Environment variables prefixed with `RISKZONE_`, using `__` for
//!    nesting: `RISKZONE_POLICY__SCORE_CEILING=60000`,
//!    `RISKZONE_SERVER__PORT=9000`.

use crate::policy::{LeaderboardPolicy, PolicyError};
use config::{Config as Cfg, Environment, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "RISKZONE";

/// Configuration error
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid policy: {0}")]
    Policy(#[from] PolicyError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Network and storage settings of the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// `sqlite:` URL of the score database; in-memory store when absent.
    pub database_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_url: None,
        }
    }
}

/// Everything the service needs at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub policy: LeaderboardPolicy,
}

impl ServiceConfig {
    /// Load from an optional file plus the process environment, then validate.
    pub fn load(path: Option<&str>) -> ConfigResult<Self> {
        Self::load_from(path, None)
    }

    /// Like [`load`](Self::load), reading overrides from `env` instead of the
    /// process environment when given.
    pub fn load_from(path: Option<&str>, env: Option<HashMap<String, String>>) -> ConfigResult<Self> {
        let mut builder = Cfg::builder();

        if let Some(path) = path {
            let format = detect_format(path)?;
            let content = std::fs::read_to_string(path)?;
            builder = builder.add_source(File::from_str(&substitute_env_vars(&content), format));
            debug!(path, ?format, "added configuration file source");
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("policy.cors.allowed_origins")
            .source(env);

        let config: ServiceConfig = builder
            .add_source(environment)
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.policy.validate()?;
        debug!(
            policy_version = %config.policy.version,
            bind = %config.bind_addr(),
            "service configuration loaded"
        );
        Ok(config)
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Detect configuration format from file extension
pub fn detect_format(path: &str) -> ConfigResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("No file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Replace `${VAR}` references with environment values.
///
/// Unset variables are left verbatim so the parser reports them in context.
pub fn substitute_env_vars(content: &str) -> String {
    substitute_with(content, |name| std::env::var(name).ok())
}

fn substitute_with(content: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let Ok(re) = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}") else {
        return content.to_string();
    };
    re.replace_all(content, |caps: &regex::Captures| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn detects_supported_formats() {
        assert_eq!(detect_format("riskzone.toml").unwrap(), FileFormat::Toml);
        assert_eq!(detect_format("riskzone.yml").unwrap(), FileFormat::Yaml);
        assert_eq!(detect_format("riskzone.YAML").unwrap(), FileFormat::Yaml);
        assert_eq!(detect_format("riskzone.json").unwrap(), FileFormat::Json);
        assert!(detect_format("riskzone.ini").is_err());
        assert!(detect_format("riskzone").is_err());
    }

    #[test]
    fn defaults_without_sources() {
        let config = ServiceConfig::load_from(None, env(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "riskzone.toml",
            r#"
[server]
port = 9100
database_url = "sqlite://scores.db"

[policy]
version = "season-2"
score_ceiling = 75000

[policy.rate_limit]
max_requests = 30
"#,
        );
        let config = ServiceConfig::load_from(Some(&path), env(&[])).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.database_url.as_deref(), Some("sqlite://scores.db"));
        assert_eq!(config.policy.version, "season-2");
        assert_eq!(config.policy.score_ceiling, 75_000);
        assert_eq!(config.policy.rate_limit.max_requests, 30);
        assert_eq!(config.policy.rate_limit.window_secs, 60);
    }

    #[test]
    fn yaml_file_is_supported() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "riskzone.yaml",
            "policy:\n  cors:\n    allowed_origins:\n      - https://game.example.com\n",
        );
        let config = ServiceConfig::load_from(Some(&path), env(&[])).unwrap();
        assert_eq!(
            config.policy.cors.allowed_origins,
            vec!["https://game.example.com".to_string()]
        );
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "riskzone.toml", "[policy]\nscore_ceiling = 75000\n");
        let config = ServiceConfig::load_from(
            Some(&path),
            env(&[
                ("RISKZONE_POLICY__SCORE_CEILING", "60000"),
                ("RISKZONE_SERVER__PORT", "9200"),
            ]),
        )
        .unwrap();
        assert_eq!(config.policy.score_ceiling, 60_000);
        assert_eq!(config.server.port, 9200);
    }

    #[test]
    fn invalid_policy_is_rejected_at_load() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "riskzone.toml", "[policy]\nscore_ceiling = 1000000\n");
        let err = ServiceConfig::load_from(Some(&path), env(&[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Policy(PolicyError::CeilingAboveHardBound(1_000_000))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ServiceConfig::load_from(Some("/nonexistent/riskzone.toml"), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn substitutes_known_variables_only() {
        let out = substitute_with("url = \"${DB}\"\nother = \"${MISSING}\"", |name| {
            (name == "DB").then(|| "sqlite://x.db".to_string())
        });
        assert_eq!(out, "url = \"sqlite://x.db\"\nother = \"${MISSING}\"");
    }
}
