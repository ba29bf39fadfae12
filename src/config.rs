//! Runtime configuration.
//!
//! Defaults can be overridden by an optional TOML file (`CARDIORISK_CONFIG`)
//! and then by individual environment variables:
//! - `CARDIORISK_ENDPOINT`
//! - `CARDIORISK_TIMEOUT_MS`
//! - `CARDIORISK_MIN_LATENCY_MS`
//! - `CARDIORISK_PROBABILITY_FIELDS="risk_probability,probability"`
//! - `CARDIORISK_CLASS_FIELD`
//! - `CARDIORISK_API_KEY`
//! - `CARDIORISK_EXPORT_DIR`
//!
//! Invalid environment values are ignored with a warning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lowest latency floor the gateway will accept.
pub const MIN_LATENCY_LOWER_BOUND: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Remote classifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout for the remote call
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Minimum time before a prediction resolves
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,

    /// Candidate names of the probability field, first match wins
    #[serde(default = "default_probability_fields")]
    pub probability_fields: Vec<String>,

    /// Name of the 0/1 class indicator field
    #[serde(default = "default_class_field")]
    pub class_field: String,

    /// Optional bearer token sent with each request
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5000/predict".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_min_latency_ms() -> u64 {
    1_500
}

fn default_probability_fields() -> Vec<String> {
    vec!["risk_probability".to_string(), "probability".to_string()]
}

fn default_class_field() -> String {
    "prediction".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            min_latency_ms: default_min_latency_ms(),
            probability_fields: default_probability_fields(),
            class_field: default_class_field(),
            api_key: None,
        }
    }
}

impl GatewayConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Latency floor, never below [`MIN_LATENCY_LOWER_BOUND`].
    #[must_use]
    pub fn min_latency(&self) -> Duration {
        Duration::from_millis(self.min_latency_ms).max(MIN_LATENCY_LOWER_BOUND)
    }
}

/// Report export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub output_dir: PathBuf,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_export_dir(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

fn parse_positive_ms(name: &str, value: &str) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(ms),
        _ => {
            tracing::warn!("Ignoring invalid {}={:?}", name, value);
            None
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if the document is invalid.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load configuration from `CARDIORISK_CONFIG` (if set) and environment overrides.
    ///
    /// # Errors
    /// Returns error if a configured file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var("CARDIORISK_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Apply overrides from a variable lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CARDIORISK_ENDPOINT") {
            let v = v.trim();
            if v.starts_with("http://") || v.starts_with("https://") {
                self.gateway.endpoint = v.to_string();
            } else {
                tracing::warn!("Ignoring CARDIORISK_ENDPOINT without http(s) scheme");
            }
        }

        if let Some(ms) = lookup("CARDIORISK_TIMEOUT_MS")
            .and_then(|v| parse_positive_ms("CARDIORISK_TIMEOUT_MS", &v))
        {
            self.gateway.timeout_ms = ms;
        }

        if let Some(ms) = lookup("CARDIORISK_MIN_LATENCY_MS")
            .and_then(|v| parse_positive_ms("CARDIORISK_MIN_LATENCY_MS", &v))
        {
            self.gateway.min_latency_ms = ms;
        }

        if let Some(v) = lookup("CARDIORISK_PROBABILITY_FIELDS") {
            let fields: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if fields.is_empty() {
                tracing::warn!("Ignoring empty CARDIORISK_PROBABILITY_FIELDS");
            } else {
                self.gateway.probability_fields = fields;
            }
        }

        if let Some(v) = lookup("CARDIORISK_CLASS_FIELD") {
            if !v.trim().is_empty() {
                self.gateway.class_field = v.trim().to_string();
            }
        }

        if let Some(v) = lookup("CARDIORISK_API_KEY") {
            if !v.trim().is_empty() {
                self.gateway.api_key = Some(v.trim().to_string());
            }
        }

        if let Some(v) = lookup("CARDIORISK_EXPORT_DIR") {
            if !v.trim().is_empty() {
                self.export.output_dir = PathBuf::from(v.trim());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.gateway.probability_fields, vec!["risk_probability", "probability"]);
        assert_eq!(cfg.gateway.class_field, "prediction");
        assert_eq!(cfg.gateway.min_latency(), Duration::from_millis(1_500));
        assert_eq!(cfg.export.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [gateway]
            endpoint = "https://cardio.example.org/predict"
            probability_fields = ["probability"]
        "#;
        let cfg = AppConfig::from_toml_str(toml, Path::new("test.toml")).expect("Should parse");
        assert_eq!(cfg.gateway.endpoint, "https://cardio.example.org/predict");
        assert_eq!(cfg.gateway.probability_fields, vec!["probability"]);
        assert_eq!(cfg.gateway.timeout_ms, 10_000);
        assert_eq!(cfg.export, ExportConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("[gateway\n", Path::new("bad.toml"))
            .expect_err("Should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/nonexistent/cardiorisk.toml").expect_err("Should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_min_latency_never_zero() {
        let cfg = GatewayConfig {
            min_latency_ms: 0,
            ..GatewayConfig::default()
        };
        assert_eq!(cfg.min_latency(), MIN_LATENCY_LOWER_BOUND);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CARDIORISK_ENDPOINT", "https://api.example.org/predict"),
            ("CARDIORISK_TIMEOUT_MS", "2500"),
            ("CARDIORISK_MIN_LATENCY_MS", "not-a-number"),
            ("CARDIORISK_PROBABILITY_FIELDS", " probability , risk_probability ,"),
            ("CARDIORISK_API_KEY", "secret"),
            ("CARDIORISK_EXPORT_DIR", "/tmp/reports"),
        ]);

        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(cfg.gateway.endpoint, "https://api.example.org/predict");
        assert_eq!(cfg.gateway.timeout_ms, 2_500);
        assert_eq!(cfg.gateway.min_latency_ms, 1_500);
        assert_eq!(cfg.gateway.probability_fields, vec!["probability", "risk_probability"]);
        assert_eq!(cfg.gateway.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.export.output_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn test_endpoint_without_scheme_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|name| (name == "CARDIORISK_ENDPOINT").then(|| "ftp://x".to_string()));
        assert_eq!(cfg.gateway.endpoint, default_endpoint());
    }
}
