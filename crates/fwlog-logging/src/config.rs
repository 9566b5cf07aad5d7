//! Logger configuration
//!
//! Loaded from `LOGGER_*` environment variables through the `config`
//! crate. The record is consumed once when a logger is built and never
//! mutated afterwards.

use config::{Config, Environment};
use fwlog_errors::{invalid_config, Result};
use serde::Deserialize;

/// Prefix shared by every logger environment variable
pub const ENV_PREFIX: &str = "LOGGER";

/// Immutable logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Component identifier stamped on every record
    pub name: String,
    /// Minimum severity to emit (`trace`..`error`, `fatal`, `silent`)
    pub level: String,
    /// Render ISO-8601 timestamps instead of epoch milliseconds
    pub iso_timestamp: bool,
    /// Render the level as a `severity` label instead of a number
    pub use_severity_string: bool,
    /// Extra field paths censored wholesale
    pub redact_paths: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: "app".to_string(),
            level: "info".to_string(),
            iso_timestamp: false,
            use_severity_string: false,
            redact_paths: Vec::new(),
        }
    }
}

impl LoggerConfig {
    /// Load from the process environment
    ///
    /// # Errors
    ///
    /// Returns `FwError::InvalidConfig` when a variable cannot be
    /// deserialized into its field (e.g. a non-boolean flag).
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from an explicit variable map instead of the process environment
    ///
    /// # Errors
    ///
    /// Same as [`LoggerConfig::from_env`].
    pub fn from_env_map(vars: config::Map<String, String>) -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(environment: Environment) -> Result<Self> {
        let environment = environment
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("redact_paths");

        Config::builder()
            .add_source(environment)
            .build()
            .and_then(|c| c.try_deserialize::<LoggerConfig>())
            .map(LoggerConfig::without_blank_paths)
            .map_err(|e| invalid_config("environment", e.to_string()))
    }

    /// `LOGGER_REDACT_PATHS=""` and trailing commas leave blank entries
    fn without_blank_paths(mut self) -> Self {
        self.redact_paths = self
            .redact_paths
            .into_iter()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .collect();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_iso_timestamp(mut self, enabled: bool) -> Self {
        self.iso_timestamp = enabled;
        self
    }

    pub fn with_severity_string(mut self, enabled: bool) -> Self {
        self.use_severity_string = enabled;
        self
    }

    pub fn with_redact_path(mut self, path: impl Into<String>) -> Self {
        self.redact_paths.push(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Logger;
    use fwlog_errors::FwErrorKind;

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = LoggerConfig::from_env_map(vars(&[])).unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_reads_all_fields() {
        let config = LoggerConfig::from_env_map(vars(&[
            ("LOGGER_NAME", "billing"),
            ("LOGGER_LEVEL", "debug"),
            ("LOGGER_ISO_TIMESTAMP", "true"),
            ("LOGGER_USE_SEVERITY_STRING", "true"),
            ("LOGGER_REDACT_PATHS", "password,req.cookie"),
        ]))
        .unwrap();

        assert_eq!(config.name, "billing");
        assert_eq!(config.level, "debug");
        assert!(config.iso_timestamp);
        assert!(config.use_severity_string);
        assert_eq!(config.redact_paths, vec!["password", "req.cookie"]);
    }

    #[test]
    fn test_unrelated_variables_are_ignored() {
        let config =
            LoggerConfig::from_env_map(vars(&[("OTHER_NAME", "x"), ("LOGGER_NAME", "svc")]))
                .unwrap();
        assert_eq!(config.name, "svc");
    }

    #[test]
    fn test_blank_redaction_list_is_empty() {
        let config = LoggerConfig::from_env_map(vars(&[("LOGGER_REDACT_PATHS", "")])).unwrap();
        assert!(config.redact_paths.is_empty());
        assert!(Logger::new(&config).is_ok());
    }

    #[test]
    fn test_trailing_comma_in_redaction_list_is_ignored() {
        let config =
            LoggerConfig::from_env_map(vars(&[("LOGGER_REDACT_PATHS", "password, req.cookie,")]))
                .unwrap();
        assert_eq!(config.redact_paths, vec!["password", "req.cookie"]);
        assert!(Logger::new(&config).is_ok());
    }

    #[test]
    fn test_malformed_flag_is_rejected() {
        let err = LoggerConfig::from_env_map(vars(&[("LOGGER_ISO_TIMESTAMP", "sometimes")]))
            .unwrap_err();
        assert_eq!(err.kind(), FwErrorKind::InvalidConfig);
    }

    #[test]
    fn test_builder_methods() {
        let config = LoggerConfig::default()
            .with_name("api")
            .with_level("warn")
            .with_iso_timestamp(true)
            .with_severity_string(true)
            .with_redact_path("password");

        assert_eq!(config.name, "api");
        assert_eq!(config.level, "warn");
        assert!(config.iso_timestamp);
        assert!(config.use_severity_string);
        assert_eq!(config.redact_paths, vec!["password"]);
    }
}
