//! Application configuration.
//!
//! # Responsibility
//! - Load store locations, audit table name, logging and retry settings
//!   from TOML, with environment variable overrides.
//! - Reject settings that would only fail later at first use.
//!
//! # Invariants
//! - Every field has a default, so an empty file is a valid config.
//! - Environment variables take precedence over file values.
//!
//! Supported environment variables:
//! - `EMPLOYEE_AUDIT_PRIMARY_STORE`: overrides `connection_strings.primary_store`
//! - `EMPLOYEE_AUDIT_LOG_STORE`: overrides `connection_strings.log_store`
//! - `EMPLOYEE_AUDIT_TABLE_NAME`: overrides `connection_strings.audit_table_name`
//! - `EMPLOYEE_AUDIT_LOG_LEVEL`: overrides `logging.level`
//! - `EMPLOYEE_AUDIT_LOG_DIR`: overrides `logging.log_dir`

use crate::audit::is_valid_table_name;
use crate::service::employee_service::AuditRetryPolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PRIMARY_STORE: &str = "EMPLOYEE_AUDIT_PRIMARY_STORE";
pub const ENV_LOG_STORE: &str = "EMPLOYEE_AUDIT_LOG_STORE";
pub const ENV_TABLE_NAME: &str = "EMPLOYEE_AUDIT_TABLE_NAME";
pub const ENV_LOG_LEVEL: &str = "EMPLOYEE_AUDIT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "EMPLOYEE_AUDIT_LOG_DIR";

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config file `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connection_strings: ConnectionStrings,
    pub logging: LoggingSettings,
    pub audit: AuditSettings,
}

/// Store locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStrings {
    /// SQLite path of the primary employee store.
    pub primary_store: String,
    /// SQLite path of the audit log store.
    pub log_store: String,
    pub audit_table_name: String,
}

impl Default for ConnectionStrings {
    fn default() -> Self {
        Self {
            primary_store: "employees.sqlite3".to_string(),
            log_store: "employee_audit_log.sqlite3".to_string(),
            audit_table_name: "EmployeeLog".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Total append attempts per audit record, including the first.
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for AuditSettings {
    fn default() -> Self {
        let policy = AuditRetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            retry_backoff_ms: policy.backoff.as_millis() as u64,
        }
    }
}

impl AuditSettings {
    pub fn retry_policy(&self) -> AuditRetryPolicy {
        AuditRetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

impl AppConfig {
    /// Loads a TOML file, applies environment overrides and validates.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML without consulting the environment.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Applies overrides from `lookup`, keyed by the `ENV_*` names.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_PRIMARY_STORE) {
            self.connection_strings.primary_store = value;
        }
        if let Some(value) = lookup(ENV_LOG_STORE) {
            self.connection_strings.log_store = value;
        }
        if let Some(value) = lookup(ENV_TABLE_NAME) {
            self.connection_strings.audit_table_name = value;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            self.logging.log_dir = Some(value);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let strings = &self.connection_strings;
        if strings.primary_store.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "connection_strings.primary_store cannot be empty".to_string(),
            ));
        }
        if strings.log_store.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "connection_strings.log_store cannot be empty".to_string(),
            ));
        }
        if !is_valid_table_name(&strings.audit_table_name) {
            return Err(ConfigError::Invalid(format!(
                "connection_strings.audit_table_name `{}` must be 3-63 alphanumeric characters starting with a letter",
                strings.audit_table_name
            )));
        }
        if self.audit.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "audit.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
