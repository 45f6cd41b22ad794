//! Client configuration
//!
//! Loaded from TOML with environment overrides:
//! - `CARBON_LEDGER_API_URL` replaces `api.base_url`
//! - `CARBON_LEDGER_TOKEN_PATH` replaces `auth.store_path`

use crate::currency::Currency;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "CARBON_LEDGER_API_URL";
/// Environment variable overriding the auth store location
pub const ENV_TOKEN_PATH: &str = "CARBON_LEDGER_TOKEN_PATH";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Session persistence
    pub auth: AuthConfig,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Currency assumed by spend estimates when none is given
    pub default_currency: Currency,
}

impl LedgerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into();
        self
    }

    /// With auth store path
    #[inline]
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth.store_path = path.into();
        self
    }

    /// With retry count for transport failures
    #[inline]
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.api.retries = retries;
        self
    }

    /// Parse from a TOML document
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or a value is out of range
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, then apply process environment overrides
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        tracing::debug!(path = %path.display(), base_url = %config.api.base_url, "configuration loaded");
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(path) = lookup(ENV_TOKEN_PATH).filter(|v| !v.trim().is_empty()) {
            self.auth.store_path = PathBuf::from(path);
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns the first invalid key found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::invalid_value(
                "api.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "api.timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.auth.store_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("auth.store_path", "must not be empty"));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            log_filter: "info".to_string(),
            default_currency: Currency::Usd,
        }
    }
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.example.com/v1`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure
    pub retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
            retries: 1,
        }
    }
}

/// Session persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JSON file holding the persisted session
    pub store_path: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(".carbon-ledger/session.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = LedgerConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.retries, 1);
        assert_eq!(config.default_currency, Currency::Usd);
    }

    #[test]
    fn parses_partial_toml() {
        let config = LedgerConfig::from_toml_str(
            r#"
            log_filter = "debug"
            default_currency = "eur"

            [api]
            base_url = "https://ledger.example.com/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://ledger.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.default_currency, Currency::Eur);
    }

    #[test]
    fn rejects_bad_values() {
        let err = LedgerConfig::from_toml_str("[api]\nbase_url = \"ftp://x\"").unwrap_err();
        assert!(err.to_string().contains("api.base_url"));

        let err = LedgerConfig::from_toml_str("[api]\ntimeout_secs = 0").unwrap_err();
        assert!(err.to_string().contains("api.timeout_secs"));

        assert!(LedgerConfig::from_toml_str("api = 3").is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "https://override.example.com"),
            (ENV_TOKEN_PATH, "/tmp/session.json"),
        ]
        .into_iter()
        .collect();

        let mut config = LedgerConfig::new();
        config.apply_env(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.api.base_url, "https://override.example.com");
        assert_eq!(config.auth.store_path, PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = LedgerConfig::new();
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config, LedgerConfig::new());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(&path, "[api]\nretries = 3\n").unwrap();

        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config.api.retries, 3);

        let missing = LedgerConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
