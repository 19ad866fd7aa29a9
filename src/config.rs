//! Provider Configuration
//!
//! Resolves the control plane credential and endpoint once at startup.
//! Precedence per setting: explicit value > environment > config file > default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.litellm.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_KEY_ENV: &str = "LITELLM_API_KEY";
pub const ENDPOINT_ENV: &str = "LITELLM_ENDPOINT";

/// Partially specified settings, from CLI flags or the config file
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("llmctl").join("config.json"))
    }

    /// Load settings from the config file, empty if missing or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

/// Resolved, immutable provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Build a configuration from explicit values
    pub fn new(api_key: &str, endpoint: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::config(format!(
                "api_key is required; set it explicitly or via {}",
                API_KEY_ENV
            )));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            endpoint: normalize_endpoint(endpoint)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve from explicit settings, the process environment and a config file
    pub fn resolve(explicit: &Settings, file: &Settings) -> Result<Self> {
        Self::resolve_with(explicit, file, |name| std::env::var(name).ok())
    }

    /// Same as [`ProviderConfig::resolve`] with an injectable environment lookup
    pub fn resolve_with(
        explicit: &Settings,
        file: &Settings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = explicit
            .api_key
            .clone()
            .or_else(|| env(API_KEY_ENV).filter(|v| !v.is_empty()))
            .or_else(|| file.api_key.clone())
            .unwrap_or_default();

        let endpoint = explicit
            .endpoint
            .clone()
            .or_else(|| env(ENDPOINT_ENV).filter(|v| !v.is_empty()))
            .or_else(|| file.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let timeout_secs = explicit
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than 0"));
        }

        let config = Self::new(&api_key, &endpoint)?.with_timeout(Duration::from_secs(timeout_secs));
        tracing::debug!("Resolved provider config: {:?}", config);
        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL without a trailing slash
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "endpoint must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(endpoint.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_endpoint() {
        let explicit = Settings {
            api_key: Some("sk-admin".into()),
            ..Default::default()
        };
        let config = ProviderConfig::resolve_with(&explicit, &Settings::default(), no_env).unwrap();
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_env_fallback_for_api_key() {
        let config = ProviderConfig::resolve_with(
            &Settings::default(),
            &Settings::default(),
            |name| (name == API_KEY_ENV).then(|| "sk-from-env".to_string()),
        )
        .unwrap();
        assert_eq!(config.api_key(), "sk-from-env");
    }

    #[test]
    fn test_explicit_beats_env_beats_file() {
        let file = Settings {
            api_key: Some("sk-file".into()),
            endpoint: Some("http://file.local".into()),
            timeout_secs: Some(5),
        };
        let env = |name: &str| match name {
            API_KEY_ENV => Some("sk-env".to_string()),
            _ => None,
        };

        let config = ProviderConfig::resolve_with(&Settings::default(), &file, env).unwrap();
        assert_eq!(config.api_key(), "sk-env");
        assert_eq!(config.endpoint(), "http://file.local");
        assert_eq!(config.timeout(), Duration::from_secs(5));

        let explicit = Settings {
            api_key: Some("sk-flag".into()),
            ..Default::default()
        };
        let config = ProviderConfig::resolve_with(&explicit, &file, env).unwrap();
        assert_eq!(config.api_key(), "sk-flag");
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err =
            ProviderConfig::resolve_with(&Settings::default(), &Settings::default(), no_env).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_endpoint_is_validated_and_trimmed() {
        let config = ProviderConfig::new("sk", "http://localhost:4000/").unwrap();
        assert_eq!(config.endpoint(), "http://localhost:4000");

        assert!(ProviderConfig::new("sk", "not a url").is_err());
        assert!(ProviderConfig::new("sk", "ftp://example.com").is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig::new("sk-very-secret", DEFAULT_ENDPOINT).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let explicit = Settings {
            api_key: Some("sk".into()),
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(ProviderConfig::resolve_with(&explicit, &Settings::default(), no_env).is_err());
    }
}
