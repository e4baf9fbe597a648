//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_STORAGE_DIR: &str = ".wallet-data";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Log output format for the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    /// Transport timeout applied to every backend request
    pub api_timeout: Duration,
    pub storage_dir: PathBuf,
    /// Base64 of the 32-byte AES key protecting the secure storage tier
    pub storage_encryption_key: SecretString,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_base_url = var("API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "API_BASE_URL".to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }

        let api_timeout = match var("API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "API_TIMEOUT_SECS".to_string(),
                    message: e.to_string(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "API_TIMEOUT_SECS".to_string(),
                        message: "must be greater than 0".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let storage_dir = var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let storage_encryption_key = var("STORAGE_ENCRYPTION_KEY")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::Missing("STORAGE_ENCRYPTION_KEY".to_string()))?;
        // Fail at startup rather than on the first secure write
        decode_encryption_key(&storage_encryption_key)?;

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT".to_string(),
                    message: format!("unknown format '{}'", other),
                });
            }
        };

        Ok(Self {
            api_base_url,
            api_timeout,
            storage_dir,
            storage_encryption_key,
            log_format,
        })
    }

    /// Raw AES-256 key bytes
    pub fn encryption_key_bytes(&self) -> Result<[u8; 32], ConfigError> {
        decode_encryption_key(&self.storage_encryption_key)
    }
}

fn decode_encryption_key(secret: &SecretString) -> Result<[u8; 32], ConfigError> {
    let invalid = |message: String| ConfigError::Invalid {
        name: "STORAGE_ENCRYPTION_KEY".to_string(),
        message,
    };
    let bytes = STANDARD
        .decode(secret.expose_secret().trim())
        .map_err(|_| invalid("not valid base64".to_string()))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| invalid(format!("expected 32 bytes, got {}", b.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn key_b64() -> String {
        STANDARD.encode([7u8; 32])
    }

    fn lookup(vars: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup(&[("STORAGE_ENCRYPTION_KEY", key_b64())])).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api_timeout, Duration::from_secs(30));
        assert_eq!(config.storage_dir, PathBuf::from(DEFAULT_STORAGE_DIR));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.encryption_key_bytes().unwrap(), [7u8; 32]);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("STORAGE_ENCRYPTION_KEY", key_b64()),
            ("API_BASE_URL", "https://api.example.com/v1/".to_string()),
            ("LOG_FORMAT", "json".to_string()),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com/v1");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("STORAGE_ENCRYPTION_KEY".to_string()));
    }

    #[test]
    fn test_short_key_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(
            "STORAGE_ENCRYPTION_KEY",
            STANDARD.encode([1u8; 16]),
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "STORAGE_ENCRYPTION_KEY"));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        for raw in ["abc", "0"] {
            let err = AppConfig::from_lookup(lookup(&[
                ("STORAGE_ENCRYPTION_KEY", key_b64()),
                ("API_TIMEOUT_SECS", raw.to_string()),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "API_TIMEOUT_SECS"));
        }
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("STORAGE_ENCRYPTION_KEY", key_b64()),
            ("API_BASE_URL", "ftp://example.com".to_string()),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "API_BASE_URL"));
    }
}
