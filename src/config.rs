// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Signing secrets are read once at startup and handed to the token service
//! as an explicit [`TokenConfig`].

use std::env;
use std::time::Duration;

/// Default access token lifetime (1 day).
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default refresh token lifetime (7 days).
pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Which document store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (or the emulator when `FIRESTORE_EMULATOR_HOST` is set).
    Firestore { project_id: String },
    /// Process-local store, for development and tests.
    Memory,
}

/// Secrets and lifetimes for access/refresh tokens.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC key for access tokens (raw bytes)
    pub access_secret: Vec<u8>,
    /// HMAC key for refresh tokens (raw bytes), distinct from the access key
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Document store selection
    pub store: StoreBackend,
    /// Token signing configuration
    pub tokens: TokenConfig,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "firestore" => StoreBackend::Firestore {
                project_id: env::var("GCP_PROJECT_ID")
                    .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    reason: format!("unknown backend '{}'", other),
                })
            }
        };

        let access_secret = required_secret("ACCESS_TOKEN_SECRET")?;
        let refresh_secret = required_secret("REFRESH_TOKEN_SECRET")?;
        if access_secret == refresh_secret {
            return Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_SECRET",
                reason: "must differ from ACCESS_TOKEN_SECRET".to_string(),
            });
        }

        let tokens = TokenConfig {
            access_secret,
            refresh_secret,
            access_ttl: ttl_from_env("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL)?,
            refresh_ttl: ttl_from_env("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL)?,
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: e.to_string(),
            })?,
            Err(_) => bcrypt::DEFAULT_COST,
        }
        .clamp(4, 31);

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store,
            tokens,
            bcrypt_cost,
        })
    }

    /// Config for tests: in-memory store, fixed secrets, cheapest bcrypt cost.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            store: StoreBackend::Memory,
            tokens: TokenConfig {
                access_secret: b"test_access_key_32_bytes_minimum!".to_vec(),
                refresh_secret: b"test_refresh_key_32_bytes_minimum".to_vec(),
                access_ttl: DEFAULT_ACCESS_TOKEN_TTL,
                refresh_ttl: DEFAULT_REFRESH_TOKEN_TTL,
            },
            bcrypt_cost: 4,
        }
    }
}

fn required_secret(name: &'static str) -> Result<Vec<u8>, ConfigError> {
    let value = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Invalid {
            name,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value.as_bytes().to_vec())
}

fn ttl_from_env(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(raw) => {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    name,
                    reason: e.to_string(),
                }
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    name,
                    reason: "must be positive".to_string(),
                });
            }
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    // All env manipulation lives in one test to avoid races between test threads.
    #[test]
    fn test_config_from_env() {
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("ACCESS_TOKEN_SECRET", "access_secret");
        env::set_var("REFRESH_TOKEN_SECRET", "refresh_secret");
        env::remove_var("ACCESS_TOKEN_TTL_SECS");
        env::set_var("REFRESH_TOKEN_TTL_SECS", "3600");
        env::set_var("BCRYPT_COST", "2");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.tokens.access_secret, b"access_secret");
        assert_eq!(config.tokens.access_ttl, DEFAULT_ACCESS_TOKEN_TTL);
        assert_eq!(config.tokens.refresh_ttl, Duration::from_secs(3600));
        assert_eq!(config.bcrypt_cost, 4, "cost is clamped to bcrypt's minimum");

        env::set_var("REFRESH_TOKEN_SECRET", "access_secret");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_SECRET",
                ..
            })
        ));

        env::set_var("REFRESH_TOKEN_SECRET", "refresh_secret");
        env::set_var("STORE_BACKEND", "mongo");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                ..
            })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::test_default();
        let printed = format!("{:?}", config.tokens);
        assert!(!printed.contains("test_access_key"));
        assert!(printed.contains("<redacted>"));
    }
}
