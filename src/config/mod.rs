use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    /// Default `title` local handed to every rendered page
    pub title: String,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub cookie_name: String,
    pub ttl_secs: u64,
    pub secure_cookie: bool,
    /// How often expired sessions are swept from the store
    pub purge_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    /// `from_env` is this with the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database_url = required(&lookup, "DATABASE_URL")?;
        let secret = required(&lookup, "SESSION_SECRET")?;

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(database_url, secret),
            Environment::Staging => Self::staging(database_url, secret),
            Environment::Development => Self::development(database_url, secret),
        };

        Ok(config.with_overrides(&lookup))
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("PUBLIC_DIR") {
            self.server.public_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("APP_TITLE") {
            self.server.title = v;
        }
        if let Some(v) = lookup("BODY_LIMIT_BYTES") {
            self.server.body_limit_bytes = v.parse().unwrap_or(self.server.body_limit_bytes);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        // Session overrides
        if let Some(v) = lookup("SESSION_COOKIE_NAME") {
            if !v.trim().is_empty() {
                self.session.cookie_name = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("SESSION_TTL_SECS") {
            self.session.ttl_secs = v.parse().unwrap_or(self.session.ttl_secs);
        }
        if let Some(v) = lookup("SESSION_COOKIE_SECURE") {
            self.session.secure_cookie = v.parse().unwrap_or(self.session.secure_cookie);
        }
        if let Some(v) = lookup("SESSION_PURGE_INTERVAL_SECS") {
            // A zero period would make the sweeper spin
            match v.parse::<u64>() {
                Ok(secs) if secs > 0 => self.session.purge_interval_secs = secs,
                _ => {}
            }
        }

        self
    }

    fn development(database_url: String, secret: String) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                public_dir: PathBuf::from("public"),
                title: "SportsBuddies".to_string(),
                body_limit_bytes: 1024 * 1024, // 1MB
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
                acquire_timeout_secs: 5,
            },
            session: SessionConfig {
                secret,
                cookie_name: "sportsbuddies.sid".to_string(),
                ttl_secs: 14 * 24 * 60 * 60, // 2 weeks
                secure_cookie: false,
                purge_interval_secs: 10 * 60,
            },
        }
    }

    fn staging(database_url: String, secret: String) -> Self {
        let mut config = Self::development(database_url, secret);
        config.environment = Environment::Staging;
        config.server.host = "0.0.0.0".to_string();
        config.database.max_connections = 10;
        config.session.secure_cookie = true;
        config
    }

    fn production(database_url: String, secret: String) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                public_dir: PathBuf::from("public"),
                title: "SportsBuddies".to_string(),
                body_limit_bytes: 256 * 1024, // 256KB
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 20,
                acquire_timeout_secs: 3,
            },
            session: SessionConfig {
                secret,
                cookie_name: "sportsbuddies.sid".to_string(),
                ttl_secs: 24 * 60 * 60, // 1 day
                secure_cookie: true,
                purge_interval_secs: 10 * 60,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_database_url_fails_fast() {
        let err = AppConfig::from_lookup(lookup_from(&[("SESSION_SECRET", "s3cret")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_blank_session_secret_fails_fast() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/sports"),
            ("SESSION_SECRET", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SESSION_SECRET")));
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/sports"),
            ("SESSION_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 3000);
        assert!(!config.session.secure_cookie);
        assert_eq!(config.server.title, "SportsBuddies");
    }

    #[test]
    fn test_production_preset_with_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "prod"),
            ("DATABASE_URL", "postgres://db/sports"),
            ("SESSION_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("SESSION_TTL_SECS", "not-a-number"),
        ]))
        .unwrap();
        assert!(config.is_production());
        assert!(config.session.secure_cookie);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.ttl_secs, 24 * 60 * 60);
    }

    #[test]
    fn test_purge_interval_rejects_zero() {
        let base = [
            ("DATABASE_URL", "postgres://localhost/sports"),
            ("SESSION_SECRET", "s3cret"),
        ];
        let config = AppConfig::from_lookup(lookup_from(&[base[0], base[1], ("SESSION_PURGE_INTERVAL_SECS", "0")])).unwrap();
        assert_eq!(config.session.purge_interval_secs, 600);

        let config = AppConfig::from_lookup(lookup_from(&[base[0], base[1], ("SESSION_PURGE_INTERVAL_SECS", "30")])).unwrap();
        assert_eq!(config.session.purge_interval_secs, 30);
    }
}
