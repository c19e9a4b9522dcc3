use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::{CredentialError, RsaCredentials};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Base64-encoded PEM key pair and token lifetime for one token purpose.
#[derive(Clone)]
pub struct KeySettings {
    pub private_key: String,
    pub public_key: String,
    pub ttl: Duration,
}

impl KeySettings {
    pub fn credentials(&self, purpose: &'static str) -> Result<RsaCredentials, CredentialError> {
        RsaCredentials::from_base64(purpose, &self.private_key, &self.public_key, self.ttl)
    }
}

impl std::fmt::Debug for KeySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySettings")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub access_token: KeySettings,
    pub refresh_token: KeySettings,
    pub bcrypt_cost: u32,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            access_token: KeySettings {
                private_key: required("ACCESS_TOKEN_PRIVATE_KEY")?,
                public_key: required("ACCESS_TOKEN_PUBLIC_KEY")?,
                ttl: Duration::from_secs(parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", 15 * 60)?),
            },
            refresh_token: KeySettings {
                private_key: required("REFRESH_TOKEN_PRIVATE_KEY")?,
                public_key: required("REFRESH_TOKEN_PUBLIC_KEY")?,
                ttl: Duration::from_secs(parse_or(
                    &lookup,
                    "REFRESH_TOKEN_TTL_SECS",
                    7 * 24 * 60 * 60,
                )?),
            },
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", 10)?,
            request_timeout: Duration::from_millis(parse_or(&lookup, "REQUEST_TIMEOUT_MS", 150)?),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
