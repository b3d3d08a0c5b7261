use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::info;
use url::Url;

use crate::error::ConfigError;
use crate::tmdb::{TmdbConfig, TMDB_BASE_URL};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub cache_enabled: bool,
    /// Mounts `DELETE /api/cache`.
    pub cache_admin_enabled: bool,
    pub tmdb: TmdbConfig,
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // TMBD_API_KEY is the name older deployments were set up with.
        let api_token = lookup("TMDB_API_KEY")
            .or_else(|| lookup("TMBD_API_KEY"))
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("TMDB_API_KEY"))?;

        let base_url = lookup("TMDB_BASE_URL").unwrap_or_else(|| TMDB_BASE_URL.to_string());
        if Url::parse(&base_url).is_err() {
            return Err(ConfigError::Invalid {
                key: "TMDB_BASE_URL",
                value: base_url,
            });
        }

        let timeout_secs: u64 = parse_or(&lookup, "TMDB_TIMEOUT_SECS", 30)?;
        let cache_enabled = match lookup("CATEGORY_CACHE_ENABLED") {
            Some(value) => parse_bool("CATEGORY_CACHE_ENABLED", &value)?,
            None => true,
        };
        let cache_admin_enabled = match lookup("CACHE_ADMIN_ENABLED") {
            Some(value) => parse_bool("CACHE_ADMIN_ENABLED", &value)?,
            None => false,
        };

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            cache_enabled,
            cache_admin_enabled,
            tmdb: TmdbConfig {
                api_token,
                base_url,
                language: lookup("TMDB_LANGUAGE").unwrap_or_else(|| "en-US".to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => {
            info!("{key} not set, using default");
            Ok(default)
        }
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}
