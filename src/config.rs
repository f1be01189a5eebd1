//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct,
//! which is built once at startup and handed to the service explicitly.

use serde::Deserialize;

use crate::error::AppError;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `ADMIN_KEY` (required): secret granting key-management access
/// - `CHANNEL` (required): default channel for relayed messages
/// - `RELAY_URL` (required): endpoint of the chat transport
/// - `RELAY_TOKEN` (optional): bearer token and signing key for the relay
/// - `ALLOWED_CHANNELS` (optional): comma-separated allow-list, or `*`
/// - `WEB_PATH_PREFIX` (optional): webhook mount point, defaults to `webhook`
/// - `DB_PATH` (optional): SQLite file for the key store, defaults to `/data/db`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DEBUG` (optional): enables debug logging
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub admin_key: String,

    pub channel: String,

    pub relay_url: String,

    #[serde(default)]
    pub relay_token: String,

    #[serde(default)]
    pub allowed_channels: String,

    #[serde(default = "default_prefix")]
    pub web_path_prefix: String,

    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub debug: bool,
}

fn default_prefix() -> String {
    "webhook".to_string()
}

fn default_db_path() -> String {
    "/data/db".to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., ADMIN_KEY)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Build a configuration from explicit key/value pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }

    /// Reject settings the service cannot run with.
    ///
    /// An empty admin key would let any request carrying an empty
    /// `x-api-key` header manage keys, so it is refused outright.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.admin_key.is_empty() {
            return Err(AppError::InvalidConfig("ADMIN_KEY must not be empty".to_string()));
        }
        if self.channel.trim().is_empty() {
            return Err(AppError::InvalidConfig("CHANNEL must not be empty".to_string()));
        }
        if self.web_path_prefix.trim_matches('/').is_empty() {
            return Err(AppError::InvalidConfig(
                "WEB_PATH_PREFIX must not be empty".to_string(),
            ));
        }
        if self.web_path_prefix.contains(['{', '}', '*']) {
            return Err(AppError::InvalidConfig(format!(
                "WEB_PATH_PREFIX must not contain route pattern characters: {}",
                self.web_path_prefix
            )));
        }
        validate_relay_url(&self.relay_url)
    }

    /// Mount point without surrounding slashes, as the router expects it.
    pub fn path_prefix(&self) -> String {
        self.web_path_prefix.trim_matches('/').to_lowercase()
    }
}

/// The relay must be reachable over HTTP or HTTPS.
fn validate_relay_url(url: &str) -> Result<(), AppError> {
    let parsed = url::Url::parse(url)
        .map_err(|_| AppError::InvalidConfig(format!("RELAY_URL is not a valid URL: {url}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::InvalidConfig(format!(
            "RELAY_URL must use http or https, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            ("ADMIN_KEY".to_string(), "admin-secret".to_string()),
            ("CHANNEL".to_string(), "#general".to_string()),
            ("RELAY_URL".to_string(), "http://localhost:8001/messages".to_string()),
        ];
        for (k, v) in extra {
            vars.retain(|(key, _)| key != k);
            vars.push((k.to_string(), v.to_string()));
        }
        vars
    }

    #[test]
    fn defaults_are_applied() {
        let config = Config::from_pairs(pairs(&[])).unwrap();

        assert_eq!(config.web_path_prefix, "webhook");
        assert_eq!(config.db_path, "/data/db");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.allowed_channels, "");
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_admin_key_fails_to_load() {
        let vars = pairs(&[])
            .into_iter()
            .filter(|(k, _)| k != "ADMIN_KEY")
            .collect::<Vec<_>>();

        assert!(Config::from_pairs(vars).is_err());
    }

    #[test]
    fn empty_admin_key_is_rejected() {
        let config = Config::from_pairs(pairs(&[("ADMIN_KEY", "")])).unwrap();

        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn relay_url_must_be_http() {
        let config = Config::from_pairs(pairs(&[("RELAY_URL", "ftp://relay")])).unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_pairs(pairs(&[("RELAY_URL", "not a url")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn path_prefix_is_normalised() {
        let config = Config::from_pairs(pairs(&[("WEB_PATH_PREFIX", "/Hooks/")])).unwrap();

        assert_eq!(config.path_prefix(), "hooks");
    }

    #[test]
    fn path_prefix_with_route_pattern_is_rejected() {
        for prefix in ["hooks/{id}x", "hooks/*", "{hook", "hook}"] {
            let config = Config::from_pairs(pairs(&[("WEB_PATH_PREFIX", prefix)])).unwrap();

            assert!(
                matches!(config.validate(), Err(AppError::InvalidConfig(_))),
                "{prefix} should be rejected"
            );
        }

        let config = Config::from_pairs(pairs(&[("WEB_PATH_PREFIX", "hooks/v1")])).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_flag_parses() {
        let config = Config::from_pairs(pairs(&[("DEBUG", "true")])).unwrap();

        assert!(config.debug);
    }
}
