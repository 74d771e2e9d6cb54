//! Client configuration.
//!
//! [`ClientConfig`] is loaded from `config/config.toml` (section `[client]`)
//! or from `CRMDESK__CLIENT__*` environment variables using
//! `ClientConfig::load()`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "CRMDESK";

/// Which [`DataSource`](crate::source::DataSource) the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    /// The remote HTTP backend.
    #[default]
    Live,
    /// Built-in fixture records, no network access.
    Fixture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub data_source: DataSourceKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            data_source: DataSourceKind::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/crm-backend/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    5
}

impl ClientConfig {
    /// Load the client configuration from `config/config.toml`, falling back to env vars.
    ///
    /// A missing `[client]` section is not an error; every field has a default.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // The file exists but could not be parsed: keep going with env only
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!(
                        "failed to load {}, falling back to environment: {}",
                        CONFIG_FILE,
                        err
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        match settings.get::<ClientConfig>("client") {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound(_)) => Ok(ClientConfig::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Client configuration could not be loaded from file or environment: {}",
                e
            ))),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Absolute URL for an entity-relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
