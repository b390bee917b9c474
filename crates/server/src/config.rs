//! Server configuration

use anyhow::Result;
use serde::Deserialize;

/// Prediction server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the published model artifact
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Directory holding session telemetry archives
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_port() -> u16 {
    8080
}

fn default_model_path() -> String {
    "models/laptime_model.json".to_string()
}

fn default_data_dir() -> String {
    "data/sessions".to_string()
}

impl ServerConfig {
    /// Load configuration from PITWALL_* environment variables.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PITWALL"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ServerConfig {
            port: default_port(),
            model_path: default_model_path(),
            data_dir: default_data_dir(),
        }))
    }
}
