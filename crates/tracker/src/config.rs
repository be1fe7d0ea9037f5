//! Configuration management for the tracker.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use agni_common::constants::{DEFAULT_INTAKE_URL, DEFAULT_PREDICT_URL};

/// Tracker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Verification intake endpoint
    #[serde(default = "default_intake_url")]
    pub intake_url: String,

    /// Classifier endpoint
    #[serde(default = "default_predict_url")]
    pub predict_url: String,

    /// Transport timeout for each request (none by default)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Prompt set override; empty means the built-in prompts
    #[serde(default)]
    pub prompts: Vec<String>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub intake_url: Option<String>,
    pub predict_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

fn default_intake_url() -> String { DEFAULT_INTAKE_URL.to_string() }
fn default_predict_url() -> String { DEFAULT_PREDICT_URL.to_string() }

impl TrackerConfig {
    /// Load configuration from file, with overrides applied on top
    pub fn load(config_path: &str, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Self::default()
        };

        if let Some(ref url) = overrides.intake_url {
            config.intake_url = url.clone();
        }
        if let Some(ref url) = overrides.predict_url {
            config.predict_url = url.clone();
        }
        if overrides.request_timeout_secs.is_some() {
            config.request_timeout_secs = overrides.request_timeout_secs;
        }

        Ok(config)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            intake_url: default_intake_url(),
            predict_url: default_predict_url(),
            request_timeout_secs: None,
            prompts: Vec::new(),
        }
    }
}
