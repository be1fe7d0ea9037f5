//! Configuration management for the intake service.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use agni_common::constants::{DEFAULT_LISTEN_ADDR, DEFAULT_LOG_PATH, DEFAULT_NONCE_TTL_SECS};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Redis URL for the shared nonce store; in-memory when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// How long Redis remembers a claimed nonce
    #[serde(default = "default_nonce_ttl")]
    pub nonce_ttl_secs: u64,

    /// Behavior log file (JSON lines)
    #[serde(default = "default_log_path")]
    pub log_path: String,

    /// Allow cross-origin requests from any origin (browser widget)
    #[serde(default = "default_cors_allow_any")]
    pub cors_allow_any: bool,
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_nonce_ttl() -> u64 { DEFAULT_NONCE_TTL_SECS }
fn default_log_path() -> String { DEFAULT_LOG_PATH.to_string() }
fn default_cors_allow_any() -> bool { true }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref redis_url) = args.redis_url {
            config.redis_url = Some(redis_url.clone());
        }
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref log_path) = args.log_path {
            config.log_path = log_path.clone();
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            redis_url: None,
            nonce_ttl_secs: default_nonce_ttl(),
            log_path: default_log_path(),
            cors_allow_any: default_cors_allow_any(),
        }
    }
}
