//! # Application Configuration
//!
//! This module defines the configuration structure for the `catalog-chat-server`
//! and the logic for loading it from a YAML file and environment variables.

use catalog_chat::{
    constants::DEFAULT_CATALOG_FUNCTION, PageChrome, QueryMode, SnowflakeConfig,
};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Which SQL function answers questions and how questions are passed to it.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Connection settings for the Snowflake SQL API.
    #[serde(default)]
    pub snowflake: SnowflakeConfig,
    /// How long idle chat sessions are kept.
    #[serde(default)]
    pub sessions: SessionConfig,
    /// Static text shown around the chat.
    #[serde(default)]
    pub page: PageChrome,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    9090
}

fn default_function() -> String {
    DEFAULT_CATALOG_FUNCTION.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_function")]
    pub function: String,
    #[serde(default)]
    pub mode: QueryMode,
    /// Run `SELECT 1` against the warehouse before accepting connections.
    #[serde(default)]
    pub check_on_startup: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            function: default_function(),
            mode: QueryMode::default(),
            check_on_startup: false,
        }
    }
}

fn default_idle_timeout_secs() -> u64 {
    30 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Sessions unused for this long are ended. 0 keeps them until deleted.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// - `config.yml` next to this crate is used when present, otherwise the shipped
///   `config.default.yml`. An explicit path overrides both.
/// - `${VAR}` references in the file are replaced with environment values.
/// - Top-level keys like `port` are overridden by `PORT`.
/// - Nested keys are overridden by `CATALOG_CHAT_...` variables
///   (e.g., `CATALOG_CHAT_SNOWFLAKE__WAREHOUSE`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");

    let main_config_path = if let Some(override_path) = config_path_override {
        override_path.to_string()
    } else {
        let user_config_path = format!("{base_path}/config.yml");
        if std::path::Path::new(&user_config_path).exists() {
            info!("Loading user-defined configuration from '{user_config_path}'.");
            user_config_path
        } else {
            let fallback_path = format!("{base_path}/config.default.yml");
            info!("'{user_config_path}' not found. Falling back to '{fallback_path}'.");
            fallback_path
        }
    };

    let main_content = read_and_substitute(&main_config_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Main config file not found at '{main_config_path}'. Please create 'config.yml' or keep 'config.default.yml' next to the server crate."
        ))
    })?;

    let settings = ConfigBuilder::builder()
        .add_source(File::from_str(&main_content, FileFormat::Yaml))
        // Load environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Load prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("CATALOG_CHAT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
