//! Configuration management for the address engine
//!
//! Supports loading configuration from:
//! - TOML files (config/default.toml, config/{env}.toml)
//! - Environment variables (ADDRESS_ENGINE_ prefix)
//!
//! All tunables live here so the processing crates can stay free of
//! hardcoded numbers. Configs are plain data: build them once at startup,
//! validate, then pass by reference into the engine.

pub mod constants;
pub mod matcher;
pub mod pipeline;
pub mod postprocess;
pub mod settings;
pub mod weights;

pub use matcher::MatcherConfig;
pub use pipeline::PipelineConfig;
pub use postprocess::PostProcessConfig;
pub use settings::{load_settings, ObservabilityConfig, RuntimeEnvironment, Settings};
pub use weights::{CountryWeights, TownWeights};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
