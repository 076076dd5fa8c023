//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, MatcherConfig, PipelineConfig, PostProcessConfig};

/// Runtime environment enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Batch processing and I/O paths
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Fuzzy scanner tuning
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Flagging, scoring, and combination tuning
    #[serde(default)]
    pub postprocess: PostProcessConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_pipeline()?;
        self.validate_matcher()?;
        self.validate_postprocess()?;
        Ok(())
    }

    fn validate_pipeline(&self) -> Result<(), ConfigError> {
        if self.pipeline.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.batch_size".to_string(),
                message: "Batch size must be at least 1".to_string(),
            });
        }

        if self.pipeline.max_text_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_text_length".to_string(),
                message: "Maximum text length must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_matcher(&self) -> Result<(), ConfigError> {
        let matcher = &self.matcher;

        if !(0.0..=100.0).contains(&matcher.score_cutoff) {
            return Err(ConfigError::InvalidValue {
                field: "matcher.score_cutoff".to_string(),
                message: format!("Must be between 0 and 100, got {}", matcher.score_cutoff),
            });
        }

        if matcher.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "matcher.workers".to_string(),
                message: "Worker count must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    fn validate_postprocess(&self) -> Result<(), ConfigError> {
        let pp = &self.postprocess;

        for (field, value) in [
            ("postprocess.minimal_final_score_country", pp.minimal_final_score_country),
            ("postprocess.minimal_final_score_town", pp.minimal_final_score_town),
            ("postprocess.base_score_suggested_country", pp.base_score_suggested_country),
            ("postprocess.street_overlap_ratio", pp.street_overlap_ratio),
            ("postprocess.tagger_country_min_confidence", pp.tagger_country_min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 1.0, got {value}"),
                });
            }
        }

        if pp.no_town_found_mul < 0.0 || pp.no_country_found_mul < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "postprocess.no_town_found_mul".to_string(),
                message: "Missing-entry multipliers must be non-negative".to_string(),
            });
        }

        if pp.small_town_population > pp.metropolis_population {
            return Err(ConfigError::InvalidValue {
                field: "postprocess.small_town_population".to_string(),
                message: format!(
                    "Small-town threshold {} exceeds metropolis threshold {}",
                    pp.small_town_population, pp.metropolis_population
                ),
            });
        }

        if pp.iban_pattern.is_empty() {
            return Err(ConfigError::MissingField(
                "postprocess.iban_pattern".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (ADDRESS_ENGINE_ prefix)
/// 2. config/{env}.toml (if env specified)
/// 3. config/default.toml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("ADDRESS_ENGINE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    // Validate
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.pipeline.batch_size, 1024);
        assert_eq!(settings.pipeline.max_text_length, 224);
        assert_eq!(settings.matcher.score_cutoff, 80.0);
        assert_eq!(settings.matcher.tolerance, 1);
        assert_eq!(settings.postprocess.minimal_final_score_town, 0.15);
        assert!(settings.postprocess.show_inferred_country);
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        settings.pipeline.batch_size = 0;
        assert!(settings.validate().is_err());

        settings.pipeline.batch_size = 64;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_matcher_validation_score_cutoff() {
        let mut settings = Settings::default();

        settings.matcher.score_cutoff = 80.0;
        assert!(settings.validate_matcher().is_ok());

        settings.matcher.score_cutoff = 150.0;
        assert!(settings.validate_matcher().is_err());

        settings.matcher.score_cutoff = -1.0;
        assert!(settings.validate_matcher().is_err());
    }

    #[test]
    fn test_matcher_validation_workers() {
        let mut settings = Settings::default();
        settings.matcher.workers = 0;
        assert!(settings.validate_matcher().is_err());
    }

    #[test]
    fn test_postprocess_validation_ranges() {
        let mut settings = Settings::default();

        settings.postprocess.street_overlap_ratio = 1.5;
        assert!(settings.validate_postprocess().is_err());
        settings.postprocess.street_overlap_ratio = 0.5;

        settings.postprocess.minimal_final_score_country = -0.2;
        assert!(settings.validate_postprocess().is_err());
        settings.postprocess.minimal_final_score_country = 0.15;

        settings.postprocess.small_town_population = 2_000_000;
        assert!(settings.validate_postprocess().is_err());
        settings.postprocess.small_town_population = 12_000;

        assert!(settings.validate_postprocess().is_ok());
    }

    #[test]
    fn test_postprocess_validation_iban_pattern() {
        let mut settings = Settings::default();
        settings.postprocess.iban_pattern = String::new();
        assert!(settings.validate_postprocess().is_err());
    }
}
