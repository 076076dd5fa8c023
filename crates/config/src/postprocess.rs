//! Post-processing configuration

use serde::{Deserialize, Serialize};

use crate::weights::{CountryWeights, TownWeights};

/// Configuration for the flagging, scoring, and combination stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostProcessConfig {
    /// Matches scoring below this are dropped before combinations are
    /// generated. The same value doubles as the sentinel score baseline.
    #[serde(default = "default_minimal_final_score")]
    pub minimal_final_score_country: f64,

    #[serde(default = "default_minimal_final_score")]
    pub minimal_final_score_town: f64,

    /// IBAN shape scanned over the raw text. Matches are re-scanned from
    /// one past each hit's start so overlapping candidates are all seen.
    #[serde(default = "default_iban_pattern")]
    pub iban_pattern: String,

    /// Confidence floor assigned to an injected suggested-country match
    /// when the tagger itself has no stronger opinion.
    #[serde(default = "default_base_score_suggested_country")]
    pub base_score_suggested_country: f64,

    /// Countries whose addresses routinely carry province abbreviations.
    /// Province-alias hits for these origins get the milder penalty.
    #[serde(default = "default_countries_with_common_provinces")]
    pub countries_with_common_provinces: Vec<String>,

    /// Population at or above which a town counts as a metropolis.
    #[serde(default = "default_metropolis_population")]
    pub metropolis_population: u64,

    /// Population at or below which a town counts as small.
    #[serde(default = "default_small_town_population")]
    pub small_town_population: u64,

    /// Fraction of a match that must lie inside tagger street spans before
    /// it counts as part of the street.
    #[serde(default = "default_street_overlap_ratio")]
    pub street_overlap_ratio: f64,

    /// Report the injected suggested country in outputs even when it was
    /// never literally present in the text.
    #[serde(default = "default_true")]
    pub show_inferred_country: bool,

    /// Scale on the penalty charged to a country combined with the
    /// no-town sentinel.
    #[serde(default = "default_no_town_found_mul")]
    pub no_town_found_mul: f64,

    /// Scale on the penalty charged to a town combined with the
    /// no-country sentinel. Much harsher than the town case.
    #[serde(default = "default_no_country_found_mul")]
    pub no_country_found_mul: f64,

    /// Minimum whole-text confidence before the tagger's own predicted
    /// country code participates in flagging.
    #[serde(default = "default_tagger_country_min_confidence")]
    pub tagger_country_min_confidence: f64,

    #[serde(default)]
    pub town_weights: TownWeights,

    #[serde(default)]
    pub country_weights: CountryWeights,
}

fn default_minimal_final_score() -> f64 {
    0.15
}

fn default_iban_pattern() -> String {
    r"[A-Z]{2}\d{2}(?:[ ]?[A-Z0-9]{4}){1,7}".to_string()
}

fn default_base_score_suggested_country() -> f64 {
    0.95
}

fn default_countries_with_common_provinces() -> Vec<String> {
    vec!["CN".to_string(), "US".to_string()]
}

fn default_metropolis_population() -> u64 {
    1_000_000
}

fn default_small_town_population() -> u64 {
    12_000
}

fn default_street_overlap_ratio() -> f64 {
    0.50
}

fn default_true() -> bool {
    true
}

fn default_no_town_found_mul() -> f64 {
    0.7
}

fn default_no_country_found_mul() -> f64 {
    0.1
}

fn default_tagger_country_min_confidence() -> f64 {
    0.0099
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            minimal_final_score_country: default_minimal_final_score(),
            minimal_final_score_town: default_minimal_final_score(),
            iban_pattern: default_iban_pattern(),
            base_score_suggested_country: default_base_score_suggested_country(),
            countries_with_common_provinces: default_countries_with_common_provinces(),
            metropolis_population: default_metropolis_population(),
            small_town_population: default_small_town_population(),
            street_overlap_ratio: default_street_overlap_ratio(),
            show_inferred_country: default_true(),
            no_town_found_mul: default_no_town_found_mul(),
            no_country_found_mul: default_no_country_found_mul(),
            tagger_country_min_confidence: default_tagger_country_min_confidence(),
            town_weights: TownWeights::default(),
            country_weights: CountryWeights::default(),
        }
    }
}
