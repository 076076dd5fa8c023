//! Post-processing: flagging, scoring, and combination generation
//!
//! Features:
//! - Evidence flags on candidate matches (position, inclusion, population,
//!   typos, street overlap, tagger agreement, country-specific features)
//! - Cross-list town/country relationship and proximity flags
//! - Suggested-country handling with a synthetic fallback match
//! - Log-odds calibration of tagger confidence against flag weights
//! - Ranked country/town combinations with solo fallbacks and sentinels
//!
//! The entry point is [`PostProcessor::process`], which takes one cleaned
//! text with its tagger output and candidate lists and returns ranked
//! combinations. Stages run in a fixed order because later annotators read
//! flags earlier ones wrote.

pub mod combinations;
pub mod flaggers;
pub mod runner;
pub mod scoring;

pub use combinations::CombinationGenerator;
pub use flaggers::{
    flag_included_matches, flag_reasonable_mistakes, flag_relationships, snapshot, CountryFlagger,
    SpanSnapshot, TownFlagger,
};
pub use runner::{CandidateLists, PostProcessOutput, PostProcessor};
pub use scoring::ScoreComputer;
