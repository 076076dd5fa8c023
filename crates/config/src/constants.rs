//! Centralized constants for the address engine
//!
//! Single source of truth for the numeric anchors of the scoring and
//! matching passes. Tunables that operators may want to change live in the
//! config structs instead; these values are part of the algorithm itself.

/// Score computation constants
pub mod scoring {
    /// Probabilities are clamped to [EPSILON, 1 - EPSILON] before the
    /// log-odds conversion so extreme tagger outputs cannot produce
    /// infinities.
    pub const PROBABILITY_EPSILON: f64 = 1e-6;

    /// Cap on how much the tagger probability alone can move the log-odds.
    /// The amortized probability is clamped to
    /// [1 - TAGGER_MAX_CONTRIBUTION, TAGGER_MAX_CONTRIBUTION].
    pub const TAGGER_MAX_CONTRIBUTION: f64 = 0.9;

    /// Flag-weight multiplier band. At tagger confidence 0.0 bonuses are
    /// scaled by MAX_MULTIPLIER and maluses by MIN_MULTIPLIER; at
    /// confidence 1.0 the roles swap. Confident tagger output therefore
    /// dampens bonuses and amplifies maluses.
    pub const MIN_MULTIPLIER: f64 = 2.5;
    pub const MAX_MULTIPLIER: f64 = 4.0;
}

/// Fuzzy matching constants
pub mod matching {
    /// Keys at or below this length must match exactly, whatever the
    /// configured tolerance.
    pub const SHORT_KEY_MAX_LEN: usize = 2;

    /// Coarse partial-ratio cutoff on a 0-100 scale.
    pub const DEFAULT_SCORE_CUTOFF: f64 = 80.0;

    /// Edit-distance tolerance for keys longer than SHORT_KEY_MAX_LEN.
    pub const DEFAULT_TOLERANCE: u32 = 1;
}

/// Positional constants used by the flagging passes
pub mod proximity {
    /// Two matches separated by at most this many characters count as
    /// very close to each other.
    pub const VERY_CLOSE_GAP: usize = 15;

    /// Matches whose span is at or below this length are flagged short.
    pub const SHORT_SPAN_LEN: usize = 2;
}

/// Pipeline limits
pub mod pipeline {
    /// Hard cap on cleaned-text length; longer inputs are rejected before
    /// any matching runs.
    pub const MAX_TEXT_LENGTH: usize = 224;

    /// Default number of samples per processing batch.
    pub const DEFAULT_BATCH_SIZE: usize = 1024;
}
