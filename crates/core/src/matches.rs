//! Candidate match types produced and consumed by the engine

use crate::flags::{Flag, FlagSet};
use serde::{Deserialize, Serialize};

/// Origin of the sentinel country match.
pub const NO_COUNTRY: &str = "NO COUNTRY";
/// Possibility of the sentinel town match.
pub const NO_TOWN: &str = "NO TOWN";

/// A single fuzzy, exact, or synthetic hit against the gazetteer.
///
/// Spans are half-open byte offsets into the cleaned source text; cleaning
/// guarantees ASCII, so byte and character offsets coincide. Created by the
/// fuzzy or postcode matchers (or synthetically by the runner), mutated in
/// place by the flagging engine and score computer, consumed by the
/// combination generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub start: usize,
    pub end: usize,
    pub matched_text: String,
    /// Canonical gazetteer key this hit was searched for.
    pub possibility: String,
    /// Newline-adjusted edit distance between `matched_text` and `possibility`.
    pub edit_distance: u32,
    /// Resolved entity code; empty while a town is pending country resolution.
    pub origin: String,
    #[serde(default)]
    pub flags: FlagSet,
    /// Mean of the tagger's per-character probability over the span.
    #[serde(default)]
    pub tagger_confidence: f64,
    /// Mean of the tagger's per-character emission over the span.
    #[serde(default)]
    pub tagger_emission: f64,
    /// Calibrated probability, set by the score computer before combination
    /// generation.
    #[serde(default)]
    pub final_score: Option<f64>,
}

impl CandidateMatch {
    pub fn new(
        start: usize,
        end: usize,
        matched_text: impl Into<String>,
        possibility: impl Into<String>,
        edit_distance: u32,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            matched_text: matched_text.into(),
            possibility: possibility.into(),
            edit_distance,
            origin: origin.into(),
            flags: FlagSet::empty(),
            tagger_confidence: 0.0,
            tagger_emission: 0.0,
            final_score: None,
        }
    }

    /// Synthetic match injected for a suggested country. Placed past the end
    /// of the text so it can never overlap or sit close to a real match.
    pub fn suggested(origin: impl Into<String>, text_len: usize, confidence: f64) -> Self {
        let origin = origin.into();
        let mut m = Self::new(text_len + 2, text_len + 2, "", origin.clone(), 0, origin);
        m.tagger_confidence = confidence;
        m.flags.insert(Flag::GeneratedBySuggestedCountry);
        m
    }

    /// Sentinel for "no country found" with the configured baseline score.
    pub fn no_country(minimal_score: f64) -> Self {
        let mut m = Self::new(0, 0, "", NO_COUNTRY, 0, NO_COUNTRY);
        m.final_score = Some(minimal_score);
        m
    }

    /// Sentinel for "no town found" with the configured baseline score.
    pub fn no_town(minimal_score: f64) -> Self {
        let mut m = Self::new(0, 0, "", NO_TOWN, 0, "");
        m.final_score = Some(minimal_score);
        m
    }

    /// Span length in characters.
    pub fn span_len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Final score, defaulting to 0.0 when scoring has not run yet.
    pub fn score(&self) -> f64 {
        self.final_score.unwrap_or(0.0)
    }

    /// True for the synthetic suggested-country match.
    pub fn is_generated(&self) -> bool {
        self.flags.contains(Flag::GeneratedBySuggestedCountry)
    }
}

/// An exact postcode hit resolved through the postcode tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcodeMatch {
    pub start: usize,
    pub end: usize,
    pub matched_text: String,
    /// Town alias registered for the postcode.
    pub possibility: String,
    pub origin: String,
}

/// A ranked (country, town) pairing with its combined score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationCandidate {
    pub country: CandidateMatch,
    pub town: CandidateMatch,
    pub score: f64,
}

impl CombinationCandidate {
    pub fn new(country: CandidateMatch, town: CandidateMatch, score: f64) -> Self {
        Self {
            country,
            town,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        let country = CandidateMatch::no_country(0.15);
        assert_eq!(country.origin, NO_COUNTRY);
        assert_eq!(country.possibility, NO_COUNTRY);
        assert_eq!(country.final_score, Some(0.15));

        let town = CandidateMatch::no_town(0.15);
        assert_eq!(town.origin, "");
        assert_eq!(town.possibility, NO_TOWN);
        assert_eq!(town.final_score, Some(0.15));
    }

    #[test]
    fn test_suggested_match_sits_past_text_end() {
        let m = CandidateMatch::suggested("DE", 40, 0.95);
        assert_eq!(m.start, 42);
        assert_eq!(m.end, 42);
        assert_eq!(m.origin, "DE");
        assert_eq!(m.possibility, "DE");
        assert!(m.is_generated());
        assert_eq!(m.tagger_confidence, 0.95);
    }

    #[test]
    fn test_span_len() {
        let m = CandidateMatch::new(3, 8, "PARIS", "PARIS", 0, "FR");
        assert_eq!(m.span_len(), 5);
    }
}
