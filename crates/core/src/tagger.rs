//! Output types of the external sequence tagger
//!
//! The tagger itself is an external collaborator; the engine only consumes
//! its per-text output: labeled spans, an optional whole-text country
//! prediction, and per-character probability/emission arrays for the country
//! and town label classes.

use serde::{Deserialize, Serialize};

/// Label classes predicted by the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    Country,
    Town,
    Street,
    PostalCode,
    Other,
}

/// Half-open labeled span over the cleaned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSpan {
    pub start: usize,
    pub end: usize,
    pub tag: Tag,
}

/// One tagger span prediction with its confidence and covered text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanPrediction {
    pub span: TaggedSpan,
    pub confidence: f64,
    pub text: String,
}

/// Everything the tagger reports for one text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaggerOutput {
    #[serde(default)]
    pub spans: Vec<SpanPrediction>,
    /// Whole-text predicted origin code, if the tagger emits one.
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_code_confidence: f64,
    /// Per-character probability of the country class, sized to the text.
    #[serde(default)]
    pub country_probabilities: Vec<f64>,
    #[serde(default)]
    pub country_emissions: Vec<f64>,
    /// Per-character probability of the town class, sized to the text.
    #[serde(default)]
    pub town_probabilities: Vec<f64>,
    #[serde(default)]
    pub town_emissions: Vec<f64>,
}

impl TaggerOutput {
    /// Span predictions carrying the given tag.
    pub fn spans_with_tag(&self, tag: Tag) -> impl Iterator<Item = &SpanPrediction> {
        self.spans.iter().filter(move |p| p.span.tag == tag)
    }

    /// Whole-text country prediction, gated on a minimum confidence.
    pub fn country_head(&self, min_confidence: f64) -> Option<&str> {
        if self.country_code_confidence >= min_confidence {
            self.country_code.as_deref()
        } else {
            None
        }
    }
}
