//! Tagger span-mean scoring
//!
//! The external tagger delivers per-character probability and emission
//! arrays sized to the cleaned text. Each candidate gets the mean of both
//! arrays over its span; spans that are empty or fall outside the arrays
//! (the synthetic suggested-country match sits past the text end) score
//! 0.0 rather than NaN.

use address_engine_core::CandidateMatch;

/// Mean of `values[start..end]` with the span clamped to the array.
fn span_mean(values: &[f64], start: usize, end: usize) -> f64 {
    let start = start.min(values.len());
    let end = end.min(values.len());
    if start >= end {
        return 0.0;
    }
    let span = &values[start..end];
    span.iter().sum::<f64>() / span.len() as f64
}

/// Assign tagger confidence and emission means to every match.
pub fn apply_tagger_scores(
    matches: &mut [CandidateMatch],
    probabilities: &[f64],
    emissions: &[f64],
) {
    for m in matches {
        m.tagger_confidence = span_mean(probabilities, m.start, m.end);
        m.tagger_emission = span_mean(emissions, m.start, m.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_mean_over_range() {
        let probs = vec![0.2, 0.4, 0.6, 0.8];
        assert!((span_mean(&probs, 1, 3) - 0.5).abs() < 1e-12);
        assert!((span_mean(&probs, 0, 4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_out_of_range_spans() {
        let probs = vec![0.5, 0.5];
        assert_eq!(span_mean(&probs, 1, 1), 0.0);
        assert_eq!(span_mean(&probs, 4, 6), 0.0);
        assert_eq!(span_mean(&[], 0, 3), 0.0);
    }

    #[test]
    fn test_apply_sets_both_scores() {
        let mut matches = vec![CandidateMatch::new(0, 2, "AB", "AB", 0, "FR")];
        apply_tagger_scores(&mut matches, &[0.8, 0.6, 0.1], &[0.4, 0.2, 0.9]);
        assert!((matches[0].tagger_confidence - 0.7).abs() < 1e-12);
        assert!((matches[0].tagger_emission - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_synthetic_match_past_text_end_scores_zero() {
        let mut matches = vec![CandidateMatch::suggested("DE", 3, 0.95)];
        let confidence_before = matches[0].tagger_confidence;
        assert_eq!(confidence_before, 0.95);
        apply_tagger_scores(&mut matches, &[0.5, 0.5, 0.5], &[0.5, 0.5, 0.5]);
        assert_eq!(matches[0].tagger_confidence, 0.0);
    }
}
