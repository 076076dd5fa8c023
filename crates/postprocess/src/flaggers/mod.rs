//! Flagging engine
//!
//! Independent annotators that attach [`Flag`]s to candidate matches.
//! Each annotator looks at one kind of evidence (position, population,
//! containment, tagger agreement, cross-list proximity) and none of them
//! remove candidates; the score computer decides what the flags are worth.

pub mod country;
pub mod inclusion;
pub mod relationship;
pub mod town;

pub use country::CountryFlagger;
pub use inclusion::{flag_included_matches, snapshot, SpanSnapshot};
pub use relationship::{flag_reasonable_mistakes, flag_relationships};
pub use town::TownFlagger;

use address_engine_core::{CandidateMatch, Flag, Tag, TaggerOutput};

/// Drop the characters treated as interchangeable separators.
pub(crate) fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| *c != '-' && *c != ' ').collect()
}

/// An edit distance explained entirely by separator differences is a
/// spelling variant, not a typo.
pub(crate) fn add_separator_typo_flag(m: &mut CandidateMatch) {
    if m.edit_distance > 0
        && strip_separators(&m.matched_text) == strip_separators(&m.possibility)
    {
        m.flags.insert(Flag::SeparatorTypo);
    }
}

/// Flag matches lying mostly inside tagger street spans. Street names
/// borrow town and country names freely ("RUE DE LILLE"), so a match
/// swallowed by a street span is weak evidence. Expects spans sorted by
/// start position.
pub(crate) fn add_street_overlap_flag(m: &mut CandidateMatch, tagger: &TaggerOutput, min_ratio: f64) {
    let mut chars_in_street = 0usize;
    for prediction in &tagger.spans {
        if prediction.span.start > m.end {
            break;
        }
        if prediction.span.tag != Tag::Street {
            continue;
        }
        let overlap_start = prediction.span.start.max(m.start);
        let overlap_end = prediction.span.end.min(m.end);
        if overlap_start < overlap_end {
            chars_in_street += overlap_end - overlap_start;
        }
    }
    if chars_in_street > 0 && chars_in_street as f64 / m.span_len() as f64 >= min_ratio {
        m.flags.insert(Flag::InsideStreet);
    }
}
