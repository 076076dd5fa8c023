//! Containment flags between candidate matches
//!
//! A short hit sitting inside a longer one is usually an accident of the
//! alias tables: "IL" matches inside "CHILE", "ES" inside "NANTES". Which
//! side gets penalized depends on rank, and rank is list position, with
//! both lists already sorted by edit distance then tagger confidence. The
//! query list and the containing list need not be the same: country codes
//! are checked against the full country list after the main pass.

use address_engine_core::{CandidateMatch, Flag};

/// Position-independent copy of the fields the containment check needs,
/// taken before the query list is borrowed mutably.
#[derive(Debug, Clone, Copy)]
pub struct SpanSnapshot {
    pub start: usize,
    pub end: usize,
    pub edit_distance: u32,
}

impl From<&CandidateMatch> for SpanSnapshot {
    fn from(m: &CandidateMatch) -> Self {
        SpanSnapshot {
            start: m.start,
            end: m.end,
            edit_distance: m.edit_distance,
        }
    }
}

/// Snapshot a candidate list for use as the containing side.
pub fn snapshot(matches: &[CandidateMatch]) -> Vec<SpanSnapshot> {
    matches.iter().map(SpanSnapshot::from).collect()
}

/// Flag every query that another span strictly contains.
///
/// Containment requires one endpoint strictly inside the other span and
/// the other endpoint at or beyond it, so identical spans never contain
/// each other (and a list checked against its own snapshot never flags a
/// match for containing itself). A query at or above the container's rank
/// is inside a lower-ranked match, but only when the container is exact;
/// a query below the container's rank is inside a higher-ranked match.
pub fn flag_included_matches(queries: &mut [CandidateMatch], others: &[SpanSnapshot]) {
    for (query_rank, query) in queries.iter_mut().enumerate() {
        for (other_rank, other) in others.iter().enumerate() {
            let left_larger = other.start < query.start && other.end >= query.end;
            let right_larger = other.end > query.end && other.start <= query.start;
            if !(left_larger || right_larger) {
                continue;
            }
            if query_rank <= other_rank && other.edit_distance < 1 {
                query.flags.insert(Flag::InsideLowerRankedMatch);
            } else if query_rank > other_rank {
                query.flags.insert(Flag::InsideHigherRankedMatch);
            }
        }
    }
}
