//! Bounded edit-distance substring alignment
//!
//! A single dynamic-programming pass aligns a gazetteer key against every
//! substring of a text: the start of the alignment is free, so row `i`
//! holds the best distance of the key's first `i` characters ending at
//! each text position. The final row answers both questions the scanner
//! asks, the coarse partial-ratio score and the qualifying occurrences.
//!
//! Texts and keys are cleaned to ASCII upstream, so the DP runs on bytes.

/// One qualifying occurrence of a key inside a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub start: usize,
    pub end: usize,
    pub dist: u32,
}

/// Final DP row of a key aligned against all substrings of a text.
#[derive(Debug)]
pub struct SubstringAlignment {
    key_len: usize,
    /// Best distance of the full key against a substring ending at `j`.
    end_dists: Vec<u32>,
    /// Start offset of the alignment behind `end_dists[j]`.
    end_starts: Vec<usize>,
}

/// Align `key` against every substring of `text`.
///
/// Uses two rows instead of a full matrix; on distance ties the shorter
/// match (larger start) wins, so exact hits are not padded with
/// neighboring characters.
pub fn align_substring(key: &[u8], text: &[u8]) -> SubstringAlignment {
    let m = key.len();
    let n = text.len();

    // Row 0: an empty key matches the empty substring at any position.
    let mut prev_dist: Vec<u32> = vec![0; n + 1];
    let mut prev_start: Vec<usize> = (0..=n).collect();
    let mut curr_dist: Vec<u32> = vec![0; n + 1];
    let mut curr_start: Vec<usize> = vec![0; n + 1];

    for i in 1..=m {
        curr_dist[0] = i as u32;
        curr_start[0] = 0;
        for j in 1..=n {
            let cost = u32::from(key[i - 1] != text[j - 1]);

            // substitution or match
            let mut dist = prev_dist[j - 1] + cost;
            let mut start = prev_start[j - 1];

            // key character unmatched (deletion)
            let deletion = prev_dist[j] + 1;
            if deletion < dist || (deletion == dist && prev_start[j] > start) {
                dist = deletion;
                start = prev_start[j];
            }

            // extra text character (insertion)
            let insertion = curr_dist[j - 1] + 1;
            if insertion < dist || (insertion == dist && curr_start[j - 1] > start) {
                dist = insertion;
                start = curr_start[j - 1];
            }

            curr_dist[j] = dist;
            curr_start[j] = start;
        }
        std::mem::swap(&mut prev_dist, &mut curr_dist);
        std::mem::swap(&mut prev_start, &mut curr_start);
    }

    SubstringAlignment {
        key_len: m,
        end_dists: prev_dist,
        end_starts: prev_start,
    }
}

impl SubstringAlignment {
    /// Smallest distance over all end positions.
    pub fn best_distance(&self) -> u32 {
        self.end_dists.iter().copied().min().unwrap_or(0)
    }

    /// Score in [0, 100]: share of the key surviving in its best-aligned
    /// substring. An empty key scores 100.
    pub fn partial_ratio(&self) -> f64 {
        if self.key_len == 0 {
            return 100.0;
        }
        let best = self.best_distance().min(self.key_len as u32);
        100.0 * (1.0 - f64::from(best) / self.key_len as f64)
    }

    /// All non-redundant occurrences within `max_dist`.
    ///
    /// Neighboring end positions qualify around every real hit; each
    /// maximal run of qualifying ends contributes one occurrence, the
    /// smallest distance, extending to the latest end on ties so a
    /// substituted final character stays inside the span.
    pub fn occurrences(&self, max_dist: u32) -> Vec<Occurrence> {
        let mut found = Vec::new();
        let mut run_best: Option<(u32, usize)> = None;
        for (end, &dist) in self.end_dists.iter().enumerate() {
            if dist <= max_dist {
                match run_best {
                    Some((best, _)) if best < dist => {}
                    _ => run_best = Some((dist, end)),
                }
            } else if let Some((dist, end)) = run_best.take() {
                found.push(Occurrence {
                    start: self.end_starts[end],
                    end,
                    dist,
                });
            }
        }
        if let Some((dist, end)) = run_best {
            found.push(Occurrence {
                start: self.end_starts[end],
                end,
                dist,
            });
        }
        found
    }
}

/// Count occurrences of each byte value in `text`.
pub fn byte_counts(text: &[u8]) -> [u32; 256] {
    let mut counts = [0u32; 256];
    for &b in text {
        counts[b as usize] += 1;
    }
    counts
}

/// Lower bound on the substring distance of `key` against any part of the
/// counted text: key characters missing from the text, with multiplicity,
/// each cost at least one edit.
pub fn missing_chars(key: &[u8], text_counts: &[u32; 256]) -> u32 {
    let mut key_counts = [0u32; 256];
    for &b in key {
        key_counts[b as usize] += 1;
    }
    let mut missing = 0;
    for c in 0..256 {
        missing += key_counts[c].saturating_sub(text_counts[c]);
    }
    missing
}
