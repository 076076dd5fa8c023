//! Batched fuzzy scanning of gazetteer alias tables
//!
//! The scanner runs two stages per (text, key) pair: a coarse
//! partial-ratio filter against the whole text, then a bounded
//! edit-distance substring search for the surviving keys. Batches are
//! data-parallel over texts; the per-call cutoff and tolerance default to
//! the configured values so the same scanner serves both tolerant name
//! scans and exact country-code scans.

use std::collections::HashMap;

use parking_lot::Mutex;
use rayon::prelude::*;
use regex::Regex;
use tracing::debug;

use address_engine_config::constants::matching::SHORT_KEY_MAX_LEN;
use address_engine_config::MatcherConfig;
use address_engine_core::{CandidateMatch, Error, Flag, Result};

use crate::similarity::{align_substring, byte_counts, missing_chars};

/// Counters accumulated across scans, drained for batch logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub texts: u64,
    pub keys_checked: u64,
    pub matches: u64,
}

/// Fuzzy matcher over alias tables.
pub struct FuzzyScanner {
    config: MatcherConfig,
    pool: rayon::ThreadPool,
    stats: Mutex<ScanStats>,
}

impl FuzzyScanner {
    /// Build a scanner with its own worker pool.
    pub fn new(config: MatcherConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("fuzzy-scan-{i}"))
            .build()
            .map_err(|e| Error::other(format!("failed to build scan pool: {e}")))?;
        Ok(FuzzyScanner {
            config,
            pool,
            stats: Mutex::new(ScanStats::default()),
        })
    }

    /// Scan a batch of texts with the configured cutoff and tolerance.
    /// One result list per text, input order preserved.
    pub fn scan_batch(
        &self,
        texts: &[String],
        keys: &HashMap<String, Vec<String>>,
    ) -> Vec<Vec<CandidateMatch>> {
        self.scan_batch_with(texts, keys, self.config.score_cutoff, self.config.tolerance)
    }

    /// Scan a batch with explicit bounds; exact matching is `(100.0, 0)`.
    pub fn scan_batch_with(
        &self,
        texts: &[String],
        keys: &HashMap<String, Vec<String>>,
        score_cutoff: f64,
        tolerance: u32,
    ) -> Vec<Vec<CandidateMatch>> {
        if texts.is_empty() || keys.is_empty() {
            return vec![Vec::new(); texts.len()];
        }
        let entries = prepare_entries(keys);
        let results: Vec<Vec<CandidateMatch>> = self.pool.install(|| {
            texts
                .par_iter()
                .map(|text| scan_one(text, &entries, score_cutoff, tolerance))
                .collect()
        });

        let found: usize = results.iter().map(Vec::len).sum();
        debug!(
            texts = texts.len(),
            keys = entries.len(),
            matches = found,
            "fuzzy scan batch done"
        );
        let mut stats = self.stats.lock();
        stats.texts += texts.len() as u64;
        stats.keys_checked += (texts.len() * entries.len()) as u64;
        stats.matches += found as u64;
        results
    }

    /// Scan a single text with the configured cutoff and tolerance.
    pub fn scan_text(
        &self,
        text: &str,
        keys: &HashMap<String, Vec<String>>,
    ) -> Vec<CandidateMatch> {
        self.scan_text_with(text, keys, self.config.score_cutoff, self.config.tolerance)
    }

    /// Scan a single text with explicit bounds.
    pub fn scan_text_with(
        &self,
        text: &str,
        keys: &HashMap<String, Vec<String>>,
        score_cutoff: f64,
        tolerance: u32,
    ) -> Vec<CandidateMatch> {
        if keys.is_empty() {
            return Vec::new();
        }
        let entries = prepare_entries(keys);
        let matches = scan_one(text, &entries, score_cutoff, tolerance);

        let mut stats = self.stats.lock();
        stats.texts += 1;
        stats.keys_checked += entries.len() as u64;
        stats.matches += matches.len() as u64;
        matches
    }

    /// Snapshot of the accumulated counters.
    pub fn stats(&self) -> ScanStats {
        *self.stats.lock()
    }
}

/// Uppercase the keys once per batch and fix a deterministic scan order.
fn prepare_entries(keys: &HashMap<String, Vec<String>>) -> Vec<(String, &Vec<String>)> {
    let mut entries: Vec<(String, &Vec<String>)> = keys
        .iter()
        .map(|(key, origins)| (key.to_uppercase(), origins))
        .collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    entries
}

fn scan_one(
    text: &str,
    entries: &[(String, &Vec<String>)],
    score_cutoff: f64,
    tolerance: u32,
) -> Vec<CandidateMatch> {
    let text_bytes = text.as_bytes();
    let counts = byte_counts(text_bytes);
    let mut matches = Vec::new();

    for (key, origins) in entries {
        if key.is_empty() {
            continue;
        }
        let key_bytes = key.as_bytes();

        // Key characters absent from the whole text already cost more than
        // the ratio cutoff allows, so the DP can be skipped outright.
        let allowed = ((1.0 - score_cutoff / 100.0) * key_bytes.len() as f64).floor() as u32;
        if missing_chars(key_bytes, &counts) > allowed {
            continue;
        }

        let alignment = align_substring(key_bytes, text_bytes);
        if alignment.partial_ratio() < score_cutoff {
            continue;
        }

        // Short aliases and bare country codes must match exactly.
        let max_dist = if key_bytes.len() <= SHORT_KEY_MAX_LEN {
            0
        } else {
            tolerance
        };
        for occ in alignment.occurrences(max_dist) {
            let matched = &text[occ.start..occ.end];
            let standalone = is_standalone(matched, text);
            let distance = newline_adjusted_distance(matched, occ.dist);
            for origin in origins.iter() {
                let mut m =
                    CandidateMatch::new(occ.start, occ.end, matched, key, distance, origin);
                if !standalone {
                    m.flags.insert(Flag::InsideAnotherWord);
                }
                matches.push(m);
            }
        }
    }
    matches
}

/// Whether the matched text occurs on its own word boundaries anywhere in
/// the text. The matched text goes into the pattern verbatim; a trailing
/// `.` would break the right boundary and is dropped first, and a pattern
/// that fails to compile counts as embedded.
fn is_standalone(matched: &str, text: &str) -> bool {
    let query = matched.strip_suffix('.').unwrap_or(matched);
    match Regex::new(&format!(r"\b{query}\b")) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}

/// Interior newlines are line breaks the writer used instead of spaces,
/// not typos; each one refunds one unit of distance.
fn newline_adjusted_distance(matched: &str, dist: u32) -> u32 {
    if matched.len() > 2 && matched.contains('\n') {
        let interior = matched[1..matched.len() - 1].matches('\n').count() as u32;
        dist.saturating_sub(interior)
    } else {
        dist
    }
}
