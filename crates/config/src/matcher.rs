//! Fuzzy scanner configuration

use serde::{Deserialize, Serialize};

use crate::constants::matching;

/// Configuration for the fuzzy gazetteer scanner
///
/// The same config drives both the country and the town scans; build two
/// instances if they ever need to diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Coarse partial-ratio cutoff on a 0-100 scale. Keys scoring below
    /// this against a text are pruned before the fine search.
    #[serde(default = "default_score_cutoff")]
    pub score_cutoff: f64,

    /// Edit-distance tolerance for keys longer than two characters.
    /// Shorter keys always require an exact match.
    #[serde(default = "default_tolerance")]
    pub tolerance: u32,

    /// Worker threads for batch scanning.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_score_cutoff() -> f64 {
    matching::DEFAULT_SCORE_CUTOFF
}

fn default_tolerance() -> u32 {
    matching::DEFAULT_TOLERANCE
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

impl MatcherConfig {
    /// Effective tolerance for a key of the given length.
    pub fn tolerance_for_key(&self, key_len: usize) -> u32 {
        if key_len <= matching::SHORT_KEY_MAX_LEN {
            0
        } else {
            self.tolerance
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            score_cutoff: default_score_cutoff(),
            tolerance: default_tolerance(),
            workers: default_workers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_keys_require_exact_match() {
        let config = MatcherConfig::default();
        assert_eq!(config.tolerance_for_key(1), 0);
        assert_eq!(config.tolerance_for_key(2), 0);
        assert_eq!(config.tolerance_for_key(3), 1);
        assert_eq!(config.tolerance_for_key(12), 1);
    }

    #[test]
    fn test_default_workers_at_least_one() {
        let config = MatcherConfig::default();
        assert!(config.workers >= 1);
    }
}
