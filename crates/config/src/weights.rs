//! Flag weight tables for final score computation
//!
//! One table per match side. Bonuses are positive and reward corroborating
//! context; maluses are negative and penalize suspicious shapes. Both are
//! applied in log-odds space, so a weight of 0.1 is worth roughly ten
//! percentage points around a 0.5 baseline.
//!
//! The stacking weights (`short_with_distance`, `short_inside_another_word`,
//! `small_town_without_country`) fire in addition to their component
//! weights, letting bad combinations compound past the sum of their parts.

use serde::{Deserialize, Serialize};

/// Weights applied when scoring town matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TownWeights {
    // Bonuses
    pub in_last_third: f64,
    pub reasonable_mistake: f64,
    pub country_present: f64,
    pub tagger_country_present: f64,
    pub very_close_to_country: f64,
    pub same_line_as_country: f64,
    pub postcode_for_town_found: f64,
    pub metropolis: f64,
    pub alone_on_line: f64,

    // Maluses (negative). `contains_typo` is applied once per unit of edit
    // distance and skipped entirely when the separator-typo flag is set.
    pub contains_typo: f64,
    pub inside_another_word: f64,
    pub in_first_third: f64,
    pub short: f64,
    pub inside_lower_ranked_match: f64,
    pub small_town: f64,
    pub small_town_without_country: f64,
    /// Applied when no country match is present for this town. Positive:
    /// it offsets part of the no-country penalty the combination stage
    /// charges separately.
    pub country_absent: f64,
    pub from_extended_data: f64,
    pub not_largest_town_with_name: f64,
    pub inside_street: f64,
    pub common_province_alias: f64,
    pub uncommon_province_alias: f64,
    pub short_with_distance: f64,
    pub short_inside_another_word: f64,
    pub inside_higher_ranked_match: f64,
}

impl Default for TownWeights {
    fn default() -> Self {
        Self {
            in_last_third: 0.01,
            reasonable_mistake: 0.25,
            country_present: 0.15,
            tagger_country_present: 0.05,
            very_close_to_country: 0.30,
            same_line_as_country: 0.15,
            postcode_for_town_found: 0.4,
            metropolis: 0.10,
            alone_on_line: 0.20,

            contains_typo: -0.85,
            inside_another_word: -0.65,
            in_first_third: -0.01,
            short: -0.25,
            inside_lower_ranked_match: -0.30,
            small_town: -0.20,
            small_town_without_country: -0.30,
            country_absent: 0.10,
            from_extended_data: -0.15,
            not_largest_town_with_name: -0.10,
            inside_street: -0.20,
            common_province_alias: -0.10,
            uncommon_province_alias: -0.15,
            short_with_distance: -2.00,
            short_inside_another_word: -2.00,
            inside_higher_ranked_match: -2.00,
        }
    }
}

/// Weights applied when scoring country matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryWeights {
    // Bonuses
    pub in_last_third: f64,
    pub reasonable_mistake: f64,
    pub town_present: f64,
    pub very_close_to_town: f64,
    pub same_line_as_town: f64,
    pub postal_code_present: f64,
    pub iban_present: f64,
    pub phone_prefix_present: f64,
    pub domain_present: f64,
    pub tagger_strongly_agrees: f64,
    pub tagger_agrees: f64,
    pub tagger_doesnt_disagree: f64,

    // Maluses (negative). `contains_typo` is per unit of edit distance,
    // skipped when the separator-typo flag is set.
    pub contains_typo: f64,
    pub inside_another_word: f64,
    pub in_first_third: f64,
    pub short: f64,
    pub inside_lower_ranked_match: f64,
    pub inside_street: f64,
    pub common_province_alias: f64,
    pub uncommon_province_alias: f64,
    pub short_with_distance: f64,
    pub short_inside_another_word: f64,
    pub inside_higher_ranked_match: f64,
}

impl Default for CountryWeights {
    fn default() -> Self {
        Self {
            in_last_third: 0.01,
            reasonable_mistake: 0.10,
            town_present: 0.20,
            very_close_to_town: 0.20,
            same_line_as_town: 0.10,
            postal_code_present: 0.10,
            iban_present: 0.10,
            phone_prefix_present: 0.10,
            domain_present: 0.10,
            tagger_strongly_agrees: 0.20,
            tagger_agrees: 0.15,
            tagger_doesnt_disagree: 0.05,

            contains_typo: -0.50,
            inside_another_word: -0.60,
            in_first_third: -0.01,
            short: -0.05,
            inside_lower_ranked_match: -0.30,
            inside_street: -0.20,
            common_province_alias: -0.10,
            uncommon_province_alias: -0.15,
            short_with_distance: -2.00,
            short_inside_another_word: -2.00,
            inside_higher_ranked_match: -2.00,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_town_maluses_are_negative() {
        let w = TownWeights::default();
        for value in [
            w.contains_typo,
            w.inside_another_word,
            w.short,
            w.inside_lower_ranked_match,
            w.small_town,
            w.small_town_without_country,
            w.from_extended_data,
            w.not_largest_town_with_name,
            w.inside_street,
            w.short_with_distance,
            w.short_inside_another_word,
            w.inside_higher_ranked_match,
        ] {
            assert!(value < 0.0, "expected negative weight, got {value}");
        }
        // The one deliberate exception in the malus table.
        assert_eq!(w.country_absent, 0.10);
    }

    #[test]
    fn test_country_bonuses_are_positive() {
        let w = CountryWeights::default();
        for value in [
            w.town_present,
            w.very_close_to_town,
            w.same_line_as_town,
            w.postal_code_present,
            w.iban_present,
            w.phone_prefix_present,
            w.domain_present,
            w.tagger_strongly_agrees,
            w.tagger_agrees,
            w.tagger_doesnt_disagree,
        ] {
            assert!(value > 0.0, "expected positive weight, got {value}");
        }
    }

    #[test]
    fn test_proximity_outweighs_plain_presence() {
        let w = TownWeights::default();
        assert!(w.very_close_to_country > w.country_present);
    }
}
