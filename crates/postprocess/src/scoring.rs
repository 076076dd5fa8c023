//! Final score computation
//!
//! Converts a raw tagger confidence plus the accumulated flag set into a
//! calibrated probability. The confidence is mapped to log-odds (after
//! clamping its contribution), flag weights are added as bonuses and
//! maluses whose multipliers shift with the confidence itself, and the
//! logistic function maps the result back to [0, 1]. Confident tagger
//! output therefore dampens bonuses and amplifies maluses, and extreme
//! flag stacks saturate instead of escaping the unit interval.

use address_engine_config::constants::scoring::{
    MAX_MULTIPLIER, MIN_MULTIPLIER, PROBABILITY_EPSILON, TAGGER_MAX_CONTRIBUTION,
};
use address_engine_config::{CountryWeights, TownWeights};
use address_engine_core::{Flag, FlagSet};

/// Computes final scores for town and country matches.
pub struct ScoreComputer<'a> {
    town_weights: &'a TownWeights,
    country_weights: &'a CountryWeights,
}

impl<'a> ScoreComputer<'a> {
    pub fn new(town_weights: &'a TownWeights, country_weights: &'a CountryWeights) -> Self {
        ScoreComputer {
            town_weights,
            country_weights,
        }
    }

    /// Calibrated probability for a town match.
    pub fn town_score(&self, confidence: f64, distance: u32, flags: &FlagSet) -> f64 {
        let w = self.town_weights;

        let bonus_table = [
            (Flag::InLastThird, w.in_last_third),
            (Flag::ReasonableMistake, w.reasonable_mistake),
            (Flag::CountryPresent, w.country_present),
            (Flag::TaggerCountryPresent, w.tagger_country_present),
            (Flag::VeryCloseToCountry, w.very_close_to_country),
            (Flag::SameLineAsCountry, w.same_line_as_country),
            (Flag::PostcodeForTownFound, w.postcode_for_town_found),
            (Flag::Metropolis, w.metropolis),
            (Flag::AloneOnLine, w.alone_on_line),
        ];
        let bonuses = sum_triggered(flags, &bonus_table);

        let malus_table = [
            (Flag::InsideAnotherWord, w.inside_another_word),
            (Flag::InFirstThird, w.in_first_third),
            (Flag::Short, w.short),
            (Flag::InsideLowerRankedMatch, w.inside_lower_ranked_match),
            (Flag::SmallTown, w.small_town),
            (Flag::FromExtendedData, w.from_extended_data),
            (Flag::NotLargestTownWithName, w.not_largest_town_with_name),
            (Flag::InsideStreet, w.inside_street),
            (Flag::CommonProvinceAlias, w.common_province_alias),
            (Flag::UncommonProvinceAlias, w.uncommon_province_alias),
            (Flag::InsideHigherRankedMatch, w.inside_higher_ranked_match),
        ];
        let mut maluses = sum_triggered(flags, &malus_table);
        if !flags.contains(Flag::SeparatorTypo) {
            maluses += w.contains_typo * f64::from(distance);
        }
        if flags.contains(Flag::SmallTown) && !flags.contains(Flag::CountryPresent) {
            maluses += w.small_town_without_country;
        }
        if !flags.contains(Flag::CountryPresent) {
            maluses += w.country_absent;
        }
        if flags.contains(Flag::Short) && distance > 0 {
            maluses += w.short_with_distance;
        }
        if flags.contains(Flag::Short) && flags.contains(Flag::InsideAnotherWord) {
            maluses += w.short_inside_another_word;
        }

        calibrate(confidence, bonuses, maluses)
    }

    /// Calibrated probability for a country match. A match generated from
    /// the suggested-country hint keeps its assigned confidence as-is.
    pub fn country_score(&self, confidence: f64, distance: u32, flags: &FlagSet) -> f64 {
        if flags.contains(Flag::GeneratedBySuggestedCountry) {
            return confidence;
        }
        let w = self.country_weights;

        let bonus_table = [
            (Flag::InLastThird, w.in_last_third),
            (Flag::ReasonableMistake, w.reasonable_mistake),
            (Flag::TownPresent, w.town_present),
            (Flag::VeryCloseToTown, w.very_close_to_town),
            (Flag::SameLineAsTown, w.same_line_as_town),
            (Flag::PostalCodePresent, w.postal_code_present),
            (Flag::IbanPresent, w.iban_present),
            (Flag::PhonePrefixPresent, w.phone_prefix_present),
            (Flag::DomainPresent, w.domain_present),
            (Flag::TaggerStronglyAgrees, w.tagger_strongly_agrees),
            (Flag::TaggerAgrees, w.tagger_agrees),
            (Flag::TaggerDoesntDisagree, w.tagger_doesnt_disagree),
        ];
        let bonuses = sum_triggered(flags, &bonus_table);

        let malus_table = [
            (Flag::InsideAnotherWord, w.inside_another_word),
            (Flag::InFirstThird, w.in_first_third),
            (Flag::Short, w.short),
            (Flag::InsideLowerRankedMatch, w.inside_lower_ranked_match),
            (Flag::InsideStreet, w.inside_street),
            (Flag::CommonProvinceAlias, w.common_province_alias),
            (Flag::UncommonProvinceAlias, w.uncommon_province_alias),
            (Flag::InsideHigherRankedMatch, w.inside_higher_ranked_match),
        ];
        let mut maluses = sum_triggered(flags, &malus_table);
        if !flags.contains(Flag::SeparatorTypo) {
            maluses += w.contains_typo * f64::from(distance);
        }
        if flags.contains(Flag::Short) && distance > 0 {
            maluses += w.short_with_distance;
        }
        if flags.contains(Flag::Short) && flags.contains(Flag::InsideAnotherWord) {
            maluses += w.short_inside_another_word;
        }

        calibrate(confidence, bonuses, maluses)
    }
}

fn sum_triggered(flags: &FlagSet, table: &[(Flag, f64)]) -> f64 {
    table
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, weight)| weight)
        .sum()
}

/// Log-odds calibration shared by both sides. The multipliers use the
/// epsilon-clamped confidence, not the contribution-capped one.
fn calibrate(confidence: f64, bonuses: f64, maluses: f64) -> f64 {
    let clipped = confidence.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
    let amortized = clipped.clamp(1.0 - TAGGER_MAX_CONTRIBUTION, TAGGER_MAX_CONTRIBUTION);
    let base_log_odds = (amortized / (1.0 - amortized)).ln();

    let bonus_mul = MAX_MULTIPLIER - (MAX_MULTIPLIER - MIN_MULTIPLIER) * clipped;
    let malus_mul = MIN_MULTIPLIER + (MAX_MULTIPLIER - MIN_MULTIPLIER) * clipped;
    let log_odds = base_log_odds + bonus_mul * bonuses + malus_mul * maluses;

    1.0 / (1.0 + (-log_odds).exp())
}
