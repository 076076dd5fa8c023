//! Country-town combination generation
//!
//! Pairs scored country and town candidates into the final ranked output.
//! Matched pairs average the two final scores; unpaired candidates are
//! padded with a sentinel and charged for the corroboration flags they
//! lack, so a claim that should have had a partner ranks below one whose
//! context supports standing alone.

use std::collections::HashSet;

use address_engine_config::PostProcessConfig;
use address_engine_core::{CandidateMatch, CombinationCandidate, Flag, FlagSet, NO_COUNTRY};
use address_engine_gazetteer::GazetteerStore;

/// Generates and scores country-town combinations.
pub struct CombinationGenerator<'a> {
    gazetteer: &'a GazetteerStore,
    config: &'a PostProcessConfig,
}

impl<'a> CombinationGenerator<'a> {
    pub fn new(gazetteer: &'a GazetteerStore, config: &'a PostProcessConfig) -> Self {
        CombinationGenerator { gazetteer, config }
    }

    /// Build the ranked, deduplicated combination list from the scored
    /// candidate lists. `suggestion` and `force` carry the caller's
    /// suggested-country hint; forcing restricts country combinations to
    /// the suggested origin.
    pub fn generate(
        &self,
        countries: &[CandidateMatch],
        towns: &[CandidateMatch],
        no_country: &CandidateMatch,
        no_town: &CandidateMatch,
        suggestion: Option<&str>,
        force: bool,
    ) -> Vec<CombinationCandidate> {
        let mut combinations = Vec::new();

        self.matched_pairs(&mut combinations, countries, towns, suggestion, force);
        self.solo_countries(&mut combinations, countries, no_town, suggestion, force);
        self.solo_towns(&mut combinations, towns, no_country, suggestion, force);

        if combinations.is_empty() {
            let score = (self.config.minimal_final_score_country
                + self.config.minimal_final_score_town)
                / 2.0;
            combinations.push(CombinationCandidate::new(
                no_country.clone(),
                no_town.clone(),
                score,
            ));
        }

        combinations.sort_by(|a, b| b.score.total_cmp(&a.score));
        deduplicate(combinations)
    }

    fn matched_pairs(
        &self,
        out: &mut Vec<CombinationCandidate>,
        countries: &[CandidateMatch],
        towns: &[CandidateMatch],
        suggestion: Option<&str>,
        force: bool,
    ) {
        for town in towns {
            for country in countries.iter().filter(|c| c.origin == town.origin) {
                if self.skip_pair(town, country, suggestion, force) {
                    continue;
                }
                let score = (country.score() + town.score()) / 2.0;
                out.push(CombinationCandidate::new(
                    country.clone(),
                    town.clone(),
                    score,
                ));
            }
        }
    }

    fn skip_pair(
        &self,
        town: &CandidateMatch,
        country: &CandidateMatch,
        suggestion: Option<&str>,
        force: bool,
    ) -> bool {
        if force {
            if let Some(code) = suggestion {
                if country.origin != code {
                    return true;
                }
            }
        }

        // Identical spans are one piece of text claimed twice; only the
        // registered country-name-equals-town-name cases may pair.
        if town.start == country.start
            && town.end == country.end
            && self.gazetteer.same_name_country(&town.possibility)
                != Some(country.origin.as_str())
        {
            return true;
        }

        // One span strictly nested in the other is an ambiguous overlap.
        (town.start > country.start && town.end <= country.end)
            || (town.start >= country.start && town.end < country.end)
            || (country.start > town.start && country.end <= town.end)
            || (country.start >= town.start && country.end < town.end)
    }

    fn solo_countries(
        &self,
        out: &mut Vec<CombinationCandidate>,
        countries: &[CandidateMatch],
        no_town: &CandidateMatch,
        suggestion: Option<&str>,
        force: bool,
    ) {
        let w = &self.config.country_weights;
        for country in countries {
            if force {
                if let Some(code) = suggestion {
                    if country.origin != code {
                        continue;
                    }
                }
            }

            let lacking = sum_lacking(
                &country.flags,
                &[
                    (Flag::TownPresent, w.town_present),
                    (Flag::VeryCloseToTown, w.very_close_to_town),
                    (Flag::SameLineAsTown, w.same_line_as_town),
                ],
            );
            let malus = self.config.no_town_found_mul * lacking;
            let score =
                (country.score() + self.config.minimal_final_score_town - malus) / 2.0;
            out.push(CombinationCandidate::new(
                country.clone(),
                no_town.clone(),
                score,
            ));
        }
    }

    fn solo_towns(
        &self,
        out: &mut Vec<CombinationCandidate>,
        towns: &[CandidateMatch],
        no_country: &CandidateMatch,
        suggestion: Option<&str>,
        force: bool,
    ) {
        if force {
            if let Some(code) = suggestion {
                if code != NO_COUNTRY {
                    return;
                }
            }
        }

        let w = &self.config.town_weights;
        for town in towns {
            let lacking = sum_lacking(
                &town.flags,
                &[
                    (Flag::CountryPresent, w.country_present),
                    (Flag::VeryCloseToCountry, w.very_close_to_country),
                    (Flag::SameLineAsCountry, w.same_line_as_country),
                ],
            );
            let malus = self.config.no_country_found_mul * lacking;
            let score =
                (self.config.minimal_final_score_country + town.score() - malus) / 2.0;
            out.push(CombinationCandidate::new(
                no_country.clone(),
                town.clone(),
                score,
            ));
        }
    }
}

/// Sum the weights of corroboration flags the match does not carry.
fn sum_lacking(flags: &FlagSet, table: &[(Flag, f64)]) -> f64 {
    table
        .iter()
        .filter(|(flag, _)| !flags.contains(*flag))
        .map(|(_, weight)| weight)
        .sum()
}

/// Keep the first (highest-scored) combination per distinct country origin
/// and separator-collapsed town name.
fn deduplicate(combinations: Vec<CombinationCandidate>) -> Vec<CombinationCandidate> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    combinations
        .into_iter()
        .filter(|combination| {
            let key = (
                combination.country.origin.clone(),
                combination.town.possibility.replace('-', " "),
            );
            seen.insert(key)
        })
        .collect()
}
