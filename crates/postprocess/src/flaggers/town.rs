//! Town-specific flag annotators

use address_engine_config::PostProcessConfig;
use address_engine_core::{CandidateMatch, Flag, PostcodeMatch, TaggerOutput};
use address_engine_gazetteer::{generate_aliases, GazetteerStore};

use super::{add_separator_typo_flag, add_street_overlap_flag};

/// Annotates town matches with population, typo, and context flags.
pub struct TownFlagger<'a> {
    gazetteer: &'a GazetteerStore,
    config: &'a PostProcessConfig,
}

impl<'a> TownFlagger<'a> {
    pub fn new(gazetteer: &'a GazetteerStore, config: &'a PostProcessConfig) -> Self {
        TownFlagger { gazetteer, config }
    }

    /// Per-match flags that need no other candidate: separator typo,
    /// population tier, and street overlap.
    pub fn annotate(&self, towns: &mut [CandidateMatch], tagger: &TaggerOutput) {
        for town in towns.iter_mut() {
            add_separator_typo_flag(town);
            self.add_population_flags(town);
            add_street_overlap_flag(town, tagger, self.config.street_overlap_ratio);
        }
    }

    /// Population tier flags. Towns without a registered population are
    /// left untouched, including the largest-with-name check.
    fn add_population_flags(&self, town: &mut CandidateMatch) {
        let Some(population) = self.gazetteer.population(&town.possibility) else {
            return;
        };
        if population >= self.config.metropolis_population {
            town.flags.insert(Flag::Metropolis);
        }
        if population <= self.config.small_town_population {
            town.flags.insert(Flag::SmallTown);
        }
        if self.gazetteer.dominant_origin(&town.possibility) != Some(town.origin.as_str()) {
            town.flags.insert(Flag::NotLargestTownWithName);
        }
    }

    /// Flag towns whose line holds nothing but the matched text.
    pub fn flag_alone_on_line(&self, towns: &mut [CandidateMatch], text: &str) {
        for town in towns.iter_mut() {
            let before = &text[..town.start];
            let after = &text[town.end..];

            let before_line = match before.rfind('\n') {
                Some(i) => &before[i + 1..],
                None => before,
            };
            let after_line = match after.find('\n') {
                Some(i) => &after[..i],
                None => after,
            };

            if before_line.trim().is_empty() && after_line.trim().is_empty() {
                town.flags.insert(Flag::AloneOnLine);
            }
        }
    }

    /// Flag towns confirmed by a postcode hit: same origin and the
    /// postcode's town name (or any of its aliases) equals the
    /// possibility.
    pub fn flag_postcode_agreement(&self, towns: &mut [CandidateMatch], postcodes: &[PostcodeMatch]) {
        for postcode in postcodes {
            let aliases = generate_aliases(&postcode.possibility);
            for town in towns.iter_mut() {
                if postcode.origin != town.origin {
                    continue;
                }
                if aliases.iter().any(|alias| *alias == town.possibility) {
                    town.flags.insert(Flag::PostcodeForTownFound);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use address_engine_core::{SpanPrediction, Tag, TaggedSpan};
    use address_engine_gazetteer::GazetteerBuilder;

    fn store() -> GazetteerStore {
        GazetteerBuilder::new()
            .town("PARIS", &["FR", "US"])
            .population("PARIS", 2_100_000)
            .dominant_origin("PARIS", "FR")
            .town("BRIGNON", &["FR"])
            .population("BRIGNON", 700)
            .dominant_origin("BRIGNON", "FR")
            .build()
    }

    fn town(start: usize, end: usize, matched: &str, possibility: &str, origin: &str) -> CandidateMatch {
        CandidateMatch::new(start, end, matched, possibility, 0, origin)
    }

    fn street_span(start: usize, end: usize, text: &str) -> SpanPrediction {
        SpanPrediction {
            span: TaggedSpan {
                start,
                end,
                tag: Tag::Street,
            },
            confidence: 0.9,
            text: text.into(),
        }
    }

    #[test]
    fn test_population_tiers() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = TownFlagger::new(&store, &config);
        let mut towns = vec![
            town(0, 5, "PARIS", "PARIS", "FR"),
            town(0, 7, "BRIGNON", "BRIGNON", "FR"),
        ];
        flagger.annotate(&mut towns, &TaggerOutput::default());

        assert!(towns[0].flags.contains(Flag::Metropolis));
        assert!(!towns[0].flags.contains(Flag::SmallTown));
        assert!(towns[1].flags.contains(Flag::SmallTown));
        assert!(!towns[1].flags.contains(Flag::Metropolis));
    }

    #[test]
    fn test_not_largest_town_with_name() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = TownFlagger::new(&store, &config);
        // Paris, Texas loses the name to Paris, France.
        let mut towns = vec![town(0, 5, "PARIS", "PARIS", "US")];
        flagger.annotate(&mut towns, &TaggerOutput::default());
        assert!(towns[0].flags.contains(Flag::NotLargestTownWithName));

        let mut towns = vec![town(0, 5, "PARIS", "PARIS", "FR")];
        flagger.annotate(&mut towns, &TaggerOutput::default());
        assert!(!towns[0].flags.contains(Flag::NotLargestTownWithName));
    }

    #[test]
    fn test_unknown_population_sets_no_tier_flags() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = TownFlagger::new(&store, &config);
        let mut towns = vec![town(0, 7, "NOWHERE", "NOWHERE", "FR")];
        flagger.annotate(&mut towns, &TaggerOutput::default());
        assert!(towns[0].flags.is_empty());
    }

    #[test]
    fn test_separator_typo() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = TownFlagger::new(&store, &config);
        let mut m = town(0, 10, "NEW-YORK", "NEW YORK", "US");
        m.edit_distance = 1;
        let mut towns = vec![m];
        flagger.annotate(&mut towns, &TaggerOutput::default());
        assert!(towns[0].flags.contains(Flag::SeparatorTypo));
    }

    #[test]
    fn test_street_overlap_ratio() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = TownFlagger::new(&store, &config);
        let tagger = TaggerOutput {
            spans: vec![street_span(0, 8, "RUE LILLE")],
            ..Default::default()
        };

        // 4 of 5 characters inside the street span.
        let mut towns = vec![town(4, 9, "LILLE", "LILLE", "FR")];
        flagger.annotate(&mut towns, &tagger);
        assert!(towns[0].flags.contains(Flag::InsideStreet));

        // 1 of 5 characters inside, below the 0.5 ratio.
        let mut towns = vec![town(7, 12, "LILLE", "LILLE", "FR")];
        flagger.annotate(&mut towns, &tagger);
        assert!(!towns[0].flags.contains(Flag::InsideStreet));
    }

    #[test]
    fn test_alone_on_line() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = TownFlagger::new(&store, &config);
        let text = "12 MAIN STREET\n  PARIS \nFRANCE";

        let mut towns = vec![town(17, 22, "PARIS", "PARIS", "FR")];
        flagger.flag_alone_on_line(&mut towns, text);
        assert!(towns[0].flags.contains(Flag::AloneOnLine));

        // Other text on the same line.
        let mut towns = vec![town(8, 14, "STREET", "STREET", "FR")];
        flagger.flag_alone_on_line(&mut towns, text);
        assert!(!towns[0].flags.contains(Flag::AloneOnLine));

        // A match spanning the whole single-line text.
        let mut towns = vec![town(0, 4, "LYON", "LYON", "FR")];
        flagger.flag_alone_on_line(&mut towns, "LYON");
        assert!(towns[0].flags.contains(Flag::AloneOnLine));
    }

    #[test]
    fn test_postcode_agreement_via_alias() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = TownFlagger::new(&store, &config);
        let postcodes = vec![PostcodeMatch {
            start: 0,
            end: 5,
            matched_text: "42100".into(),
            possibility: "SAINT-ETIENNE".into(),
            origin: "FR".into(),
        }];

        let mut towns = vec![town(6, 17, "ST. ETIENNE", "ST. ETIENNE", "FR")];
        flagger.flag_postcode_agreement(&mut towns, &postcodes);
        assert!(towns[0].flags.contains(Flag::PostcodeForTownFound));

        // Same name, different origin.
        let mut towns = vec![town(6, 17, "ST. ETIENNE", "ST. ETIENNE", "US")];
        flagger.flag_postcode_agreement(&mut towns, &postcodes);
        assert!(!towns[0].flags.contains(Flag::PostcodeForTownFound));
    }
}
