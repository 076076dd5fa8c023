//! Post-processing orchestration
//!
//! Runs the full reconciliation sequence for one text: tagger span means,
//! suggested-country handling, flagging, scoring, and combination
//! generation. The stage order is load-bearing; several annotators read
//! flags earlier stages wrote, and span means must land before the
//! synthetic suggested-country match is injected so it keeps its assigned
//! confidence.

use address_engine_config::constants::proximity::SHORT_SPAN_LEN;
use address_engine_config::PostProcessConfig;
use address_engine_core::{
    CandidateMatch, CombinationCandidate, Error, Flag, PostcodeMatch, Result, TaggerOutput,
};
use address_engine_gazetteer::GazetteerStore;
use address_engine_matching::apply_tagger_scores;
use regex::Regex;
use tracing::debug;

use crate::combinations::CombinationGenerator;
use crate::flaggers::{
    self, flag_reasonable_mistakes, flag_relationships, CountryFlagger, TownFlagger,
};
use crate::scoring::ScoreComputer;

/// Candidate matches for one text, grouped by the scan that produced them.
#[derive(Debug, Clone, Default)]
pub struct CandidateLists {
    pub countries: Vec<CandidateMatch>,
    pub country_codes: Vec<CandidateMatch>,
    pub towns: Vec<CandidateMatch>,
    pub extended_towns: Vec<CandidateMatch>,
}

/// Ranked combinations plus the annotated candidates behind them.
///
/// `countries` and `towns` are parallel to `combinations`: entry `i` holds
/// the two sides of combination `i`, sentinels included.
#[derive(Debug, Clone)]
pub struct PostProcessOutput {
    pub combinations: Vec<CombinationCandidate>,
    pub countries: Vec<CandidateMatch>,
    pub towns: Vec<CandidateMatch>,
    pub ibans: Vec<String>,
}

/// Reconciles fuzzy, postcode, and tagger signals into ranked combinations.
pub struct PostProcessor<'a> {
    gazetteer: &'a GazetteerStore,
    config: &'a PostProcessConfig,
    town_flagger: TownFlagger<'a>,
    country_flagger: CountryFlagger<'a>,
    score_computer: ScoreComputer<'a>,
    combination_generator: CombinationGenerator<'a>,
    iban_regex: Regex,
}

impl<'a> PostProcessor<'a> {
    pub fn new(gazetteer: &'a GazetteerStore, config: &'a PostProcessConfig) -> Result<Self> {
        let iban_regex = Regex::new(&config.iban_pattern)
            .map_err(|e| Error::config(format!("invalid IBAN pattern: {e}")))?;
        Ok(PostProcessor {
            gazetteer,
            config,
            town_flagger: TownFlagger::new(gazetteer, config),
            country_flagger: CountryFlagger::new(gazetteer, config),
            score_computer: ScoreComputer::new(&config.town_weights, &config.country_weights),
            combination_generator: CombinationGenerator::new(gazetteer, config),
            iban_regex,
        })
    }

    /// Process one cleaned text. `suggestion` is the caller's country hint
    /// (empty strings count as absent); `force` restricts the output to
    /// that origin.
    pub fn process(
        &self,
        text: &str,
        tagger: &TaggerOutput,
        candidates: CandidateLists,
        postcodes: &[PostcodeMatch],
        suggestion: Option<&str>,
        force: bool,
    ) -> PostProcessOutput {
        let suggestion = suggestion.filter(|s| !s.is_empty());
        let CandidateLists {
            mut countries,
            mut country_codes,
            mut towns,
            mut extended_towns,
        } = candidates;

        apply_tagger_scores(
            &mut countries,
            &tagger.country_probabilities,
            &tagger.country_emissions,
        );
        apply_tagger_scores(
            &mut country_codes,
            &tagger.country_probabilities,
            &tagger.country_emissions,
        );

        if let Some(code) = suggestion {
            self.inject_suggested_country(&mut country_codes, code, text.len());
        }

        // Codes are noisy; keep only those the tagger gives some weight,
        // plus the tagger's own whole-text pick.
        let tagger_country = tagger.country_code.as_deref();
        country_codes
            .retain(|m| m.tagger_confidence > 0.0 || Some(m.origin.as_str()) == tagger_country);
        countries.extend(country_codes);

        for town in extended_towns.iter_mut() {
            town.flags.insert(Flag::FromExtendedData);
        }
        towns.extend(extended_towns);
        apply_tagger_scores(&mut towns, &tagger.town_probabilities, &tagger.town_emissions);

        let text_lower = text.to_lowercase();
        let ibans = self.extract_ibans(text);
        self.town_flagger.annotate(&mut towns, tagger);
        self.country_flagger
            .annotate(&mut countries, tagger, text, &text_lower, &ibans);

        prepare_matches(&mut countries, text.len());
        prepare_matches(&mut towns, text.len());

        // Country codes hiding inside full country names get a second
        // containment pass against the whole country list; codes come back
        // first so they keep their rank advantage in later stable sorts.
        let full_snapshot = flaggers::snapshot(&countries);
        let (mut codes, names): (Vec<CandidateMatch>, Vec<CandidateMatch>) = countries
            .into_iter()
            .partition(|m| m.possibility.len() <= 2);
        flaggers::flag_included_matches(&mut codes, &full_snapshot);
        let mut countries = codes;
        countries.extend(names);

        let country_head = tagger.country_head(self.config.tagger_country_min_confidence);
        flag_relationships(&mut towns, &mut countries, text, country_head);
        flag_reasonable_mistakes(&mut towns, &mut countries, tagger);
        self.town_flagger.flag_alone_on_line(&mut towns, text);
        self.town_flagger.flag_postcode_agreement(&mut towns, postcodes);

        for country in countries.iter_mut() {
            if country.is_generated() {
                // The synthetic match competes on its assigned confidence
                // alone; positional flags picked up along the way are noise.
                country.flags.clear();
                country.flags.insert(Flag::GeneratedBySuggestedCountry);
            }
            country.final_score = Some(self.score_computer.country_score(
                country.tagger_confidence,
                country.edit_distance,
                &country.flags,
            ));
        }
        for town in towns.iter_mut() {
            town.final_score = Some(self.score_computer.town_score(
                town.tagger_confidence,
                town.edit_distance,
                &town.flags,
            ));
        }

        let no_country = CandidateMatch::no_country(self.config.minimal_final_score_country);
        let no_town = CandidateMatch::no_town(self.config.minimal_final_score_town);

        let countries_above: Vec<CandidateMatch> = countries
            .iter()
            .filter(|m| m.score() >= self.config.minimal_final_score_country)
            .cloned()
            .collect();
        let towns_above: Vec<CandidateMatch> = towns
            .iter()
            .filter(|m| m.score() >= self.config.minimal_final_score_town)
            .cloned()
            .collect();

        let combinations = self.combination_generator.generate(
            &countries_above,
            &towns_above,
            &no_country,
            &no_town,
            suggestion,
            force,
        );

        debug!(
            country_candidates = countries.len(),
            town_candidates = towns.len(),
            combinations = combinations.len(),
            "generated combinations"
        );

        let countries = combinations.iter().map(|c| c.country.clone()).collect();
        let towns = combinations.iter().map(|c| c.town.clone()).collect();

        PostProcessOutput {
            combinations,
            countries,
            towns,
            ibans,
        }
    }

    /// Flag code matches agreeing with the suggestion and raise their
    /// confidence to at least the configured base, then append a synthetic
    /// match so the suggestion survives even with no textual evidence.
    fn inject_suggested_country(
        &self,
        country_codes: &mut Vec<CandidateMatch>,
        code: &str,
        text_len: usize,
    ) {
        let base = self.config.base_score_suggested_country;
        let mut best = base;
        for m in country_codes.iter_mut() {
            if m.possibility == code && m.origin == code {
                m.flags.insert(Flag::SuggestedCountry);
                m.tagger_confidence = m.tagger_confidence.max(base);
                best = best.max(m.tagger_confidence);
            }
        }
        country_codes.push(CandidateMatch::suggested(code, text_len, best));
    }

    /// All IBAN-shaped tokens in the text, including overlapping ones: the
    /// scan restarts one character past each hit's start.
    fn extract_ibans(&self, text: &str) -> Vec<String> {
        let mut ibans = Vec::new();
        let mut at = 0;
        while let Some(m) = self.iban_regex.find_at(text, at) {
            ibans.push(m.as_str().to_string());
            at = m.start() + 1;
        }
        ibans
    }
}

/// Sort by distance then tagger confidence, flag self-containments, and
/// add the position flags. Rank for containment is the post-sort position.
fn prepare_matches(matches: &mut [CandidateMatch], text_len: usize) {
    matches.sort_by(|a, b| {
        a.edit_distance
            .cmp(&b.edit_distance)
            .then_with(|| b.tagger_confidence.total_cmp(&a.tagger_confidence))
    });

    let snapshot = flaggers::snapshot(matches);
    flaggers::flag_included_matches(matches, &snapshot);

    let one_third = text_len as f64 / 3.0;
    let two_thirds = text_len as f64 * 2.0 / 3.0;
    for m in matches.iter_mut() {
        if m.span_len() <= SHORT_SPAN_LEN {
            m.flags.insert(Flag::Short);
        }
        if m.start as f64 <= one_third {
            m.flags.insert(Flag::InFirstThird);
        }
        if m.start as f64 >= two_thirds {
            m.flags.insert(Flag::InLastThird);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use address_engine_core::NO_COUNTRY;
    use address_engine_gazetteer::GazetteerBuilder;

    fn store() -> GazetteerStore {
        GazetteerBuilder::new()
            .country("FRANCE", "FR")
            .country("DE", "DE")
            .town("PARIS", &["FR"])
            .population("PARIS", 2_100_000)
            .dominant_origin("PARIS", "FR")
            .build()
    }

    fn uniform_tagger(len: usize, country: f64, town: f64) -> TaggerOutput {
        TaggerOutput {
            country_probabilities: vec![country; len],
            country_emissions: vec![country; len],
            town_probabilities: vec![town; len],
            town_emissions: vec![town; len],
            ..Default::default()
        }
    }

    fn candidate(start: usize, end: usize, name: &str, origin: &str) -> CandidateMatch {
        CandidateMatch::new(start, end, name, name, 0, origin)
    }

    #[test]
    fn test_paired_town_and_country_rank_first() {
        let store = store();
        let config = PostProcessConfig::default();
        let processor = PostProcessor::new(&store, &config).unwrap();

        let text = "10 MAIN ST PARIS FRANCE";
        let tagger = uniform_tagger(text.len(), 0.8, 0.7);
        let candidates = CandidateLists {
            countries: vec![candidate(17, 23, "FRANCE", "FR")],
            towns: vec![candidate(11, 16, "PARIS", "FR")],
            ..Default::default()
        };

        let output = processor.process(text, &tagger, candidates, &[], None, false);

        let top = &output.combinations[0];
        assert_eq!(top.country.origin, "FR");
        assert_eq!(top.town.possibility, "PARIS");
        assert!(top.town.flags.contains(Flag::VeryCloseToCountry));
        assert!(top.town.flags.contains(Flag::SameLineAsCountry));
        assert!(top.town.flags.contains(Flag::Metropolis));
        assert!(top.country.flags.contains(Flag::TownPresent));

        // The pair outscores both solo fallbacks.
        for other in &output.combinations[1..] {
            assert!(other.score < top.score);
        }
        // Output lists stay parallel to the combinations.
        assert_eq!(output.countries.len(), output.combinations.len());
        assert_eq!(output.towns.len(), output.combinations.len());
        assert_eq!(output.countries[0].origin, "FR");
        assert_eq!(output.towns[0].possibility, "PARIS");
    }

    #[test]
    fn test_zero_confidence_codes_are_dropped() {
        let store = store();
        let config = PostProcessConfig::default();
        let processor = PostProcessor::new(&store, &config).unwrap();

        let text = "AA BB";
        // Only the second code's span carries tagger probability.
        let tagger = TaggerOutput {
            country_probabilities: vec![0.0, 0.0, 0.0, 0.6, 0.6],
            country_emissions: vec![0.0; 5],
            town_probabilities: vec![0.0; 5],
            town_emissions: vec![0.0; 5],
            ..Default::default()
        };
        let candidates = CandidateLists {
            country_codes: vec![candidate(0, 2, "AA", "AA"), candidate(3, 5, "BB", "BB")],
            ..Default::default()
        };

        let output = processor.process(text, &tagger, candidates, &[], None, false);

        assert!(output.combinations.iter().any(|c| c.country.origin == "BB"));
        assert!(output.combinations.iter().all(|c| c.country.origin != "AA"));
    }

    #[test]
    fn test_zero_confidence_code_survives_as_tagger_pick() {
        let store = store();
        let config = PostProcessConfig::default();
        let processor = PostProcessor::new(&store, &config).unwrap();

        let text = "AA HOUSE";
        let mut tagger = uniform_tagger(text.len(), 0.0, 0.0);
        tagger.country_code = Some("AA".into());
        tagger.country_code_confidence = 0.5;
        let candidates = CandidateLists {
            country_codes: vec![candidate(0, 2, "AA", "AA")],
            ..Default::default()
        };

        let output = processor.process(text, &tagger, candidates, &[], None, false);

        // Kept past the confidence filter, but a zero-confidence short code
        // still scores under the threshold, so only the fallback remains.
        assert_eq!(output.combinations.len(), 1);
        assert_eq!(output.combinations[0].country.origin, NO_COUNTRY);
    }

    #[test]
    fn test_suggestion_injects_synthetic_match() {
        let store = store();
        let config = PostProcessConfig::default();
        let processor = PostProcessor::new(&store, &config).unwrap();

        let text = "SOMEWHERE";
        let tagger = uniform_tagger(text.len(), 0.0, 0.0);

        let output = processor.process(
            text,
            &tagger,
            CandidateLists::default(),
            &[],
            Some("DE"),
            false,
        );

        assert_eq!(output.combinations.len(), 1);
        let top = &output.combinations[0];
        assert_eq!(top.country.origin, "DE");
        assert!(top.country.is_generated());
        // Flags are reset before scoring and the score is the raw base.
        assert_eq!(top.country.flags.len(), 1);
        assert_eq!(top.country.final_score, Some(0.95));
        assert!((top.score - (0.95 + 0.15 - 0.35) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_forced_suggestion_overrides_textual_evidence() {
        let store = store();
        let config = PostProcessConfig::default();
        let processor = PostProcessor::new(&store, &config).unwrap();

        let text = "10 MAIN ST PARIS FRANCE";
        let tagger = uniform_tagger(text.len(), 0.8, 0.7);
        let candidates = CandidateLists {
            countries: vec![candidate(17, 23, "FRANCE", "FR")],
            towns: vec![candidate(11, 16, "PARIS", "FR")],
            ..Default::default()
        };

        let output = processor.process(text, &tagger, candidates, &[], Some("DE"), true);

        assert!(!output.combinations.is_empty());
        assert!(output.combinations.iter().all(|c| c.country.origin == "DE"));
    }

    #[test]
    fn test_empty_suggestion_is_ignored() {
        let store = store();
        let config = PostProcessConfig::default();
        let processor = PostProcessor::new(&store, &config).unwrap();

        let text = "PARIS FRANCE";
        let tagger = uniform_tagger(text.len(), 0.8, 0.7);
        let candidates = CandidateLists {
            countries: vec![candidate(6, 12, "FRANCE", "FR")],
            towns: vec![candidate(0, 5, "PARIS", "FR")],
            ..Default::default()
        };

        let output = processor.process(text, &tagger, candidates, &[], Some(""), true);

        // An empty hint neither injects a synthetic match nor forces.
        assert!(output.combinations.iter().all(|c| !c.country.is_generated()));
        assert!(output.combinations.iter().any(|c| c.country.origin == "FR"));
    }

    #[test]
    fn test_extended_town_pairs_without_boosting_country() {
        let store = store();
        let config = PostProcessConfig::default();
        let processor = PostProcessor::new(&store, &config).unwrap();

        let text = "OBSCURVILLE FRANCE";
        let tagger = uniform_tagger(text.len(), 0.8, 0.6);
        let candidates = CandidateLists {
            countries: vec![candidate(12, 18, "FRANCE", "FR")],
            extended_towns: vec![candidate(0, 11, "OBSCURVILLE", "FR")],
            ..Default::default()
        };

        let output = processor.process(text, &tagger, candidates, &[], None, false);

        let top = &output.combinations[0];
        assert_eq!(top.town.possibility, "OBSCURVILLE");
        assert!(top.town.flags.contains(Flag::FromExtendedData));
        assert!(top.town.flags.contains(Flag::CountryPresent));
        // Extended data corroborates the town side only.
        assert!(!top.country.flags.contains(Flag::TownPresent));
        assert!(!top.country.flags.contains(Flag::VeryCloseToTown));
    }

    #[test]
    fn test_iban_extraction_reports_overlaps() {
        let store = store();
        let config = PostProcessConfig::default();
        let processor = PostProcessor::new(&store, &config).unwrap();

        let ibans = processor.extract_ibans("XX12AB12CD34EF56GH78");
        assert_eq!(ibans.len(), 4);
        assert_eq!(ibans[0], "XX12AB12CD34EF56GH78");
        assert_eq!(ibans[1], "AB12CD34EF56GH78");

        assert!(processor.extract_ibans("NO BANK DATA HERE").is_empty());
    }

    #[test]
    fn test_invalid_iban_pattern_is_a_config_error() {
        let store = store();
        let config = PostProcessConfig {
            iban_pattern: "[".into(),
            ..Default::default()
        };
        assert!(PostProcessor::new(&store, &config).is_err());
    }
}
