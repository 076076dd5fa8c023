//! Country-specific flag annotators

use address_engine_config::PostProcessConfig;
use address_engine_core::{CandidateMatch, Flag, Tag, TaggerOutput};
use address_engine_gazetteer::GazetteerStore;

use super::{add_separator_typo_flag, add_street_overlap_flag};

/// Annotates country matches with typo, corroboration, and ambiguity flags.
pub struct CountryFlagger<'a> {
    gazetteer: &'a GazetteerStore,
    config: &'a PostProcessConfig,
}

impl<'a> CountryFlagger<'a> {
    pub fn new(gazetteer: &'a GazetteerStore, config: &'a PostProcessConfig) -> Self {
        CountryFlagger { gazetteer, config }
    }

    /// Per-match country flags. `text` is the processed sample, `text_lower`
    /// its lowercased form for domain-extension scanning, `ibans` the IBAN
    /// strings already extracted from the sample.
    pub fn annotate(
        &self,
        countries: &mut [CandidateMatch],
        tagger: &TaggerOutput,
        text: &str,
        text_lower: &str,
        ibans: &[String],
    ) {
        for country in countries.iter_mut() {
            add_separator_typo_flag(country);
            add_iban_flag(country, ibans);
            add_street_overlap_flag(country, tagger, self.config.street_overlap_ratio);
            self.add_province_alias_flags(country);
            add_tagger_agreement_flags(country, tagger);
            self.add_feature_flags(country, tagger, text, text_lower);
        }
    }

    /// Two-character matches that double as province or state abbreviations
    /// of the origin country ("IL", "CA", ...) are weak evidence on their
    /// own. Common-province countries get the milder flag.
    fn add_province_alias_flags(&self, country: &mut CandidateMatch) {
        if country.possibility.len() > 2 || country.origin.is_empty() {
            return;
        }
        let Some(aliases) = self.gazetteer.province_aliases(&country.origin) else {
            return;
        };
        if aliases.contains(&country.possibility) {
            let flag = if self
                .config
                .countries_with_common_provinces
                .contains(&country.origin)
            {
                Flag::CommonProvinceAlias
            } else {
                Flag::UncommonProvinceAlias
            };
            country.flags.insert(flag);
        }
    }

    /// Country-specific corroborating evidence: phone prefixes and domain
    /// extensions anywhere in the sample, postal code patterns inside the
    /// tagger's postal code spans.
    fn add_feature_flags(
        &self,
        country: &mut CandidateMatch,
        tagger: &TaggerOutput,
        text: &str,
        text_lower: &str,
    ) {
        if country.origin.is_empty() {
            return;
        }
        let Some(features) = self.gazetteer.features(&country.origin) else {
            return;
        };

        if features
            .phone_prefixes
            .iter()
            .any(|prefix| text.contains(prefix.as_str()))
        {
            country.flags.insert(Flag::PhonePrefixPresent);
        }

        if features
            .domain_extensions
            .iter()
            .any(|ext| text_lower.contains(ext.as_str()))
        {
            country.flags.insert(Flag::DomainPresent);
        }

        if let Some(regex) = &features.postal_code_regex {
            let mut postal_spans = tagger.spans_with_tag(Tag::PostalCode);
            if postal_spans.any(|span| regex.is_match(&span.text)) {
                country.flags.insert(Flag::PostalCodePresent);
            }
        }
    }
}

/// Flag countries whose code opens one of the extracted IBANs.
fn add_iban_flag(country: &mut CandidateMatch, ibans: &[String]) {
    if country.origin.is_empty() {
        return;
    }
    for iban in ibans {
        if iban.len() >= 2 && iban[..2].eq_ignore_ascii_case(&country.origin) {
            country.flags.insert(Flag::IbanPresent);
            break;
        }
    }
}

/// Grade how strongly the tagger's own country head backs this match.
fn add_tagger_agreement_flags(country: &mut CandidateMatch, tagger: &TaggerOutput) {
    if country.origin.is_empty() || tagger.country_code.as_deref() != Some(country.origin.as_str())
    {
        return;
    }
    let head_score = tagger.country_code_confidence * 100.0;
    if head_score >= 99.0 {
        country.flags.insert(Flag::TaggerStronglyAgrees);
    } else if head_score >= 90.0 {
        country.flags.insert(Flag::TaggerAgrees);
    } else if head_score >= 50.0 {
        country.flags.insert(Flag::TaggerDoesntDisagree);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use address_engine_core::{SpanPrediction, TaggedSpan};
    use address_engine_gazetteer::{CountryFeatures, GazetteerBuilder};
    use regex::Regex;

    fn store() -> GazetteerStore {
        GazetteerBuilder::new()
            .country("FRANCE", "FR")
            .provinces("US", &["IL", "CA", "TX"])
            .provinces("IT", &["RM", "MI"])
            .features(
                "FR",
                CountryFeatures {
                    phone_prefixes: vec!["+33".into(), "0033".into()],
                    domain_extensions: vec![".fr".into()],
                    postal_code_regex: Some(Regex::new(r"^\d{5}$").unwrap()),
                },
            )
            .build()
    }

    fn country(possibility: &str, origin: &str) -> CandidateMatch {
        CandidateMatch::new(0, possibility.len(), possibility, possibility, 0, origin)
    }

    fn postal_span(text: &str) -> SpanPrediction {
        SpanPrediction {
            span: TaggedSpan {
                start: 0,
                end: text.len(),
                tag: Tag::PostalCode,
            },
            confidence: 0.9,
            text: text.into(),
        }
    }

    #[test]
    fn test_iban_prefix_matches_origin() {
        let ibans = vec!["DE89370400440532013000".to_string()];

        let mut m = country("GERMANY", "DE");
        add_iban_flag(&mut m, &ibans);
        assert!(m.flags.contains(Flag::IbanPresent));

        let mut m = country("FRANCE", "FR");
        add_iban_flag(&mut m, &ibans);
        assert!(!m.flags.contains(Flag::IbanPresent));
    }

    #[test]
    fn test_province_alias_common_and_uncommon() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = CountryFlagger::new(&store, &config);

        // "IL" doubles as a US state code; US is a common-province country.
        let mut m = country("IL", "US");
        flagger.add_province_alias_flags(&mut m);
        assert!(m.flags.contains(Flag::CommonProvinceAlias));
        assert!(!m.flags.contains(Flag::UncommonProvinceAlias));

        // "RM" doubles as an Italian province code; IT is not.
        let mut m = country("RM", "IT");
        flagger.add_province_alias_flags(&mut m);
        assert!(m.flags.contains(Flag::UncommonProvinceAlias));

        // Not in the alias list.
        let mut m = country("ZZ", "US");
        flagger.add_province_alias_flags(&mut m);
        assert!(m.flags.is_empty());

        // Full names never count as province collisions.
        let mut m = country("TEXAS", "US");
        flagger.add_province_alias_flags(&mut m);
        assert!(m.flags.is_empty());
    }

    #[test]
    fn test_tagger_agreement_grades() {
        let tagger = |confidence: f64| TaggerOutput {
            country_code: Some("FR".into()),
            country_code_confidence: confidence,
            ..Default::default()
        };

        let mut m = country("FRANCE", "FR");
        add_tagger_agreement_flags(&mut m, &tagger(0.995));
        assert!(m.flags.contains(Flag::TaggerStronglyAgrees));

        let mut m = country("FRANCE", "FR");
        add_tagger_agreement_flags(&mut m, &tagger(0.92));
        assert!(m.flags.contains(Flag::TaggerAgrees));

        let mut m = country("FRANCE", "FR");
        add_tagger_agreement_flags(&mut m, &tagger(0.60));
        assert!(m.flags.contains(Flag::TaggerDoesntDisagree));

        let mut m = country("FRANCE", "FR");
        add_tagger_agreement_flags(&mut m, &tagger(0.30));
        assert!(m.flags.is_empty());

        // Head points elsewhere.
        let mut m = country("GERMANY", "DE");
        add_tagger_agreement_flags(&mut m, &tagger(0.995));
        assert!(m.flags.is_empty());
    }

    #[test]
    fn test_feature_flags() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = CountryFlagger::new(&store, &config);
        let tagger = TaggerOutput {
            spans: vec![postal_span("75001")],
            ..Default::default()
        };

        let text = "CONTACT +33 1 23 45 67 89 WWW.EXAMPLE.FR 75001 PARIS";
        let text_lower = text.to_lowercase();

        let mut countries = vec![country("FRANCE", "FR")];
        flagger.annotate(&mut countries, &tagger, text, &text_lower, &[]);
        assert!(countries[0].flags.contains(Flag::PhonePrefixPresent));
        assert!(countries[0].flags.contains(Flag::DomainPresent));
        assert!(countries[0].flags.contains(Flag::PostalCodePresent));
    }

    #[test]
    fn test_feature_flags_absent_evidence() {
        let store = store();
        let config = PostProcessConfig::default();
        let flagger = CountryFlagger::new(&store, &config);
        let tagger = TaggerOutput {
            spans: vec![postal_span("SW1A 1AA")],
            ..Default::default()
        };

        let text = "10 DOWNING STREET LONDON SW1A 1AA";
        let text_lower = text.to_lowercase();

        let mut countries = vec![country("FRANCE", "FR")];
        flagger.annotate(&mut countries, &tagger, text, &text_lower, &[]);
        assert!(countries[0].flags.is_empty());
    }
}
