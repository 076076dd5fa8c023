//! Cross-list flags tying town and country matches together
//!
//! A town and a country corroborate each other when they share an origin
//! and sit close together in the text. These flags are the strongest
//! signal the scorer has, so the pair check is deliberately conservative:
//! fuzzy matches, matches inside other words, and short-and-buried
//! country hits never form a pair.

use address_engine_config::constants::proximity::VERY_CLOSE_GAP;
use address_engine_core::{CandidateMatch, Flag, Tag, TaggerOutput};

/// Run the pair check over every town/country combination, then mark
/// towns whose origin the tagger's country head already picked.
pub fn flag_relationships(
    towns: &mut [CandidateMatch],
    countries: &mut [CandidateMatch],
    text: &str,
    country_head: Option<&str>,
) {
    for town in towns.iter_mut() {
        for country in countries.iter_mut() {
            check_pair(town, country, text);
        }
        if country_head == Some(town.origin.as_str()) {
            town.flags.insert(Flag::TaggerCountryPresent);
        }
    }
}

/// Flag matches whose text also appears inside a tagger span of the
/// opposite kind: a town matched inside a country span (or vice versa)
/// is a plausible tagger confusion rather than a random hit.
pub fn flag_reasonable_mistakes(
    towns: &mut [CandidateMatch],
    countries: &mut [CandidateMatch],
    tagger: &TaggerOutput,
) {
    for town in towns.iter_mut() {
        if tagger
            .spans_with_tag(Tag::Country)
            .any(|span| span.text.contains(town.matched_text.as_str()))
        {
            town.flags.insert(Flag::ReasonableMistake);
        }
    }
    for country in countries.iter_mut() {
        if tagger
            .spans_with_tag(Tag::Town)
            .any(|span| span.text.contains(country.matched_text.as_str()))
        {
            country.flags.insert(Flag::ReasonableMistake);
        }
    }
}

fn check_pair(town: &mut CandidateMatch, country: &mut CandidateMatch, text: &str) {
    if country.edit_distance > 0
        || town.edit_distance > 0
        || town.flags.contains(Flag::InsideAnotherWord)
    {
        return;
    }
    if country.flags.contains(Flag::Short) && country.flags.contains(Flag::InsideAnotherWord) {
        return;
    }
    if country.origin.is_empty() || country.origin != town.origin {
        return;
    }

    let extended = town.flags.contains(Flag::FromExtendedData);
    if country
        .flags
        .contains_any([Flag::SuggestedCountry, Flag::GeneratedBySuggestedCountry])
    {
        town.flags.insert(Flag::SuggestedCountryPresent);
    }
    town.flags.insert(Flag::CountryPresent);
    if !extended {
        country.flags.insert(Flag::TownPresent);
    }

    // Province-alias countries keep the presence flags but are too
    // ambiguous for proximity evidence.
    if country
        .flags
        .contains_any([Flag::CommonProvinceAlias, Flag::UncommonProvinceAlias])
    {
        return;
    }

    // Synthetic matches sit past the end of the text, so the range can be
    // out of bounds; an empty gap is correct there because the proximity
    // flags below are gated off for them anyway.
    let gap = if town.start <= country.start {
        text.get(town.end..country.start)
    } else {
        text.get(country.end..town.start)
    }
    .unwrap_or("");

    let generated = country.flags.contains(Flag::GeneratedBySuggestedCountry);
    if gap.len() <= VERY_CLOSE_GAP && !generated {
        town.flags.insert(Flag::VeryCloseToCountry);
        if !extended {
            country.flags.insert(Flag::VeryCloseToTown);
        }
    }
    if !gap.contains('\n') && !generated {
        town.flags.insert(Flag::SameLineAsCountry);
        if !extended {
            country.flags.insert(Flag::SameLineAsTown);
        }
    }
}
