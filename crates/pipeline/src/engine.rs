//! Batch extraction engine
//!
//! Wires the full per-batch sequence: text cleaning and validation, the
//! three batched gazetteer scans, the per-sample extended-town and
//! postcode scans, and post-processing. Batches keep input order; a
//! sample that fails validation yields an error in its slot without
//! disturbing its neighbours.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::debug;

use address_engine_config::Settings;
use address_engine_core::{
    AddressSample, CandidateMatch, Error, PipelineError, Result, TaggerOutput,
};
use address_engine_gazetteer::{fold_ascii, GazetteerStore};
use address_engine_matching::{FuzzyScanner, PostcodeScanner};
use address_engine_postprocess::{CandidateLists, PostProcessOutput, PostProcessor};

/// One input sample together with the external tagger's output for it.
///
/// The tagger must have run on [`clean_text`] of the sample, so its arrays
/// and span offsets line up with the text the engine scans.
#[derive(Debug, Clone)]
pub struct TaggedSample {
    pub sample: AddressSample,
    pub tagger: TaggerOutput,
}

/// Everything produced for one sample.
#[derive(Debug, Clone)]
pub struct SampleResult {
    /// The input sample as read.
    pub sample: AddressSample,
    /// Cleaned text all offsets in the result refer to.
    pub text: String,
    pub result: PostProcessOutput,
}

#[derive(Debug)]
struct PreparedSample {
    sample: AddressSample,
    text: String,
    tagger: TaggerOutput,
    suggestion: Option<String>,
    force: bool,
}

struct WorkItem {
    slot: usize,
    prepared: PreparedSample,
    countries: Vec<CandidateMatch>,
    country_codes: Vec<CandidateMatch>,
    towns: Vec<CandidateMatch>,
}

/// Normalize a raw address for scanning: literal `\n` sequences become
/// real newlines, carriage returns are dropped, and the text is
/// uppercased and folded to ASCII. The output is pure ASCII, so byte
/// offsets and character offsets coincide everywhere downstream.
///
/// The external tagger must consume exactly this form; the engine
/// validates its array lengths against the cleaned text.
pub fn clean_text(raw: &str) -> String {
    fold_ascii(&raw.replace("\\n", "\n").replace('\r', "").to_uppercase())
}

/// Batch extraction engine over one gazetteer and one settings set.
pub struct ExtractionEngine<'a> {
    store: &'a GazetteerStore,
    settings: &'a Settings,
    scanner: FuzzyScanner,
    postcode_scanner: PostcodeScanner<'a>,
    postprocessor: PostProcessor<'a>,
}

impl<'a> ExtractionEngine<'a> {
    pub fn new(store: &'a GazetteerStore, settings: &'a Settings) -> Result<Self> {
        let scanner = FuzzyScanner::new(settings.matcher.clone())?;
        let postcode_scanner = PostcodeScanner::new(&store.postcode_tables);
        let postprocessor = PostProcessor::new(store, &settings.postprocess)?;
        Ok(ExtractionEngine {
            store,
            settings,
            scanner,
            postcode_scanner,
            postprocessor,
        })
    }

    /// Process one batch. The output has one entry per input, in input
    /// order; samples that fail cleaning-stage validation carry their
    /// error while the rest of the batch proceeds.
    pub fn process_batch(&self, inputs: &[TaggedSample]) -> Vec<Result<SampleResult>> {
        let mut slots: Vec<Option<Result<SampleResult>>> = Vec::with_capacity(inputs.len());
        let mut accepted: Vec<(usize, PreparedSample)> = Vec::new();
        for (slot, input) in inputs.iter().enumerate() {
            match self.prepare(input) {
                Ok(prepared) => {
                    slots.push(None);
                    accepted.push((slot, prepared));
                }
                Err(e) => slots.push(Some(Err(e))),
            }
        }
        debug!(
            batch = inputs.len(),
            accepted = accepted.len(),
            "batch cleaned and validated"
        );

        let texts: Vec<String> = accepted.iter().map(|(_, p)| p.text.clone()).collect();
        let name_lists = self.scanner.scan_batch(&texts, &self.store.country_names);
        let code_lists = self
            .scanner
            .scan_batch_with(&texts, &self.store.country_codes, 100.0, 0);
        let town_lists = self.scanner.scan_batch(&texts, &self.store.town_names);

        let mut items = Vec::with_capacity(accepted.len());
        for ((((slot, prepared), countries), country_codes), towns) in accepted
            .into_iter()
            .zip(name_lists)
            .zip(code_lists)
            .zip(town_lists)
        {
            items.push(WorkItem {
                slot,
                prepared,
                countries,
                country_codes,
                towns,
            });
        }

        // Extended-town scans, postcode scans, and post-processing have no
        // cross-sample dependencies; each worker owns its item outright.
        let processed: Vec<(usize, SampleResult)> = items
            .into_par_iter()
            .map(|item| (item.slot, self.process_item(item)))
            .collect();
        for (slot, result) in processed {
            slots[slot] = Some(Ok(result));
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(Error::other("batch slot left unfilled"))))
            .collect()
    }

    /// Clean and validate one sample against the configured limits and
    /// the tagger array shapes. Tagger spans are sorted by start here;
    /// downstream annotators rely on that order.
    fn prepare(&self, input: &TaggedSample) -> Result<PreparedSample> {
        let text = clean_text(&input.sample.text);
        let max = self.settings.pipeline.max_text_length;
        if text.len() > max {
            return Err(PipelineError::TextTooLong {
                length: text.len(),
                max,
            }
            .into());
        }

        let mut tagger = input.tagger.clone();
        validate_tagger_arrays(&tagger, text.len())?;
        tagger.spans.sort_by_key(|p| p.span.start);

        let suggestion = input
            .sample
            .suggested_country
            .as_deref()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty());

        Ok(PreparedSample {
            sample: input.sample.clone(),
            text,
            tagger,
            suggestion,
            force: input.sample.force_suggested_country,
        })
    }

    fn process_item(&self, item: WorkItem) -> SampleResult {
        let WorkItem {
            prepared,
            countries,
            country_codes,
            towns,
            ..
        } = item;

        let extended_towns = self.scan_extended(&prepared, &countries, &country_codes);
        let postcodes = self.postcode_scanner.scan(&prepared.text);
        let candidates = CandidateLists {
            countries,
            country_codes,
            towns,
            extended_towns,
        };
        let result = self.postprocessor.process(
            &prepared.text,
            &prepared.tagger,
            candidates,
            &postcodes,
            prepared.suggestion.as_deref(),
            prepared.force,
        );
        SampleResult {
            sample: prepared.sample,
            text: prepared.text,
            result,
        }
    }

    /// Scan the extended town tables of every origin in play for this
    /// sample: origins of found country and code matches, the always-on
    /// override origins, and the suggested country if any.
    fn scan_extended(
        &self,
        prepared: &PreparedSample,
        countries: &[CandidateMatch],
        codes: &[CandidateMatch],
    ) -> Vec<CandidateMatch> {
        let mut origins: BTreeSet<&str> = countries
            .iter()
            .chain(codes.iter())
            .map(|m| m.origin.as_str())
            .collect();
        for origin in &self.store.country_overrides {
            origins.insert(origin);
        }
        if let Some(code) = prepared.suggestion.as_deref() {
            origins.insert(code);
        }

        let table = self.store.extended_towns_for(origins);
        if table.is_empty() {
            return Vec::new();
        }
        self.scanner.scan_text(&prepared.text, &table)
    }
}

fn validate_tagger_arrays(tagger: &TaggerOutput, expected: usize) -> Result<()> {
    for actual in [
        tagger.country_probabilities.len(),
        tagger.country_emissions.len(),
        tagger.town_probabilities.len(),
        tagger.town_emissions.len(),
    ] {
        if actual != expected {
            return Err(PipelineError::TaggerShapeMismatch { expected, actual }.into());
        }
    }
    Ok(())
}
