//! JSONL input and output records
//!
//! One JSON object per line in both directions. Input records carry the
//! raw address, the optional suggestion columns, and the external
//! tagger's output for the cleaned form of the text. Output records echo
//! the sample alongside the ranked combinations and the full annotated
//! candidate lists.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use address_engine_core::{AddressSample, CandidateMatch, CombinationCandidate, Error, Result, TaggerOutput};

use crate::engine::{SampleResult, TaggedSample};

/// String values accepted as "true" for the force column, lowercased.
const FORCED_FLAG_VALUES: [&str; 4] = ["true", "1", "yes", "y"];

/// One input line. `address` is accepted as an alias for `text`; the
/// force flag tolerates booleans, numbers, and the usual truthy strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRecord {
    #[serde(alias = "address")]
    pub text: String,
    #[serde(default)]
    pub suggested_country: Option<String>,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub force_suggested_country: bool,
    #[serde(default)]
    pub tagger: TaggerOutput,
}

impl InputRecord {
    pub fn into_sample(self) -> TaggedSample {
        TaggedSample {
            sample: AddressSample {
                text: self.text,
                suggested_country: self.suggested_country,
                force_suggested_country: self.force_suggested_country,
            },
            tagger: self.tagger,
        }
    }
}

fn deserialize_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(truthy(&value))
}

fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        serde_json::Value::String(s) => FORCED_FLAG_VALUES.contains(&s.to_lowercase().as_str()),
        _ => false,
    }
}

/// One ranked combination in reader-facing form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationRecord {
    /// Resolved country code, or the no-country sentinel.
    pub country_code: String,
    /// Country text as matched, newlines stripped.
    pub country_text: String,
    pub country_confidence: f64,
    /// Resolved town name, or the no-town sentinel.
    pub town: String,
    pub town_text: String,
    pub town_confidence: f64,
    /// Country code implied by the town's gazetteer entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_country: Option<String>,
    pub score: f64,
}

impl CombinationRecord {
    pub fn from_combination(combination: &CombinationCandidate, show_inferred: bool) -> Self {
        let inferred_country = if show_inferred && !combination.town.origin.is_empty() {
            Some(combination.town.origin.clone())
        } else {
            None
        };
        CombinationRecord {
            country_code: combination.country.origin.clone(),
            country_text: combination.country.matched_text.replace('\n', ""),
            country_confidence: combination.country.score(),
            town: combination.town.possibility.clone(),
            town_text: combination.town.matched_text.replace('\n', ""),
            town_confidence: combination.town.score(),
            inferred_country,
            score: combination.score,
        }
    }
}

/// One output line for one processed sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Cleaned text all spans in the record refer to.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_country: Option<String>,
    #[serde(default)]
    pub force_suggested_country: bool,
    pub combinations: Vec<CombinationRecord>,
    pub ibans: Vec<String>,
    /// Annotated country candidates, parallel to `combinations`.
    pub country_matches: Vec<CandidateMatch>,
    /// Annotated town candidates, parallel to `combinations`.
    pub town_matches: Vec<CandidateMatch>,
}

impl OutputRecord {
    pub fn from_result(result: &SampleResult, show_inferred: bool) -> Self {
        let combinations = result
            .result
            .combinations
            .iter()
            .map(|c| CombinationRecord::from_combination(c, show_inferred))
            .collect();
        OutputRecord {
            address: result.text.clone(),
            suggested_country: result.sample.suggested_country.clone(),
            force_suggested_country: result.sample.force_suggested_country,
            combinations,
            ibans: result.result.ibans.clone(),
            country_matches: result.result.countries.clone(),
            town_matches: result.result.towns.clone(),
        }
    }
}

/// Read every record from a JSONL file. Blank lines are skipped; a
/// malformed line fails the whole read with its line number.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<InputRecord>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: InputRecord = serde_json::from_str(&line)
            .map_err(|e| Error::other(format!("invalid record on line {}: {e}", index + 1)))?;
        records.push(record);
    }
    Ok(records)
}

/// Write records as JSONL, one object per line.
pub fn write_records(path: impl AsRef<Path>, records: &[OutputRecord]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
