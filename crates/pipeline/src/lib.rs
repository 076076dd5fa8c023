//! Batch extraction pipeline
//!
//! Features:
//! - Text cleaning shared with the external tagger (uppercase, ASCII fold)
//! - Length and tagger-shape validation with per-sample errors
//! - Batched country, code, and town scans plus per-sample extended scans
//! - Data-parallel post-processing with input order preserved
//! - JSONL record types and file helpers for batch tooling
//!
//! [`ExtractionEngine`] borrows an immutable [gazetteer
//! store](address_engine_gazetteer::GazetteerStore) and a settings set and
//! turns batches of [`TaggedSample`]s into ranked combinations.

pub mod engine;
pub mod io;

pub use engine::{clean_text, ExtractionEngine, SampleResult, TaggedSample};
pub use io::{read_records, write_records, CombinationRecord, InputRecord, OutputRecord};
