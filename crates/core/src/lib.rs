//! Core types for the address extraction engine
//!
//! This crate provides the foundational types shared by all other crates:
//! - Candidate matches produced by the fuzzy and postcode matchers
//! - Flag vocabularies (bitset-backed) attached to candidates
//! - Tagger output types delivered by the external sequence tagger
//! - Input samples and sentinel constructors
//! - Error types

pub mod error;
pub mod flags;
pub mod matches;
pub mod sample;
pub mod tagger;

pub use error::{Error, PipelineError, Result};
pub use flags::{Flag, FlagSet};
pub use matches::{CandidateMatch, CombinationCandidate, PostcodeMatch, NO_COUNTRY, NO_TOWN};
pub use sample::AddressSample;
pub use tagger::{SpanPrediction, Tag, TaggedSpan, TaggerOutput};
