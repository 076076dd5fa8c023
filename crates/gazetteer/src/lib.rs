//! Gazetteer lookup tables for address extraction
//!
//! Features:
//! - Country name, ISO code, and town alias tables with multi-origin fan-out
//! - Extended per-country town tables loaded on demand
//! - Town population and dominant-origin metadata
//! - Province alias lists and per-country feature hints (phone, domain, postal)
//! - Postcode pattern tables with compiled regexes
//! - ASCII folding and separator/"Saint" alias generation
//! - Directory loader for JSON table files plus a builder for in-memory stores
//!
//! Tables are loaded once at startup and shared immutably across workers.

pub mod normalize;
pub mod store;

pub use normalize::{fold_ascii, generate_aliases, lookup_key, saint_aliases, separator_aliases};
pub use store::{CountryFeatures, GazetteerBuilder, GazetteerStore, PostcodePattern, PostcodeTable};

use std::path::PathBuf;

use thiserror::Error;

/// Gazetteer errors
#[derive(Error, Debug)]
pub enum GazetteerError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Missing required table: {0}")]
    MissingTable(String),
}

impl From<GazetteerError> for address_engine_core::Error {
    fn from(err: GazetteerError) -> Self {
        address_engine_core::Error::Gazetteer(err.to_string())
    }
}
