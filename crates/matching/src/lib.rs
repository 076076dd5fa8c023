//! Candidate generation: fuzzy, exact, and postcode matching
//!
//! Features:
//! - Substring edit-distance alignment with per-end-position distances
//! - Batched fuzzy scanning over gazetteer alias tables on a worker pool
//! - Exact scanning (cutoff 100, tolerance 0) through the same scanner
//! - Tagger probability and emission span means applied onto matches
//! - Postcode scanning against per-origin pattern tables
//!
//! The scanners own no mutable gazetteer state; alias tables are borrowed
//! per call so one scanner instance serves every scan pass of a batch.

pub mod postcode;
pub mod scan;
pub mod similarity;
pub mod span_means;

pub use postcode::PostcodeScanner;
pub use scan::{FuzzyScanner, ScanStats};
pub use similarity::{align_substring, Occurrence, SubstringAlignment};
pub use span_means::apply_tagger_scores;
