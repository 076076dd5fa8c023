//! Pipeline configuration

use serde::{Deserialize, Serialize};

use crate::constants::pipeline;

/// Configuration for batch processing and I/O paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of samples processed per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Cleaned texts longer than this are rejected up front.
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Directory holding the gazetteer JSON tables.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Input JSONL file, one sample per line.
    #[serde(default = "default_input_path")]
    pub input_path: String,

    /// Output JSONL file, one result per line.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

fn default_batch_size() -> usize {
    pipeline::DEFAULT_BATCH_SIZE
}

fn default_max_text_length() -> usize {
    pipeline::MAX_TEXT_LENGTH
}

fn default_data_dir() -> String {
    "data/gazetteer".to_string()
}

fn default_input_path() -> String {
    "data/addresses.jsonl".to_string()
}

fn default_output_path() -> String {
    "out/structured.jsonl".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_text_length: default_max_text_length(),
            data_dir: default_data_dir(),
            input_path: default_input_path(),
            output_path: default_output_path(),
        }
    }
}
