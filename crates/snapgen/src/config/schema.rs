use serde::{Deserialize, Serialize};

use crate::extract::ExtractionRange;
use crate::inputs::catalog::DEFAULT_COMPANIES;

/// Runtime settings for ingestion, extraction and the input catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    /// Files larger than this are rejected before an entity is created.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    #[serde(default = "default_read_chunk_bytes")]
    pub read_chunk_bytes: usize,
    /// Cell separator used when serializing extracted spreadsheet rows.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Capacity of the ingestion and pipeline broadcast channels.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    #[serde(default)]
    pub ranges: RangesConfig,
    #[serde(default = "default_companies")]
    pub companies: Vec<String>,
    /// Number of past years offered besides the current one.
    #[serde(default = "default_year_window")]
    pub year_window: u16,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_max_upload_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_read_chunk_bytes() -> usize {
    64 * 1024
}

fn default_delimiter() -> char {
    ','
}

fn default_event_capacity() -> usize {
    100
}

fn default_companies() -> Vec<String> {
    DEFAULT_COMPANIES.iter().map(|c| c.to_string()).collect()
}

fn default_year_window() -> u16 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            max_upload_bytes: default_max_upload_bytes(),
            read_chunk_bytes: default_read_chunk_bytes(),
            delimiter: default_delimiter(),
            event_capacity: default_event_capacity(),
            ranges: RangesConfig::default(),
            companies: default_companies(),
            year_window: default_year_window(),
        }
    }
}

/// Fixed extraction ranges, one per spreadsheet category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangesConfig {
    #[serde(default = "ExtractionRange::quarterly_metrics")]
    pub metrics: ExtractionRange,
    #[serde(default = "ExtractionRange::consensus")]
    pub consensus: ExtractionRange,
}

impl Default for RangesConfig {
    fn default() -> Self {
        Self {
            metrics: ExtractionRange::quarterly_metrics(),
            consensus: ExtractionRange::consensus(),
        }
    }
}
