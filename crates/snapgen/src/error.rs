use std::path::PathBuf;
use thiserror::Error;

use crate::inputs::FileCategory;

#[derive(Error, Debug)]
pub enum SnapgenError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Pipeline error: {0}")]
    Orchestrator(#[from] crate::orchestrator::OrchestratorError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("File {name} is too large ({size} bytes, max {limit} bytes)")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("Failed to read '{name}': {message}")]
    Read { name: String, message: String },

    #[error("Upload was cancelled")]
    Aborted,

    #[error("No {category} file with id {id}")]
    UnknownFile { id: String, category: FileCategory },

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Could not find 'Metrics' sheet or sheet for {entity}")]
    SheetNotFound { entity: String },

    #[error("Failed to parse workbook: {0}")]
    Workbook(String),

    #[error("Invalid cell range: {0}")]
    InvalidRange(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown company: {0}")]
    UnknownCompany(String),

    #[error("Invalid reporting period: {0}")]
    InvalidPeriod(String),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Empty audit response")]
    Empty,

    #[error("Malformed audit response: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SnapgenError>;
