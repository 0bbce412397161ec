pub mod config;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod inputs;
pub mod orchestrator;
pub mod sanitize;
pub mod session;
pub mod telemetry;
pub mod validation;

pub use config::{load_config, load_config_from_str, Config};
pub use error::{
    ConfigError, ExtractError, IngestError, InputError, ParseError, Result, SnapgenError,
};
pub use extract::{extract, ExtractionRange, SpreadsheetCategory, Workbook};
pub use ingest::{FileIngestionPipeline, IngestBatch, IngestEvent, PendingFile, ReadOutcome};
pub use inputs::{FileCategory, InputStore, Quarter, ReportingPeriod, RequestInputs, UploadedFile};
pub use orchestrator::{
    GenerationMode, GenerationOrchestrator, OrchestratorError, Phase, PipelineEvent,
    PromptTemplates, RunOutcome, RunState, ServiceError, TextGenerator, Validator,
};
pub use session::Session;
pub use validation::{merge, ValidationResult};
