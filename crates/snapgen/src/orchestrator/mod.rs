//! The generate / validate / refine pipeline.
//!
//! [`GenerationOrchestrator`] reads snapshots of the request inputs, drives
//! the [`TextGenerator`] and [`Validator`] collaborators and owns the
//! resulting [`RunState`]. Phase changes and export signals are broadcast as
//! [`PipelineEvent`]s.

pub mod collaborator;
pub mod error;
pub mod phase;
pub mod progress;
pub mod request;
pub mod runner;
pub mod text;

pub use collaborator::{AuditKind, AuditRequest, PromptPart, PromptTemplates, TextGenerator, Validator};
pub use error::{OrchestratorError, ServiceError, QUOTA_EXCEEDED_MESSAGE, UNEXPECTED_ERROR_MESSAGE};
pub use phase::Phase;
pub use progress::{PipelineEvent, PipelineEventBroadcaster};
pub use runner::{GenerationMode, GenerationOrchestrator, RunOutcome, RunState};
pub use text::{clean_generated_text, NO_TEXT_GENERATED, NO_TEXT_REFINED};
