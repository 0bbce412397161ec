//! Seams to the AI service and to the prompt wording.

use async_trait::async_trait;

use super::error::ServiceError;
use crate::inputs::{ReportingPeriod, RequestInputs};

/// One element of a multi-part request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    Attachment {
        mime_type: String,
        data_base64: String,
    },
}

impl PromptPart {
    pub fn text(text: impl Into<String>) -> Self {
        PromptPart::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PromptPart::Text(text) => Some(text),
            PromptPart::Attachment { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditKind {
    /// Facts checked against the attached documents and spreadsheet data.
    Content,
    /// Layout and length checked against the draft alone.
    Format,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRequest {
    pub kind: AuditKind,
    pub parts: Vec<PromptPart>,
}

/// Generation and refinement client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, parts: Vec<PromptPart>) -> Result<String, ServiceError>;
}

/// Audit client. Returns the raw JSON text of the audit verdict.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn audit(&self, request: AuditRequest) -> Result<String, ServiceError>;
}

/// Prompt wording supplied by the embedding application.
pub trait PromptTemplates: Send + Sync {
    fn generation(&self, inputs: &RequestInputs) -> String;

    fn refinement(&self, original: &str, draft: &str, feedback: &[String]) -> String;

    fn content_validation(&self, draft: &str, period: &ReportingPeriod) -> String;

    fn format_validation(&self, draft: &str) -> String;
}
