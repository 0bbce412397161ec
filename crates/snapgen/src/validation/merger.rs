use serde::Serialize;

use super::audit::{ContentAudit, FormatAudit};

/// Score a draft must reach to skip refinement.
pub const PASSING_SCORE: u8 = 100;

/// Combined verdict of both audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub score: u8,
    pub word_count: u32,
    /// `[CONTENT] ` items first, then `[FORMAT] ` items.
    pub feedback: Vec<String>,
}

impl ValidationResult {
    pub fn needs_refinement(&self) -> bool {
        !self.is_valid || self.score < PASSING_SCORE
    }
}

/// Merges the two audits. The lower score wins and both must pass.
pub fn merge(content: ContentAudit, format: FormatAudit) -> ValidationResult {
    let feedback = content
        .feedback
        .into_iter()
        .map(|item| format!("[CONTENT] {}", item))
        .chain(
            format
                .feedback
                .into_iter()
                .map(|item| format!("[FORMAT] {}", item)),
        )
        .collect();

    ValidationResult {
        is_valid: content.is_valid && format.is_valid,
        score: content.score.min(format.score).min(100),
        word_count: format.word_count,
        feedback,
    }
}
