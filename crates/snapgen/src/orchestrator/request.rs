//! Assembly of the multi-part requests sent to the collaborators.
//!
//! Attachments always precede the instruction text: analyst reports first,
//! then transcripts, skipping anything that has not finished uploading.

use super::collaborator::{AuditKind, AuditRequest, PromptPart, PromptTemplates};
use crate::inputs::RequestInputs;

pub const METRICS_BLOCK_LABEL: &str = "[OFFICIAL QUARTERLY METRICS DATA FOR SECTION E VERIFICATION]";
pub const CONSENSUS_BLOCK_LABEL: &str = "[OFFICIAL CONSENSUS DATA FOR SECTION E VERIFICATION]";

pub fn attachment_parts(inputs: &RequestInputs) -> Vec<PromptPart> {
    inputs
        .completed_files()
        .map(|file| PromptPart::Attachment {
            mime_type: file.mime_type.clone(),
            data_base64: file.data.clone(),
        })
        .collect()
}

fn with_instruction(inputs: &RequestInputs, instruction: String) -> Vec<PromptPart> {
    let mut parts = attachment_parts(inputs);
    parts.push(PromptPart::Text(instruction));
    parts
}

pub fn generation_parts(inputs: &RequestInputs, templates: &dyn PromptTemplates) -> Vec<PromptPart> {
    with_instruction(inputs, templates.generation(inputs))
}

pub fn refinement_parts(
    inputs: &RequestInputs,
    templates: &dyn PromptTemplates,
    draft: &str,
    feedback: &[String],
) -> Vec<PromptPart> {
    let original = templates.generation(inputs);
    with_instruction(inputs, templates.refinement(&original, draft, feedback))
}

fn append_block(prompt: &mut String, label: &str, context: Option<&str>) {
    if let Some(context) = context.filter(|c| !c.is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(label);
        prompt.push_str(":\n");
        prompt.push_str(context);
        prompt.push('\n');
    }
}

/// Content audit: the attachments plus the instruction with the spreadsheet
/// contexts appended.
pub fn content_audit_request(
    inputs: &RequestInputs,
    templates: &dyn PromptTemplates,
    draft: &str,
) -> AuditRequest {
    let mut prompt = templates.content_validation(draft, &inputs.period);
    append_block(&mut prompt, METRICS_BLOCK_LABEL, inputs.metrics.context.as_deref());
    append_block(&mut prompt, CONSENSUS_BLOCK_LABEL, inputs.consensus.context.as_deref());

    AuditRequest {
        kind: AuditKind::Content,
        parts: with_instruction(inputs, prompt),
    }
}

/// Format audit: the instruction alone.
pub fn format_audit_request(templates: &dyn PromptTemplates, draft: &str) -> AuditRequest {
    AuditRequest {
        kind: AuditKind::Format,
        parts: vec![PromptPart::Text(templates.format_validation(draft))],
    }
}
