//! Scripted stand-ins for the generation and audit services.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{Barrier, Notify};

use snapgen::inputs::{ReportingPeriod, RequestInputs};
use snapgen::orchestrator::{
    AuditKind, AuditRequest, PromptPart, PromptTemplates, ServiceError, TextGenerator, Validator,
};

/// Raw content-audit JSON as the service would return it.
pub fn content_json(is_valid: bool, score: u32, feedback: &[&str]) -> String {
    json!({ "isValid": is_valid, "score": score, "feedback": feedback }).to_string()
}

/// Raw format-audit JSON as the service would return it.
pub fn format_json(is_valid: bool, score: u32, word_count: u32, feedback: &[&str]) -> String {
    json!({
        "isValid": is_valid,
        "score": score,
        "wordCount": word_count,
        "feedback": feedback
    })
    .to_string()
}

/// Returns queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, ServiceError>>>,
    calls: Mutex<Vec<Vec<PromptPart>>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, text: &str) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self, err: ServiceError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Vec<PromptPart>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Instruction text of the nth call.
    pub fn instruction(&self, call: usize) -> String {
        self.calls.lock().unwrap()[call]
            .last()
            .and_then(|p| p.as_text())
            .unwrap_or_default()
            .to_string()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, parts: Vec<PromptPart>) -> Result<String, ServiceError> {
        self.calls.lock().unwrap().push(parts);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Service("no scripted draft".to_string())))
    }
}

/// Queued responses per audit kind.
#[derive(Default)]
pub struct ScriptedValidator {
    content: Mutex<VecDeque<Result<String, ServiceError>>>,
    format: Mutex<VecDeque<Result<String, ServiceError>>>,
    requests: Mutex<Vec<AuditRequest>>,
}

impl ScriptedValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one passing pair of audits.
    pub fn passing(self) -> Self {
        self.content(&content_json(true, 100, &[]))
            .format(&format_json(true, 100, 650, &[]))
    }

    pub fn content(self, raw: &str) -> Self {
        self.content.lock().unwrap().push_back(Ok(raw.to_string()));
        self
    }

    pub fn content_fails(self, err: ServiceError) -> Self {
        self.content.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn format(self, raw: &str) -> Self {
        self.format.lock().unwrap().push_back(Ok(raw.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<AuditRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request(&self, kind: AuditKind) -> Option<AuditRequest> {
        self.requests().into_iter().find(|r| r.kind == kind)
    }
}

#[async_trait]
impl Validator for ScriptedValidator {
    async fn audit(&self, request: AuditRequest) -> Result<String, ServiceError> {
        let queue = match request.kind {
            AuditKind::Content => &self.content,
            AuditKind::Format => &self.format,
        };
        self.requests.lock().unwrap().push(request);
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Service("no scripted audit".to_string())))
    }
}

/// Blocks inside `generate` until released.
#[derive(Default)]
pub struct GatedGenerator {
    pub started: Notify,
    pub release: Notify,
}

#[async_trait]
impl TextGenerator for GatedGenerator {
    async fn generate(&self, _parts: Vec<PromptPart>) -> Result<String, ServiceError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok("gated draft".to_string())
    }
}

/// Answers each audit only after both audits have arrived, so a caller
/// that awaits them one after the other never gets a response.
pub struct RendezvousValidator {
    barrier: Barrier,
    content: String,
    format: String,
    arrivals: Mutex<Vec<AuditKind>>,
}

impl RendezvousValidator {
    pub fn new(content: &str, format: &str) -> Self {
        Self {
            barrier: Barrier::new(2),
            content: content.to_string(),
            format: format.to_string(),
            arrivals: Mutex::new(Vec::new()),
        }
    }

    pub fn arrivals(&self) -> Vec<AuditKind> {
        self.arrivals.lock().unwrap().clone()
    }
}

#[async_trait]
impl Validator for RendezvousValidator {
    async fn audit(&self, request: AuditRequest) -> Result<String, ServiceError> {
        self.arrivals.lock().unwrap().push(request.kind);
        self.barrier.wait().await;
        Ok(match request.kind {
            AuditKind::Content => self.content.clone(),
            AuditKind::Format => self.format.clone(),
        })
    }
}

/// Deterministic wording that echoes its arguments.
pub struct FixedTemplates;

impl PromptTemplates for FixedTemplates {
    fn generation(&self, inputs: &RequestInputs) -> String {
        format!(
            "Write the {} snapshot for {} prepared {}",
            inputs.period, inputs.company, inputs.prepared_date
        )
    }

    fn refinement(&self, original: &str, draft: &str, feedback: &[String]) -> String {
        format!(
            "{}\n--- DRAFT ---\n{}\n--- FIX ---\n{}",
            original,
            draft,
            feedback.join("\n")
        )
    }

    fn content_validation(&self, draft: &str, period: &ReportingPeriod) -> String {
        format!("Audit facts for {}:\n{}", period, draft)
    }

    fn format_validation(&self, draft: &str) -> String {
        format!("Audit layout:\n{}", draft)
    }
}
