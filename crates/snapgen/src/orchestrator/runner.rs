use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::collaborator::{PromptTemplates, TextGenerator, Validator};
use super::error::{OrchestratorError, ServiceError};
use super::phase::Phase;
use super::progress::{PipelineEvent, PipelineEventBroadcaster};
use super::request;
use super::text::{clean_generated_text, NO_TEXT_GENERATED, NO_TEXT_REFINED};
use crate::config::Config;
use crate::inputs::{InputStore, RequestInputs};
use crate::validation::{merge, ContentAudit, FormatAudit, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Generate, validate and refine if needed, then signal export.
    Auto,
    /// Generate a draft only.
    Manual,
}

/// Observable state of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub phase: Phase,
    pub draft: String,
    pub validation: Option<ValidationResult>,
    pub error: Option<String>,
    /// Number of "ready for export" signals emitted so far.
    pub export_signals: u64,
}

/// How an operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Manual generation produced a draft.
    Generated,
    /// Auto run finished and signalled export.
    ExportReady,
    Validated(ValidationResult),
    Refined,
    /// Preconditions were not met; nothing happened.
    Skipped,
}

/// Holds the busy flag for one operation. Releasing it while a busy phase is
/// still recorded means the operation's future was dropped mid-call.
struct BusyGuard<'a>(&'a GenerationOrchestrator);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.settle_abandoned();
        self.0.busy.store(false, Ordering::Release);
    }
}

/// The generate / validate / refine state machine.
///
/// Only one operation runs at a time; overlapping calls fail with
/// [`OrchestratorError::Busy`] and leave the state untouched.
pub struct GenerationOrchestrator {
    store: Arc<InputStore>,
    generator: Arc<dyn TextGenerator>,
    validator: Arc<dyn Validator>,
    templates: Arc<dyn PromptTemplates>,
    state: Mutex<RunState>,
    busy: AtomicBool,
    events: PipelineEventBroadcaster,
}

impl GenerationOrchestrator {
    pub fn new(
        config: &Config,
        store: Arc<InputStore>,
        generator: Arc<dyn TextGenerator>,
        validator: Arc<dyn Validator>,
        templates: Arc<dyn PromptTemplates>,
    ) -> Self {
        Self {
            store,
            generator,
            validator,
            templates,
            state: Mutex::new(RunState::default()),
            busy: AtomicBool::new(false),
            events: PipelineEventBroadcaster::new(config.event_capacity),
        }
    }

    pub fn snapshot(&self) -> RunState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                log::warn!("Run state lock was poisoned, recovering");
                poisoned.into_inner().clone()
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.snapshot().phase
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, OrchestratorError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(self))
            .map_err(|_| OrchestratorError::Busy)
    }

    /// Replaces the state with an updated copy and announces phase changes.
    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut RunState),
    {
        let (from, to) = {
            let mut guard = match self.state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    log::warn!("Run state lock was poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            let mut next = guard.clone();
            f(&mut next);
            let from = guard.phase;
            *guard = next;
            (from, guard.phase)
        };

        if from != to {
            info!("Phase {} -> {}", from, to);
            self.events.send(PipelineEvent::PhaseChanged {
                from,
                to,
                timestamp: Utc::now(),
            });
        }
    }

    /// Leaves a busy phase after an abandoned call: back to `Generated` when a
    /// draft exists, otherwise `Idle`.
    fn settle_abandoned(&self) {
        if !self.phase().is_busy() {
            return;
        }
        warn!("Operation dropped before it finished");
        self.update(|s| {
            if s.phase.is_busy() {
                s.phase = if s.draft.is_empty() {
                    Phase::Idle
                } else {
                    Phase::Generated
                };
            }
        });
    }

    fn enter(&self, phase: Phase) {
        self.update(|s| s.phase = phase);
    }

    /// Records a collaborator failure. The draft is kept.
    fn fail(&self, err: ServiceError) -> OrchestratorError {
        let message = err.friendly_message();
        error!("AI service call failed: {}", err);
        self.update(|s| {
            s.error = Some(message);
            s.phase = Phase::Error;
        });
        OrchestratorError::Service(err)
    }

    fn signal_export(&self) {
        let mut signal = 0;
        self.update(|s| {
            s.export_signals += 1;
            signal = s.export_signals;
        });
        info!("Draft ready for export");
        self.events.send(PipelineEvent::ExportReady {
            signal,
            timestamp: Utc::now(),
        });
    }

    /// Generates a fresh draft from the current inputs. In auto mode the draft
    /// is validated and, unless it scores a clean 100, refined once.
    pub async fn generate(&self, mode: GenerationMode) -> Result<RunOutcome, OrchestratorError> {
        let _guard = self.acquire()?;
        let inputs = self.store.snapshot();
        let span = info_span!("generate", mode = ?mode, company = %inputs.company);
        self.run_generate(mode, inputs).instrument(span).await
    }

    async fn run_generate(
        &self,
        mode: GenerationMode,
        inputs: RequestInputs,
    ) -> Result<RunOutcome, OrchestratorError> {
        self.update(|s| {
            s.validation = None;
            s.error = None;
            s.draft.clear();
            s.phase = Phase::Generating;
        });

        let draft = self
            .generate_draft(&inputs)
            .await
            .map_err(|e| self.fail(e))?;
        self.update(|s| s.draft = draft.clone());

        if mode == GenerationMode::Manual {
            self.enter(Phase::Generated);
            return Ok(RunOutcome::Generated);
        }

        self.enter(Phase::Validating);
        let result = self
            .merged_validation(&inputs, &draft)
            .await
            .map_err(|e| self.fail(e))?;
        let needs_refinement = result.needs_refinement();
        self.update(|s| s.validation = Some(result.clone()));

        if needs_refinement {
            debug!(
                "Score {} (valid: {}), refining with {} feedback items",
                result.score,
                result.is_valid,
                result.feedback.len()
            );
            self.enter(Phase::Refining);
            let refined = self
                .refine_draft(&inputs, &draft, &result.feedback)
                .await
                .map_err(|e| self.fail(e))?;
            self.update(|s| {
                s.draft = refined;
                s.validation = None;
            });
        }

        self.enter(Phase::Generated);
        self.signal_export();
        Ok(RunOutcome::ExportReady)
    }

    /// Audits the current draft. Skipped when there is no draft.
    pub async fn validate_only(&self) -> Result<RunOutcome, OrchestratorError> {
        let _guard = self.acquire()?;
        let draft = self.snapshot().draft;
        if draft.is_empty() {
            debug!("Nothing to validate");
            return Ok(RunOutcome::Skipped);
        }

        let inputs = self.store.snapshot();
        let span = info_span!("validate", company = %inputs.company);
        async {
            self.update(|s| {
                s.error = None;
                s.phase = Phase::Validating;
            });
            let result = self
                .merged_validation(&inputs, &draft)
                .await
                .map_err(|e| self.fail(e))?;
            self.update(|s| {
                s.validation = Some(result.clone());
                s.phase = Phase::Validated;
            });
            Ok::<_, OrchestratorError>(RunOutcome::Validated(result))
        }
        .instrument(span)
        .await
    }

    /// Refines the current draft with the stored feedback. Skipped unless both
    /// a draft and a validation result exist.
    pub async fn refine_only(&self) -> Result<RunOutcome, OrchestratorError> {
        let _guard = self.acquire()?;
        let current = self.snapshot();
        let Some(validation) = current.validation.filter(|_| !current.draft.is_empty()) else {
            debug!("Nothing to refine");
            return Ok(RunOutcome::Skipped);
        };

        let inputs = self.store.snapshot();
        let span = info_span!("refine", company = %inputs.company);
        async {
            self.update(|s| {
                s.error = None;
                s.phase = Phase::Refining;
            });
            let refined = self
                .refine_draft(&inputs, &current.draft, &validation.feedback)
                .await
                .map_err(|e| self.fail(e))?;
            self.update(|s| {
                s.draft = refined;
                s.validation = None;
                s.phase = Phase::Generated;
            });
            Ok::<_, OrchestratorError>(RunOutcome::Refined)
        }
        .instrument(span)
        .await
    }

    async fn generate_draft(&self, inputs: &RequestInputs) -> Result<String, ServiceError> {
        let parts = request::generation_parts(inputs, self.templates.as_ref());
        debug!("Requesting draft with {} parts", parts.len());
        let raw = self.generator.generate(parts).await?;
        Ok(clean_generated_text(&raw, NO_TEXT_GENERATED))
    }

    async fn refine_draft(
        &self,
        inputs: &RequestInputs,
        draft: &str,
        feedback: &[String],
    ) -> Result<String, ServiceError> {
        let parts = request::refinement_parts(inputs, self.templates.as_ref(), draft, feedback);
        let raw = self.generator.generate(parts).await?;
        Ok(clean_generated_text(&raw, NO_TEXT_REFINED))
    }

    /// Runs both audits concurrently and merges them.
    async fn merged_validation(
        &self,
        inputs: &RequestInputs,
        draft: &str,
    ) -> Result<ValidationResult, ServiceError> {
        let content_request = request::content_audit_request(inputs, self.templates.as_ref(), draft);
        let format_request = request::format_audit_request(self.templates.as_ref(), draft);

        let (content, format) = tokio::join!(
            self.validator.audit(content_request),
            self.validator.audit(format_request)
        );

        let result = merge(ContentAudit::parse(&content?), FormatAudit::parse(&format?));
        info!(
            "Validation score {} (valid: {}, {} words)",
            result.score, result.is_valid, result.word_count
        );
        Ok(result)
    }
}
