//! Integration tests for the generate / validate / refine pipeline.

mod common;

use std::sync::Arc;
use std::time::Duration;

use snapgen::config::Config;
use snapgen::extract::{Sheet, SpreadsheetCategory, Workbook};
use snapgen::inputs::{FileCategory, InputStore};
use snapgen::orchestrator::{
    AuditKind, GenerationMode, GenerationOrchestrator, OrchestratorError, Phase, PromptPart,
    RunOutcome, ServiceError, QUOTA_EXCEEDED_MESSAGE,
};

use common::{
    content_json, format_json, FixedTemplates, GatedGenerator, Harness, RendezvousValidator,
    ScriptedGenerator, ScriptedValidator,
};

#[tokio::test]
async fn auto_run_with_perfect_score_does_not_refine() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("# Nutrien Q3 snapshot"),
        ScriptedValidator::new().passing(),
    );

    let outcome = h.orchestrator.generate(GenerationMode::Auto).await.unwrap();
    assert_eq!(outcome, RunOutcome::ExportReady);

    let state = h.orchestrator.snapshot();
    assert_eq!(state.phase, Phase::Generated);
    assert_eq!(state.draft, "# Nutrien Q3 snapshot");
    let validation = state.validation.expect("validation retained");
    assert!(validation.is_valid);
    assert_eq!(validation.score, 100);
    assert_eq!(state.export_signals, 1);
    assert_eq!(h.generator.call_count(), 1);
}

#[tokio::test]
async fn auto_run_with_score_99_refines_exactly_once() {
    let h = Harness::new(
        ScriptedGenerator::new()
            .respond("first draft")
            .respond("```markdown\nrefined draft\n```"),
        ScriptedValidator::new()
            .content(&content_json(true, 99, &["Revenue should read $5.2bn"]))
            .format(&format_json(true, 100, 610, &["Trim section B"])),
    );

    let outcome = h.orchestrator.generate(GenerationMode::Auto).await.unwrap();
    assert_eq!(outcome, RunOutcome::ExportReady);

    let state = h.orchestrator.snapshot();
    assert_eq!(state.draft, "refined draft");
    assert_eq!(state.validation, None);
    assert_eq!(state.export_signals, 1);
    assert_eq!(h.generator.call_count(), 2);

    let instruction = h.generator.instruction(1);
    assert!(instruction.contains("first draft"));
    assert!(instruction.contains("[CONTENT] Revenue should read $5.2bn\n[FORMAT] Trim section B"));
}

#[tokio::test]
async fn fractional_score_below_100_refines() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("d1").respond("d2"),
        ScriptedValidator::new()
            .content(r#"{"isValid": true, "score": 99.6, "feedback": ["minor"]}"#)
            .format(&format_json(true, 100, 640, &[])),
    );

    assert_eq!(
        h.orchestrator.generate(GenerationMode::Auto).await.unwrap(),
        RunOutcome::ExportReady
    );
    assert_eq!(h.generator.call_count(), 2);
    let state = h.orchestrator.snapshot();
    assert_eq!(state.draft, "d2");
    assert_eq!(state.validation, None);
    assert!(h.generator.instruction(1).contains("[CONTENT] minor"));
}

#[tokio::test]
async fn fractional_score_validates_below_passing() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("d1"),
        ScriptedValidator::new()
            .content(r#"{"isValid": true, "score": 99.6, "feedback": ["minor"]}"#)
            .format(&format_json(true, 100, 640, &[])),
    );
    h.orchestrator.generate(GenerationMode::Manual).await.unwrap();

    let RunOutcome::Validated(result) = h.orchestrator.validate_only().await.unwrap() else {
        panic!("expected a validation result");
    };
    assert_eq!(result.score, 99);
    assert!(result.needs_refinement());
}

#[tokio::test]
async fn both_audits_are_in_flight_together() {
    let config = Config::default();
    let validator = Arc::new(RendezvousValidator::new(
        &content_json(true, 100, &[]),
        &format_json(true, 100, 640, &[]),
    ));
    let orchestrator = GenerationOrchestrator::new(
        &config,
        Arc::new(InputStore::new(&config)),
        Arc::new(ScriptedGenerator::new().respond("d1")),
        validator.clone(),
        Arc::new(FixedTemplates),
    );

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.generate(GenerationMode::Auto),
    )
    .await
    .expect("audits were awaited one after the other")
    .unwrap();

    assert_eq!(outcome, RunOutcome::ExportReady);
    let mut arrivals = validator.arrivals();
    arrivals.sort_by_key(|k| *k == AuditKind::Format);
    assert_eq!(arrivals, vec![AuditKind::Content, AuditKind::Format]);
    assert_eq!(orchestrator.snapshot().validation.map(|v| v.score), Some(100));
}

#[tokio::test]
async fn dropped_call_releases_busy_phase() {
    let config = Config::default();
    let generator = Arc::new(GatedGenerator::default());
    let orchestrator = GenerationOrchestrator::new(
        &config,
        Arc::new(InputStore::new(&config)),
        generator.clone(),
        Arc::new(ScriptedValidator::new()),
        Arc::new(FixedTemplates),
    );

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.generate(GenerationMode::Manual),
    )
    .await;
    assert!(abandoned.is_err());

    assert!(!orchestrator.is_busy());
    let state = orchestrator.snapshot();
    assert_eq!(state.phase, Phase::Idle);
    assert_eq!(state.draft, "");

    // The orchestrator accepts work again.
    generator.release.notify_one();
    assert_eq!(
        orchestrator.generate(GenerationMode::Manual).await.unwrap(),
        RunOutcome::Generated
    );
    assert_eq!(orchestrator.phase(), Phase::Generated);
}

#[tokio::test]
async fn invalid_result_refines_even_at_full_score() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("d1").respond("d2"),
        ScriptedValidator::new()
            .content(&content_json(true, 100, &[]))
            .format(&format_json(false, 100, 1400, &["Over the word limit"])),
    );

    h.orchestrator.generate(GenerationMode::Auto).await.unwrap();
    assert_eq!(h.generator.call_count(), 2);
    assert_eq!(h.orchestrator.snapshot().draft, "d2");
}

#[tokio::test]
async fn unparseable_audit_forces_refinement() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("d1").respond("d2"),
        ScriptedValidator::new()
            .content("Looks great to me!")
            .format(&format_json(true, 100, 600, &[])),
    );

    h.orchestrator.generate(GenerationMode::Auto).await.unwrap();
    assert_eq!(h.generator.call_count(), 2);
    assert!(h.generator.instruction(1).contains("[CONTENT] parse error"));
}

#[tokio::test]
async fn manual_mode_stops_after_generation() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("manual draft"),
        ScriptedValidator::new(),
    );

    let outcome = h.orchestrator.generate(GenerationMode::Manual).await.unwrap();
    assert_eq!(outcome, RunOutcome::Generated);

    let state = h.orchestrator.snapshot();
    assert_eq!(state.phase, Phase::Generated);
    assert_eq!(state.draft, "manual draft");
    assert_eq!(state.validation, None);
    assert_eq!(state.export_signals, 0);
    assert!(h.validator.requests().is_empty());
}

#[tokio::test]
async fn refine_requires_draft_and_validation() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("draft").respond("better draft"),
        ScriptedValidator::new()
            .content(&content_json(true, 80, &["Check EPS"]))
            .format(&format_json(true, 90, 700, &[])),
    );

    assert_eq!(h.orchestrator.refine_only().await.unwrap(), RunOutcome::Skipped);
    assert_eq!(h.orchestrator.validate_only().await.unwrap(), RunOutcome::Skipped);

    h.orchestrator.generate(GenerationMode::Manual).await.unwrap();
    // Draft but no validation yet.
    assert_eq!(h.orchestrator.refine_only().await.unwrap(), RunOutcome::Skipped);
    assert_eq!(h.generator.call_count(), 1);

    let RunOutcome::Validated(result) = h.orchestrator.validate_only().await.unwrap() else {
        panic!("expected a validation result");
    };
    assert_eq!(result.score, 80);
    assert_eq!(result.word_count, 700);
    assert_eq!(h.orchestrator.phase(), Phase::Validated);

    assert_eq!(h.orchestrator.refine_only().await.unwrap(), RunOutcome::Refined);
    let state = h.orchestrator.snapshot();
    assert_eq!(state.phase, Phase::Generated);
    assert_eq!(state.draft, "better draft");
    assert_eq!(state.validation, None);
    assert_eq!(state.export_signals, 0);
    assert!(h.generator.instruction(1).contains("[CONTENT] Check EPS"));
}

#[tokio::test]
async fn rate_limit_failure_is_reported_with_quota_message() {
    let h = Harness::new(
        ScriptedGenerator::new().fail(ServiceError::Service(
            "429 RESOURCE_EXHAUSTED: quota exceeded for model".to_string(),
        )),
        ScriptedValidator::new(),
    );

    let err = h.orchestrator.generate(GenerationMode::Auto).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Service(_)));

    let state = h.orchestrator.snapshot();
    assert_eq!(state.phase, Phase::Error);
    assert_eq!(state.error.as_deref(), Some(QUOTA_EXCEEDED_MESSAGE));
    assert_eq!(state.export_signals, 0);
}

#[tokio::test]
async fn failed_validation_keeps_the_draft() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("keep me"),
        ScriptedValidator::new()
            .content_fails(ServiceError::Service("connection reset".to_string()))
            .format(&format_json(true, 100, 500, &[])),
    );

    h.orchestrator.generate(GenerationMode::Manual).await.unwrap();
    let err = h.orchestrator.validate_only().await.unwrap_err();
    assert_eq!(
        err,
        OrchestratorError::Service(ServiceError::Service("connection reset".to_string()))
    );

    let state = h.orchestrator.snapshot();
    assert_eq!(state.phase, Phase::Error);
    assert_eq!(state.draft, "keep me");
    assert_eq!(state.error.as_deref(), Some("connection reset"));
}

#[tokio::test]
async fn next_operation_clears_previous_error() {
    let h = Harness::new(
        ScriptedGenerator::new()
            .fail(ServiceError::Service("boom".to_string()))
            .respond("recovered"),
        ScriptedValidator::new(),
    );

    assert!(h.orchestrator.generate(GenerationMode::Manual).await.is_err());
    assert_eq!(h.orchestrator.snapshot().error.as_deref(), Some("boom"));

    h.orchestrator.generate(GenerationMode::Manual).await.unwrap();
    let state = h.orchestrator.snapshot();
    assert_eq!(state.error, None);
    assert_eq!(state.draft, "recovered");
}

#[tokio::test]
async fn failed_refinement_keeps_first_draft() {
    let h = Harness::new(
        ScriptedGenerator::new()
            .respond("first")
            .fail(ServiceError::RateLimited("slow down".to_string())),
        ScriptedValidator::new()
            .content(&content_json(true, 50, &["Wrong period"]))
            .format(&format_json(true, 100, 500, &[])),
    );

    assert!(h.orchestrator.generate(GenerationMode::Auto).await.is_err());
    let state = h.orchestrator.snapshot();
    assert_eq!(state.phase, Phase::Error);
    assert_eq!(state.draft, "first");
    assert_eq!(state.export_signals, 0);
    assert_eq!(state.error.as_deref(), Some(QUOTA_EXCEEDED_MESSAGE));
}

#[tokio::test]
async fn overlapping_calls_are_rejected_as_busy() {
    let config = Config::default();
    let generator = Arc::new(GatedGenerator::default());
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        &config,
        Arc::new(InputStore::new(&config)),
        generator.clone(),
        Arc::new(ScriptedValidator::new()),
        Arc::new(FixedTemplates),
    ));

    let running = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.generate(GenerationMode::Manual).await })
    };
    generator.started.notified().await;

    assert!(orchestrator.is_busy());
    assert_eq!(orchestrator.phase(), Phase::Generating);
    assert_eq!(
        orchestrator.generate(GenerationMode::Auto).await,
        Err(OrchestratorError::Busy)
    );
    assert_eq!(orchestrator.validate_only().await, Err(OrchestratorError::Busy));
    assert_eq!(orchestrator.refine_only().await, Err(OrchestratorError::Busy));
    assert_eq!(orchestrator.phase(), Phase::Generating);

    generator.release.notify_one();
    let outcome = running.await.unwrap().unwrap();
    assert_eq!(outcome, RunOutcome::Generated);
    assert!(!orchestrator.is_busy());
    assert_eq!(orchestrator.snapshot().draft, "gated draft");
}

#[tokio::test]
async fn only_completed_files_are_attached_in_order() {
    let h = Harness::new(
        ScriptedGenerator::new().respond("draft"),
        ScriptedValidator::new(),
    );

    h.upload(FileCategory::Transcript, &[("call.txt", "transcript")])
        .await;
    h.upload(
        FileCategory::AnalystReport,
        &[("broker-a.pdf", "first"), ("empty.pdf", ""), ("broker-b.pdf", "second")],
    )
    .await;

    h.orchestrator.generate(GenerationMode::Manual).await.unwrap();

    let parts = &h.generator.calls()[0];
    let attachments: Vec<(&str, &str)> = parts
        .iter()
        .filter_map(|p| match p {
            PromptPart::Attachment {
                mime_type,
                data_base64,
            } => Some((mime_type.as_str(), data_base64.as_str())),
            PromptPart::Text(_) => None,
        })
        .collect();
    assert_eq!(
        attachments,
        vec![
            ("application/pdf", "Zmlyc3Q="),
            ("application/pdf", "c2Vjb25k"),
            ("text/plain", "dHJhbnNjcmlwdA=="),
        ]
    );
    assert_eq!(parts.len(), 4);
    assert!(parts[3]
        .as_text()
        .unwrap()
        .starts_with("Write the "));
}

#[tokio::test]
async fn content_audit_carries_spreadsheet_context() {
    let mut config = Config::default();
    config.ranges.metrics = "A1:B1".parse().unwrap();
    let h = Harness::with_config(
        config,
        ScriptedGenerator::new().respond("draft"),
        ScriptedValidator::new().passing(),
    );

    h.upload(FileCategory::AnalystReport, &[("a.pdf", "pdf")]).await;
    h.store
        .attach_workbook(
            SpreadsheetCategory::QuarterlyMetrics,
            "metrics.xlsx",
            Workbook::from_sheets(vec![Sheet::from_rows("Metrics", &[vec!["Revenue", "5.2"]])]),
        )
        .unwrap();

    h.orchestrator.generate(GenerationMode::Auto).await.unwrap();

    let content = h.validator.request(AuditKind::Content).unwrap();
    assert_eq!(content.parts.len(), 2);
    let prompt = content.parts[1].as_text().unwrap();
    assert!(prompt.starts_with("Audit facts for "));
    assert!(prompt.ends_with(
        "\n\n[OFFICIAL QUARTERLY METRICS DATA FOR SECTION E VERIFICATION]:\nRevenue,5.2\n"
    ));
    assert!(!prompt.contains("CONSENSUS"));

    let format = h.validator.request(AuditKind::Format).unwrap();
    assert_eq!(format.parts, vec![PromptPart::text("Audit layout:\ndraft")]);
}
