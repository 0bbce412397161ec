#![allow(dead_code)]

use std::sync::Arc;

use snapgen::config::Config;
use snapgen::ingest::{FileIngestionPipeline, PendingFile, ReadOutcome};
use snapgen::inputs::{FileCategory, InputStore};
use snapgen::orchestrator::GenerationOrchestrator;

use super::fakes::{FixedTemplates, ScriptedGenerator, ScriptedValidator};

/// A store, an ingestion pipeline and an orchestrator over scripted fakes.
pub struct Harness {
    pub config: Config,
    pub store: Arc<InputStore>,
    pub pipeline: FileIngestionPipeline,
    pub generator: Arc<ScriptedGenerator>,
    pub validator: Arc<ScriptedValidator>,
    pub orchestrator: GenerationOrchestrator,
}

impl Harness {
    pub fn new(generator: ScriptedGenerator, validator: ScriptedValidator) -> Self {
        Self::with_config(Config::default(), generator, validator)
    }

    pub fn with_config(
        config: Config,
        generator: ScriptedGenerator,
        validator: ScriptedValidator,
    ) -> Self {
        let store = Arc::new(InputStore::new(&config));
        let pipeline = FileIngestionPipeline::new(&config, Arc::clone(&store));
        let generator = Arc::new(generator);
        let validator = Arc::new(validator);
        let orchestrator = GenerationOrchestrator::new(
            &config,
            Arc::clone(&store),
            generator.clone(),
            validator.clone(),
            Arc::new(FixedTemplates),
        );

        Self {
            config,
            store,
            pipeline,
            generator,
            validator,
            orchestrator,
        }
    }

    /// Ingests in-memory files and waits for every read to finish.
    pub async fn upload(&self, category: FileCategory, files: &[(&str, &str)]) -> Vec<ReadOutcome> {
        let pending = files
            .iter()
            .map(|(name, content)| PendingFile::from_bytes(name, content.as_bytes().to_vec()))
            .collect();
        let batch = self.pipeline.ingest(pending, category);
        let mut outcomes = Vec::new();
        for ticket in batch.accepted {
            outcomes.push(ticket.finished().await);
        }
        outcomes
    }
}
