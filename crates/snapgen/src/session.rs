//! One analyst session: the input store, the ingestion pipeline and the
//! orchestrator built from a single [`Config`].

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::{load_config, validate_config, Config};
use crate::error::Result;
use crate::extract::SpreadsheetCategory;
use crate::ingest::{FileIngestionPipeline, IngestBatch, PendingFile};
use crate::inputs::{FileCategory, InputStore, ReportingPeriod};
use crate::orchestrator::{
    GenerationMode, GenerationOrchestrator, PromptTemplates, RunOutcome, TextGenerator, Validator,
};

pub struct Session {
    config: Config,
    store: Arc<InputStore>,
    pipeline: FileIngestionPipeline,
    orchestrator: GenerationOrchestrator,
}

impl Session {
    pub fn new(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        validator: Arc<dyn Validator>,
        templates: Arc<dyn PromptTemplates>,
    ) -> Result<Self> {
        validate_config(&config)?;

        let store = Arc::new(InputStore::new(&config));
        let pipeline = FileIngestionPipeline::new(&config, Arc::clone(&store));
        let orchestrator = GenerationOrchestrator::new(
            &config,
            Arc::clone(&store),
            generator,
            validator,
            templates,
        );
        info!("Session ready with {} companies", config.companies.len());

        Ok(Self {
            config,
            store,
            pipeline,
            orchestrator,
        })
    }

    pub fn from_config_file<P: AsRef<Path>>(
        path: P,
        generator: Arc<dyn TextGenerator>,
        validator: Arc<dyn Validator>,
        templates: Arc<dyn PromptTemplates>,
    ) -> Result<Self> {
        let config = load_config(path)?;
        Self::new(config, generator, validator, templates)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<InputStore> {
        &self.store
    }

    pub fn pipeline(&self) -> &FileIngestionPipeline {
        &self.pipeline
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    pub fn set_company(&self, company: &str) -> Result<()> {
        Ok(self.store.set_company(company)?)
    }

    pub fn set_period(&self, period: ReportingPeriod) -> Result<()> {
        Ok(self.store.set_period(period)?)
    }

    pub fn attach_workbook(&self, category: SpreadsheetCategory, path: &Path) -> Result<()> {
        Ok(self.store.attach_workbook_path(category, path)?)
    }

    /// Opens each path and starts ingesting it. Must be called from within a
    /// tokio runtime.
    pub async fn upload_paths(&self, paths: &[&Path], category: FileCategory) -> Result<IngestBatch> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(PendingFile::open(path).await?);
        }
        Ok(self.pipeline.ingest(files, category))
    }

    pub async fn generate(&self, mode: GenerationMode) -> Result<RunOutcome> {
        Ok(self.orchestrator.generate(mode).await?)
    }

    pub async fn validate(&self) -> Result<RunOutcome> {
        Ok(self.orchestrator.validate_only().await?)
    }

    pub async fn refine(&self) -> Result<RunOutcome> {
        Ok(self.orchestrator.refine_only().await?)
    }
}
