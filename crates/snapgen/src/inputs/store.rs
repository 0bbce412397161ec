//! Single owner of [`RequestInputs`].
//!
//! Ingestion writes file collections, extraction writes spreadsheet contexts
//! and the user writes scalar fields. The orchestrator only takes snapshots.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Local;
use tracing::{info, warn};

use super::catalog::{check_period, ReportingPeriod};
use super::model::{FileCategory, RequestInputs, SpreadsheetSlot, UploadedFile};
use crate::config::Config;
use crate::error::{ExtractError, InputError};
use crate::extract::{self, ExtractionRange, SpreadsheetCategory, Workbook};
use crate::sanitize;

struct StoreState {
    inputs: RequestInputs,
    workbooks: HashMap<SpreadsheetCategory, Workbook>,
}

pub struct InputStore {
    state: RwLock<StoreState>,
    companies: Vec<String>,
    year_window: u16,
    metrics_range: ExtractionRange,
    consensus_range: ExtractionRange,
    delimiter: char,
}

impl InputStore {
    pub fn new(config: &Config) -> Self {
        let mut inputs = RequestInputs::default();
        if let Some(first) = config.companies.first() {
            inputs.company = first.clone();
        }
        Self::with_inputs(config, inputs)
    }

    pub fn with_inputs(config: &Config, inputs: RequestInputs) -> Self {
        Self {
            state: RwLock::new(StoreState {
                inputs,
                workbooks: HashMap::new(),
            }),
            companies: config.companies.clone(),
            year_window: config.year_window,
            metrics_range: config.ranges.metrics,
            consensus_range: config.ranges.consensus,
            delimiter: config.delimiter,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Input store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Input store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// A consistent copy of the current inputs.
    pub fn snapshot(&self) -> RequestInputs {
        self.read_state().inputs.clone()
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn range_for(&self, category: SpreadsheetCategory) -> ExtractionRange {
        match category {
            SpreadsheetCategory::QuarterlyMetrics => self.metrics_range,
            SpreadsheetCategory::Consensus => self.consensus_range,
        }
    }

    /// Changes the target company and re-extracts every attached workbook.
    pub fn set_company(&self, company: &str) -> Result<(), InputError> {
        let canonical = self
            .companies
            .iter()
            .find(|c| c.as_str() == company)
            .ok_or_else(|| InputError::UnknownCompany(company.to_string()))?
            .clone();

        let mut state = self.write_state();
        state.inputs.company = canonical;

        let categories: Vec<SpreadsheetCategory> = state.workbooks.keys().copied().collect();
        for category in categories {
            if let Err(e) = self.reextract(&mut state, category) {
                warn!("{} file: {}", category, e);
            }
        }
        Ok(())
    }

    /// Rejects years outside the window and quarters that have not started.
    pub fn set_period(&self, period: ReportingPeriod) -> Result<(), InputError> {
        check_period(period, Local::now().date_naive(), self.year_window)?;
        self.write_state().inputs.period = period;
        Ok(())
    }

    pub fn set_prepared_date(&self, prepared_date: &str) {
        self.write_state().inputs.prepared_date = prepared_date.to_string();
    }

    /// Attaches a workbook and extracts its range for the current company.
    ///
    /// `SheetNotFound` leaves the file attached with its context cleared.
    pub fn attach_workbook(
        &self,
        category: SpreadsheetCategory,
        file_name: &str,
        workbook: Workbook,
    ) -> Result<(), ExtractError> {
        let mut state = self.write_state();
        state.workbooks.insert(category, workbook);
        state.inputs.slot_mut(category).file_name = Some(file_name.to_string());
        info!(
            "Attached {} workbook {}",
            category,
            sanitize::redact_name(file_name)
        );
        self.reextract(&mut state, category)
    }

    /// Parses raw workbook bytes and attaches them. Unreadable bytes leave
    /// the slot untouched.
    pub fn attach_workbook_bytes(
        &self,
        category: SpreadsheetCategory,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ExtractError> {
        let workbook = Workbook::from_bytes(bytes)?;
        self.attach_workbook(category, file_name, workbook)
    }

    pub fn attach_workbook_path(
        &self,
        category: SpreadsheetCategory,
        path: &Path,
    ) -> Result<(), ExtractError> {
        let workbook = Workbook::open(path)?;
        self.attach_workbook(category, &sanitize::redact_path(path), workbook)
    }

    pub fn detach_workbook(&self, category: SpreadsheetCategory) {
        let mut state = self.write_state();
        state.workbooks.remove(&category);
        *state.inputs.slot_mut(category) = SpreadsheetSlot::default();
    }

    fn reextract(
        &self,
        state: &mut StoreState,
        category: SpreadsheetCategory,
    ) -> Result<(), ExtractError> {
        let Some(workbook) = state.workbooks.get(&category) else {
            return Ok(());
        };
        let company = state.inputs.company.clone();
        let context = extract::extract(
            workbook,
            &company,
            &self.range_for(category),
            self.delimiter,
        );

        let found = context.is_some();
        state.inputs.slot_mut(category).context = context;

        if found {
            Ok(())
        } else {
            Err(ExtractError::SheetNotFound { entity: company })
        }
    }

    pub(crate) fn push_file(&self, file: UploadedFile) {
        let category = file.category;
        self.write_state().inputs.files_mut(category).push(file);
    }

    /// Applies `update` to the file with `id` under the write lock; `None` if
    /// the file is gone.
    pub(crate) fn update_file<T, F>(&self, category: FileCategory, id: &str, update: F) -> Option<T>
    where
        F: FnOnce(&mut UploadedFile) -> T,
    {
        let mut state = self.write_state();
        state
            .inputs
            .files_mut(category)
            .iter_mut()
            .find(|f| f.id == id)
            .map(update)
    }

    pub(crate) fn take_file(&self, category: FileCategory, id: &str) -> Option<UploadedFile> {
        let mut state = self.write_state();
        let files = state.inputs.files_mut(category);
        let index = files.iter().position(|f| f.id == id)?;
        Some(files.remove(index))
    }

    pub fn file(&self, category: FileCategory, id: &str) -> Option<UploadedFile> {
        self.read_state()
            .inputs
            .files(category)
            .iter()
            .find(|f| f.id == id)
            .cloned()
    }

    pub fn files(&self, category: FileCategory) -> Vec<UploadedFile> {
        self.read_state().inputs.files(category).to_vec()
    }
}
