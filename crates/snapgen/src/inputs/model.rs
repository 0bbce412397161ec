use std::fmt;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::catalog::{default_prepared_date, ReportingPeriod, DEFAULT_COMPANIES};
use crate::extract::SpreadsheetCategory;

/// Lifecycle status of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploading,
    Completed,
    Error,
}

/// Collection an uploaded file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    AnalystReport,
    Transcript,
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileCategory::AnalystReport => write!(f, "analyst report"),
            FileCategory::Transcript => write!(f, "transcript"),
        }
    }
}

/// Handle that aborts an in-flight read.
#[derive(Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// One binary attachment.
///
/// `progress == 100` iff `status == Completed`, and `data` is non-empty iff
/// `status == Completed`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Base64 payload without any data-URL prefix.
    pub data: String,
    pub status: UploadStatus,
    pub progress: u8,
    pub category: FileCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub cancel: Option<CancelHandle>,
}

impl UploadedFile {
    pub fn new(name: &str, mime_type: &str, category: FileCategory) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            data: String::new(),
            status: UploadStatus::Uploading,
            progress: 0,
            category,
            error: None,
            cancel: Some(CancelHandle::new()),
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.status == UploadStatus::Uploading
    }

    pub fn is_completed(&self) -> bool {
        self.status == UploadStatus::Completed
    }

    /// Raises progress; never lowers it and never reaches 100 before completion.
    pub(crate) fn advance(&mut self, progress: u8) -> bool {
        let progress = progress.min(99);
        if self.is_uploading() && progress > self.progress {
            self.progress = progress;
            true
        } else {
            false
        }
    }

    pub(crate) fn complete(&mut self, data: String) {
        self.data = data;
        self.status = UploadStatus::Completed;
        self.progress = 100;
        self.error = None;
        self.cancel = None;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.data.clear();
        self.status = UploadStatus::Error;
        self.error = Some(message);
        self.cancel = None;
    }
}

/// A workbook slot: the attached file name and the text extracted from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetSlot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Everything a generation request is built from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInputs {
    pub company: String,
    pub period: ReportingPeriod,
    pub prepared_date: String,
    pub analyst_reports: Vec<UploadedFile>,
    pub transcripts: Vec<UploadedFile>,
    pub metrics: SpreadsheetSlot,
    pub consensus: SpreadsheetSlot,
}

impl RequestInputs {
    pub fn new(company: &str, period: ReportingPeriod, prepared_date: &str) -> Self {
        Self {
            company: company.to_string(),
            period,
            prepared_date: prepared_date.to_string(),
            analyst_reports: Vec::new(),
            transcripts: Vec::new(),
            metrics: SpreadsheetSlot::default(),
            consensus: SpreadsheetSlot::default(),
        }
    }

    pub fn files(&self, category: FileCategory) -> &[UploadedFile] {
        match category {
            FileCategory::AnalystReport => &self.analyst_reports,
            FileCategory::Transcript => &self.transcripts,
        }
    }

    pub(crate) fn files_mut(&mut self, category: FileCategory) -> &mut Vec<UploadedFile> {
        match category {
            FileCategory::AnalystReport => &mut self.analyst_reports,
            FileCategory::Transcript => &mut self.transcripts,
        }
    }

    pub fn slot(&self, category: SpreadsheetCategory) -> &SpreadsheetSlot {
        match category {
            SpreadsheetCategory::QuarterlyMetrics => &self.metrics,
            SpreadsheetCategory::Consensus => &self.consensus,
        }
    }

    pub(crate) fn slot_mut(&mut self, category: SpreadsheetCategory) -> &mut SpreadsheetSlot {
        match category {
            SpreadsheetCategory::QuarterlyMetrics => &mut self.metrics,
            SpreadsheetCategory::Consensus => &mut self.consensus,
        }
    }

    /// Completed attachments in request order: analyst reports, then transcripts.
    pub fn completed_files(&self) -> impl Iterator<Item = &UploadedFile> {
        self.analyst_reports
            .iter()
            .chain(self.transcripts.iter())
            .filter(|f| f.is_completed() && !f.data.is_empty())
    }
}

impl Default for RequestInputs {
    fn default() -> Self {
        Self::new(
            DEFAULT_COMPANIES[0],
            ReportingPeriod::current(),
            &default_prepared_date(),
        )
    }
}
