use std::sync::Arc;

use base64::Engine;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::progress::{IngestEvent, IngestEventBroadcaster, IngestEventKind};
use super::reader::{read_chunked, ReadOutcome};
use super::source::PendingFile;
use crate::config::Config;
use crate::error::IngestError;
use crate::inputs::{FileCategory, InputStore, UploadedFile};
use crate::sanitize;

/// Result of submitting a batch of files.
#[derive(Debug)]
pub struct IngestBatch {
    pub accepted: Vec<IngestTicket>,
    pub rejected: Vec<IngestError>,
}

/// An accepted file and its running read task.
#[derive(Debug)]
pub struct IngestTicket {
    /// The entity as created, before any read progress.
    pub file: UploadedFile,
    handle: JoinHandle<ReadOutcome>,
}

impl IngestTicket {
    pub fn id(&self) -> &str {
        &self.file.id
    }

    /// Waits for the read task to reach its terminal outcome.
    pub async fn finished(self) -> ReadOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Ingest task for {} did not finish: {}", self.file.id, e);
                ReadOutcome::Failed(e.to_string())
            }
        }
    }

    /// Like [`finished`](Self::finished), with failures and aborts as errors.
    pub async fn wait(self) -> Result<(), IngestError> {
        let name = self.file.name.clone();
        self.finished().await.into_result(&name)
    }
}

/// Runs uploads as independent cancellable tokio tasks that write their
/// progress into the [`InputStore`].
#[derive(Clone)]
pub struct FileIngestionPipeline {
    store: Arc<InputStore>,
    events: IngestEventBroadcaster,
    max_upload_bytes: u64,
    read_chunk_bytes: usize,
}

impl FileIngestionPipeline {
    pub fn new(config: &Config, store: Arc<InputStore>) -> Self {
        Self {
            store,
            events: IngestEventBroadcaster::new(config.event_capacity),
            max_upload_bytes: config.max_upload_bytes,
            read_chunk_bytes: config.read_chunk_bytes,
        }
    }

    pub fn events(&self) -> &IngestEventBroadcaster {
        &self.events
    }

    pub fn store(&self) -> &Arc<InputStore> {
        &self.store
    }

    /// Accepts or rejects each file and starts a read task for every accepted
    /// one. Must be called from within a tokio runtime.
    pub fn ingest(&self, files: Vec<PendingFile>, category: FileCategory) -> IngestBatch {
        let mut batch = IngestBatch {
            accepted: Vec::with_capacity(files.len()),
            rejected: Vec::new(),
        };

        for pending in files {
            if let Some(size) = pending.size.filter(|s| *s > self.max_upload_bytes) {
                let rejection = IngestError::TooLarge {
                    name: pending.name.clone(),
                    size,
                    limit: self.max_upload_bytes,
                };
                warn!(
                    "Rejected {} {}: {} bytes exceeds limit",
                    category,
                    sanitize::redact_name(&pending.name),
                    size
                );
                self.events.send(IngestEvent::rejected(
                    &pending.name,
                    category,
                    &rejection.to_string(),
                ));
                batch.rejected.push(rejection);
                continue;
            }

            batch.accepted.push(self.start(pending, category));
        }

        batch
    }

    fn start(&self, pending: PendingFile, category: FileCategory) -> IngestTicket {
        let file = UploadedFile::new(&pending.name, &pending.mime_type, category);
        let token = file
            .cancel
            .as_ref()
            .map(|c| c.token())
            .unwrap_or_default();
        self.store.push_file(file.clone());
        self.events.send(IngestEvent::new(
            &file.id,
            &file.name,
            category,
            IngestEventKind::Queued,
            0,
        ));

        let span = info_span!(
            "ingest_file",
            file_id = %file.id,
            name = %sanitize::redact_name(&file.name)
        );
        let task = ReadTask {
            store: Arc::clone(&self.store),
            events: self.events.clone(),
            id: file.id.clone(),
            name: file.name.clone(),
            category,
            limit: self.max_upload_bytes,
            chunk_size: self.read_chunk_bytes,
        };
        let handle = tokio::spawn(task.run(pending, token).instrument(span));

        IngestTicket { file, handle }
    }

    /// Aborts an in-flight read. The task removes the entity once it stops.
    ///
    /// Returns false when the file exists but is no longer uploading.
    pub fn cancel(&self, category: FileCategory, id: &str) -> Result<bool, IngestError> {
        self.store
            .update_file(category, id, |file| match &file.cancel {
                Some(handle) if file.is_uploading() => {
                    handle.cancel();
                    true
                }
                _ => false,
            })
            .ok_or_else(|| IngestError::UnknownFile {
                id: id.to_string(),
                category,
            })
    }

    /// Removes a file. In-flight reads are cancelled instead and disappear
    /// when their task observes the cancellation.
    pub fn remove(&self, category: FileCategory, id: &str) -> Result<(), IngestError> {
        if self.cancel(category, id)? {
            debug!("Cancelled in-flight {} {}", category, id);
            return Ok(());
        }
        self.store.take_file(category, id);
        info!("Removed {} {}", category, id);
        Ok(())
    }
}

struct ReadTask {
    store: Arc<InputStore>,
    events: IngestEventBroadcaster,
    id: String,
    name: String,
    category: FileCategory,
    limit: u64,
    chunk_size: usize,
}

impl ReadTask {
    async fn run(self, pending: PendingFile, token: CancellationToken) -> ReadOutcome {
        let total = pending.size;
        let mut reader = pending.into_reader();

        let read = read_chunked(&mut reader, total, self.chunk_size, self.limit, |percent| {
            self.report_progress(percent)
        });

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = read => Some(result),
        };

        match result {
            None => self.abort(),
            Some(Ok(bytes)) => {
                let data = base64::engine::general_purpose::STANDARD.encode(bytes);
                self.complete(data)
            }
            Some(Err(message)) => self.fail(message),
        }
    }

    fn event(&self, kind: IngestEventKind, progress: u8) -> IngestEvent {
        IngestEvent::new(&self.id, &self.name, self.category, kind, progress)
    }

    fn report_progress(&self, percent: u8) {
        let advanced = self
            .store
            .update_file(self.category, &self.id, |file| {
                file.advance(percent).then_some(file.progress)
            })
            .flatten();
        if let Some(progress) = advanced {
            self.events.send(self.event(IngestEventKind::Progress, progress));
        }
    }

    fn complete(&self, data: String) -> ReadOutcome {
        // A cancel that lands after the last chunk still wins.
        let applied = self.store.update_file(self.category, &self.id, |file| {
            if file.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                false
            } else {
                file.complete(data);
                true
            }
        });

        match applied {
            Some(true) => {
                info!("Read completed");
                self.events.send(self.event(IngestEventKind::Completed, 100));
                ReadOutcome::Completed
            }
            Some(false) => self.abort(),
            None => {
                debug!("File was removed before its read completed");
                ReadOutcome::Aborted
            }
        }
    }

    fn fail(&self, message: String) -> ReadOutcome {
        warn!("Read failed: {}", message);
        let progress = self.store.update_file(self.category, &self.id, |file| {
            file.fail(message.clone());
            file.progress
        });
        self.events.send(
            self.event(IngestEventKind::Failed, progress.unwrap_or(0))
                .with_message(&message),
        );
        ReadOutcome::Failed(message)
    }

    fn abort(&self) -> ReadOutcome {
        self.store.take_file(self.category, &self.id);
        info!("Read aborted");
        self.events.send(self.event(IngestEventKind::Aborted, 0));
        ReadOutcome::Aborted
    }
}
