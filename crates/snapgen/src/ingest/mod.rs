//! Asynchronous, cancellable upload ingestion.
//!
//! Every accepted file becomes an [`UploadedFile`](crate::inputs::UploadedFile)
//! in the store straight away and is then read on its own tokio task. The
//! task streams the source in chunks, writes progress back by id and ends in
//! exactly one [`ReadOutcome`].

pub mod pipeline;
pub mod progress;
pub mod reader;
pub mod source;

pub use pipeline::{FileIngestionPipeline, IngestBatch, IngestTicket};
pub use progress::{IngestEvent, IngestEventBroadcaster, IngestEventKind};
pub use reader::{progress_percent, ReadOutcome};
pub use source::{guess_mime_type, PendingFile, DEFAULT_MIME_TYPE};
