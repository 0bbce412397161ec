use std::fmt;
use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use tokio::io::AsyncRead;

use crate::error::IngestError;
use crate::sanitize;

/// MIME type assumed when neither the name nor the source declares one.
pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

/// Guesses a MIME type from a file name.
pub fn guess_mime_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string())
}

/// A file selected for upload but not yet read.
pub struct PendingFile {
    pub name: String,
    pub mime_type: String,
    /// Total size in bytes, when the source knows it.
    pub size: Option<u64>,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl PendingFile {
    pub fn from_reader<R>(name: &str, reader: R, size: Option<u64>) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            name: name.to_string(),
            mime_type: guess_mime_type(name),
            size,
            reader: Box::new(reader),
        }
    }

    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        Self::from_reader(name, Cursor::new(bytes), Some(size))
    }

    /// Opens a file on disk; its metadata supplies the size.
    pub async fn open(path: &Path) -> Result<Self, IngestError> {
        let name = sanitize::redact_path(path);
        let read_error = |e: std::io::Error| IngestError::Read {
            name: name.clone(),
            message: e.to_string(),
        };

        let file = tokio::fs::File::open(path).await.map_err(read_error)?;
        let size = file.metadata().await.map_err(read_error)?.len();
        Ok(Self::from_reader(&name, file, Some(size)))
    }

    /// Decodes a `data:<mime>;base64,<payload>` URL. The declared MIME type
    /// wins over the guess from `name`.
    pub fn from_data_url(name: &str, url: &str) -> Result<Self, IngestError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| IngestError::InvalidDataUrl("missing 'data:' scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| IngestError::InvalidDataUrl("missing ',' separator".to_string()))?;
        let declared = header
            .strip_suffix(";base64")
            .ok_or_else(|| IngestError::InvalidDataUrl("payload is not base64".to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| IngestError::InvalidDataUrl(e.to_string()))?;

        let file = Self::from_bytes(name, bytes);
        Ok(if declared.is_empty() {
            file
        } else {
            file.with_mime_type(declared)
        })
    }

    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = mime_type.to_string();
        self
    }

    pub(crate) fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }
}

impl fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
