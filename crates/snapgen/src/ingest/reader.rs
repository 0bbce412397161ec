use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::IngestError;

/// Terminal result of one file read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Completed,
    Failed(String),
    Aborted,
}

impl ReadOutcome {
    /// Maps a read that did not complete to the matching [`IngestError`].
    pub fn into_result(self, name: &str) -> Result<(), IngestError> {
        match self {
            ReadOutcome::Completed => Ok(()),
            ReadOutcome::Failed(message) => Err(IngestError::Read {
                name: name.to_string(),
                message,
            }),
            ReadOutcome::Aborted => Err(IngestError::Aborted),
        }
    }
}

/// `round(loaded * 100 / total)`, or `None` when the total is unknown or zero.
pub fn progress_percent(loaded: u64, total: Option<u64>) -> Option<u8> {
    match total {
        Some(total) if total > 0 => {
            let percent = (loaded as f64 * 100.0 / total as f64).round();
            Some(percent.clamp(0.0, 100.0) as u8)
        }
        _ => None,
    }
}

/// Reads `reader` to the end in `chunk_size` pieces, calling `on_progress`
/// after each chunk when the total is known.
pub(crate) async fn read_chunked<R, F>(
    reader: &mut R,
    total: Option<u64>,
    chunk_size: usize,
    limit: u64,
    mut on_progress: F,
) -> Result<Vec<u8>, String>
where
    R: AsyncRead + Unpin + ?Sized,
    F: FnMut(u8),
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut data = Vec::with_capacity(total.unwrap_or(0).min(limit) as usize);

    loop {
        let n = reader.read(&mut buf).await.map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        if data.len() as u64 > limit {
            return Err(format!("file exceeds the {} byte limit", limit));
        }
        if let Some(percent) = progress_percent(data.len() as u64, total) {
            on_progress(percent);
        }
    }

    if data.is_empty() {
        return Err("empty file".to_string());
    }
    Ok(data)
}
