//! Helpers for sanitizing data before it enters log lines and span fields.
//!
//! Uploaded documents are confidential research; their names can reveal the
//! deal or company being covered, so logs only ever see a redacted form.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Replaces a file name's stem with its character count, keeping the extension.
///
/// - `Q3 Nutrien notes.pdf` → `<16 chars>.pdf`
/// - `README` → `<6 chars>`
pub fn redact_name(name: &str) -> String {
    let name = redact_path(Path::new(name));
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!("<{} chars>.{}", stem.chars().count(), ext)
        }
        _ => format!("<{} chars>", name.chars().count()),
    }
}
