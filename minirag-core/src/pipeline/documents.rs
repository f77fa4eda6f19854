//! Document loading

use super::{PipelineError, Result};
use std::path::Path;

/// Read a document as text
///
/// Fails with [`PipelineError::DocumentNotFound`] when nothing exists at
/// `path`. Bytes that are not valid UTF-8 are dropped.
pub fn load_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PipelineError::DocumentNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Loaded document");
    Ok(decode_ignoring_invalid(&bytes))
}

fn decode_ignoring_invalid(mut bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                text.push_str(valid);
                return text;
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                // Checked by from_utf8 above
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                let skip = err.error_len().unwrap_or(rest.len());
                bytes = &rest[skip..];
            }
        }
    }
}
