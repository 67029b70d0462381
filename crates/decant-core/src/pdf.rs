//! Layout-mode text extraction from PDF documents.
//!
//! Parsing depends on column positions surviving extraction, so text
//! comes from Poppler's `pdftotext -layout`, which preserves the
//! page's horizontal geometry as runs of spaces. Extraction sits
//! behind a trait so parser and driver tests can feed in prepared
//! text without a PDF or the external tool.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::ExtractError;

/// Source of layout-mode text for a document on disk.
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Extractor shelling out to Poppler's `pdftotext`.
pub struct PdftotextExtractor {
    binary: String,
}

impl PdftotextExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl TextExtractor for PdftotextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        debug!(file = %path.display(), tool = %self.binary, "extracting layout text");

        let output = Command::new(&self.binary)
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|source| ExtractError::Spawn {
                tool: "pdftotext",
                source,
            })?;

        if !output.status.success() {
            return Err(ExtractError::ToolFailure {
                tool: "pdftotext",
                file: path.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(ExtractError::NoText(path.display().to_string()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_a_spawn_error() {
        let extractor = PdftotextExtractor::new("pdftotext-does-not-exist");
        let result = extractor.extract(Path::new("whatever.pdf"));
        assert!(matches!(result, Err(ExtractError::Spawn { .. })));
    }
}
