//! Runtime configuration for the import pipeline.

use serde::{Deserialize, Serialize};

use crate::error::DecantError;

/// Main configuration for a decant run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecantConfig {
    /// Import/persistence configuration.
    pub import: ImportConfig,

    /// Text extraction configuration.
    pub extraction: ExtractionConfig,
}

impl Default for DecantConfig {
    fn default() -> Self {
        Self {
            import: ImportConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

/// Persistence-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Tenant slug invoices are imported under.
    pub tenant_slug: String,

    /// Bottles per case when the size field carries no "<N> x" pattern.
    pub default_case_multiplier: u32,

    /// Currency code recorded on created orders.
    pub currency: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            tenant_slug: "well-crafted".to_string(),
            default_case_multiplier: 12,
            currency: "USD".to_string(),
        }
    }
}

/// Text extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Name of the layout-mode extraction binary.
    pub pdftotext_bin: String,

    /// Directory name used when no --directory flag is given,
    /// resolved as a sibling of the working directory.
    pub default_directory: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pdftotext_bin: "pdftotext".to_string(),
            default_directory: "invoices".to_string(),
        }
    }
}

impl DecantConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DecantError::Config(format!("{}: {e}", path.display())))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DecantError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
