//! Error types for the decant-core library.

use thiserror::Error;

/// Main error type for the decant library.
#[derive(Error, Debug)]
pub enum DecantError {
    /// Text extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Invoice parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while extracting layout-mode text from a PDF.
///
/// Every variant is fatal for the file in question but never for the
/// batch; the driver logs and moves on.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The extraction tool could not be spawned.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The extraction tool exited with a failure status.
    #[error("{tool} failed for {file}: {stderr}")]
    ToolFailure {
        tool: &'static str,
        file: String,
        stderr: String,
    },

    /// The file yielded no usable text (blank or scanned without OCR).
    #[error("no extractable text in {0}")]
    NoText(String),
}

/// Errors raised while parsing an extracted text blob.
#[derive(Error, Debug)]
pub enum ParseError {
    /// No vendor signature matched. A normal per-file outcome, not a
    /// batch failure.
    #[error("unsupported invoice format")]
    UnsupportedFormat,

    /// A required scalar field could not be located.
    #[error("missing required field {field} in {file}")]
    MissingField { field: &'static str, file: String },

    /// A header row needed for layout resolution could not be found.
    #[error("unable to locate {header} header in {file}")]
    MissingHeader { header: &'static str, file: String },

    /// A column label was absent from the header line it should be on.
    #[error("column layout error: {0}")]
    Layout(String),
}

/// Errors raised by the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The tenant slug did not resolve to a tenant record.
    #[error("unable to resolve tenant {0}")]
    UnknownTenant(String),

    /// Database-level failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for the decant library.
pub type Result<T> = std::result::Result<T, DecantError>;
