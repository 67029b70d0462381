//! Core library for importing distributor wine invoices.
//!
//! This crate provides:
//! - Layout-mode text extraction from PDF invoices (via pdftotext)
//! - Vendor detection and per-vendor invoice parsing
//! - Quantity and unit-price resolution for line items
//! - Idempotent persistence keyed on invoice number

pub mod error;
pub mod models;
pub mod parse;
pub mod pdf;
pub mod resolve;
pub mod store;

pub use error::{DecantError, ExtractError, ParseError, Result, StoreError};
pub use models::config::{DecantConfig, ExtractionConfig, ImportConfig};
pub use models::invoice::{InvoiceLine, ParsedAddress, ParsedInvoice};
pub use parse::{parse_invoice, Vendor};
pub use pdf::{PdftotextExtractor, TextExtractor};
pub use resolve::{resolved_quantity, resolved_unit_price, DEFAULT_CASE_MULTIPLIER};
pub use store::{ImportOptions, ImportOutcome, InvoiceStore, MemoryStore, PostgresStore};
