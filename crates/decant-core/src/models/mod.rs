//! Data models for parsed invoices and runtime configuration.

pub mod config;
pub mod invoice;
