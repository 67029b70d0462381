//! Vendor detection and invoice parsing.
//!
//! Each supported vendor prints a structurally different invoice; the
//! parsers share the column-layout and row-assembly machinery but keep
//! their own label sets and anchor rules. Detection is signature-based
//! on literal letterhead phrases, evaluated in a fixed priority order.

pub mod canopy;
pub mod layout;
pub mod normalize;
pub mod patterns;
pub mod rows;
pub mod wellcrafted;
pub mod wellcrafted_classic;

use regex::Regex;

use crate::error::ParseError;
use crate::models::invoice::ParsedInvoice;

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// The closed set of supported vendor layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    /// Current Well Crafted invoice form ("Customer ID:" letterhead).
    WellCrafted,
    /// Older Well Crafted distributor form.
    WellCraftedClassic,
    /// Canopy Wine Selections.
    Canopy,
}

impl Vendor {
    /// Detection priority. The modern Well Crafted predicate requires
    /// the "Customer ID:" label the classic form lacks, so it is
    /// checked first; Canopy's letterhead is unambiguous and goes
    /// last.
    pub const DETECTION_ORDER: [Vendor; 3] = [
        Vendor::WellCrafted,
        Vendor::WellCraftedClassic,
        Vendor::Canopy,
    ];

    /// First vendor whose signature matches, if any. A `None` here is
    /// a normal per-file outcome, not an error.
    pub fn detect(text: &str) -> Option<Vendor> {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|vendor| vendor.can_parse(text))
    }

    /// Signature predicate for this vendor's letterhead.
    pub fn can_parse(self, text: &str) -> bool {
        match self {
            Vendor::WellCrafted => wellcrafted::can_parse(text),
            Vendor::WellCraftedClassic => wellcrafted_classic::can_parse(text),
            Vendor::Canopy => canopy::can_parse(text),
        }
    }

    /// Parse one text blob into a structured invoice.
    pub fn parse(self, text: &str, source_file: &str) -> Result<ParsedInvoice> {
        match self {
            Vendor::WellCrafted => wellcrafted::parse(text, source_file),
            Vendor::WellCraftedClassic => wellcrafted_classic::parse(text, source_file),
            Vendor::Canopy => canopy::parse(text, source_file),
        }
    }
}

/// Detect the vendor and parse in one step.
pub fn parse_invoice(text: &str, source_file: &str) -> Result<ParsedInvoice> {
    let vendor = Vendor::detect(text).ok_or(ParseError::UnsupportedFormat)?;
    vendor.parse(text, source_file)
}

/// First capture group of the first match, trimmed. `None` when the
/// pattern does not match or the group is blank.
pub(crate) fn match_single(text: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|group| group.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// The contiguous block of rows after `start`: leading blank lines are
/// skipped, then rows are collected until the next blank line.
pub(crate) fn block_rows<'a>(lines: &[&'a str], start: usize) -> Vec<&'a str> {
    let mut rows = Vec::new();
    let mut started = false;

    for &row in lines.iter().skip(start) {
        let blank = row.trim().is_empty();
        if !started && blank {
            continue;
        }
        if started && blank {
            break;
        }
        started = true;
        rows.push(row);
    }

    rows
}
