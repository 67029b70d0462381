//! Parser for the older Well Crafted distributor invoice form.
//!
//! The classic form has no "Customer ID:" letterhead; the licensee
//! address is printed as labeled lines, and the item table splits its
//! quantity header across two physical lines ("CASES / BOTTLES" under
//! a quantity group).

use tracing::warn;

use super::layout::{Column, ColumnLayout, HeaderLabel};
use super::normalize::parse_long_date;
use super::patterns::*;
use super::rows::{starts_alphanumeric, starts_numeric, AnchorRule, RowAssembler, TableRules};
use super::{match_single, Result};
use crate::error::ParseError;
use crate::models::invoice::{ParsedAddress, ParsedInvoice};

pub const VENDOR_NAME: &str = "Well Crafted Wine & Beverage Co.";

// "LITERS" and "TOTAL" both repeat in the header line; the item
// columns are the right-most occurrences.
const ITEM_LABELS: [HeaderLabel; 9] = [
    HeaderLabel::bottom(Column::Cases, "CASES"),
    HeaderLabel::bottom(Column::Bottles, "BOTTLES"),
    HeaderLabel::top(Column::Size, "SIZE IN"),
    HeaderLabel::top(Column::Code, "CODE"),
    HeaderLabel::top(Column::Sku, "SKU"),
    HeaderLabel::top(Column::Description, "BRAND"),
    HeaderLabel::top(Column::Liters, "LITERS").last(),
    HeaderLabel::top(Column::UnitPrice, "BOTTLE"),
    HeaderLabel::top(Column::Amount, "TOTAL").last(),
];

static TABLE_RULES: TableRules = TableRules {
    anchors: &[
        AnchorRule::non_empty(Column::Cases),
        AnchorRule::matching(Column::Sku, starts_alphanumeric),
        AnchorRule::matching(Column::Amount, starts_numeric),
    ],
    stop: |trimmed| trimmed.starts_with("DATE") || trimmed.starts_with("Invoices shall"),
    header_echo: |line| line.contains("SIZE IN") && line.contains("BRAND"),
    untitled_fallback: true,
};

pub fn can_parse(text: &str) -> bool {
    text.contains("Distributor") && text.contains(VENDOR_NAME) && text.contains("Invoice No")
}

pub fn parse(text: &str, source_file: &str) -> Result<ParsedInvoice> {
    let invoice_number = match_single(text, &WCC_INVOICE_NO).ok_or(ParseError::MissingField {
        field: "invoice number",
        file: source_file.to_string(),
    })?;

    let invoice_date =
        match_single(text, &WCC_INVOICE_DATE).and_then(|value| parse_long_date(&value));
    let payment_terms = match_single(text, &WCC_TERMS);
    let salesperson = match_single(text, &WCC_SALESPERSON);

    let licensee = match_single(text, &WCC_LICENSEE);
    let license_number = match_single(text, &WCC_LICENSE_NO);
    let address_lines: Vec<String> = [
        match_single(text, &WCC_STREET),
        match_single(text, &WCC_STREET_CONTINUATION),
        match_single(text, &WCC_CITY),
    ]
    .into_iter()
    .flatten()
    .collect();

    let customer = ParsedAddress {
        name: licensee.clone(),
        lines: address_lines.clone(),
        license_number,
        ..Default::default()
    };
    // The classic form has no separate ship-to block; goods ship to
    // the licensee address.
    let ship_to = Some(ParsedAddress {
        name: licensee,
        lines: address_lines,
        ..Default::default()
    });

    let lines: Vec<&str> = text.lines().collect();
    let header_index = lines
        .iter()
        .position(|line| {
            line.contains("TOTAL") && line.contains("SIZE IN") && line.contains("BOTTLE")
        })
        .ok_or(ParseError::MissingHeader {
            header: "item table",
            file: source_file.to_string(),
        })?;

    let top = lines[header_index];
    let bottom = lines.get(header_index + 1).copied().unwrap_or("");
    let layout = ColumnLayout::resolve_split(top, bottom, &ITEM_LABELS)?;

    let items = RowAssembler::new(&layout, &TABLE_RULES)
        .assemble(lines[header_index + 2..].iter().copied());
    if items.is_empty() {
        warn!(file = source_file, "no line items parsed from invoice");
    }

    let mut invoice = ParsedInvoice {
        vendor: VENDOR_NAME.to_string(),
        source_file: source_file.to_string(),
        invoice_number,
        invoice_date,
        payment_terms,
        ship_date: None,
        due_date: None,
        salesperson,
        shipping_method: None,
        customer,
        ship_to,
        total: None,
        portfolio: None,
        items,
    };
    // No grand total is printed on this form.
    invoice.total = Some(invoice.computed_total());

    Ok(invoice)
}
