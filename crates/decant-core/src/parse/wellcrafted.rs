//! Parser for the current Well Crafted Wine & Beverage Co. invoice
//! form.
//!
//! The form prints scalar fields as stacked label/value pairs, a
//! three-column "Bill to: / Customer ID: / Ship to:" address header,
//! and a single-line item table header anchored on "No. bottles".

use tracing::warn;

use super::layout::{char_offset, slice_chars, Column, ColumnLayout, HeaderLabel};
use super::normalize::{parse_decimal, parse_long_date};
use super::patterns::*;
use super::rows::{AnchorRule, RowAssembler, TableRules};
use super::{block_rows, match_single, Result};
use crate::error::ParseError;
use crate::models::invoice::{ParsedAddress, ParsedInvoice};

pub const VENDOR_NAME: &str = "Well Crafted Wine & Beverage Co.";

const ITEM_LABELS: [HeaderLabel; 8] = [
    HeaderLabel::top(Column::Bottles, "No. bottles"),
    HeaderLabel::top(Column::Size, "Size"),
    HeaderLabel::top(Column::Code, "Code"),
    HeaderLabel::top(Column::Sku, "SKU"),
    HeaderLabel::top(Column::Description, "Brand & type"),
    HeaderLabel::top(Column::Liters, "Liters"),
    HeaderLabel::top(Column::UnitPrice, "Unit price"),
    HeaderLabel::top(Column::Amount, "Amount"),
];

static TABLE_RULES: TableRules = TableRules {
    anchors: &[
        AnchorRule::non_empty(Column::Bottles),
        AnchorRule::non_empty(Column::Sku),
        AnchorRule::non_empty(Column::Amount),
    ],
    stop: |trimmed| trimmed == "Total" || trimmed.starts_with("Total "),
    header_echo: |line| line.contains("No. bottles") && line.contains("Brand & type"),
    untitled_fallback: false,
};

pub fn can_parse(text: &str) -> bool {
    text.contains(VENDOR_NAME) && text.contains("Customer ID:")
}

pub fn parse(text: &str, source_file: &str) -> Result<ParsedInvoice> {
    let invoice_number =
        match_single(text, &WC_INVOICE_NUMBER).ok_or(ParseError::MissingField {
            field: "invoice number",
            file: source_file.to_string(),
        })?;

    let invoice_date =
        match_single(text, &WC_INVOICE_DATE).and_then(|value| parse_long_date(&value));
    let customer_id = match_single(text, &WC_CUSTOMER_ID);
    let retail_license = match_single(text, &WC_RETAIL_LICENSE);

    // The value row under "Payment terms" repeats the neighboring
    // columns' values; ours is the right-most cell.
    let payment_terms = match_single(text, &WC_PAYMENT_TERMS).and_then(|value| {
        WIDE_GAP
            .split(&value)
            .filter(|part| !part.trim().is_empty())
            .last()
            .map(|part| part.trim().to_string())
    });
    let ship_date = match_single(text, &WC_SHIP_DATE).and_then(|value| parse_long_date(&value));
    let due_date = match_single(text, &WC_DUE_DATE).and_then(|value| parse_long_date(&value));
    let salesperson = match_single(text, &WC_SALESPERSON);
    let shipping_method = match_single(text, &WC_SHIPPING_METHOD);

    let lines: Vec<&str> = text.lines().collect();

    let header_index = lines
        .iter()
        .position(|line| {
            line.contains("No. bottles") && line.contains("Brand & type") && line.contains("Amount")
        })
        .ok_or(ParseError::MissingHeader {
            header: "line item",
            file: source_file.to_string(),
        })?;

    let (customer, ship_to) =
        parse_address_blocks(&lines, customer_id, retail_license, source_file)?;

    let layout = ColumnLayout::resolve(lines[header_index], &ITEM_LABELS)?;
    let items = RowAssembler::new(&layout, &TABLE_RULES).assemble(lines[header_index..].iter().copied());
    if items.is_empty() {
        warn!(file = source_file, "no line items parsed from invoice");
    }

    let total = match_single(text, &WC_TOTAL).and_then(|value| parse_decimal(&value));

    Ok(ParsedInvoice {
        vendor: VENDOR_NAME.to_string(),
        source_file: source_file.to_string(),
        invoice_number,
        invoice_date,
        payment_terms,
        ship_date,
        due_date,
        salesperson,
        shipping_method,
        customer,
        ship_to,
        total,
        portfolio: None,
        items,
    })
}

/// Slice the bill-to and ship-to blocks out of the three-column
/// address header. The middle column also carries the customer's
/// account number, which wins over the letterhead "Customer ID:"
/// when it contains digits.
fn parse_address_blocks(
    lines: &[&str],
    letterhead_customer_id: Option<String>,
    retail_license: Option<String>,
    source_file: &str,
) -> Result<(ParsedAddress, Option<ParsedAddress>)> {
    let header_index = lines
        .iter()
        .position(|line| {
            line.contains("Bill to:") && line.contains("Customer ID:") && line.contains("Ship to:")
        })
        .ok_or(ParseError::MissingHeader {
            header: "Bill to/Ship to",
            file: source_file.to_string(),
        })?;

    let header = lines[header_index];
    let bill_start = char_offset(header, "Bill to:").expect("header located by this label");
    let id_start = char_offset(header, "Customer ID:").expect("header located by this label");
    let ship_start = char_offset(header, "Ship to:").expect("header located by this label");

    let mut bill_lines = Vec::new();
    let mut ship_lines = Vec::new();
    let mut id_cells = Vec::new();

    for row in block_rows(lines, header_index + 1) {
        let bill = slice_chars(row, bill_start, Some(id_start)).trim();
        let id = slice_chars(row, id_start, Some(ship_start)).trim();
        let ship = slice_chars(row, ship_start, None).trim();

        if !bill.is_empty() {
            bill_lines.push(bill.to_string());
        }
        if !id.is_empty() {
            id_cells.push(id.to_string());
        }
        if !ship.is_empty() {
            ship_lines.push(ship.to_string());
        }
    }

    let resolved_id = id_cells
        .iter()
        .filter_map(|cell| cell.split_whitespace().next())
        .find(|token| token.chars().any(|c| c.is_ascii_digit()))
        .map(|token| token.to_string());

    let customer = ParsedAddress {
        name: bill_lines.first().cloned(),
        lines: bill_lines.iter().skip(1).cloned().collect(),
        license_number: retail_license,
        customer_external_id: resolved_id.or(letterhead_customer_id),
        ..Default::default()
    };

    let ship_to = (!ship_lines.is_empty()).then(|| ParsedAddress {
        name: ship_lines.first().cloned(),
        lines: ship_lines.iter().skip(1).cloned().collect(),
        ..Default::default()
    });

    Ok((customer, ship_to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_address_blocks_sliced_by_header_offsets() {
        let lines = vec![
            "Bill to:                      Customer ID:        Ship to:",
            "Fine Bottle Shop              4417                Fine Bottle Shop Warehouse",
            "12 Market Street                                  88 Dock Road",
            "Baltimore, MD 21201                               Baltimore, MD 21230",
            "",
        ];

        let (customer, ship_to) =
            parse_address_blocks(&lines, Some("9999".to_string()), None, "a.pdf").unwrap();

        assert_eq!(customer.name.as_deref(), Some("Fine Bottle Shop"));
        assert_eq!(
            customer.lines,
            vec!["12 Market Street", "Baltimore, MD 21201"]
        );
        // The in-column account number beats the letterhead one.
        assert_eq!(customer.customer_external_id.as_deref(), Some("4417"));

        let ship_to = ship_to.unwrap();
        assert_eq!(ship_to.name.as_deref(), Some("Fine Bottle Shop Warehouse"));
        assert_eq!(ship_to.lines, vec!["88 Dock Road", "Baltimore, MD 21230"]);
    }

    #[test]
    fn test_missing_address_header_fails() {
        let lines = vec!["no header here"];
        let result = parse_address_blocks(&lines, None, None, "a.pdf");
        assert!(matches!(result, Err(ParseError::MissingHeader { .. })));
    }
}
