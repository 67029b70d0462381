//! Parser for Canopy Wine Selections invoices.
//!
//! Canopy prints a three-column "Seller: / Bill to: / Ship to:"
//! address header, but its item table renders with ragged columns, so
//! data rows are segmented with a whole-row pattern instead of header
//! offsets. Continuation rows still fold into the accumulating item.

use tracing::warn;

use super::layout::{char_offset, slice_chars};
use super::normalize::{clean_row, parse_decimal, parse_integer, parse_long_date};
use super::patterns::*;
use super::{block_rows, match_single, Result};
use crate::error::ParseError;
use crate::models::invoice::{InvoiceLine, ParsedAddress, ParsedInvoice};
use rust_decimal::Decimal;

pub const VENDOR_NAME: &str = "Canopy Wine Selections";

pub fn can_parse(text: &str) -> bool {
    text.contains(VENDOR_NAME)
}

pub fn parse(text: &str, source_file: &str) -> Result<ParsedInvoice> {
    let invoice_number =
        match_single(text, &CANOPY_INVOICE_NUMBER).ok_or(ParseError::MissingField {
            field: "invoice number",
            file: source_file.to_string(),
        })?;

    let invoice_date =
        match_single(text, &CANOPY_INVOICE_DATE).and_then(|value| parse_long_date(&value));

    let lines: Vec<&str> = text.lines().collect();
    let seller = parse_seller_blocks(&lines, source_file)?;

    let salesperson = seller
        .labeled("Salesperson:")
        .or_else(|| match_single(text, &CANOPY_SALESPERSON));
    let portfolio = seller.labeled("Portfolio:");

    let header_index = lines
        .iter()
        .position(|line| {
            line.contains("Name:")
                && line.contains("Item #:")
                && line.contains("Cases:")
                && line.contains("Net price USD")
        })
        .ok_or(ParseError::MissingHeader {
            header: "item table",
            file: source_file.to_string(),
        })?;

    let (items, printed_total) = parse_items(&lines[header_index..]);
    if items.is_empty() {
        warn!(file = source_file, "no line items parsed from invoice");
    }

    let vendor = seller
        .seller_lines
        .first()
        .filter(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| VENDOR_NAME.to_string());

    Ok(ParsedInvoice {
        vendor,
        source_file: source_file.to_string(),
        invoice_number,
        invoice_date,
        payment_terms: None,
        ship_date: None,
        due_date: None,
        salesperson,
        shipping_method: match_single(text, &CANOPY_SHIPPING_METHOD),
        customer: seller.customer,
        ship_to: seller.ship_to,
        total: printed_total,
        portfolio,
        items,
    })
}

struct SellerBlocks {
    seller_lines: Vec<String>,
    customer: ParsedAddress,
    ship_to: Option<ParsedAddress>,
}

impl SellerBlocks {
    /// Value of a "Label: value" entry in the seller column.
    fn labeled(&self, label: &str) -> Option<String> {
        self.seller_lines
            .iter()
            .find(|cell| cell.starts_with(label))
            .map(|cell| cell[label.len()..].trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

fn parse_seller_blocks(lines: &[&str], source_file: &str) -> Result<SellerBlocks> {
    let header_index = lines
        .iter()
        .position(|line| {
            line.contains("Seller:") && line.contains("Bill to:") && line.contains("Ship to:")
        })
        .ok_or(ParseError::MissingHeader {
            header: "Seller/Bill to/Ship to",
            file: source_file.to_string(),
        })?;

    let header = lines[header_index];
    let seller_start = char_offset(header, "Seller:").expect("header located by this label");
    let bill_start = char_offset(header, "Bill to:").expect("header located by this label");
    let ship_start = char_offset(header, "Ship to:").expect("header located by this label");

    let mut seller_lines = Vec::new();
    let mut bill_cells = Vec::new();
    let mut ship_cells = Vec::new();

    for row in block_rows(lines, header_index + 1) {
        seller_lines.push(slice_chars(row, seller_start, Some(bill_start)).trim().to_string());
        bill_cells.push(slice_chars(row, bill_start, Some(ship_start)).trim().to_string());
        ship_cells.push(slice_chars(row, ship_start, None).trim().to_string());
    }

    // Tax and license annotations print inside the bill-to column but
    // are not address lines.
    let is_address_cell =
        |cell: &String| !cell.is_empty() && !cell.starts_with("Tax") && !cell.starts_with("License");

    let customer_name = bill_cells.iter().find(|cell| is_address_cell(cell)).cloned();
    let customer_lines: Vec<String> = bill_cells
        .iter()
        .filter(|cell| is_address_cell(cell))
        .filter(|cell| Some(*cell) != customer_name.as_ref())
        .cloned()
        .collect();

    let ship_name = ship_cells.iter().find(|cell| !cell.is_empty()).cloned();
    let ship_lines: Vec<String> = ship_cells
        .iter()
        .filter(|cell| !cell.is_empty())
        .filter(|cell| Some(*cell) != ship_name.as_ref())
        .cloned()
        .collect();

    let customer = ParsedAddress {
        name: customer_name,
        lines: customer_lines,
        ..Default::default()
    };
    let ship_to = ship_name.map(|name| ParsedAddress {
        name: Some(name),
        lines: ship_lines,
        ..Default::default()
    });

    Ok(SellerBlocks {
        seller_lines,
        customer,
        ship_to,
    })
}

/// Fold the item rows into line items. Returns the items plus the
/// grand total printed on the terminal "Total:" row, when present.
fn parse_items(lines: &[&str]) -> (Vec<InvoiceLine>, Option<Decimal>) {
    let mut items = Vec::new();
    let mut total = None;
    let mut current: Option<InvoiceLine> = None;

    // The first two physical lines are the two-line column header.
    for raw in lines.iter().skip(2) {
        let line = clean_row(raw);
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with("Total:") {
            total = MONEY
                .find_iter(trimmed)
                .last()
                .and_then(|m| parse_decimal(m.as_str()));
            break;
        }
        if trimmed.starts_with("Certified") || trimmed.starts_with("Name:") {
            continue;
        }

        if let Some(caps) = CANOPY_ITEM_ROW.captures(line) {
            if let Some(done) = current.take() {
                items.push(done);
            }
            current = Some(InvoiceLine {
                description: caps[1].trim().to_string(),
                sku: non_empty(caps[2].trim()),
                code: None,
                size: non_empty(caps[4].trim()),
                quantity_cases: parse_decimal(caps[3].trim()),
                quantity_bottles: parse_integer(caps[5].trim()),
                liters: None,
                unit_price: parse_decimal(caps[6].trim()),
                amount: parse_decimal(caps[8].trim()),
            });
            continue;
        }

        if let Some(item) = current.as_mut() {
            if item.description.is_empty() {
                item.description = trimmed.to_string();
            } else {
                item.description = format!("{} {}", item.description, trimmed);
            }
        }
    }

    if let Some(done) = current.take() {
        items.push(done);
    }

    (items, total)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_item_row_pattern_groups() {
        let row = "Veramonte Sauvignon Blanc   VM-2210   4.0   12 x 750ml   48   9.50   0.00   456.00";
        let caps = CANOPY_ITEM_ROW.captures(row).unwrap();
        assert_eq!(caps[1].trim(), "Veramonte Sauvignon Blanc");
        assert_eq!(&caps[2], "VM-2210");
        assert_eq!(&caps[3], "4.0");
        assert_eq!(caps[4].trim(), "12 x 750ml");
        assert_eq!(&caps[5], "48");
        assert_eq!(&caps[6], "9.50");
        assert_eq!(&caps[8], "456.00");
    }

    #[test]
    fn test_parse_items_merges_continuations_and_reads_total() {
        let lines = [
            "Name:                       Item #:   Cases:   Size:   Bottles:   Price:   Disc:   Net price USD",
            "",
            "Veramonte Sauvignon Blanc   VM-2210   4.0   12 x 750ml   48   9.50   0.00   456.00",
            "    Casablanca Valley 2023",
            "Domaine Example Rouge   DE-0042   2.0   12 x 750ml   24   14.00   0.00   336.00",
            "Total:   792.00",
        ];

        let (items, total) = parse_items(&lines);
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].description,
            "Veramonte Sauvignon Blanc Casablanca Valley 2023"
        );
        assert_eq!(items[0].quantity_bottles, Some(48));
        assert_eq!(total, Some(Decimal::from_str("792.00").unwrap()));
    }
}
