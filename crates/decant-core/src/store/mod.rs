//! Idempotent persistence of parsed invoices.
//!
//! Importing the same document twice must leave one invoice behind, so
//! backends replace by invoice number instead of appending. The trait
//! keeps the batch driver backend-agnostic; tests run against the
//! in-memory store.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::StoreError;
use crate::models::invoice::ParsedInvoice;
use crate::resolve::{resolved_quantity, resolved_unit_price};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Per-run knobs the store needs from configuration.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Slug of the tenant the invoices belong to.
    pub tenant_slug: String,
    /// Bottles per case when a line's size field names no pack count.
    pub default_case_multiplier: u32,
    /// ISO currency code recorded on created orders.
    pub currency: String,
}

/// What one upsert did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// True when a prior record for this invoice number was replaced.
    pub replaced: bool,
    /// True when the customer record had to be created.
    pub customer_created: bool,
    /// Line items written.
    pub lines_written: usize,
    /// Line items dropped for missing quantity or price.
    pub lines_skipped: usize,
}

/// Destination for parsed invoices.
#[async_trait]
pub trait InvoiceStore {
    /// Replace-or-create the invoice keyed on its invoice number.
    ///
    /// The invoice record is written even when every line is skipped;
    /// a zero-line invoice is still evidence the document was seen.
    async fn upsert_invoice(
        &self,
        invoice: &ParsedInvoice,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, StoreError>;
}

/// A line item with its SKU code, quantity and price resolved, ready
/// to write.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLine {
    pub description: String,
    pub sku_code: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub amount: Option<Decimal>,
}

/// Resolve every line of an invoice, dropping the ones that cannot be
/// stored. A line needs an SKU code (the `sku` cell, falling back to
/// the `code` cell), a quantity and a price; anything short of that is
/// skipped with a warning. Returns the writable lines and the number
/// dropped.
pub fn prepare_lines(invoice: &ParsedInvoice, default_multiplier: u32) -> (Vec<PreparedLine>, usize) {
    let mut prepared = Vec::with_capacity(invoice.items.len());
    let mut skipped = 0;

    for item in &invoice.items {
        let Some(sku_code) = item.sku.clone().or_else(|| item.code.clone()) else {
            warn!(
                invoice = %invoice.invoice_number,
                description = %item.description,
                "skipping line with no SKU code"
            );
            skipped += 1;
            continue;
        };
        let Some(quantity) = resolved_quantity(item, default_multiplier) else {
            warn!(
                invoice = %invoice.invoice_number,
                description = %item.description,
                "skipping line with no resolvable quantity"
            );
            skipped += 1;
            continue;
        };
        let Some(unit_price) = resolved_unit_price(item, quantity) else {
            warn!(
                invoice = %invoice.invoice_number,
                description = %item.description,
                "skipping line with no resolvable unit price"
            );
            skipped += 1;
            continue;
        };

        prepared.push(PreparedLine {
            description: item.description.clone(),
            sku_code,
            quantity,
            unit_price,
            amount: item.amount,
        });
    }

    (prepared, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{InvoiceLine, ParsedAddress};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn invoice(items: Vec<InvoiceLine>) -> ParsedInvoice {
        ParsedInvoice {
            vendor: "V".to_string(),
            source_file: "f.pdf".to_string(),
            invoice_number: "INV-1".to_string(),
            invoice_date: None,
            payment_terms: None,
            ship_date: None,
            due_date: None,
            salesperson: None,
            shipping_method: None,
            customer: ParsedAddress::default(),
            ship_to: None,
            total: None,
            portfolio: None,
            items,
        }
    }

    #[test]
    fn test_prepare_lines_resolves_and_skips() {
        let good = InvoiceLine {
            description: "Good".to_string(),
            sku: Some("SKU-1".to_string()),
            quantity_bottles: Some(12),
            unit_price: Some(Decimal::from_str("9.50").unwrap()),
            ..Default::default()
        };
        let by_case = InvoiceLine {
            description: "By case".to_string(),
            sku: Some("SKU-2".to_string()),
            quantity_cases: Some(Decimal::from_str("2").unwrap()),
            size: Some("6 x 750ml".to_string()),
            amount: Some(Decimal::from_str("120.00").unwrap()),
            ..Default::default()
        };
        let no_quantity = InvoiceLine {
            description: "No quantity".to_string(),
            sku: Some("SKU-3".to_string()),
            amount: Some(Decimal::from_str("50.00").unwrap()),
            ..Default::default()
        };
        let no_price = InvoiceLine {
            description: "No price".to_string(),
            sku: Some("SKU-4".to_string()),
            quantity_bottles: Some(6),
            ..Default::default()
        };

        let (lines, skipped) = prepare_lines(&invoice(vec![good, by_case, no_quantity, no_price]), 12);

        assert_eq!(skipped, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 12);
        assert_eq!(lines[1].quantity, 12);
        assert_eq!(lines[1].unit_price, Decimal::from_str("10").unwrap());
    }

    #[test]
    fn test_prepare_lines_skips_line_without_sku_code() {
        // Resolvable quantity and price are not enough; a line with
        // neither an SKU nor a code cell never reaches the store.
        let item = InvoiceLine {
            description: "Anonymous wine".to_string(),
            quantity_bottles: Some(12),
            unit_price: Some(Decimal::from_str("9.50").unwrap()),
            ..Default::default()
        };
        let (lines, skipped) = prepare_lines(&invoice(vec![item]), 12);
        assert_eq!(lines.len(), 0);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_prepare_lines_prefers_sku_over_code() {
        let item = InvoiceLine {
            description: "Item".to_string(),
            sku: Some("SKU-9".to_string()),
            code: Some("CODE-9".to_string()),
            quantity_bottles: Some(1),
            unit_price: Some(Decimal::ONE),
            ..Default::default()
        };
        let (lines, _) = prepare_lines(&invoice(vec![item]), 12);
        assert_eq!(lines[0].sku_code, "SKU-9");

        let code_only = InvoiceLine {
            description: "Item".to_string(),
            code: Some("CODE-9".to_string()),
            quantity_bottles: Some(1),
            unit_price: Some(Decimal::ONE),
            ..Default::default()
        };
        let (lines, _) = prepare_lines(&invoice(vec![code_only]), 12);
        assert_eq!(lines[0].sku_code, "CODE-9");
    }
}
