//! Normalized invoice records produced by the vendor parsers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A complete invoice as recovered from one source document.
///
/// Produced in full by a single parse call and never mutated
/// afterwards. `invoice_number` is the natural external key used for
/// idempotent replacement downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedInvoice {
    /// Issuing vendor name as printed on the document.
    pub vendor: String,

    /// Path of the source file the invoice came from.
    pub source_file: String,

    /// Invoice number. Required; its absence is a hard parse failure.
    pub invoice_number: String,

    /// Invoice issue date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Payment terms (e.g. "Net 30").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,

    /// Ship date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<NaiveDate>,

    /// Payment due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Salesperson on record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<String>,

    /// Shipping method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,

    /// Bill-to customer address block.
    pub customer: ParsedAddress,

    /// Ship-to address block, when distinct from the customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_to: Option<ParsedAddress>,

    /// Grand total. Read from the document where printed, otherwise
    /// computed from line amounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,

    /// Portfolio name (Canopy invoices only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,

    /// Line items in document order.
    pub items: Vec<InvoiceLine>,
}

impl ParsedInvoice {
    /// Sum of all line amounts. Used as the grand total for vendors
    /// that do not print one.
    pub fn computed_total(&self) -> Decimal {
        self.items.iter().filter_map(|line| line.amount).sum()
    }
}

/// An address block column-sliced out of a document.
///
/// `lines` holds the address lines after the name, order-preserving,
/// with blank entries dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedAddress {
    /// Name line (first non-blank line of the block).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Remaining address lines in document order.
    pub lines: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// Retail/alcohol license number, when printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,

    /// Vendor-side customer identifier, used for customer resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_external_id: Option<String>,
}

/// One logical line item, possibly assembled from several physical
/// rows (overflow description lines are merged in).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Product description (brand and type).
    pub description: String,

    /// Distributor SKU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Regulatory/product code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Pack size (e.g. "12 x 750ml").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Bottle count, when the vendor bills by bottle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_bottles: Option<u32>,

    /// Case count, when the vendor bills by case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_cases: Option<Decimal>,

    /// Total liters for the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liters: Option<Decimal>,

    /// Per-bottle price, when printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Extended line amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl InvoiceLine {
    /// Whether either quantity column carried a value.
    pub fn has_quantity(&self) -> bool {
        self.quantity_bottles.is_some() || self.quantity_cases.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn line(amount: Option<&str>) -> InvoiceLine {
        InvoiceLine {
            description: "Test".to_string(),
            amount: amount.map(|a| Decimal::from_str(a).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_computed_total_sums_present_amounts() {
        let invoice = ParsedInvoice {
            vendor: "V".to_string(),
            source_file: "f.pdf".to_string(),
            invoice_number: "1".to_string(),
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
            items: vec![line(Some("10.50")), line(None), line(Some("4.25"))],
        };

        assert_eq!(invoice.computed_total(), Decimal::from_str("14.75").unwrap());
    }

    #[test]
    fn test_optional_fields_skipped_in_json() {
        let json = serde_json::to_string(&line(None)).unwrap();
        assert!(!json.contains("sku"));
        assert!(!json.contains("amount"));
    }
}
