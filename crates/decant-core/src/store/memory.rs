//! In-memory invoice store with the same replace-by-number semantics
//! as the Postgres backend. Used by driver and integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use super::{prepare_lines, ImportOptions, ImportOutcome, InvoiceStore, PreparedLine};
use crate::error::StoreError;
use crate::models::invoice::ParsedInvoice;

/// One stored invoice, keyed by invoice number.
#[derive(Debug, Clone)]
pub struct StoredInvoice {
    pub invoice: ParsedInvoice,
    pub customer_name: Option<String>,
    pub lines: Vec<PreparedLine>,
}

#[derive(Default)]
pub struct MemoryStore {
    invoices: Mutex<HashMap<String, StoredInvoice>>,
    customers: Mutex<Vec<String>>,
    /// SKU catalog to resolve line codes against. `None` treats every
    /// code as known.
    skus: Option<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose SKU catalog contains exactly `codes`; lines with
    /// any other code are skipped, as the Postgres backend does.
    pub fn with_skus<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            skus: Some(codes.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    fn sku_known(&self, code: &str) -> bool {
        self.skus.as_ref().map_or(true, |known| known.contains(code))
    }

    pub fn len(&self) -> usize {
        self.invoices.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, invoice_number: &str) -> Option<StoredInvoice> {
        self.invoices.lock().unwrap().get(invoice_number).cloned()
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn upsert_invoice(
        &self,
        invoice: &ParsedInvoice,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, StoreError> {
        let (prepared, mut lines_skipped) = prepare_lines(invoice, options.default_case_multiplier);
        let mut lines = Vec::with_capacity(prepared.len());
        for line in prepared {
            if self.sku_known(&line.sku_code) {
                lines.push(line);
            } else {
                warn!(
                    invoice = %invoice.invoice_number,
                    sku = %line.sku_code,
                    "skipping line with unknown SKU"
                );
                lines_skipped += 1;
            }
        }

        let customer_name = invoice.customer.name.clone();
        let customer_created = match customer_name.as_deref() {
            Some(name) => {
                let mut customers = self.customers.lock().unwrap();
                if customers.iter().any(|existing| existing == name) {
                    false
                } else {
                    customers.push(name.to_string());
                    true
                }
            }
            None => false,
        };

        let lines_written = lines.len();
        let replaced = self
            .invoices
            .lock()
            .unwrap()
            .insert(
                invoice.invoice_number.clone(),
                StoredInvoice {
                    invoice: invoice.clone(),
                    customer_name,
                    lines,
                },
            )
            .is_some();

        Ok(ImportOutcome {
            replaced,
            customer_created,
            lines_written,
            lines_skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{InvoiceLine, ParsedAddress};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn options() -> ImportOptions {
        ImportOptions {
            tenant_slug: "well-crafted".to_string(),
            default_case_multiplier: 12,
            currency: "USD".to_string(),
        }
    }

    fn invoice(number: &str) -> ParsedInvoice {
        ParsedInvoice {
            vendor: "V".to_string(),
            source_file: "f.pdf".to_string(),
            invoice_number: number.to_string(),
            invoice_date: None,
            payment_terms: None,
            ship_date: None,
            due_date: None,
            salesperson: None,
            shipping_method: None,
            customer: ParsedAddress {
                name: Some("Fine Bottle Shop".to_string()),
                ..Default::default()
            },
            ship_to: None,
            total: None,
            portfolio: None,
            items: vec![InvoiceLine {
                description: "Wine".to_string(),
                sku: Some("WINE-1".to_string()),
                quantity_bottles: Some(12),
                unit_price: Some(Decimal::ONE),
                ..Default::default()
            }],
        }
    }

    #[tokio::test]
    async fn test_reimport_replaces_instead_of_appending() {
        let store = MemoryStore::new();

        let first = store.upsert_invoice(&invoice("INV-1"), &options()).await.unwrap();
        assert!(!first.replaced);
        assert!(first.customer_created);
        assert_eq!(first.lines_written, 1);

        let second = store.upsert_invoice(&invoice("INV-1"), &options()).await.unwrap();
        assert!(second.replaced);
        assert!(!second.customer_created);

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_sku_line_is_skipped() {
        let store = MemoryStore::with_skus(["OTHER-1"]);

        let outcome = store.upsert_invoice(&invoice("INV-2"), &options()).await.unwrap();
        assert_eq!(outcome.lines_written, 0);
        assert_eq!(outcome.lines_skipped, 1);

        // The invoice record itself is still written.
        let stored = store.get("INV-2").unwrap();
        assert!(stored.lines.is_empty());
    }
}
