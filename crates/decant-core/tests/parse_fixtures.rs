//! End-to-end parses of captured layout-mode text for each vendor.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;

use decant_core::{parse_invoice, ImportOptions, InvoiceStore, MemoryStore, Vendor};

const MODERN: &str = include_str!("fixtures/wellcrafted_modern.txt");
const CLASSIC: &str = include_str!("fixtures/wellcrafted_classic.txt");
const CANOPY: &str = include_str!("fixtures/canopy.txt");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn test_vendor_detection_on_fixtures() {
    assert_eq!(Vendor::detect(MODERN), Some(Vendor::WellCrafted));
    assert_eq!(Vendor::detect(CLASSIC), Some(Vendor::WellCraftedClassic));
    assert_eq!(Vendor::detect(CANOPY), Some(Vendor::Canopy));
}

#[test]
fn test_modern_wellcrafted_invoice() {
    let invoice = parse_invoice(MODERN, "modern.pdf").unwrap();

    assert_eq!(invoice.invoice_number, "12345");
    assert_eq!(invoice.invoice_date, Some(date(2024, 3, 5)));
    assert_eq!(invoice.payment_terms.as_deref(), Some("Net 30"));
    assert_eq!(invoice.ship_date, Some(date(2024, 3, 6)));
    assert_eq!(invoice.due_date, Some(date(2024, 4, 4)));
    assert_eq!(invoice.salesperson.as_deref(), Some("Jordan Reed"));
    assert_eq!(invoice.shipping_method.as_deref(), Some("Delivery"));

    assert_eq!(invoice.customer.name.as_deref(), Some("Fine Bottle Shop"));
    assert_eq!(
        invoice.customer.customer_external_id.as_deref(),
        Some("4417")
    );
    assert_eq!(invoice.customer.license_number.as_deref(), Some("R-778899"));
    assert_eq!(
        invoice.ship_to.as_ref().and_then(|s| s.name.as_deref()),
        Some("Fine Bottle Shop Warehouse")
    );

    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.items[0].description, "Chateau Example Rouge 2019");
    assert_eq!(invoice.items[0].quantity_bottles, Some(12));
    assert_eq!(invoice.items[0].sku.as_deref(), Some("WC-99"));
    assert_eq!(invoice.items[0].unit_price, Some(dec("14.00")));
    assert_eq!(invoice.items[0].amount, Some(dec("168.00")));
    assert_eq!(invoice.items[1].description, "Sparkling Example");
    assert_eq!(invoice.items[1].quantity_bottles, Some(24));

    assert_eq!(invoice.total, Some(dec("432.00")));
    assert_eq!(invoice.computed_total(), dec("432.00"));
}

#[test]
fn test_classic_wellcrafted_invoice() {
    let invoice = parse_invoice(CLASSIC, "classic.pdf").unwrap();

    assert_eq!(invoice.invoice_number, "8712");
    assert_eq!(invoice.invoice_date, Some(date(2024, 3, 5)));
    assert_eq!(invoice.payment_terms.as_deref(), Some("Net 30"));
    assert_eq!(invoice.salesperson.as_deref(), Some("Jordan Reed"));

    assert_eq!(invoice.customer.name.as_deref(), Some("Fine Bottle Shop"));
    assert_eq!(invoice.customer.license_number.as_deref(), Some("R-778899"));
    assert_eq!(
        invoice.customer.lines,
        vec!["12 Market Street", "Suite 4", "Baltimore, MD 21201"]
    );

    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.items[0].description, "CHATEAU EXAMPLE ROUGE 2019");
    assert_eq!(invoice.items[0].quantity_cases, Some(dec("5")));
    assert_eq!(invoice.items[0].quantity_bottles, Some(60));
    assert_eq!(invoice.items[0].amount, Some(dec("840.00")));
    // A row with no brand text names itself after its SKU.
    assert_eq!(invoice.items[1].description, "WC-55");
    assert_eq!(invoice.items[1].quantity_cases, Some(dec("1")));

    // No printed grand total on this form; the sum of line amounts
    // stands in.
    assert_eq!(invoice.total, Some(dec("972.00")));
}

#[test]
fn test_canopy_invoice() {
    let invoice = parse_invoice(CANOPY, "canopy.pdf").unwrap();

    assert_eq!(invoice.vendor, "Canopy Wine Selections");
    assert_eq!(invoice.invoice_number, "CWS-1042");
    assert_eq!(invoice.invoice_date, Some(date(2024, 3, 5)));
    assert_eq!(invoice.salesperson.as_deref(), Some("Jordan Reed"));
    assert_eq!(invoice.shipping_method.as_deref(), Some("Delivery"));
    assert_eq!(invoice.portfolio.as_deref(), Some("Coastal Imports"));

    assert_eq!(invoice.customer.name.as_deref(), Some("Fine Bottle Shop"));
    assert_eq!(
        invoice.customer.lines,
        vec!["12 Market Street", "Baltimore, MD 21201"]
    );
    assert_eq!(
        invoice.ship_to.as_ref().and_then(|s| s.name.as_deref()),
        Some("Fine Bottle Shop Warehouse")
    );

    assert_eq!(invoice.items.len(), 2);
    assert_eq!(
        invoice.items[0].description,
        "Veramonte Sauvignon Blanc Casablanca Valley 2023"
    );
    assert_eq!(invoice.items[0].sku.as_deref(), Some("VM-2210"));
    assert_eq!(invoice.items[0].quantity_cases, Some(dec("4.0")));
    assert_eq!(invoice.items[0].quantity_bottles, Some(48));
    assert_eq!(invoice.items[0].unit_price, Some(dec("9.50")));
    assert_eq!(invoice.items[0].amount, Some(dec("456.00")));

    assert_eq!(invoice.total, Some(dec("792.00")));
}

#[tokio::test]
async fn test_parse_then_store_is_idempotent() {
    let invoice = parse_invoice(MODERN, "modern.pdf").unwrap();
    let store = MemoryStore::new();
    let options = ImportOptions {
        tenant_slug: "well-crafted".to_string(),
        default_case_multiplier: 12,
        currency: "USD".to_string(),
    };

    let first = store.upsert_invoice(&invoice, &options).await.unwrap();
    assert!(!first.replaced);
    assert_eq!(first.lines_written, 2);
    assert_eq!(first.lines_skipped, 0);

    let second = store.upsert_invoice(&invoice, &options).await.unwrap();
    assert!(second.replaced);
    assert_eq!(store.len(), 1);

    let stored = store.get("12345").unwrap();
    assert_eq!(stored.lines[0].quantity, 12);
    assert_eq!(stored.lines[0].unit_price, dec("14.00"));
}
