//! Label-lookup regex constants for the vendor parsers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Modern Well Crafted letterhead. Scalar fields print the label
    // on one line and the value on the next.
    pub static ref WC_INVOICE_NUMBER: Regex =
        Regex::new(r"Invoice Number:\s*([0-9A-Za-z-]+)").unwrap();
    pub static ref WC_INVOICE_DATE: Regex =
        Regex::new(r"Invoice Date:\s*([A-Za-z]+\s+\d{1,2},\s+\d{4})").unwrap();
    pub static ref WC_CUSTOMER_ID: Regex =
        Regex::new(r"Customer ID:\s*([0-9A-Za-z-]+)").unwrap();
    pub static ref WC_RETAIL_LICENSE: Regex =
        Regex::new(r"Retail License Number:\s*([0-9A-Za-z-]+)").unwrap();
    pub static ref WC_PAYMENT_TERMS: Regex =
        Regex::new(r"Payment terms\s*\n([^\n]+)").unwrap();
    pub static ref WC_SHIP_DATE: Regex =
        Regex::new(r"Ship date\s*\n([A-Za-z]+\s+\d{1,2},\s+\d{4})").unwrap();
    pub static ref WC_DUE_DATE: Regex =
        Regex::new(r"Due date\s*\n([A-Za-z]+\s+\d{1,2},\s+\d{4})").unwrap();
    pub static ref WC_SALESPERSON: Regex =
        Regex::new(r"Salesperson\s*\n([^\n]+)").unwrap();
    pub static ref WC_SHIPPING_METHOD: Regex =
        Regex::new(r"Shipping method\s*\n([^\n]+)").unwrap();
    pub static ref WC_TOTAL: Regex =
        Regex::new(r"Total\s+([\d,]+\.\d{2})").unwrap();

    // Classic Well Crafted form. Labels and values share a line.
    pub static ref WCC_INVOICE_NO: Regex =
        Regex::new(r"Invoice\s*No\.?\s*([0-9A-Za-z-]+)").unwrap();
    pub static ref WCC_INVOICE_DATE: Regex =
        Regex::new(r"Date of invoice\s+([A-Za-z]+\s+\d{1,2},\s+\d{4})").unwrap();
    pub static ref WCC_TERMS: Regex = Regex::new(r"Terms\s+([^\n]+)").unwrap();
    pub static ref WCC_SALESPERSON: Regex = Regex::new(r"Salesperson\s+([^\n]+)").unwrap();
    pub static ref WCC_LICENSEE: Regex = Regex::new(r"Licensee\s*/\s*([^\n]+)").unwrap();
    pub static ref WCC_LICENSE_NO: Regex = Regex::new(r"License #\s*([^\n]+)").unwrap();
    pub static ref WCC_STREET: Regex = Regex::new(r"Street\s*([^\n]+)").unwrap();
    pub static ref WCC_STREET_CONTINUATION: Regex =
        Regex::new(r"Street[^\n]*\n\s+([^\n]+)").unwrap();
    pub static ref WCC_CITY: Regex = Regex::new(r"City\s*([^\n]+)").unwrap();

    // Canopy Wine Selections.
    pub static ref CANOPY_INVOICE_NUMBER: Regex =
        Regex::new(r"Invoice #:\s*([0-9A-Za-z-]+)").unwrap();
    pub static ref CANOPY_INVOICE_DATE: Regex =
        Regex::new(r"Invoice date:\s*([A-Za-z]+\s+\d{1,2},\s+\d{4})").unwrap();
    pub static ref CANOPY_SALESPERSON: Regex =
        Regex::new(r"Salesperson:\s*([^\n]+)").unwrap();
    pub static ref CANOPY_SHIPPING_METHOD: Regex =
        Regex::new(r"Shipping method:\s*([^\n]+)").unwrap();

    // One Canopy item row: description, item number, cases, size,
    // bottle count, unit price, a discount column, net price.
    pub static ref CANOPY_ITEM_ROW: Regex = Regex::new(
        r"^\s*(.*?)\s{2,}([0-9A-Za-z'-]+)\s+([\d.]+)\s+([0-9A-Za-z x]+?)\s+([\d.]+)\s+([\d.]+)\s+([\d.]+)\s+([\d,.]+)$"
    )
    .unwrap();

    /// A printed money amount ("1,234.56").
    pub static ref MONEY: Regex = Regex::new(r"[\d,]+\.\d{2}").unwrap();

    /// Two or more spaces: the gap between stacked label/value pairs.
    pub static ref WIDE_GAP: Regex = Regex::new(r"\s{2,}").unwrap();
}
