//! Quantity and unit-price resolution for finalized line items.
//!
//! Vendors bill by bottle, by case, or both; persistence needs one
//! bottle-denominated quantity and one per-bottle price. A line whose
//! price cannot be resolved is skipped downstream rather than stored
//! with a fabricated value.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::invoice::InvoiceLine;

/// Bottles per case assumed when the size field carries no
/// "<N> x" pattern.
pub const DEFAULT_CASE_MULTIPLIER: u32 = 12;

lazy_static! {
    /// "<N> x" prefix of a pack size such as "12 x 750ml".
    static ref CASE_MULTIPLIER: Regex = Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*x").unwrap();
}

/// Bottles per case parsed from a size field.
pub fn case_multiplier(size: Option<&str>) -> Option<Decimal> {
    let size = size?;
    let caps = CASE_MULTIPLIER.captures(size)?;
    caps[1].parse().ok()
}

/// Bottle-denominated quantity for a line: the bottle count when
/// present and positive, otherwise cases times the case multiplier
/// (rounded to whole bottles). `None` when neither quantity resolves.
pub fn resolved_quantity(item: &InvoiceLine, default_multiplier: u32) -> Option<u32> {
    if let Some(bottles) = item.quantity_bottles {
        if bottles > 0 {
            return Some(bottles);
        }
    }

    let cases = item.quantity_cases.filter(|c| c.is_sign_positive() && !c.is_zero())?;
    let multiplier = case_multiplier(item.size.as_deref())
        .unwrap_or_else(|| Decimal::from(default_multiplier));
    (cases * multiplier).round().to_u32()
}

/// Per-bottle price for a line: the printed unit price when present,
/// otherwise the line amount divided by the resolved quantity.
pub fn resolved_unit_price(item: &InvoiceLine, quantity: u32) -> Option<Decimal> {
    if let Some(unit_price) = item.unit_price {
        return Some(unit_price);
    }
    if quantity == 0 {
        return None;
    }
    item.amount.map(|amount| amount / Decimal::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_case_multiplier_from_size() {
        assert_eq!(case_multiplier(Some("12 x 750ml")), Some(dec("12")));
        assert_eq!(case_multiplier(Some("6X1.5L")), Some(dec("6")));
        assert_eq!(case_multiplier(Some("750ml")), None);
        assert_eq!(case_multiplier(None), None);
    }

    #[test]
    fn test_bottles_win_over_cases() {
        let item = InvoiceLine {
            quantity_bottles: Some(6),
            quantity_cases: Some(dec("10")),
            ..Default::default()
        };
        assert_eq!(resolved_quantity(&item, DEFAULT_CASE_MULTIPLIER), Some(6));
    }

    #[test]
    fn test_cases_times_size_multiplier() {
        let item = InvoiceLine {
            quantity_cases: Some(dec("2")),
            size: Some("12 x 750ml".to_string()),
            ..Default::default()
        };
        assert_eq!(resolved_quantity(&item, DEFAULT_CASE_MULTIPLIER), Some(24));
    }

    #[test]
    fn test_cases_fall_back_to_default_multiplier() {
        let item = InvoiceLine {
            quantity_cases: Some(dec("3")),
            size: Some("750ml".to_string()),
            ..Default::default()
        };
        assert_eq!(resolved_quantity(&item, DEFAULT_CASE_MULTIPLIER), Some(36));
    }

    #[test]
    fn test_no_quantity_resolves_to_none() {
        let item = InvoiceLine::default();
        assert_eq!(resolved_quantity(&item, DEFAULT_CASE_MULTIPLIER), None);

        let zero = InvoiceLine {
            quantity_bottles: Some(0),
            ..Default::default()
        };
        assert_eq!(resolved_quantity(&zero, DEFAULT_CASE_MULTIPLIER), None);
    }

    #[test]
    fn test_unit_price_derived_from_amount() {
        let item = InvoiceLine {
            amount: Some(dec("168.00")),
            ..Default::default()
        };
        assert_eq!(resolved_unit_price(&item, 12), Some(dec("14")));
        assert_eq!(resolved_unit_price(&item, 0), None);

        let priced = InvoiceLine {
            unit_price: Some(dec("9.50")),
            amount: Some(dec("999.99")),
            ..Default::default()
        };
        assert_eq!(resolved_unit_price(&priced, 48), Some(dec("9.50")));
    }

    #[test]
    fn test_unpriced_line_resolves_to_none() {
        let item = InvoiceLine::default();
        assert_eq!(resolved_unit_price(&item, 12), None);
    }
}
