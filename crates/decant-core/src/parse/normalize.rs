//! Normalization of raw text fragments into numbers and dates.
//!
//! Everything here is pure: these functions never fail loudly, because
//! an empty or non-numeric fragment is a normal outcome when slicing
//! layout-mode columns.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a decimal out of a fragment, tolerating thousands separators
/// ("12,345.67" -> 12345.67). Returns `None` for anything that is not
/// a finite number once commas are stripped.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let sanitized = value.trim().replace(',', "");
    if sanitized.is_empty() {
        return None;
    }
    Decimal::from_str(&sanitized).ok()
}

/// Parse an integer out of a fragment, ignoring embedded unit labels
/// ("5 CS" -> 5). Returns `None` when no digits remain.
pub fn parse_integer(value: &str) -> Option<u32> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parse a long-form date ("July 3, 2024"). Returns `None` on any
/// other shape; line items routinely carry no date at all.
pub fn parse_long_date(value: &str) -> Option<NaiveDate> {
    let collapsed = value.trim().split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&collapsed, "%B %d, %Y").ok()
}

/// Replace non-breaking spaces with regular spaces. Vendors embed them
/// as layout padding, which would otherwise break positional slicing.
pub fn clean_row(line: &str) -> String {
    line.replace('\u{00a0}', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_decimal_with_thousands_separator() {
        assert_eq!(
            parse_decimal("12,345.67"),
            Some(Decimal::from_str("12345.67").unwrap())
        );
        assert_eq!(parse_decimal(" 9.00 "), Some(Decimal::from_str("9.00").unwrap()));
    }

    #[test]
    fn test_parse_decimal_rejects_non_numbers() {
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("  "), None);
    }

    #[test]
    fn test_parse_integer_ignores_unit_labels() {
        assert_eq!(parse_integer("5 CS"), Some(5));
        assert_eq!(parse_integer("120"), Some(120));
        assert_eq!(parse_integer("N/A"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn test_parse_long_date() {
        assert_eq!(
            parse_long_date("July 3, 2024"),
            Some(NaiveDate::from_ymd_opt(2024, 7, 3).unwrap())
        );
        assert_eq!(
            parse_long_date("  March  12,   2024 "),
            Some(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap())
        );
        assert_eq!(parse_long_date("2024-07-03"), None);
        assert_eq!(parse_long_date("Net 30"), None);
        assert_eq!(parse_long_date(""), None);
    }

    #[test]
    fn test_clean_row_replaces_nbsp() {
        assert_eq!(clean_row("12\u{a0}x\u{a0}750ml"), "12 x 750ml");
    }
}
