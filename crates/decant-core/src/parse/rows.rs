//! Row segmentation and continuation-line merging.
//!
//! Below a resolved header, every physical row is either the start of
//! a new line item or overflow text belonging to the previous one. A
//! row starts a new item when any of the vendor's anchor columns is
//! non-empty; otherwise its description (and code) fragments are
//! folded into the accumulating item.

use tracing::debug;

use super::layout::{Column, ColumnLayout};
use super::normalize::{clean_row, parse_decimal, parse_integer};
use crate::models::invoice::InvoiceLine;

/// An anchor column together with a predicate its cell content must
/// satisfy to count as "this row starts a new item".
#[derive(Debug, Clone, Copy)]
pub struct AnchorRule {
    pub column: Column,
    pub accept: fn(&str) -> bool,
}

impl AnchorRule {
    /// Anchor on any non-empty cell.
    pub const fn non_empty(column: Column) -> Self {
        Self {
            column,
            accept: |_| true,
        }
    }

    /// Anchor on a cell matching a predicate.
    pub const fn matching(column: Column, accept: fn(&str) -> bool) -> Self {
        Self { column, accept }
    }
}

/// Cell looks like an identifier (starts alphanumeric).
pub fn starts_alphanumeric(cell: &str) -> bool {
    cell.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
}

/// Cell looks like a printed amount (starts with a digit or a
/// thousands separator).
pub fn starts_numeric(cell: &str) -> bool {
    cell.chars().next().is_some_and(|c| c.is_ascii_digit() || c == ',')
}

/// Per-vendor table behavior: which columns anchor a new row, what
/// terminates the stream, and how the header's own reappearance is
/// recognized.
pub struct TableRules {
    pub anchors: &'static [AnchorRule],
    /// True for the terminal row (e.g. the "Total" line); stops the
    /// stream.
    pub stop: fn(&str) -> bool,
    /// True for a duplicate appearance of the header line itself.
    pub header_echo: fn(&str) -> bool,
    /// Substitute the SKU (or a placeholder) when a new row carries no
    /// description of its own.
    pub untitled_fallback: bool,
}

/// Merges the row stream beneath a header into logical line items.
pub struct RowAssembler<'a> {
    layout: &'a ColumnLayout,
    rules: &'a TableRules,
}

impl<'a> RowAssembler<'a> {
    pub fn new(layout: &'a ColumnLayout, rules: &'a TableRules) -> Self {
        Self { layout, rules }
    }

    /// Fold the rows into finalized items. The in-progress item is an
    /// explicit accumulator, flushed when the next anchor row appears
    /// and once more at end of stream.
    pub fn assemble<'l>(&self, rows: impl IntoIterator<Item = &'l str>) -> Vec<InvoiceLine> {
        let mut items = Vec::new();
        let mut current: Option<InvoiceLine> = None;

        for raw in rows {
            let line = clean_row(raw);
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if (self.rules.header_echo)(&line) {
                continue;
            }
            if (self.rules.stop)(trimmed) {
                break;
            }

            if self.is_new_row(&line) {
                if let Some(done) = current.take() {
                    push_finalized(&mut items, done);
                }
                current = Some(self.build_item(&line));
                continue;
            }

            let Some(item) = current.as_mut() else {
                // Stray text above the first anchor row: not an item.
                continue;
            };

            // A continuation row can carry a code fragment, a
            // description fragment, or both; each is appended
            // independently, space-joined.
            if let Some(code) = self.non_empty_segment(&line, Column::Code) {
                item.code = Some(match item.code.take() {
                    Some(existing) => format!("{existing} {code}"),
                    None => code,
                });
            }
            if let Some(fragment) = self.non_empty_segment(&line, Column::Description) {
                if item.description.is_empty() {
                    item.description = fragment;
                } else {
                    item.description = format!("{} {}", item.description, fragment);
                }
            }
        }

        if let Some(done) = current.take() {
            push_finalized(&mut items, done);
        }

        items
    }

    fn is_new_row(&self, line: &str) -> bool {
        self.rules.anchors.iter().any(|anchor| {
            self.layout
                .segment(line, anchor.column)
                .is_some_and(|cell| !cell.is_empty() && (anchor.accept)(&cell))
        })
    }

    fn build_item(&self, line: &str) -> InvoiceLine {
        let mut item = InvoiceLine::default();

        for (column, cell) in self.layout.segments(line) {
            let value = (!cell.is_empty()).then_some(cell);
            match column {
                Column::Cases => item.quantity_cases = value.as_deref().and_then(parse_decimal),
                Column::Bottles => item.quantity_bottles = value.as_deref().and_then(parse_integer),
                Column::Size => item.size = value,
                Column::Code => item.code = value,
                Column::Sku => item.sku = value,
                Column::Description => item.description = value.unwrap_or_default(),
                Column::Liters => item.liters = value.as_deref().and_then(parse_decimal),
                Column::UnitPrice => item.unit_price = value.as_deref().and_then(parse_decimal),
                Column::Amount => item.amount = value.as_deref().and_then(parse_decimal),
            }
        }

        if self.rules.untitled_fallback && item.description.is_empty() {
            item.description = item
                .sku
                .clone()
                .unwrap_or_else(|| "Untitled Item".to_string());
        }

        item
    }

    fn non_empty_segment(&self, line: &str, column: Column) -> Option<String> {
        self.layout
            .segment(line, column)
            .filter(|cell| !cell.is_empty())
    }
}

fn push_finalized(items: &mut Vec<InvoiceLine>, item: InvoiceLine) {
    if !item.has_quantity() {
        debug!(description = %item.description, "line item finalized without a quantity");
    }
    items.push(item);
}
