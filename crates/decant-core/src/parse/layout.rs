//! Column-boundary resolution from table header rows.
//!
//! Layout-mode text carries no markup; the only structure is that a
//! data cell starts at the same character offset as its column label
//! in the header. `ColumnLayout` records those offsets once per
//! document and slices every subsequent row with them.

use crate::error::ParseError;

/// The named columns a vendor table can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Cases,
    Bottles,
    Size,
    Code,
    Sku,
    Description,
    Liters,
    UnitPrice,
    Amount,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Cases => "cases",
            Column::Bottles => "bottles",
            Column::Size => "size",
            Column::Code => "code",
            Column::Sku => "sku",
            Column::Description => "description",
            Column::Liters => "liters",
            Column::UnitPrice => "unit_price",
            Column::Amount => "amount",
        }
    }
}

/// Which physical header line a label lives on. Some vendors split a
/// logical header across two lines, e.g. a top line with
/// "SIZE IN / CODE / SKU / BRAND" and "CASES / BOTTLES" beneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine {
    Top,
    Bottom,
}

/// A column label to locate within a header line.
#[derive(Debug, Clone, Copy)]
pub struct HeaderLabel {
    pub column: Column,
    pub text: &'static str,
    pub line: HeaderLine,
    /// Use the last occurrence of the label instead of the first.
    /// Needed where a label word repeats in the header.
    pub last_occurrence: bool,
}

impl HeaderLabel {
    /// Label on the top (or only) header line, first occurrence.
    pub const fn top(column: Column, text: &'static str) -> Self {
        Self {
            column,
            text,
            line: HeaderLine::Top,
            last_occurrence: false,
        }
    }

    /// Label on the second header line, first occurrence.
    pub const fn bottom(column: Column, text: &'static str) -> Self {
        Self {
            column,
            text,
            line: HeaderLine::Bottom,
            last_occurrence: false,
        }
    }

    /// Switch the lookup to the last occurrence of the label.
    pub const fn last(mut self) -> Self {
        self.last_occurrence = true;
        self
    }
}

/// Column start-offsets for one document's item table, in declared
/// field order. Computed once from the header row(s), read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    cuts: Vec<(Column, usize)>,
}

impl ColumnLayout {
    /// Resolve a layout from a single header line.
    pub fn resolve(header: &str, labels: &[HeaderLabel]) -> Result<Self, ParseError> {
        Self::resolve_split(header, header, labels)
    }

    /// Resolve a layout from a two-line header. Each label is located
    /// on the line it is declared for; offsets from both lines share
    /// one coordinate space.
    pub fn resolve_split(
        top: &str,
        bottom: &str,
        labels: &[HeaderLabel],
    ) -> Result<Self, ParseError> {
        let mut cuts = Vec::with_capacity(labels.len());

        for label in labels {
            let line = match label.line {
                HeaderLine::Top => top,
                HeaderLine::Bottom => bottom,
            };
            let byte_pos = if label.last_occurrence {
                line.rfind(label.text)
            } else {
                line.find(label.text)
            };
            let byte_pos = byte_pos.ok_or_else(|| {
                ParseError::Layout(format!(
                    "label {:?} for column {} not found in header",
                    label.text,
                    label.column.name()
                ))
            })?;
            // Offsets are in characters so rows with multi-byte text
            // still slice at the right visual position.
            let char_pos = line[..byte_pos].chars().count();
            cuts.push((label.column, char_pos));
        }

        for pair in cuts.windows(2) {
            if pair[1].1 <= pair[0].1 {
                return Err(ParseError::Layout(format!(
                    "column {} does not start after column {}",
                    pair[1].0.name(),
                    pair[0].0.name()
                )));
            }
        }

        Ok(Self { cuts })
    }

    /// Columns in declared order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.cuts.iter().map(|(column, _)| *column)
    }

    /// Start offset of a column, if it is part of this layout.
    pub fn offset(&self, column: Column) -> Option<usize> {
        self.cuts
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, offset)| *offset)
    }

    /// Slice one column's cell out of a data row, trimmed. The cell
    /// spans from the column's offset to the next column's offset;
    /// the final column extends to end of line. Returns `None` for a
    /// column that is not part of this layout, so a caller can never
    /// silently slice at a wrong position.
    pub fn segment(&self, row: &str, column: Column) -> Option<String> {
        let index = self.cuts.iter().position(|(c, _)| *c == column)?;
        let start = self.cuts[index].1;
        let end = self.cuts.get(index + 1).map(|(_, offset)| *offset);
        Some(slice_chars(row, start, end).trim().to_string())
    }

    /// All cells of a row in declared column order.
    pub fn segments(&self, row: &str) -> Vec<(Column, String)> {
        self.columns()
            .map(|column| (column, self.segment(row, column).unwrap_or_default()))
            .collect()
    }
}

/// Character offset at which a label first appears in a line. Address
/// block headers are sliced with this, the same technique the item
/// tables use.
pub(crate) fn char_offset(line: &str, label: &str) -> Option<usize> {
    line.find(label).map(|byte| line[..byte].chars().count())
}

/// Slice a line by character offsets, clamped to its length.
pub(crate) fn slice_chars(line: &str, start: usize, end: Option<usize>) -> &str {
    let byte_start = byte_at_char(line, start);
    let byte_end = end.map(|e| byte_at_char(line, e)).unwrap_or(line.len());
    &line[byte_start..byte_end.max(byte_start)]
}

fn byte_at_char(line: &str, char_index: usize) -> usize {
    line.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(line.len())
}
