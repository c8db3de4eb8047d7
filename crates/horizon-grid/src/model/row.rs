//! Rows and cells.
//!
//! Rows are owned by the view. Host code only ever receives shared
//! references, so every change goes through a view operation and the
//! filtered and paged views stay in sync with the data.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::Field;
use super::value::CompareValue;

/// Stable identifier of a row.
///
/// Ids are unique for the lifetime of a view and never reused after a row
/// is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl RowId {
    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RowId {
    fn from(id: u64) -> Self {
        RowId(id)
    }
}

/// A single converted value of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) field_index: usize,
    pub(crate) row_id: RowId,
    pub(crate) display_value: String,
    pub(crate) compare_value: CompareValue,
    pub(crate) original_value: String,
    pub(crate) style: Option<String>,
    pub(crate) selected: bool,
    pub(crate) invalid: bool,
}

impl Cell {
    /// Converts raw text through the field's data type.
    pub(crate) fn convert(field: &Field, row_id: RowId, raw: &str, style: Option<String>) -> Self {
        let conversion = field.convert(raw);
        Self {
            field_index: field.index(),
            row_id,
            display_value: conversion.display,
            compare_value: conversion.value,
            original_value: raw.to_string(),
            style,
            selected: false,
            invalid: !conversion.valid,
        }
    }

    /// Replaces the value, keeping style and selection.
    pub(crate) fn set_value(&mut self, field: &Field, raw: &str) {
        let conversion = field.convert(raw);
        self.display_value = conversion.display;
        self.compare_value = conversion.value;
        self.original_value = raw.to_string();
        self.invalid = !conversion.valid;
    }

    /// Index of the field this cell belongs to.
    pub fn field_index(&self) -> usize {
        self.field_index
    }

    /// Id of the owning row.
    pub fn row_id(&self) -> RowId {
        self.row_id
    }

    /// The text shown for this cell.
    pub fn display_value(&self) -> &str {
        &self.display_value
    }

    /// The type-normalized value used for sorting and filtering.
    pub fn compare_value(&self) -> &CompareValue {
        &self.compare_value
    }

    /// The raw text the cell was created from.
    pub fn original_value(&self) -> &str {
        &self.original_value
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// `true` if the raw text did not convert under the field's data type.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }
}

/// A record of the view: one cell per field, in field order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub(crate) id: RowId,
    pub(crate) cells: Vec<Cell>,
    pub(crate) style: Option<String>,
    pub(crate) selected: bool,
    pub(crate) invalid: bool,
}

impl Row {
    /// Builds a row from raw values, padding or truncating to the field count.
    pub(crate) fn build(
        id: RowId,
        fields: &[Field],
        values: Vec<(String, Option<String>)>,
        style: Option<String>,
    ) -> Self {
        let mut values = values.into_iter();
        let cells: Vec<Cell> = fields
            .iter()
            .map(|field| {
                let (raw, cell_style) = values.next().unwrap_or_default();
                Cell::convert(field, id, &raw, cell_style)
            })
            .collect();
        let mut row = Self {
            id,
            cells,
            style,
            selected: false,
            invalid: false,
        };
        row.refresh_invalid();
        row
    }

    pub(crate) fn refresh_invalid(&mut self) {
        self.invalid = self.cells.iter().any(|cell| cell.invalid);
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    /// All cells, in field order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Compare value of a column.
    pub fn value(&self, column: usize) -> Option<&CompareValue> {
        self.cells.get(column).map(|cell| &cell.compare_value)
    }

    /// Display text of a column.
    pub fn display(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(|cell| cell.display_value.as_str())
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// `true` if any cell failed conversion.
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }
}
