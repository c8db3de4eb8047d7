//! Field (column) definitions and per-column filter state.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::data_type::{Conversion, DataType, convert_with};
use super::value::CompareValue;

/// The sort marker displayed on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortState {
    /// Not sorted.
    #[default]
    None,
    /// Sorted ascending.
    Ascending,
    /// Sorted descending.
    Descending,
}

/// A column definition.
///
/// A field's identity is its index; fields are kept in index order, which is
/// also the display order. Besides display metadata, a field carries the
/// filter state configured on its column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    index: usize,
    title: String,
    data_type: Option<DataType>,
    width: Option<u32>,
    hidden: bool,
    sortable: bool,
    sort_by_field: Option<usize>,
    style: Option<String>,
    pub(crate) sort_state: SortState,
    pub(crate) hidden_values: BTreeSet<String>,
    pub(crate) min_value: Option<CompareValue>,
    pub(crate) max_value: Option<CompareValue>,
    pub(crate) text_filter: Option<String>,
}

impl Field {
    /// Creates a sortable, visible, untyped field.
    pub fn new(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            data_type: None,
            width: None,
            hidden: false,
            sortable: true,
            sort_by_field: None,
            style: None,
            sort_state: SortState::None,
            hidden_values: BTreeSet::new(),
            min_value: None,
            max_value: None,
            text_filter: None,
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Sort this column by the values of another column.
    pub fn with_sort_by_field(mut self, column: usize) -> Self {
        self.sort_by_field = Some(column);
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The data type, or `None` for raw passthrough.
    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn sort_by_field(&self) -> Option<usize> {
        self.sort_by_field
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn sort_state(&self) -> SortState {
        self.sort_state
    }

    /// Display values currently hidden on this column.
    pub fn hidden_values(&self) -> &BTreeSet<String> {
        &self.hidden_values
    }

    pub fn min_value(&self) -> Option<&CompareValue> {
        self.min_value.as_ref()
    }

    pub fn max_value(&self) -> Option<&CompareValue> {
        self.max_value.as_ref()
    }

    pub fn text_filter(&self) -> Option<&str> {
        self.text_filter.as_deref()
    }

    /// Converts raw cell text through this field's data type.
    pub fn convert(&self, raw: &str) -> Conversion {
        convert_with(self.data_type, raw)
    }

    /// Returns `true` if any filter is configured on this column.
    pub fn is_filtered(&self) -> bool {
        !self.hidden_values.is_empty()
            || self.min_value.is_some()
            || self.max_value.is_some()
            || self.text_filter.is_some()
    }

    pub(crate) fn clear_filters(&mut self) {
        self.hidden_values.clear();
        self.min_value = None;
        self.max_value = None;
        self.text_filter = None;
    }

    /// Hidden-value and range checks for one cell.
    pub(crate) fn admits(&self, display: &str, value: &CompareValue) -> bool {
        if self.hidden_values.contains(display) {
            return false;
        }
        if let Some(min) = &self.min_value
            && value.compare(min) == Ordering::Less
        {
            return false;
        }
        if let Some(max) = &self.max_value
            && value.compare(max) == Ordering::Greater
        {
            return false;
        }
        true
    }

    /// Text filter check: `None` if no text filter is set on this column.
    pub(crate) fn text_matches(&self, display: &str) -> Option<bool> {
        self.text_filter
            .as_deref()
            .map(|text| display.contains(text))
    }
}
