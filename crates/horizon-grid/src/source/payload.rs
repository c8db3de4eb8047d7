//! The structured load payload.
//!
//! A payload is what a data source hands to a view: field definitions, rows,
//! and for remotely paged views the server-side row count and page. Payloads
//! are deserialized tolerantly. Missing arrays become empty, cells may be
//! objects or bare scalars, and unknown data type names degrade to untyped
//! fields.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use horizon_grid_core::logging::targets;

use crate::error::Result;
use crate::model::{DataType, Field};

/// A full load payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Payload {
    /// Field definitions. Empty means "derive from the first row".
    #[serde(deserialize_with = "null_as_empty")]
    pub fields: Vec<FieldSpec>,
    /// Rows in load order.
    #[serde(deserialize_with = "null_as_empty")]
    pub rows: Vec<RowSpec>,
    /// Total rows available on the server (remote paging).
    pub total_row_count: Option<usize>,
    /// Rows the server returned for this page.
    pub displayed_row_count: Option<usize>,
    /// Page the server returned (remote paging).
    pub current_page: Option<usize>,
}

impl Payload {
    /// Parses a payload from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Creates a payload from field definitions and rows.
    pub fn new(fields: Vec<FieldSpec>, rows: Vec<RowSpec>) -> Self {
        Self {
            fields,
            rows,
            ..Self::default()
        }
    }

    /// Builds the view fields, re-indexed from zero in declared index order.
    ///
    /// Returns the fields plus a map from each declared index to its
    /// position, used to place cells that name their field.
    pub(crate) fn build_fields(&self) -> (Vec<Field>, HashMap<usize, usize>) {
        if self.fields.is_empty() {
            let width = self.rows.first().map(|row| row.cells.len()).unwrap_or(0);
            let fields = (0..width)
                .map(|i| Field::new(i, format!("Column {}", i + 1)))
                .collect();
            return (fields, (0..width).map(|i| (i, i)).collect());
        }

        let mut specs: Vec<(usize, &FieldSpec)> = self
            .fields
            .iter()
            .enumerate()
            .map(|(pos, spec)| (spec.index.unwrap_or(pos), spec))
            .collect();
        specs.sort_by_key(|(index, _)| *index);

        let mut positions = HashMap::new();
        let fields = specs
            .into_iter()
            .enumerate()
            .map(|(pos, (declared, spec))| {
                positions.entry(declared).or_insert(pos);
                spec.to_field(pos)
            })
            .collect::<Vec<_>>();

        // sort-by redirects name declared indices too
        let fields = fields
            .into_iter()
            .map(|field| match field.sort_by_field() {
                Some(target) => match positions.get(&target) {
                    Some(&pos) => field.with_sort_by_field(pos),
                    None => {
                        tracing::warn!(
                            target: targets::SOURCE,
                            field = field.index(),
                            target_field = target,
                            "sort-by field does not exist; sorting by the field itself"
                        );
                        let index = field.index();
                        field.with_sort_by_field(index)
                    }
                },
                None => field,
            })
            .collect();
        (fields, positions)
    }
}

fn default_true() -> bool {
    true
}

/// A field definition in a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub title: String,
    /// Data type name; unknown names load as untyped.
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default)]
    pub sort_by_field: Option<usize>,
    #[serde(default)]
    pub style: Option<String>,
}

impl FieldSpec {
    /// A sortable, untyped field with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            index: None,
            title: title.into(),
            data_type: None,
            width: None,
            hidden: false,
            sortable: true,
            sort_by_field: None,
            style: None,
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type.name().to_string());
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_sort_by_field(mut self, index: usize) -> Self {
        self.sort_by_field = Some(index);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    fn to_field(&self, index: usize) -> Field {
        let mut field = Field::new(index, self.title.clone())
            .with_hidden(self.hidden)
            .with_sortable(self.sortable);
        if let Some(name) = self.data_type.as_deref().filter(|name| !name.trim().is_empty()) {
            match name.parse::<DataType>() {
                Ok(data_type) => field = field.with_data_type(data_type),
                Err(err) => {
                    tracing::warn!(target: targets::SOURCE, %err, field = index, "loading field as untyped");
                }
            }
        }
        if let Some(width) = self.width {
            field = field.with_width(width);
        }
        if let Some(target) = self.sort_by_field {
            field = field.with_sort_by_field(target);
        }
        if let Some(style) = &self.style {
            field = field.with_style(style.clone());
        }
        field
    }
}

/// A row in a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RowSpec {
    /// Requested id. Honoured when unique, otherwise a fresh id is assigned.
    pub id: Option<u64>,
    #[serde(deserialize_with = "null_as_empty")]
    pub cells: Vec<CellSpec>,
    pub style: Option<String>,
}

impl RowSpec {
    /// A row of plain values in field order.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: None,
            cells: values.into_iter().map(CellSpec::new).collect(),
            style: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Raw values and styles laid out by field position.
    pub(crate) fn layout(
        &self,
        field_count: usize,
        positions: &HashMap<usize, usize>,
    ) -> Vec<(String, Option<String>)> {
        let mut values = vec![(String::new(), None); field_count];
        for (seq, cell) in self.cells.iter().enumerate() {
            let pos = match cell.field_index {
                Some(declared) => positions.get(&declared).copied(),
                None => Some(seq),
            };
            match pos.and_then(|pos| values.get_mut(pos)) {
                Some(slot) => *slot = (cell.value.clone(), cell.style.clone()),
                None => {
                    tracing::debug!(
                        target: targets::SOURCE,
                        cell = seq,
                        field = ?cell.field_index,
                        "dropping cell beyond the field count"
                    );
                }
            }
        }
        values
    }
}

/// A cell in a payload.
///
/// Deserializes from an object `{fieldIndex?, value, style?}` or from a bare
/// JSON scalar. Numbers and booleans are stringified and `null` becomes the
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CellRepr")]
pub struct CellSpec {
    pub field_index: Option<usize>,
    pub value: String,
    pub style: Option<String>,
}

impl CellSpec {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            field_index: None,
            value: value.into(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn at(mut self, field_index: usize) -> Self {
        self.field_index = Some(field_index);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Full {
        #[serde(default, rename = "fieldIndex")]
        field_index: Option<usize>,
        #[serde(default)]
        value: serde_json::Value,
        #[serde(default)]
        style: Option<String>,
    },
    Scalar(serde_json::Value),
}

impl From<CellRepr> for CellSpec {
    fn from(repr: CellRepr) -> Self {
        match repr {
            CellRepr::Full {
                field_index,
                value,
                style,
            } => Self {
                field_index,
                value: scalar_text(value),
                style,
            },
            CellRepr::Scalar(value) => Self::new(scalar_text(value)),
        }
    }
}

fn scalar_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// An explicit `null` array reads as empty, like a missing one.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_arrays_read_as_empty() {
        let payload = Payload::from_json(r#"{"fields": null, "rows": null}"#).unwrap();
        assert!(payload.fields.is_empty());
        assert!(payload.rows.is_empty());

        let payload = Payload::from_json(r#"{"rows": [{"id": 2, "cells": null}]}"#).unwrap();
        assert_eq!(payload.rows[0].id, Some(2));
        assert!(payload.rows[0].cells.is_empty());
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let payload = Payload::from_json("{}").unwrap();
        assert!(payload.fields.is_empty());
        assert!(payload.rows.is_empty());
        assert_eq!(payload.total_row_count, None);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Payload::from_json("{\"rows\": [").is_err());
    }

    #[test]
    fn test_cells_accept_objects_and_scalars() {
        let payload = Payload::from_json(
            r#"{"rows": [{"id": 4, "cells": [
                {"fieldIndex": 1, "value": 12, "style": "num"},
                "plain",
                true,
                null
            ]}]}"#,
        )
        .unwrap();
        let cells = &payload.rows[0].cells;
        assert_eq!(payload.rows[0].id, Some(4));
        assert_eq!(cells[0].field_index, Some(1));
        assert_eq!(cells[0].value, "12");
        assert_eq!(cells[0].style.as_deref(), Some("num"));
        assert_eq!(cells[1].value, "plain");
        assert_eq!(cells[2].value, "true");
        assert_eq!(cells[3].value, "");
    }

    #[test]
    fn test_field_spec_defaults() {
        let payload = Payload::from_json(
            r#"{"fields": [{"index": 0, "title": "Qty", "dataType": "int", "sortByField": 1},
                           {"index": 1, "title": "Raw", "dataType": "currency", "sortable": false}]}"#,
        )
        .unwrap();
        let (fields, _) = payload.build_fields();
        assert_eq!(fields[0].data_type(), Some(DataType::Int));
        assert!(fields[0].is_sortable());
        assert_eq!(fields[0].sort_by_field(), Some(1));
        assert_eq!(fields[1].data_type(), None);
        assert!(!fields[1].is_sortable());
    }

    #[test]
    fn test_fields_reindexed_in_declared_order() {
        let payload = Payload::from_json(
            r#"{"fields": [{"index": 20, "title": "B"}, {"index": 10, "title": "A"}],
                "rows": [{"cells": [{"fieldIndex": 20, "value": "b"}, {"fieldIndex": 10, "value": "a"}]}]}"#,
        )
        .unwrap();
        let (fields, positions) = payload.build_fields();
        assert_eq!(fields[0].title(), "A");
        assert_eq!(fields[0].index(), 0);
        assert_eq!(fields[1].title(), "B");

        let values = payload.rows[0].layout(fields.len(), &positions);
        assert_eq!(values[0].0, "a");
        assert_eq!(values[1].0, "b");
    }

    #[test]
    fn test_fields_derived_from_first_row() {
        let payload = Payload::new(Vec::new(), vec![RowSpec::from_values(["x", "y", "z"])]);
        let (fields, _) = payload.build_fields();
        let titles: Vec<&str> = fields.iter().map(|f| f.title()).collect();
        assert_eq!(titles, ["Column 1", "Column 2", "Column 3"]);
    }
}
