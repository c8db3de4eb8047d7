//! Table markup sources.
//!
//! Reads the first `<table>` of an XHTML fragment. A row of `<th>` cells
//! defines the fields; each later `<tr>` of `<td>` cells is a row. Header
//! cells may carry typed attributes:
//!
//! | attribute       | effect                              |
//! |-----------------|-------------------------------------|
//! | `data-type`     | data type name                      |
//! | `data-width`    | display width                       |
//! | `data-hidden`   | hide the column                     |
//! | `data-sortable` | `false` makes the column unsortable |
//! | `data-sort-by`  | sort by another column's values     |
//!
//! A `class` attribute on `<tr>`, `<td>` or `<th>` becomes the style.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use horizon_grid_core::logging::targets;

use super::payload::{CellSpec, FieldSpec, Payload, RowSpec};
use crate::error::{GridError, Result};

/// Position relative to the first `<table>`; nested tables are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    Before,
    Inside(usize),
    After,
}

impl TableState {
    fn open(self) -> Self {
        match self {
            TableState::Before => TableState::Inside(1),
            TableState::Inside(depth) => TableState::Inside(depth + 1),
            TableState::After => TableState::After,
        }
    }

    fn close(self) -> Self {
        match self {
            TableState::Inside(1) => TableState::After,
            TableState::Inside(depth) => TableState::Inside(depth - 1),
            other => other,
        }
    }

    fn is_top_level(self) -> bool {
        self == TableState::Inside(1)
    }
}

#[derive(Default)]
struct OpenCell {
    header: bool,
    attributes: HashMap<String, String>,
    text: String,
}

#[derive(Default)]
struct OpenRow {
    style: Option<String>,
    headers: Vec<FieldSpec>,
    cells: Vec<CellSpec>,
}

/// Parses table markup into a payload.
pub fn parse_markup(text: &str) -> Result<Payload> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut table = TableState::Before;
    let mut row: Option<OpenRow> = None;
    let mut cell: Option<OpenCell> = None;
    let mut payload = Payload::default();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|err| GridError::markup(err.to_string(), position))?;

        match event {
            Event::Start(start) => {
                let name = local_name(&start);
                if name == "table" {
                    table = table.open();
                    continue;
                }
                if !table.is_top_level() {
                    continue;
                }
                match name.as_str() {
                    "tr" => {
                        let attributes = parse_attributes(&start, position)?;
                        row = Some(OpenRow {
                            style: attributes.get("class").cloned(),
                            ..OpenRow::default()
                        });
                    }
                    "th" | "td" => {
                        cell = Some(OpenCell {
                            header: name == "th",
                            attributes: parse_attributes(&start, position)?,
                            text: String::new(),
                        });
                    }
                    _ => {}
                }
            }
            Event::Empty(empty) => {
                let name = local_name(&empty);
                if table.is_top_level()
                    && (name == "th" || name == "td")
                    && let Some(open_row) = row.as_mut()
                {
                    let empty_cell = OpenCell {
                        header: name == "th",
                        attributes: parse_attributes(&empty, position)?,
                        text: String::new(),
                    };
                    close_cell(open_row, empty_cell);
                }
            }
            Event::Text(text) if table.is_top_level() => {
                if let Some(open) = cell.as_mut() {
                    let content = text
                        .unescape()
                        .map_err(|err| GridError::markup(err.to_string(), position))?;
                    append_text(&mut open.text, &content);
                }
            }
            Event::CData(data) if table.is_top_level() => {
                if let Some(open) = cell.as_mut() {
                    append_text(&mut open.text, &String::from_utf8_lossy(&data));
                }
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.local_name().as_ref()).to_lowercase();
                if name == "table" {
                    table = table.close();
                    continue;
                }
                if !table.is_top_level() {
                    continue;
                }
                match name.as_str() {
                    "th" | "td" => {
                        if let (Some(open_row), Some(open_cell)) = (row.as_mut(), cell.take()) {
                            close_cell(open_row, open_cell);
                        }
                    }
                    "tr" => {
                        if let Some(open_row) = row.take() {
                            close_row(&mut payload, open_row);
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if table == TableState::Before {
        return Err(GridError::markup("no <table> element", 0));
    }

    tracing::debug!(
        target: targets::SOURCE,
        fields = payload.fields.len(),
        rows = payload.rows.len(),
        "parsed table markup"
    );
    Ok(payload)
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).to_lowercase()
}

fn parse_attributes(start: &BytesStart<'_>, position: u64) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| GridError::markup(err.to_string(), position))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_lowercase();
        let value = attr
            .unescape_value()
            .map_err(|err| GridError::markup(err.to_string(), position))?;
        attrs.insert(key, value.into_owned());
    }
    Ok(attrs)
}

fn append_text(target: &mut String, text: &str) {
    if !target.is_empty() && !text.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

fn flag(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "false" | "0" | "no")
}

fn close_cell(row: &mut OpenRow, cell: OpenCell) {
    let style = cell.attributes.get("class").cloned();
    if cell.header {
        let attrs = &cell.attributes;
        let mut spec = FieldSpec::new(cell.text);
        spec.data_type = attrs.get("data-type").cloned();
        spec.width = attrs.get("data-width").and_then(|w| w.trim().parse().ok());
        spec.hidden = attrs.get("data-hidden").is_some_and(|v| flag(v));
        spec.sortable = attrs.get("data-sortable").is_none_or(|v| flag(v));
        spec.sort_by_field = attrs.get("data-sort-by").and_then(|v| v.trim().parse().ok());
        spec.style = style;
        row.headers.push(spec);
    } else {
        let mut spec = CellSpec::new(cell.text);
        spec.style = style;
        row.cells.push(spec);
    }
}

fn close_row(payload: &mut Payload, row: OpenRow) {
    if !row.headers.is_empty() && payload.fields.is_empty() && payload.rows.is_empty() {
        payload.fields = row.headers;
        return;
    }
    // header cells after the field row read as plain values
    let mut cells: Vec<CellSpec> = row
        .headers
        .into_iter()
        .map(|spec| CellSpec::new(spec.title))
        .collect();
    cells.extend(row.cells);
    if cells.is_empty() {
        return;
    }
    payload.rows.push(RowSpec {
        id: None,
        cells,
        style: row.style,
    });
}
