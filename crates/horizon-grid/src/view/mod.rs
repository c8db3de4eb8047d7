//! The tabular view.
//!
//! [`TabularView`] owns the fields and rows of a data set and derives from
//! them a filtered, sorted sequence and a current page of it. Every public
//! operation is synchronous and leaves the derived views consistent before
//! it returns; a render follows each operation (or is scheduled, on deferred
//! views).
//!
//! The operations are grouped by concern:
//!
//! - loading (this module)
//! - [`sort`](TabularView::sort) and [`clear_sort`](TabularView::clear_sort)
//! - filtering by hidden values, value ranges and text
//! - paging, local or remote
//! - row and cell selection
//! - batched insert, update and delete
//!
//! Host code that only needs one concern can depend on the matching
//! capability trait in [`traits`].

mod filter;
mod mutation;
mod pager;
mod render;
mod selection;
mod signals;
mod sort;
pub mod traits;

use std::collections::{HashMap, HashSet};

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use crate::config::GridConfig;
use crate::error::Result;
use crate::model::{Cell, Field, Row, RowId};
use crate::source::{CsvOptions, Payload, RemoteState, parse_csv, parse_markup};

pub use mutation::InsertPosition;
pub use pager::PagingMode;
pub use render::{Frame, FrameCell, FrameColumn, FrameRow};
pub use selection::{ClickModifiers, SelectionMode, SelectionUnit};
pub use signals::{Modification, ModificationKind, SelectionItem, ViewSignals};
pub use sort::ActiveSort;

use render::RenderState;
use selection::Anchor;

/// A filtered, sorted, paged and selectable view over typed rows.
///
/// # Example
///
/// ```
/// use horizon_grid::{GridConfig, TabularView};
/// use horizon_grid::source::{FieldSpec, Payload, RowSpec};
/// use horizon_grid::model::DataType;
///
/// let mut view = TabularView::new(GridConfig::default().with_rows_per_page(2));
/// view.load(Payload::new(
///     vec![FieldSpec::new("Qty").with_data_type(DataType::Int)],
///     vec![
///         RowSpec::from_values(["3"]),
///         RowSpec::from_values(["1"]),
///         RowSpec::from_values(["2"]),
///     ],
/// ));
/// view.sort(0, false);
///
/// let page: Vec<&str> = view.page_rows().iter().filter_map(|r| r.display(0)).collect();
/// assert_eq!(page, ["1", "2"]);
/// assert_eq!(view.total_pages(), 2);
/// ```
pub struct TabularView {
    config: GridConfig,
    fields: Vec<Field>,
    /// All rows, in load and insert order.
    rows: Vec<Row>,
    /// Position of each row in `rows`.
    positions: HashMap<RowId, usize>,
    /// Indices into `rows` of the rows passing the filters, in display order.
    filtered: Vec<usize>,
    next_id: u64,
    sort: Option<ActiveSort>,
    current_page: usize,
    anchor: Option<Anchor>,
    remote: RemoteState,
    render: RenderState,
    signals: ViewSignals,
}

impl Default for TabularView {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl TabularView {
    /// Creates an empty view.
    pub fn new(config: GridConfig) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(target: targets::VIEW, %err, "view created with invalid configuration");
        }
        Self {
            config,
            fields: Vec::new(),
            rows: Vec::new(),
            positions: HashMap::new(),
            filtered: Vec::new(),
            next_id: 1,
            sort: None,
            current_page: 0,
            anchor: None,
            remote: RemoteState::default(),
            render: RenderState::default(),
            signals: ViewSignals::new(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn signals(&self) -> &ViewSignals {
        &self.signals
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Replaces the fields and rows with the contents of a payload.
    ///
    /// Filters, sort and selection are discarded. The configured initial
    /// sort is applied once, then the view renders.
    pub fn load(&mut self, payload: Payload) {
        let _perf = PerfSpan::with_rows("load", payload.rows.len());
        let page = match self.config.paging {
            PagingMode::Local => 0,
            PagingMode::Remote => {
                self.remote.total_row_count =
                    payload.total_row_count.unwrap_or(payload.rows.len());
                payload.current_page.unwrap_or(0)
            }
        };
        self.remote.cancel();
        self.install(payload, false);
        self.sort = None;
        self.filtered = (0..self.rows.len()).collect();
        self.set_page(page);

        if let Some(initial) = self.config.initial_sort {
            self.apply_sort_request(initial.column, initial.descending);
        }

        tracing::debug!(
            target: targets::VIEW,
            fields = self.fields.len(),
            rows = self.rows.len(),
            "loaded"
        );
        self.refresh_busy();
        self.request_render();
    }

    /// Parses a JSON payload and loads it.
    pub fn load_json(&mut self, text: &str) -> Result<()> {
        self.load(Payload::from_json(text)?);
        Ok(())
    }

    /// Parses CSV text and loads it.
    pub fn load_csv(&mut self, text: &str, options: &CsvOptions) -> Result<()> {
        self.load(parse_csv(text, options)?);
        Ok(())
    }

    /// Parses table markup and loads it.
    pub fn load_markup(&mut self, text: &str) -> Result<()> {
        self.load(parse_markup(text)?);
        Ok(())
    }

    /// Replaces rows (and fields, unless kept) without deriving views.
    fn install(&mut self, payload: Payload, keep_fields: bool) {
        let (fields, mut positions) = payload.build_fields();
        if keep_fields {
            positions = (0..self.fields.len()).map(|i| (i, i)).collect();
        } else {
            self.fields = fields;
        }

        let mut seen = HashSet::new();
        let requested: Vec<Option<u64>> = payload
            .rows
            .iter()
            .map(|row| row.id.filter(|id| seen.insert(*id)))
            .collect();
        if let Some(max) = requested.iter().flatten().max() {
            self.next_id = self.next_id.max(max.saturating_add(1));
        }

        let field_count = self.fields.len();
        let mut rows = Vec::with_capacity(payload.rows.len());
        for (spec, requested) in payload.rows.into_iter().zip(requested) {
            let id = match requested {
                Some(id) => RowId(id),
                None => self.issue_id(),
            };
            let values = spec.layout(field_count, &positions);
            rows.push(Row::build(id, &self.fields, values, spec.style));
        }
        self.rows = rows;
        self.anchor = None;
        self.reindex();
    }

    fn issue_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }

    fn reindex(&mut self) {
        self.positions = self
            .rows
            .iter()
            .enumerate()
            .map(|(pos, row)| (row.id(), pos))
            .collect();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All fields, in display order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, column: usize) -> Option<&Field> {
        self.fields.get(column)
    }

    /// All rows, in load and insert order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.positions.get(&id).map(|&pos| &self.rows[pos])
    }

    /// Number of rows held by the view.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows passing the filters, in display order.
    pub fn filtered_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.filtered.iter().map(|&pos| &self.rows[pos])
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    /// Ids of the filtered rows, in display order.
    pub fn filtered_ids(&self) -> Vec<RowId> {
        self.filtered_rows().map(Row::id).collect()
    }

    /// Rows holding at least one cell that failed conversion.
    pub fn invalid_rows(&self) -> Vec<&Row> {
        self.rows.iter().filter(|row| row.is_invalid()).collect()
    }

    /// Cells that failed conversion.
    pub fn invalid_cells(&self) -> Vec<&Cell> {
        self.rows
            .iter()
            .flat_map(|row| row.cells().iter())
            .filter(|cell| cell.is_invalid())
            .collect()
    }

    fn filtered_position(&self, id: RowId) -> Option<usize> {
        let pos = *self.positions.get(&id)?;
        self.filtered.iter().position(|&p| p == pos)
    }
}

static_assertions::assert_impl_all!(TabularView: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompareValue, DataType};
    use crate::source::{FieldSpec, RowSpec};

    #[test]
    fn test_load_converts_cells() {
        let mut view = TabularView::default();
        view.load(Payload::new(
            vec![
                FieldSpec::new("Name"),
                FieldSpec::new("Qty").with_data_type(DataType::Int),
            ],
            vec![
                RowSpec::from_values(["Ann", "5"]),
                RowSpec::from_values(["Bo", "abc"]),
            ],
        ));
        assert_eq!(view.row_count(), 2);
        assert_eq!(view.filtered_count(), 2);
        assert_eq!(view.rows()[0].value(1), Some(&CompareValue::Int(5)));
        assert_eq!(view.invalid_rows().len(), 1);
        assert_eq!(view.invalid_cells()[0].original_value(), "abc");
    }

    #[test]
    fn test_payload_ids_honoured_when_unique() {
        let mut view = TabularView::default();
        view.load(Payload::new(
            vec![FieldSpec::new("A")],
            vec![
                RowSpec::from_values(["x"]).with_id(10),
                RowSpec::from_values(["y"]).with_id(10),
                RowSpec::from_values(["z"]),
            ],
        ));
        let ids: Vec<u64> = view.rows().iter().map(|r| r.id().get()).collect();
        assert_eq!(ids[0], 10);
        assert_ne!(ids[1], 10);
        assert_ne!(ids[1], ids[2]);
        assert!(ids[1] > 10 && ids[2] > 10);
        assert_eq!(view.row(RowId(10)).and_then(|r| r.display(0)), Some("x"));
    }

    #[test]
    fn test_load_json_tolerates_missing_arrays() {
        let mut view = TabularView::default();
        view.load_json("{}").unwrap();
        assert_eq!(view.row_count(), 0);
        assert_eq!(view.total_pages(), 1);
        assert!(view.load_json("not json").is_err());
    }

    #[test]
    fn test_load_csv_and_markup() {
        let mut view = TabularView::default();
        view.load_csv("state\nCA\nNY", &CsvOptions::default()).unwrap();
        assert_eq!(view.fields()[0].title(), "state");
        assert_eq!(view.row_count(), 2);

        view.load_markup("<table><tr><th data-type=\"int\">n</th></tr><tr><td>4</td></tr></table>")
            .unwrap();
        assert_eq!(view.fields()[0].data_type(), Some(DataType::Int));
        assert_eq!(view.rows()[0].value(0), Some(&CompareValue::Int(4)));
    }
}
