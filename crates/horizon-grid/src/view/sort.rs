//! Single-column sorting with a deterministic tiebreak.
//!
//! Rows compare first on the target column (descending if requested). Ties
//! fall through every other column from left to right, always ascending, and
//! rows equal on every column keep their relative order.

use std::cmp::Ordering;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use super::TabularView;
use super::pager::PagingMode;
use crate::model::{Row, SortState};
use crate::source::SortKey;

/// The sort currently applied to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSort {
    /// The column the sort was requested on (carries the sort marker).
    pub column: usize,
    /// The column whose values are compared.
    pub target: usize,
    pub descending: bool,
}

impl ActiveSort {
    pub(crate) fn key(&self) -> SortKey {
        SortKey {
            column: self.target,
            state: if self.descending {
                SortState::Descending
            } else {
                SortState::Ascending
            },
        }
    }
}

impl TabularView {
    /// Sorts by a column.
    ///
    /// An unknown or unsortable column leaves the view unchanged. A column
    /// that sorts by another field compares that field's values but keeps the
    /// sort marker itself.
    pub fn sort(&mut self, column: usize, descending: bool) {
        if !self.apply_sort_request(column, descending) {
            return;
        }
        let state = self.fields[column].sort_state();
        self.signals.sort_changed.emit((column, state));
        if self.config.paging == PagingMode::Remote {
            self.fetch_current_page();
        }
        self.request_render();
    }

    /// Removes the sort and restores load order.
    pub fn clear_sort(&mut self) {
        let Some(previous) = self.sort.take() else {
            return;
        };
        for field in &mut self.fields {
            field.sort_state = SortState::None;
        }
        tracing::debug!(target: targets::SORT, column = previous.column, "sort cleared");
        self.filtered.sort_unstable();
        self.signals
            .sort_changed
            .emit((previous.column, SortState::None));
        if self.config.paging == PagingMode::Remote {
            self.fetch_current_page();
        }
        self.request_render();
    }

    /// The sort currently applied.
    pub fn active_sort(&self) -> Option<ActiveSort> {
        self.sort
    }

    /// Records the sort and orders the filtered rows. Returns `false` if the
    /// request was ignored.
    pub(super) fn apply_sort_request(&mut self, column: usize, descending: bool) -> bool {
        let Some(field) = self.fields.get(column) else {
            tracing::debug!(target: targets::SORT, column, "sort on unknown column ignored");
            return false;
        };
        if !field.is_sortable() {
            tracing::debug!(target: targets::SORT, column, "sort on unsortable column ignored");
            return false;
        }
        let target = field
            .sort_by_field()
            .filter(|&target| target < self.fields.len())
            .unwrap_or(column);

        for field in &mut self.fields {
            field.sort_state = SortState::None;
        }
        self.fields[column].sort_state = if descending {
            SortState::Descending
        } else {
            SortState::Ascending
        };
        self.sort = Some(ActiveSort {
            column,
            target,
            descending,
        });
        self.apply_sort();
        true
    }

    /// Orders the filtered rows by the active sort.
    pub(super) fn apply_sort(&mut self) {
        let Some(sort) = self.sort else {
            return;
        };
        // the server orders remote pages
        if self.config.paging == PagingMode::Remote {
            return;
        }
        let _perf = PerfSpan::with_rows("sort", self.filtered.len());
        let rows = &self.rows;
        let field_count = self.fields.len();
        self.filtered
            .sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], &sort, field_count));
        tracing::trace!(
            target: targets::SORT,
            column = sort.column,
            target_column = sort.target,
            descending = sort.descending,
            "sorted"
        );
    }
}

fn compare_rows(a: &Row, b: &Row, sort: &ActiveSort, field_count: usize) -> Ordering {
    let primary = compare_column(a, b, sort.target);
    let primary = if sort.descending {
        primary.reverse()
    } else {
        primary
    };
    if primary != Ordering::Equal {
        return primary;
    }
    (0..field_count)
        .filter(|&column| column != sort.target)
        .map(|column| compare_column(a, b, column))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn compare_column(a: &Row, b: &Row, column: usize) -> Ordering {
    match (a.value(column), b.value(column)) {
        (Some(x), Some(y)) => x.compare(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{DataType, SortState};
    use crate::source::{FieldSpec, Payload, RowSpec};
    use crate::{GridConfig, TabularView};

    fn view(rows: &[[&str; 2]]) -> TabularView {
        let mut view = TabularView::default();
        view.load(Payload::new(
            vec![
                FieldSpec::new("Qty").with_data_type(DataType::Int),
                FieldSpec::new("Name"),
            ],
            rows.iter().map(|r| RowSpec::from_values(*r)).collect(),
        ));
        view
    }

    fn names(view: &TabularView) -> Vec<String> {
        view.filtered_rows()
            .filter_map(|r| r.display(1).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_descending_primary_ascending_tiebreak() {
        let mut v = view(&[["1", "b"], ["2", "z"], ["1", "a"], ["2", "c"]]);
        v.sort(0, true);
        assert_eq!(names(&v), ["c", "z", "a", "b"]);
        assert_eq!(v.fields()[0].sort_state(), SortState::Descending);
    }

    #[test]
    fn test_only_one_sort_marker() {
        let mut v = view(&[["1", "b"], ["2", "a"]]);
        v.sort(0, false);
        v.sort(1, false);
        assert_eq!(v.fields()[0].sort_state(), SortState::None);
        assert_eq!(v.fields()[1].sort_state(), SortState::Ascending);
        assert_eq!(names(&v), ["a", "b"]);
    }

    #[test]
    fn test_sort_by_field_redirect() {
        let mut view = TabularView::default();
        view.load(Payload::new(
            vec![
                FieldSpec::new("Label").with_sort_by_field(1),
                FieldSpec::new("Rank")
                    .with_data_type(DataType::Int)
                    .with_hidden(true),
            ],
            vec![
                RowSpec::from_values(["ten", "10"]),
                RowSpec::from_values(["two", "2"]),
                RowSpec::from_values(["five", "5"]),
            ],
        ));
        view.sort(0, false);
        let labels: Vec<&str> = view.filtered_rows().filter_map(|r| r.display(0)).collect();
        assert_eq!(labels, ["two", "five", "ten"]);
        assert_eq!(view.fields()[0].sort_state(), SortState::Ascending);
        assert_eq!(view.fields()[1].sort_state(), SortState::None);
        assert_eq!(view.active_sort().map(|s| s.target), Some(1));
    }

    #[test]
    fn test_unknown_and_unsortable_columns_are_ignored() {
        let mut view = TabularView::default();
        view.load(Payload::new(
            vec![FieldSpec::new("Locked").with_sortable(false)],
            vec![RowSpec::from_values(["b"]), RowSpec::from_values(["a"])],
        ));
        let renders = view.render_count();
        view.sort(0, false);
        view.sort(7, false);
        assert_eq!(view.active_sort(), None);
        assert_eq!(view.render_count(), renders);
        let values: Vec<&str> = view.filtered_rows().filter_map(|r| r.display(0)).collect();
        assert_eq!(values, ["b", "a"]);
    }

    #[test]
    fn test_clear_sort_restores_load_order() {
        let mut v = view(&[["3", "c"], ["1", "a"], ["2", "b"]]);
        v.sort(0, false);
        assert_eq!(names(&v), ["a", "b", "c"]);
        v.clear_sort();
        assert_eq!(names(&v), ["c", "a", "b"]);
        assert!(v.fields().iter().all(|f| f.sort_state() == SortState::None));
    }

    #[test]
    fn test_initial_sort_applied_on_load() {
        let mut view = TabularView::new(GridConfig::default().with_initial_sort(0, true));
        view.load(Payload::new(
            vec![FieldSpec::new("Qty").with_data_type(DataType::Int)],
            vec![RowSpec::from_values(["1"]), RowSpec::from_values(["3"])],
        ));
        let values: Vec<&str> = view.filtered_rows().filter_map(|r| r.display(0)).collect();
        assert_eq!(values, ["3", "1"]);
    }
}
