//! Column filters.
//!
//! Three mechanisms, each configured per column:
//!
//! - hidden values: rows whose display text is in the column's hidden set
//!   are excluded
//! - ranges: rows whose compare value lies below the minimum or above the
//!   maximum are excluded
//! - text: rows are kept if *any* text-filtered column contains its filter
//!   text (case-sensitive, on display text)
//!
//! Hidden-value and range filters apply to every column (AND) and combine
//! with the text outcome by AND. Filtering always starts again from all
//! rows and re-applies the sort. Locally paged views return to the first
//! page; remotely paged views stay on the page they received.

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use super::TabularView;
use super::pager::PagingMode;
use crate::model::Row;

impl TabularView {
    /// Hides (`show == false`) or shows again rows holding any of `values`
    /// in any of `columns`.
    pub fn filter_by_hidden_values(&mut self, columns: &[usize], values: &[&str], show: bool) {
        for &column in columns {
            let Some(field) = self.fields.get_mut(column) else {
                tracing::debug!(target: targets::FILTER, column, "hidden-value filter on unknown column ignored");
                continue;
            };
            for value in values {
                if show {
                    field.hidden_values.remove(*value);
                } else {
                    field.hidden_values.insert((*value).to_string());
                }
            }
        }
        self.refilter();
    }

    /// Bounds a column's compare values.
    ///
    /// Bounds are given as text and converted through the column's data
    /// type. `None`, blank text or text that does not convert clears the
    /// bound.
    pub fn filter_by_range(&mut self, column: usize, min: Option<&str>, max: Option<&str>) {
        let Some(field) = self.fields.get_mut(column) else {
            tracing::debug!(target: targets::FILTER, column, "range filter on unknown column ignored");
            return;
        };
        let bound = |text: Option<&str>| {
            let text = text?.trim();
            if text.is_empty() {
                return None;
            }
            let conversion = field.convert(text);
            if !conversion.valid {
                tracing::warn!(
                    target: targets::FILTER,
                    column,
                    bound = text,
                    "range bound does not convert; bound cleared"
                );
                return None;
            }
            Some(conversion.value)
        };
        let min = bound(min);
        let max = bound(max);
        field.min_value = min;
        field.max_value = max;
        self.refilter();
    }

    /// Filters by substring on the given columns (every column if `None`).
    ///
    /// Empty text clears the text filter of those columns.
    pub fn filter_by_text(&mut self, text: &str, columns: Option<&[usize]>) {
        let all: Vec<usize>;
        let columns = match columns {
            Some(columns) => columns,
            None => {
                all = (0..self.fields.len()).collect();
                &all
            }
        };
        for &column in columns {
            let Some(field) = self.fields.get_mut(column) else {
                tracing::debug!(target: targets::FILTER, column, "text filter on unknown column ignored");
                continue;
            };
            field.text_filter = (!text.is_empty()).then(|| text.to_string());
        }
        self.refilter();
    }

    /// Removes every filter from every column.
    pub fn reset_filters(&mut self) {
        for field in &mut self.fields {
            field.clear_filters();
        }
        self.refilter();
    }

    /// `true` if any column carries a filter.
    pub fn is_filtered(&self) -> bool {
        self.fields.iter().any(|field| field.is_filtered())
    }

    /// Re-derives the filtered rows and renders.
    fn refilter(&mut self) {
        self.derive_filtered();
        if self.config.paging == PagingMode::Local {
            self.set_page(0);
        }
        self.request_render();
    }

    /// Re-derives the filtered rows from all rows and re-applies the sort.
    pub(super) fn derive_filtered(&mut self) {
        let _perf = PerfSpan::with_rows("filter", self.rows.len());
        let filtered: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.passes(row))
            .map(|(pos, _)| pos)
            .collect();
        tracing::debug!(
            target: targets::FILTER,
            kept = filtered.len(),
            total = self.rows.len(),
            "filtered"
        );
        self.filtered = filtered;
        self.apply_sort();
    }

    fn passes(&self, row: &Row) -> bool {
        let mut text_filtered = false;
        let mut text_matched = false;
        for (field, cell) in self.fields.iter().zip(row.cells()) {
            if !field.admits(cell.display_value(), cell.compare_value()) {
                return false;
            }
            if let Some(matched) = field.text_matches(cell.display_value()) {
                text_filtered = true;
                text_matched |= matched;
            }
        }
        !text_filtered || text_matched
    }
}
