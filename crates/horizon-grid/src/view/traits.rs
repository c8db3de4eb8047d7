//! Capability traits.
//!
//! Host code that only needs part of a view's surface can depend on the
//! matching trait instead of [`TabularView`]. Every trait is implemented by
//! [`TabularView`] by forwarding to its inherent methods.

use super::{ActiveSort, ClickModifiers, TabularView};
use crate::model::{Row, RowId};
use crate::source::Payload;

/// A view that accepts full data payloads.
pub trait Loadable {
    fn load(&mut self, payload: Payload);

    /// Number of rows held.
    fn row_count(&self) -> usize;
}

/// A view that orders its rows by one column.
pub trait Sortable {
    fn sort(&mut self, column: usize, descending: bool);
    fn clear_sort(&mut self);
    fn active_sort(&self) -> Option<ActiveSort>;
}

/// A view that filters its rows per column.
pub trait Filterable {
    fn filter_by_hidden_values(&mut self, columns: &[usize], values: &[&str], show: bool);
    fn filter_by_range(&mut self, column: usize, min: Option<&str>, max: Option<&str>);
    fn filter_by_text(&mut self, text: &str, columns: Option<&[usize]>);
    fn reset_filters(&mut self);

    /// Number of rows passing the filters.
    fn filtered_count(&self) -> usize;
}

/// A view that shows its rows one page at a time.
pub trait Paginated {
    fn rows_per_page(&self) -> usize;
    fn set_rows_per_page(&mut self, rows_per_page: usize);
    fn total_pages(&self) -> usize;
    fn current_page(&self) -> usize;
    fn goto_page(&mut self, page: usize) -> usize;
    fn page_rows(&self) -> Vec<&Row>;

    fn next_page(&mut self) -> usize {
        let page = self.current_page() + 1;
        self.goto_page(page)
    }

    fn previous_page(&mut self) -> usize {
        let page = self.current_page().saturating_sub(1);
        self.goto_page(page)
    }
}

/// A view whose rows or cells can be selected.
pub trait Selectable {
    fn click_row(&mut self, id: RowId, modifiers: ClickModifiers);
    fn click_cell(&mut self, id: RowId, column: usize, modifiers: ClickModifiers);
    fn select_all(&mut self);
    fn clear_selection(&mut self);
    fn selected_rows(&self) -> Vec<RowId>;
    fn selected_cells(&self) -> Vec<(RowId, usize)>;
}

impl Loadable for TabularView {
    fn load(&mut self, payload: Payload) {
        TabularView::load(self, payload);
    }

    fn row_count(&self) -> usize {
        TabularView::row_count(self)
    }
}

impl Sortable for TabularView {
    fn sort(&mut self, column: usize, descending: bool) {
        TabularView::sort(self, column, descending);
    }

    fn clear_sort(&mut self) {
        TabularView::clear_sort(self);
    }

    fn active_sort(&self) -> Option<ActiveSort> {
        TabularView::active_sort(self)
    }
}

impl Filterable for TabularView {
    fn filter_by_hidden_values(&mut self, columns: &[usize], values: &[&str], show: bool) {
        TabularView::filter_by_hidden_values(self, columns, values, show);
    }

    fn filter_by_range(&mut self, column: usize, min: Option<&str>, max: Option<&str>) {
        TabularView::filter_by_range(self, column, min, max);
    }

    fn filter_by_text(&mut self, text: &str, columns: Option<&[usize]>) {
        TabularView::filter_by_text(self, text, columns);
    }

    fn reset_filters(&mut self) {
        TabularView::reset_filters(self);
    }

    fn filtered_count(&self) -> usize {
        TabularView::filtered_count(self)
    }
}

impl Paginated for TabularView {
    fn rows_per_page(&self) -> usize {
        TabularView::rows_per_page(self)
    }

    fn set_rows_per_page(&mut self, rows_per_page: usize) {
        TabularView::set_rows_per_page(self, rows_per_page);
    }

    fn total_pages(&self) -> usize {
        TabularView::total_pages(self)
    }

    fn current_page(&self) -> usize {
        TabularView::current_page(self)
    }

    fn goto_page(&mut self, page: usize) -> usize {
        TabularView::goto_page(self, page)
    }

    fn page_rows(&self) -> Vec<&Row> {
        TabularView::page_rows(self)
    }
}

impl Selectable for TabularView {
    fn click_row(&mut self, id: RowId, modifiers: ClickModifiers) {
        TabularView::click_row(self, id, modifiers);
    }

    fn click_cell(&mut self, id: RowId, column: usize, modifiers: ClickModifiers) {
        TabularView::click_cell(self, id, column, modifiers);
    }

    fn select_all(&mut self) {
        TabularView::select_all(self);
    }

    fn clear_selection(&mut self) {
        TabularView::clear_selection(self);
    }

    fn selected_rows(&self) -> Vec<RowId> {
        TabularView::selected_rows(self)
    }

    fn selected_cells(&self) -> Vec<(RowId, usize)> {
        TabularView::selected_cells(self)
    }
}
