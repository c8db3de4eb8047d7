//! Pagination, local or remote.
//!
//! Local paging slices the filtered rows into pages of `rows_per_page`.
//! Remote paging holds only the current page and computes the page count
//! from the total the server reports; navigation issues fetch requests that
//! the host answers through [`TabularView::complete_fetch`].

use serde::{Deserialize, Serialize};

use horizon_grid_core::logging::targets;

use super::TabularView;
use crate::config::MAX_ROWS_PER_PAGE;
use crate::model::{Row, SortState};
use crate::source::{DataFetcher, FetchRequest, Payload};

/// Where pages come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Every row is held by the view and sliced locally.
    #[default]
    Local,
    /// Pages are fetched on demand through a [`DataFetcher`].
    Remote,
}

impl TabularView {
    pub fn rows_per_page(&self) -> usize {
        self.config.rows_per_page
    }

    /// Sets the page size (`0` disables paging) and returns to the first page.
    ///
    /// Sizes above [`MAX_ROWS_PER_PAGE`] are clamped.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        let clamped = rows_per_page.min(MAX_ROWS_PER_PAGE);
        if clamped != rows_per_page {
            tracing::warn!(
                target: targets::VIEW,
                requested = rows_per_page,
                clamped,
                "rows per page clamped"
            );
        }
        if clamped == self.config.rows_per_page {
            return;
        }
        self.config.rows_per_page = clamped;
        match self.config.paging {
            PagingMode::Local => {
                self.set_page(0);
                self.request_render();
            }
            PagingMode::Remote => self.request_page(0),
        }
    }

    /// Number of pages; never less than one.
    pub fn total_pages(&self) -> usize {
        let rows = match self.config.paging {
            PagingMode::Local => self.filtered.len(),
            PagingMode::Remote => self.remote.total_row_count,
        };
        match self.config.rows_per_page {
            0 => 1,
            per_page => rows.div_ceil(per_page).max(1),
        }
    }

    /// Zero-based index of the current page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Moves to a page, clamped to the valid range, and returns it.
    ///
    /// In remote mode the page is requested and becomes current when the
    /// response arrives.
    pub fn goto_page(&mut self, page: usize) -> usize {
        let page = page.min(self.total_pages() - 1);
        match self.config.paging {
            PagingMode::Local => {
                if page != self.current_page {
                    self.set_page(page);
                    self.request_render();
                }
            }
            PagingMode::Remote => self.request_page(page),
        }
        page
    }

    pub fn next_page(&mut self) -> usize {
        self.goto_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.goto_page(self.current_page.saturating_sub(1))
    }

    /// Rows of the current page, in display order.
    pub fn page_rows(&self) -> Vec<&Row> {
        let per_page = self.config.rows_per_page;
        if per_page == 0 || self.config.paging == PagingMode::Remote {
            return self.filtered_rows().collect();
        }
        let start = (self.current_page * per_page).min(self.filtered.len());
        let end = (start + per_page).min(self.filtered.len());
        self.filtered[start..end]
            .iter()
            .map(|&pos| &self.rows[pos])
            .collect()
    }

    pub(super) fn set_page(&mut self, page: usize) {
        if page == self.current_page {
            return;
        }
        tracing::debug!(target: targets::VIEW, from = self.current_page, to = page, "page changed");
        self.current_page = page;
        self.signals.page_changed.emit(page);
    }

    /// Steps back from the current page until it is valid.
    pub(super) fn clamp_page(&mut self) {
        let mut page = self.current_page;
        while page > 0 && page >= self.total_pages() {
            page -= 1;
        }
        self.set_page(page);
    }

    // =========================================================================
    // Remote paging
    // =========================================================================

    /// Installs the fetcher used by remote paging.
    pub fn set_fetcher(&mut self, fetcher: Box<dyn DataFetcher>) {
        self.remote.set_fetcher(fetcher);
    }

    /// Requests the current page again, e.g. after the sort changed.
    pub fn fetch_current_page(&mut self) {
        self.request_page(self.current_page);
    }

    /// `true` while a page request is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.remote.is_fetching()
    }

    /// The outstanding page request, if any.
    pub fn pending_fetch(&self) -> Option<&FetchRequest> {
        self.remote.in_flight()
    }

    /// Applies the response to a page request.
    ///
    /// Only the response to the latest request is applied; returns `false`
    /// for a stale token. Responses without fields keep the current fields.
    /// Filters and the sort marker carry over to the new page.
    pub fn complete_fetch(&mut self, token: u64, payload: Payload) -> bool {
        let Some(request) = self.remote.accept(token) else {
            self.refresh_busy();
            return false;
        };

        let received = payload.rows.len();
        self.remote.total_row_count = payload.total_row_count.unwrap_or(received);
        let page = payload.current_page.unwrap_or(request.page);
        let keep_fields = payload.fields.is_empty() && !self.fields.is_empty();
        self.install(payload, keep_fields);
        self.restore_sort_marker();
        self.derive_filtered();
        self.set_page(page);

        tracing::debug!(
            target: targets::SOURCE,
            token,
            page,
            rows = received,
            total = self.remote.total_row_count,
            "page received"
        );
        self.refresh_busy();
        self.request_render();
        true
    }

    fn request_page(&mut self, page: usize) {
        let per_page = self.config.rows_per_page;
        let sort = self.sort.map(|sort| sort.key());
        self.remote.request(page, per_page, sort);
        self.refresh_busy();
    }

    fn restore_sort_marker(&mut self) {
        let Some(sort) = self.sort else {
            return;
        };
        match self.fields.get_mut(sort.column) {
            Some(field) => {
                field.sort_state = if sort.descending {
                    SortState::Descending
                } else {
                    SortState::Ascending
                };
            }
            None => self.sort = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::PagingMode;
    use crate::model::SortState;
    use crate::source::{FetchRequest, FieldSpec, Payload, RowSpec};
    use crate::{GridConfig, TabularView};

    fn numbered(count: usize) -> Payload {
        Payload::new(
            vec![FieldSpec::new("N")],
            (1..=count)
                .map(|n| RowSpec::from_values([n.to_string()]))
                .collect(),
        )
    }

    fn page_values(view: &TabularView) -> Vec<String> {
        view.page_rows()
            .iter()
            .filter_map(|r| r.display(0).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_last_page_holds_remainder() {
        let mut view = TabularView::new(GridConfig::default().with_rows_per_page(3));
        view.load(numbered(10));
        assert_eq!(view.total_pages(), 4);
        assert_eq!(view.goto_page(3), 3);
        assert_eq!(page_values(&view), ["10"]);
    }

    #[test]
    fn test_goto_page_clamps() {
        let mut view = TabularView::new(GridConfig::default().with_rows_per_page(4));
        view.load(numbered(10));
        assert_eq!(view.goto_page(99), 2);
        assert_eq!(view.next_page(), 2);
        assert_eq!(view.previous_page(), 1);
        assert_eq!(page_values(&view), ["5", "6", "7", "8"]);
    }

    #[test]
    fn test_zero_rows_per_page_is_one_page() {
        let mut view = TabularView::default();
        view.load(numbered(5));
        assert_eq!(view.total_pages(), 1);
        assert_eq!(view.page_rows().len(), 5);

        view.set_rows_per_page(2);
        assert_eq!(view.total_pages(), 3);
        view.set_rows_per_page(usize::MAX);
        assert_eq!(view.rows_per_page(), crate::config::MAX_ROWS_PER_PAGE);
    }

    #[test]
    fn test_empty_view_has_one_page() {
        let mut view = TabularView::new(GridConfig::default().with_rows_per_page(10));
        view.load(Payload::default());
        assert_eq!(view.total_pages(), 1);
        assert!(view.page_rows().is_empty());
    }

    #[test]
    fn test_page_changed_emitted_on_change_only() {
        let mut view = TabularView::new(GridConfig::default().with_rows_per_page(2));
        view.load(numbered(6));
        let pages = Arc::new(Mutex::new(Vec::new()));
        let sink = pages.clone();
        view.signals()
            .page_changed
            .connect(move |page| sink.lock().push(*page));
        view.goto_page(1);
        view.goto_page(1);
        view.goto_page(2);
        assert_eq!(*pages.lock(), [1, 2]);
    }

    fn remote_view() -> (TabularView, Arc<Mutex<Vec<FetchRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let sink = requests.clone();
        let mut view = TabularView::new(
            GridConfig::default()
                .with_rows_per_page(2)
                .with_paging(PagingMode::Remote),
        );
        view.set_fetcher(Box::new(move |request: &FetchRequest| {
            sink.lock().push(request.clone());
        }));
        let mut first = numbered(2);
        first.total_row_count = Some(7);
        view.load(first);
        (view, requests)
    }

    fn remote_page(values: &[&str], page: usize) -> Payload {
        let mut payload = Payload::new(
            Vec::new(),
            values.iter().map(|v| RowSpec::from_values([*v])).collect(),
        );
        payload.total_row_count = Some(7);
        payload.current_page = Some(page);
        payload
    }

    #[test]
    fn test_remote_pages_from_reported_total() {
        let (mut view, requests) = remote_view();
        assert_eq!(view.total_pages(), 4);

        assert_eq!(view.goto_page(2), 2);
        assert!(view.is_fetching());
        assert!(view.is_busy());
        assert_eq!(view.current_page(), 0);

        let token = requests.lock()[0].token;
        assert!(view.complete_fetch(token, remote_page(&["5", "6"], 2)));
        assert_eq!(view.current_page(), 2);
        assert_eq!(page_values(&view), ["5", "6"]);
        assert_eq!(view.fields()[0].title(), "N");
        assert!(!view.is_busy());
    }

    #[test]
    fn test_remote_duplicate_and_stale_requests() {
        let (mut view, requests) = remote_view();
        view.goto_page(1);
        view.goto_page(1);
        assert_eq!(requests.lock().len(), 1);

        view.goto_page(3);
        let (stale, latest) = {
            let requests = requests.lock();
            (requests[0].token, requests[1].token)
        };
        assert!(!view.complete_fetch(stale, remote_page(&["3", "4"], 1)));
        assert_eq!(view.current_page(), 0);
        assert!(view.is_fetching());

        assert!(view.complete_fetch(latest, remote_page(&["7"], 3)));
        assert_eq!(page_values(&view), ["7"]);
    }

    #[test]
    fn test_remote_sort_requests_current_page() {
        let (mut view, requests) = remote_view();
        view.sort(0, true);
        let request = requests.lock()[0].clone();
        assert_eq!(request.page, 0);
        assert_eq!(request.sort.map(|s| s.state), Some(SortState::Descending));

        assert!(view.complete_fetch(request.token, remote_page(&["7", "6"], 0)));
        assert_eq!(view.fields()[0].sort_state(), SortState::Descending);
        assert_eq!(page_values(&view), ["7", "6"]);
    }

    #[test]
    fn test_remote_filter_stays_on_received_page() {
        let (mut view, requests) = remote_view();
        view.goto_page(2);
        let token = requests.lock()[0].token;
        assert!(view.complete_fetch(token, remote_page(&["5", "6"], 2)));

        view.filter_by_hidden_values(&[0], &["5"], false);
        assert_eq!(view.current_page(), 2);
        assert_eq!(page_values(&view), ["6"]);
        assert_eq!(requests.lock().len(), 1);

        assert_eq!(view.next_page(), 3);
        assert_eq!(requests.lock()[1].page, 3);
    }

    #[test]
    fn test_load_drops_outstanding_fetch() {
        let (mut view, requests) = remote_view();
        view.goto_page(3);
        assert!(view.is_busy());
        let token = requests.lock()[0].token;

        let mut fresh = numbered(2);
        fresh.total_row_count = Some(7);
        view.load(fresh);
        assert!(!view.is_fetching());
        assert!(!view.is_busy());

        assert!(!view.complete_fetch(token, remote_page(&["7"], 3)));
        assert_eq!(view.current_page(), 0);
        assert_eq!(page_values(&view), ["1", "2"]);
    }
}
