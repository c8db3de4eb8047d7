//! Load-on-demand page fetching.
//!
//! A remotely paged view holds only the current page. Navigation and sorting
//! issue a [`FetchRequest`] through the injected [`DataFetcher`]; the host
//! answers later with [`TabularView::complete_fetch`](crate::TabularView::complete_fetch).
//!
//! At most one request is outstanding. Asking for the page that is already
//! in flight does not issue a second request, a different request supersedes
//! the outstanding one, and a response whose token is not the latest is
//! dropped.

use std::fmt;

use horizon_grid_core::logging::targets;

use crate::model::SortState;

/// The sort the server should apply to the requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    /// The column whose values are compared (after any sort-by redirect).
    pub column: usize,
    pub state: SortState,
}

/// A request for one page of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Identifies the response that answers this request.
    pub token: u64,
    pub page: usize,
    pub rows_per_page: usize,
    pub sort: Option<SortKey>,
}

impl FetchRequest {
    fn same_target(&self, page: usize, rows_per_page: usize, sort: Option<SortKey>) -> bool {
        self.page == page && self.rows_per_page == rows_per_page && self.sort == sort
    }
}

/// Issues page requests on behalf of a remotely paged view.
///
/// Implementations start the fetch and return immediately; the result is
/// delivered back to the view with its token.
pub trait DataFetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest);
}

impl<F> DataFetcher for F
where
    F: Fn(&FetchRequest) + Send + Sync,
{
    fn fetch(&self, request: &FetchRequest) {
        self(request)
    }
}

/// Outstanding-request bookkeeping of a remotely paged view.
#[derive(Default)]
pub(crate) struct RemoteState {
    fetcher: Option<Box<dyn DataFetcher>>,
    next_token: u64,
    in_flight: Option<FetchRequest>,
    /// Rows available on the server, as last reported.
    pub(crate) total_row_count: usize,
}

impl fmt::Debug for RemoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteState")
            .field("has_fetcher", &self.fetcher.is_some())
            .field("next_token", &self.next_token)
            .field("in_flight", &self.in_flight)
            .field("total_row_count", &self.total_row_count)
            .finish()
    }
}

impl RemoteState {
    pub(crate) fn set_fetcher(&mut self, fetcher: Box<dyn DataFetcher>) {
        self.fetcher = Some(fetcher);
    }

    pub(crate) fn in_flight(&self) -> Option<&FetchRequest> {
        self.in_flight.as_ref()
    }

    /// Forgets the outstanding request; its response will be dropped.
    pub(crate) fn cancel(&mut self) {
        if let Some(pending) = self.in_flight.take() {
            tracing::debug!(target: targets::SOURCE, token = pending.token, "fetch cancelled");
        }
    }

    pub(crate) fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Issues a request unless the same one is already outstanding.
    ///
    /// Returns the token of the issued request.
    pub(crate) fn request(
        &mut self,
        page: usize,
        rows_per_page: usize,
        sort: Option<SortKey>,
    ) -> Option<u64> {
        if let Some(pending) = &self.in_flight
            && pending.same_target(page, rows_per_page, sort)
        {
            tracing::debug!(
                target: targets::SOURCE,
                page,
                token = pending.token,
                "page already in flight; not re-issued"
            );
            return None;
        }
        let Some(fetcher) = &self.fetcher else {
            tracing::warn!(target: targets::SOURCE, page, "remote paging without a data fetcher");
            return None;
        };

        self.next_token += 1;
        let request = FetchRequest {
            token: self.next_token,
            page,
            rows_per_page,
            sort,
        };
        if let Some(superseded) = self.in_flight.replace(request.clone()) {
            tracing::debug!(
                target: targets::SOURCE,
                superseded = superseded.token,
                token = request.token,
                "fetch superseded"
            );
        }
        tracing::debug!(target: targets::SOURCE, token = request.token, page, "fetching page");
        fetcher.fetch(&request);
        Some(request.token)
    }

    /// Accepts the response for `token` if it answers the outstanding request.
    pub(crate) fn accept(&mut self, token: u64) -> Option<FetchRequest> {
        if self.in_flight.as_ref().is_some_and(|pending| pending.token == token) {
            return self.in_flight.take();
        }
        tracing::warn!(
            target: targets::SOURCE,
            token,
            expected = ?self.in_flight.as_ref().map(|pending| pending.token),
            "dropping stale fetch response"
        );
        None
    }
}
