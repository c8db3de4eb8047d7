//! Logging and tracing facilities for Horizon Grid.
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_grid::filter=debug,horizon_grid::sort=trace")
//!         .init();
//! }
//! ```
//!
//! The grid never surfaces operational errors to the caller (bad predicates,
//! out-of-range pages and unknown columns degrade to safe defaults), so the
//! log is where those conditions become visible.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal emission target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// View lifecycle (load, mutation, paging).
    pub const VIEW: &str = "horizon_grid::view";
    /// Sorting passes.
    pub const SORT: &str = "horizon_grid::sort";
    /// Filter passes.
    pub const FILTER: &str = "horizon_grid::filter";
    /// Row and cell selection.
    pub const SELECTION: &str = "horizon_grid::selection";
    /// Payload, CSV and markup loading, remote fetches.
    pub const SOURCE: &str = "horizon_grid::source";
    /// Predicate compilation.
    pub const PREDICATE: &str = "horizon_grid::predicate";
    /// Render scheduling.
    pub const RENDER: &str = "horizon_grid::render";
    /// Performance spans.
    pub const PERF: &str = "horizon_grid::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Wrap potentially expensive passes (sort, filter, load) to measure them
/// with a span-timing subscriber.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }

    /// Create a span that also records the number of rows being processed.
    pub fn with_rows(name: &'static str, rows: usize) -> Self {
        let span =
            tracing::info_span!(target: targets::PERF, "perf", operation = name, rows);
        Self {
            span: span.entered(),
        }
    }
}
