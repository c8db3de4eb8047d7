//! Render scheduling and frame snapshots.
//!
//! A render captures the visible page into a [`Frame`] and publishes it.
//! Immediate views render at the end of every operation. Deferred views
//! only mark a render as pending and report themselves busy; any number of
//! requests collapse into one render when the host calls
//! [`TabularView::tick`]. The pending render always reads current state, so
//! a newer request never renders stale data.

use std::sync::Arc;

use horizon_grid_core::logging::targets;

use super::TabularView;
use crate::model::{RowId, SortState};

/// A visible column in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    pub index: usize,
    pub title: String,
    pub width: Option<u32>,
    pub sort_state: SortState,
    pub style: Option<String>,
}

/// A visible cell in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCell {
    pub text: String,
    pub selected: bool,
    pub invalid: bool,
    pub style: Option<String>,
}

/// A visible row in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub id: RowId,
    /// One cell per visible column.
    pub cells: Vec<FrameCell>,
    pub selected: bool,
    pub invalid: bool,
    pub style: Option<String>,
}

impl FrameRow {
    /// Cell texts in column order.
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|cell| cell.text.as_str()).collect()
    }
}

/// Snapshot of the visible page, ready to draw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub page: usize,
    pub total_pages: usize,
    /// Rows passing the filters.
    pub filtered_count: usize,
    /// Rows held by the view.
    pub total_count: usize,
    pub columns: Vec<FrameColumn>,
    pub rows: Vec<FrameRow>,
}

#[derive(Debug, Default)]
pub(super) struct RenderState {
    pub(super) pending: bool,
    pub(super) busy: bool,
    pub(super) initialized: bool,
    pub(super) renders: u64,
    pub(super) frame: Option<Arc<Frame>>,
}

impl TabularView {
    /// Renders now, or marks a render pending on deferred views.
    pub(super) fn request_render(&mut self) {
        if !self.config.deferred_render {
            self.render_now();
            return;
        }
        if self.render.pending {
            tracing::trace!(target: targets::RENDER, "render already pending; coalesced");
            return;
        }
        self.render.pending = true;
        self.refresh_busy();
    }

    /// Performs the pending render, if any.
    ///
    /// Returns `true` if a render happened.
    pub fn tick(&mut self) -> bool {
        if !self.render.pending {
            return false;
        }
        self.render.pending = false;
        self.render_now();
        self.refresh_busy();
        true
    }

    /// `true` while a render is pending or a remote page is being fetched.
    pub fn is_busy(&self) -> bool {
        self.render.busy
    }

    /// `true` while a deferred render waits for [`tick`](Self::tick).
    pub fn render_pending(&self) -> bool {
        self.render.pending
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> Option<Arc<Frame>> {
        self.render.frame.clone()
    }

    /// Number of renders performed so far.
    pub fn render_count(&self) -> u64 {
        self.render.renders
    }

    pub(super) fn refresh_busy(&mut self) {
        let busy = self.render.pending || self.remote.is_fetching();
        if busy != self.render.busy {
            self.render.busy = busy;
            tracing::debug!(target: targets::RENDER, busy, "busy state changed");
            self.signals.busy_changed.emit(busy);
        }
    }

    fn render_now(&mut self) {
        let frame = Arc::new(self.build_frame());
        self.render.frame = Some(frame.clone());
        self.render.renders += 1;
        tracing::trace!(
            target: targets::RENDER,
            page = frame.page,
            rows = frame.rows.len(),
            "rendered"
        );
        if self.render.initialized {
            self.signals.view_refreshed.emit(frame);
        } else {
            self.render.initialized = true;
            self.signals.view_initialized.emit(frame);
        }
    }

    fn build_frame(&self) -> Frame {
        let visible: Vec<usize> = self
            .fields
            .iter()
            .filter(|field| !field.is_hidden())
            .map(|field| field.index())
            .collect();

        let columns = visible
            .iter()
            .filter_map(|&index| self.fields.get(index))
            .map(|field| FrameColumn {
                index: field.index(),
                title: field.title().to_string(),
                width: field.width(),
                sort_state: field.sort_state(),
                style: field.style().map(str::to_string),
            })
            .collect();

        let rows = self
            .page_rows()
            .into_iter()
            .map(|row| FrameRow {
                id: row.id(),
                cells: visible
                    .iter()
                    .filter_map(|&index| row.cell(index))
                    .map(|cell| FrameCell {
                        text: cell.display_value().to_string(),
                        selected: cell.is_selected(),
                        invalid: cell.is_invalid(),
                        style: cell.style().map(str::to_string),
                    })
                    .collect(),
                selected: row.is_selected(),
                invalid: row.is_invalid(),
                style: row.style().map(str::to_string),
            })
            .collect();

        Frame {
            page: self.current_page(),
            total_pages: self.total_pages(),
            filtered_count: self.filtered.len(),
            total_count: self.rows.len(),
            columns,
            rows,
        }
    }
}
