//! Notifications published by a view.

use std::sync::Arc;

use horizon_grid_core::Signal;

use super::render::Frame;
use crate::model::{RowId, SortState};

/// The kind of a batched mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationKind {
    Insert,
    Update,
    Delete,
}

/// Payload of [`ViewSignals::view_modified`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub kind: ModificationKind,
    /// Rows inserted, updated or deleted by the call.
    pub rows: Vec<RowId>,
    /// Rows removed to make room for an insert.
    pub replaced: Vec<RowId>,
}

/// A selectable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectionItem {
    Row(RowId),
    /// A cell, by row id and column.
    Cell(RowId, usize),
}

/// Signals emitted by a [`TabularView`](crate::TabularView).
///
/// Slots run synchronously inside the operation that emits them.
pub struct ViewSignals {
    /// Emitted on the first render of the view's lifetime.
    pub view_initialized: Signal<Arc<Frame>>,

    /// Emitted on every render after the first.
    pub view_refreshed: Signal<Arc<Frame>>,

    /// Emitted once per insert, update or delete call.
    pub view_modified: Signal<Modification>,

    /// Emitted when selection changes. Args: (selected, deselected)
    pub selection_changed: Signal<(Vec<SelectionItem>, Vec<SelectionItem>)>,

    /// Emitted when the sort changes. Args: (column, new state)
    pub sort_changed: Signal<(usize, SortState)>,

    /// Emitted when the current page changes.
    pub page_changed: Signal<usize>,

    /// Emitted when the view becomes busy or idle.
    pub busy_changed: Signal<bool>,
}

impl Default for ViewSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSignals {
    pub fn new() -> Self {
        Self {
            view_initialized: Signal::new(),
            view_refreshed: Signal::new(),
            view_modified: Signal::new(),
            selection_changed: Signal::new(),
            sort_changed: Signal::new(),
            page_changed: Signal::new(),
            busy_changed: Signal::new(),
        }
    }

    /// Blocks or unblocks every signal at once.
    pub fn set_blocked(&self, blocked: bool) {
        self.view_initialized.set_blocked(blocked);
        self.view_refreshed.set_blocked(blocked);
        self.view_modified.set_blocked(blocked);
        self.selection_changed.set_blocked(blocked);
        self.sort_changed.set_blocked(blocked);
        self.page_changed.set_blocked(blocked);
        self.busy_changed.set_blocked(blocked);
    }
}
