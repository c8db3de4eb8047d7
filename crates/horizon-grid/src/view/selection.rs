//! Row and cell selection.
//!
//! Selection flags live on the rows and cells themselves. Clicks follow the
//! usual desktop conventions:
//!
//! - a plain click selects only the target and moves the anchor to it
//! - a toggle click flips the target and moves the anchor to it
//! - a range click selects exactly the rows (or the rectangle of cells)
//!   between the anchor and the target, in display order, and keeps the
//!   anchor
//!
//! Modifiers only apply in [`SelectionMode::Multiple`]. Every change is
//! published once through `selection_changed` as `(selected, deselected)`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use horizon_grid_core::logging::targets;

use super::TabularView;
use super::signals::SelectionItem;
use crate::model::RowId;

/// How many items may be selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Clicks are ignored.
    None,
    /// One item at a time; modifiers are ignored.
    Single,
    /// Toggle and range modifiers apply.
    #[default]
    Multiple,
}

/// What a click selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionUnit {
    #[default]
    Rows,
    Cells,
}

/// Keyboard modifiers held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    /// Flip the target (usually Ctrl/Cmd).
    pub toggle: bool,
    /// Extend from the anchor (usually Shift). Takes precedence over `toggle`.
    pub range: bool,
}

impl ClickModifiers {
    pub const NONE: Self = Self {
        toggle: false,
        range: false,
    };

    pub const TOGGLE: Self = Self {
        toggle: true,
        range: false,
    };

    pub const RANGE: Self = Self {
        toggle: false,
        range: true,
    };
}

/// Start point of range selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Anchor {
    pub(super) row: RowId,
    pub(super) column: usize,
}

impl TabularView {
    /// Handles a click on a row.
    ///
    /// Ignored on views selecting cells, and for rows hidden by the filters.
    pub fn click_row(&mut self, id: RowId, modifiers: ClickModifiers) {
        if self.config.selection_unit != SelectionUnit::Rows {
            tracing::debug!(target: targets::SELECTION, row = %id, "row click on a cell-selecting view ignored");
            return;
        }
        self.click(Anchor { row: id, column: 0 }, modifiers);
    }

    /// Handles a click on a cell.
    ///
    /// On views selecting rows this selects the cell's row.
    pub fn click_cell(&mut self, id: RowId, column: usize, modifiers: ClickModifiers) {
        match self.config.selection_unit {
            SelectionUnit::Rows => self.click(Anchor { row: id, column: 0 }, modifiers),
            SelectionUnit::Cells => {
                if column >= self.fields.len() {
                    tracing::debug!(target: targets::SELECTION, row = %id, column, "click on unknown column ignored");
                    return;
                }
                self.click(Anchor { row: id, column }, modifiers);
            }
        }
    }

    /// Selects every filtered row (or every cell of them).
    ///
    /// Only available in multiple selection mode.
    pub fn select_all(&mut self) {
        if self.config.selection_mode != SelectionMode::Multiple {
            tracing::debug!(target: targets::SELECTION, mode = ?self.config.selection_mode, "select all ignored");
            return;
        }
        let before = self.selection_snapshot();
        let unit = self.config.selection_unit;
        for &pos in &self.filtered {
            let row = &mut self.rows[pos];
            match unit {
                SelectionUnit::Rows => row.selected = true,
                SelectionUnit::Cells => row.cells.iter_mut().for_each(|cell| cell.selected = true),
            }
        }
        self.commit_selection(before);
    }

    /// Deselects everything, including rows hidden by the filters.
    pub fn clear_selection(&mut self) {
        let before = self.selection_snapshot();
        self.clear_selection_flags();
        self.commit_selection(before);
    }

    /// Ids of selected rows, in load order.
    pub fn selected_rows(&self) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|row| row.is_selected())
            .map(|row| row.id())
            .collect()
    }

    /// Selected cells as `(row, column)`, in load order.
    pub fn selected_cells(&self) -> Vec<(RowId, usize)> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.cells()
                    .iter()
                    .filter(|cell| cell.is_selected())
                    .map(move |cell| (row.id(), cell.field_index()))
            })
            .collect()
    }

    /// The item range selections extend from.
    pub fn selection_anchor(&self) -> Option<SelectionItem> {
        let anchor = self.anchor?;
        Some(match self.config.selection_unit {
            SelectionUnit::Rows => SelectionItem::Row(anchor.row),
            SelectionUnit::Cells => SelectionItem::Cell(anchor.row, anchor.column),
        })
    }

    fn click(&mut self, target: Anchor, modifiers: ClickModifiers) {
        let mode = self.config.selection_mode;
        if mode == SelectionMode::None {
            return;
        }
        let Some(target_pos) = self.filtered_position(target.row) else {
            tracing::debug!(target: targets::SELECTION, row = %target.row, "click on a row outside the filtered view ignored");
            return;
        };

        let before = self.selection_snapshot();
        let multiple = mode == SelectionMode::Multiple;
        let range_from = self
            .anchor
            .filter(|_| multiple && modifiers.range)
            .and_then(|anchor| Some((anchor, self.filtered_position(anchor.row)?)));

        if let Some((anchor, anchor_pos)) = range_from {
            self.select_range(anchor, anchor_pos, target, target_pos);
        } else if multiple && modifiers.toggle {
            let selected = !self.is_item_selected(target);
            self.set_item_selected(target, selected);
            self.anchor = Some(target);
        } else {
            self.clear_selection_flags();
            self.set_item_selected(target, true);
            self.anchor = Some(target);
        }
        self.commit_selection(before);
    }

    /// Replaces the selection with the span between two filtered positions.
    fn select_range(&mut self, anchor: Anchor, anchor_pos: usize, target: Anchor, target_pos: usize) {
        self.clear_selection_flags();
        let rows = anchor_pos.min(target_pos)..=anchor_pos.max(target_pos);
        let columns = anchor.column.min(target.column)..=anchor.column.max(target.column);
        let unit = self.config.selection_unit;
        for &pos in &self.filtered[rows] {
            let row = &mut self.rows[pos];
            match unit {
                SelectionUnit::Rows => row.selected = true,
                SelectionUnit::Cells => {
                    for cell in row.cells.iter_mut().filter(|c| columns.contains(&c.field_index)) {
                        cell.selected = true;
                    }
                }
            }
        }
    }

    fn is_item_selected(&self, item: Anchor) -> bool {
        let Some(row) = self.row(item.row) else {
            return false;
        };
        match self.config.selection_unit {
            SelectionUnit::Rows => row.is_selected(),
            SelectionUnit::Cells => row.cell(item.column).is_some_and(|cell| cell.is_selected()),
        }
    }

    fn set_item_selected(&mut self, item: Anchor, selected: bool) {
        let Some(&pos) = self.positions.get(&item.row) else {
            return;
        };
        let row = &mut self.rows[pos];
        match self.config.selection_unit {
            SelectionUnit::Rows => row.selected = selected,
            SelectionUnit::Cells => {
                if let Some(cell) = row.cells.get_mut(item.column) {
                    cell.selected = selected;
                }
            }
        }
    }

    fn clear_selection_flags(&mut self) {
        for row in &mut self.rows {
            row.selected = false;
            row.cells.iter_mut().for_each(|cell| cell.selected = false);
        }
    }

    fn selection_snapshot(&self) -> BTreeSet<SelectionItem> {
        let mut items = BTreeSet::new();
        for row in &self.rows {
            if row.is_selected() {
                items.insert(SelectionItem::Row(row.id()));
            }
            for cell in row.cells().iter().filter(|cell| cell.is_selected()) {
                items.insert(SelectionItem::Cell(row.id(), cell.field_index()));
            }
        }
        items
    }

    /// Publishes the difference to `before`, if any, and renders.
    fn commit_selection(&mut self, before: BTreeSet<SelectionItem>) {
        let after = self.selection_snapshot();
        let selected: Vec<SelectionItem> = after.difference(&before).copied().collect();
        let deselected: Vec<SelectionItem> = before.difference(&after).copied().collect();
        if selected.is_empty() && deselected.is_empty() {
            return;
        }
        tracing::debug!(
            target: targets::SELECTION,
            selected = selected.len(),
            deselected = deselected.len(),
            "selection changed"
        );
        self.signals.selection_changed.emit((selected, deselected));
        self.request_render();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::GridConfig;
    use crate::source::{FieldSpec, Payload, RowSpec};

    fn view(config: GridConfig) -> (TabularView, Vec<RowId>) {
        let mut view = TabularView::new(config);
        view.load(Payload::new(
            vec![FieldSpec::new("A"), FieldSpec::new("B"), FieldSpec::new("C")],
            (0..5)
                .map(|n| RowSpec::from_values([format!("a{n}"), format!("b{n}"), format!("c{n}")]))
                .collect(),
        ));
        let ids = view.filtered_ids();
        (view, ids)
    }

    #[test]
    fn test_plain_click_replaces_selection() {
        let (mut v, ids) = view(GridConfig::default());
        v.click_row(ids[0], ClickModifiers::NONE);
        v.click_row(ids[2], ClickModifiers::NONE);
        assert_eq!(v.selected_rows(), [ids[2]]);
        assert_eq!(v.selection_anchor(), Some(SelectionItem::Row(ids[2])));
    }

    #[test]
    fn test_toggle_flips_and_moves_anchor() {
        let (mut v, ids) = view(GridConfig::default());
        v.click_row(ids[0], ClickModifiers::NONE);
        v.click_row(ids[3], ClickModifiers::TOGGLE);
        assert_eq!(v.selected_rows(), [ids[0], ids[3]]);
        v.click_row(ids[0], ClickModifiers::TOGGLE);
        assert_eq!(v.selected_rows(), [ids[3]]);
        assert_eq!(v.selection_anchor(), Some(SelectionItem::Row(ids[0])));
    }

    #[test]
    fn test_range_selects_exactly_the_span() {
        let (mut v, ids) = view(GridConfig::default());
        v.click_row(ids[4], ClickModifiers::NONE);
        v.click_row(ids[0], ClickModifiers::TOGGLE);
        v.click_row(ids[2], ClickModifiers::RANGE);
        assert_eq!(v.selected_rows(), [ids[0], ids[1], ids[2]]);
        v.click_row(ids[1], ClickModifiers::RANGE);
        assert_eq!(v.selected_rows(), [ids[0], ids[1]]);
        assert_eq!(v.selection_anchor(), Some(SelectionItem::Row(ids[0])));
    }

    #[test]
    fn test_range_follows_display_order() {
        let (mut v, ids) = view(GridConfig::default());
        v.sort(0, true);
        v.click_row(ids[4], ClickModifiers::NONE);
        v.click_row(ids[2], ClickModifiers::RANGE);
        assert_eq!(v.selected_rows(), [ids[2], ids[3], ids[4]]);
    }

    #[test]
    fn test_single_mode_ignores_modifiers() {
        let (mut v, ids) = view(GridConfig::default().with_selection_mode(SelectionMode::Single));
        v.click_row(ids[0], ClickModifiers::NONE);
        v.click_row(ids[3], ClickModifiers::RANGE);
        assert_eq!(v.selected_rows(), [ids[3]]);
        v.select_all();
        assert_eq!(v.selected_rows(), [ids[3]]);
    }

    #[test]
    fn test_none_mode_ignores_clicks() {
        let (mut v, ids) = view(GridConfig::default().with_selection_mode(SelectionMode::None));
        v.click_row(ids[0], ClickModifiers::NONE);
        assert!(v.selected_rows().is_empty());
        assert_eq!(v.selection_anchor(), None);
    }

    #[test]
    fn test_cell_range_is_a_rectangle() {
        let (mut v, ids) = view(GridConfig::default().with_selection_unit(SelectionUnit::Cells));
        v.click_cell(ids[1], 2, ClickModifiers::NONE);
        v.click_cell(ids[3], 1, ClickModifiers::RANGE);
        assert_eq!(
            v.selected_cells(),
            [(ids[1], 1), (ids[1], 2), (ids[2], 1), (ids[2], 2), (ids[3], 1), (ids[3], 2)]
        );
        assert!(v.selected_rows().is_empty());
    }

    #[test]
    fn test_selection_changed_reports_diff() {
        let (mut v, ids) = view(GridConfig::default());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        v.signals()
            .selection_changed
            .connect(move |change| sink.lock().push(change.clone()));

        v.click_row(ids[0], ClickModifiers::NONE);
        v.click_row(ids[0], ClickModifiers::NONE);
        v.click_row(ids[1], ClickModifiers::NONE);
        v.clear_selection();

        let events = events.lock();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], (vec![SelectionItem::Row(ids[0])], vec![]));
        assert_eq!(
            events[1],
            (vec![SelectionItem::Row(ids[1])], vec![SelectionItem::Row(ids[0])])
        );
        assert_eq!(events[2], (vec![], vec![SelectionItem::Row(ids[1])]));
    }

    #[test]
    fn test_select_all_covers_filtered_rows_only() {
        let (mut v, ids) = view(GridConfig::default());
        v.filter_by_hidden_values(&[0], &["a0"], false);
        v.select_all();
        assert_eq!(v.selected_rows(), ids[1..].to_vec());
    }

    #[test]
    fn test_click_on_filtered_out_row_is_ignored() {
        let (mut v, ids) = view(GridConfig::default());
        v.filter_by_hidden_values(&[0], &["a1"], false);
        v.click_row(ids[1], ClickModifiers::NONE);
        assert!(v.selected_rows().is_empty());
    }
}
