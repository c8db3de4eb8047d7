//! Batched insert, update and delete.
//!
//! Each call applies its whole batch, re-derives the filtered view, steps the
//! current page back if it no longer exists, publishes one `view_modified`
//! and renders once.

use std::collections::{BTreeMap, HashMap, HashSet};

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use super::TabularView;
use super::signals::{Modification, ModificationKind};
use crate::model::{Row, RowId};
use crate::predicate::Predicate;
use crate::source::RowSpec;

/// Where inserted rows go, in load order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertPosition {
    Before(RowId),
    After(RowId),
    /// Position among all rows; past the end means the end.
    Index(usize),
    /// After every row; also used when a referenced row does not exist.
    #[default]
    End,
}

impl TabularView {
    /// Inserts rows, first removing `remove_count` rows at the position.
    ///
    /// A requested id is honoured only if it was never issued by this view;
    /// otherwise a fresh id is assigned. Returns the ids of the new rows.
    pub fn insert_rows(
        &mut self,
        rows: Vec<RowSpec>,
        position: InsertPosition,
        remove_count: usize,
    ) -> Vec<RowId> {
        let _perf = PerfSpan::with_rows("insert", rows.len());
        let at = self.insert_index(position);
        let end = at.saturating_add(remove_count).min(self.rows.len());

        let field_count = self.fields.len();
        let layout: HashMap<usize, usize> = (0..field_count).map(|i| (i, i)).collect();
        let mut claimed = HashSet::new();
        let requested: Vec<Option<u64>> = rows
            .iter()
            .map(|spec| spec.id.filter(|&id| id >= self.next_id && claimed.insert(id)))
            .collect();
        if let Some(max) = claimed.iter().max() {
            self.next_id = self.next_id.max(max.saturating_add(1));
        }

        let mut new_rows = Vec::with_capacity(rows.len());
        for (spec, requested) in rows.into_iter().zip(requested) {
            let id = match requested {
                Some(id) => RowId(id),
                None => self.issue_id(),
            };
            let values = spec.layout(field_count, &layout);
            new_rows.push(Row::build(id, &self.fields, values, spec.style));
        }
        let inserted: Vec<RowId> = new_rows.iter().map(Row::id).collect();
        let replaced: Vec<RowId> = self
            .rows
            .splice(at..end, new_rows)
            .map(|row| row.id())
            .collect();
        if !replaced.is_empty() {
            self.forget_anchor(&replaced);
        }

        tracing::debug!(
            target: targets::VIEW,
            inserted = inserted.len(),
            replaced = replaced.len(),
            at,
            "rows inserted"
        );
        self.finish_mutation(Modification {
            kind: ModificationKind::Insert,
            rows: inserted.clone(),
            replaced,
        });
        inserted
    }

    /// Re-converts the given cells of every row matching `predicate`.
    ///
    /// Unknown columns are ignored. Returns the number of rows updated.
    pub fn update_rows(&mut self, predicate: &Predicate, values: &BTreeMap<usize, String>) -> usize {
        let _perf = PerfSpan::with_rows("update", self.rows.len());
        let columns: Vec<(usize, &String)> = values
            .iter()
            .filter(|&(&column, _)| {
                let known = column < self.fields.len();
                if !known {
                    tracing::debug!(target: targets::VIEW, column, "update of unknown column ignored");
                }
                known
            })
            .map(|(&column, raw)| (column, raw))
            .collect();

        let mut updated = Vec::new();
        for row in &mut self.rows {
            if !predicate.matches(row) {
                continue;
            }
            for &(column, raw) in &columns {
                if let Some(cell) = row.cells.get_mut(column) {
                    cell.set_value(&self.fields[column], raw);
                }
            }
            row.refresh_invalid();
            updated.push(row.id());
        }

        tracing::debug!(target: targets::VIEW, updated = updated.len(), "rows updated");
        let count = updated.len();
        self.finish_mutation(Modification {
            kind: ModificationKind::Update,
            rows: updated,
            replaced: Vec::new(),
        });
        count
    }

    /// Removes every row matching `predicate`. Returns the number removed.
    pub fn delete_rows(&mut self, predicate: &Predicate) -> usize {
        let _perf = PerfSpan::with_rows("delete", self.rows.len());
        let mut deleted = Vec::new();
        self.rows.retain(|row| {
            let matched = predicate.matches(row);
            if matched {
                deleted.push(row.id());
            }
            !matched
        });
        self.forget_anchor(&deleted);

        tracing::debug!(target: targets::VIEW, deleted = deleted.len(), "rows deleted");
        let count = deleted.len();
        self.finish_mutation(Modification {
            kind: ModificationKind::Delete,
            rows: deleted,
            replaced: Vec::new(),
        });
        count
    }

    fn insert_index(&self, position: InsertPosition) -> usize {
        let len = self.rows.len();
        let relative = |id: RowId, offset: usize| match self.positions.get(&id) {
            Some(&pos) => pos + offset,
            None => {
                tracing::debug!(target: targets::VIEW, row = %id, "insert position refers to an unknown row; appending");
                len
            }
        };
        match position {
            InsertPosition::Before(id) => relative(id, 0),
            InsertPosition::After(id) => relative(id, 1),
            InsertPosition::Index(index) => index.min(len),
            InsertPosition::End => len,
        }
    }

    fn forget_anchor(&mut self, removed: &[RowId]) {
        if self.anchor.is_some_and(|anchor| removed.contains(&anchor.row)) {
            self.anchor = None;
        }
    }

    fn finish_mutation(&mut self, modification: Modification) {
        self.reindex();
        self.derive_filtered();
        self.clamp_page();
        self.signals.view_modified.emit(modification);
        self.request_render();
    }
}
