//! Ordered row projection of a component store.
//!
//! Every component that is not removed owns a row. Hidden components keep
//! their row but it is detached from the display sequence; showing the
//! component attaches the row again at the component's raw index.

use std::fmt;

use crate::component::ComponentRecord;
use crate::error::XcalResult;
use crate::store::{ComponentStore, Visibility};

/// Opaque row identity. Ids are never reused, so a handle taken before a
/// rebuild no longer matches anything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct TreeRow {
    pub id: RowId,
    pub component_index: usize,
    /// Position among the components that are not removed.
    pub rank: usize,
    pub record: ComponentRecord,
}

impl TreeRow {
    /// 1-based number shown to the user. Removed components are not counted,
    /// so this matches the numbering of the mark-done list.
    pub fn number(&self) -> usize {
        self.rank + 1
    }
}

#[derive(Debug, Default)]
pub struct TreeProjection {
    rows: Vec<TreeRow>,
    /// Indexed by component index; `None` for removed components.
    ids: Vec<Option<RowId>>,
    /// Attached rows in display order.
    display: Vec<RowId>,
    next_id: u64,
}

impl TreeProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all rows and the id table.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.ids.clear();
        self.display.clear();
    }

    /// Rebuild rows from scratch, then detach the hidden ones.
    pub fn build(&mut self, store: &ComponentStore) -> XcalResult<()> {
        self.clear();

        let records = store.records()?;
        let visibility = store.visibility()?;

        for (index, (record, state)) in records.iter().zip(visibility).enumerate() {
            if *state == Visibility::Removed {
                self.ids.push(None);
                continue;
            }

            let id = RowId(self.next_id);
            self.next_id += 1;

            self.rows.push(TreeRow {
                id,
                component_index: index,
                rank: self.rows.len(),
                record: record.clone(),
            });
            self.ids.push(Some(id));
            self.display.push(id);
        }

        tracing::debug!(
            rows = self.rows.len(),
            components = records.len(),
            "tree built"
        );

        self.refresh(store)
    }

    /// Bring attachment in line with the store's visibility.
    ///
    /// Hidden rows are detached. Visible rows are detached and reinserted at
    /// their raw component index (or at the end when fewer rows are attached),
    /// in ascending component order.
    pub fn refresh(&mut self, store: &ComponentStore) -> XcalResult<()> {
        let visibility = store.visibility()?;

        for (index, state) in visibility.iter().enumerate() {
            let Some(id) = self.ids.get(index).copied().flatten() else {
                continue;
            };

            match state {
                Visibility::Hidden => self.detach(id),
                Visibility::Visible => {
                    self.detach(id);
                    let at = index.min(self.display.len());
                    self.display.insert(at, id);
                }
                Visibility::Removed => {}
            }
        }

        Ok(())
    }

    fn detach(&mut self, id: RowId) {
        self.display.retain(|d| *d != id);
    }

    /// Every row, attached or not, in component order.
    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&TreeRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Attached rows in display order.
    pub fn displayed(&self) -> impl Iterator<Item = &TreeRow> + '_ {
        self.display.iter().filter_map(|id| self.row(*id))
    }

    pub fn displayed_len(&self) -> usize {
        self.display.len()
    }

    pub fn is_attached(&self, id: RowId) -> bool {
        self.display.contains(&id)
    }

    pub fn ids(&self) -> &[Option<RowId>] {
        &self.ids
    }

    /// Row carrying the user-facing `number` (1-based), attached or not.
    pub fn row_for_number(&self, number: usize) -> Option<&TreeRow> {
        self.rows.get(number.checked_sub(1)?)
    }
}
