//! Single-valued selection over tree rows.

use crate::error::{XcalError, XcalResult};
use crate::tree::{RowId, TreeProjection};

#[derive(Debug, Default)]
pub struct SelectionIndex {
    selected: Option<RowId>,
}

impl SelectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`, or deselect it if it is already the selection.
    /// Returns the selection afterwards.
    pub fn toggle(&mut self, id: RowId) -> Option<RowId> {
        self.selected = match self.selected {
            Some(current) if current == id => None,
            _ => Some(id),
        };
        self.selected
    }

    pub fn select(&mut self, id: RowId) {
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<RowId> {
        self.selected
    }

    /// Component index for `id`, by a linear scan of the tree's id table.
    pub fn resolve(tree: &TreeProjection, id: RowId) -> Option<usize> {
        tree.ids().iter().position(|entry| *entry == Some(id))
    }

    /// Component index of the current selection.
    pub fn resolve_selected(&self, tree: &TreeProjection) -> XcalResult<usize> {
        self.selected
            .and_then(|id| Self::resolve(tree, id))
            .ok_or(XcalError::SelectionNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::describe;
    use crate::document::{CalComponent, Document, ParsedDocument};
    use crate::store::ComponentStore;

    fn built_tree(n: usize, removed: &[usize]) -> TreeProjection {
        let components: Vec<CalComponent> = (0..n).map(|_| CalComponent::new("VEVENT")).collect();
        let (records, details) = components.iter().map(describe).unzip();
        let mut store = ComponentStore::new(ParsedDocument {
            document: Document::new(vec![], components),
            records,
            details,
        })
        .unwrap();
        for &i in removed {
            store.hide(i).unwrap();
        }
        store.commit_removals().unwrap();

        let mut tree = TreeProjection::new();
        tree.build(&store).unwrap();
        tree
    }

    #[test]
    fn test_resolve_skips_removed_slots() {
        let tree = built_tree(4, &[0, 2]);
        let id = tree.rows()[1].id;
        assert_eq!(SelectionIndex::resolve(&tree, id), Some(3));
    }

    #[test]
    fn test_stale_handle_after_rebuild() {
        let mut tree = built_tree(2, &[]);
        let mut selection = SelectionIndex::new();
        selection.select(tree.rows()[0].id);
        assert_eq!(selection.resolve_selected(&tree).unwrap(), 0);

        tree.clear();
        assert!(matches!(
            selection.resolve_selected(&tree),
            Err(XcalError::SelectionNotFound)
        ));
    }

    #[test]
    fn test_toggle_is_single_valued() {
        let tree = built_tree(2, &[]);
        let (a, b) = (tree.rows()[0].id, tree.rows()[1].id);
        let mut selection = SelectionIndex::new();

        assert_eq!(selection.toggle(a), Some(a));
        assert_eq!(selection.toggle(b), Some(b));
        assert_eq!(selection.toggle(b), None);
        assert!(matches!(
            selection.resolve_selected(&tree),
            Err(XcalError::SelectionNotFound)
        ));
    }
}
