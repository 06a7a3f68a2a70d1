//! Coarse undo and the mark-done batch.

use crate::error::{XcalError, XcalResult};
use crate::store::{ComponentStore, Visibility};

/// Whether the single-level "restore all hidden" undo is available.
#[derive(Debug, Default)]
pub struct UndoLog {
    available: bool,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self) {
        self.available = true;
    }

    pub fn clear(&mut self) {
        self.available = false;
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Reset every component that is not removed to visible, regardless of
    /// which batch hid it. Returns how many components came back.
    pub fn undo(&mut self, store: &mut ComponentStore) -> XcalResult<usize> {
        if !self.available {
            return Err(XcalError::UndoUnavailable);
        }
        let restored = store.restore_hidden()?;
        self.available = false;
        tracing::debug!(restored, "undo applied");
        Ok(restored)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkDoneItem {
    pub component_index: usize,
    /// The number the tree shows for this component.
    pub number: usize,
    pub label: String,
    pub checked: bool,
}

/// A pending "mark done" batch over the visible to-do items.
#[derive(Debug, Clone)]
pub struct MarkDone {
    items: Vec<MarkDoneItem>,
}

impl MarkDone {
    /// List visible to-dos, labelled `"<n>: <summary>"` where `n` is the
    /// 1-based component number not counting removed components before it.
    pub fn begin(store: &ComponentStore) -> XcalResult<Self> {
        let items = store
            .visible_todos()?
            .into_iter()
            .map(|(index, removed_before)| {
                let summary = &store.record(index)?.summary;
                let number = index + 1 - removed_before;
                Ok(MarkDoneItem {
                    component_index: index,
                    number,
                    label: format!("{number}: {summary}"),
                    checked: false,
                })
            })
            .collect::<XcalResult<Vec<_>>>()?;

        Ok(MarkDone { items })
    }

    pub fn items(&self) -> &[MarkDoneItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Flip the check box at `position` in the list. Returns the new state,
    /// or `None` when the position does not exist.
    pub fn toggle(&mut self, position: usize) -> Option<bool> {
        let item = self.items.get_mut(position)?;
        item.checked = !item.checked;
        Some(item.checked)
    }

    /// List position of the item the tree numbers `number`.
    pub fn position_of(&self, number: usize) -> Option<usize> {
        self.items.iter().position(|i| i.number == number)
    }

    pub fn can_commit(&self) -> bool {
        self.items.iter().any(|i| i.checked)
    }

    /// Target state for every listed item: checked ones hidden, the rest visible.
    pub fn targets(&self) -> Vec<(usize, Visibility)> {
        self.items
            .iter()
            .map(|i| {
                let target = if i.checked {
                    Visibility::Hidden
                } else {
                    Visibility::Visible
                };
                (i.component_index, target)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::describe;
    use crate::document::{CalComponent, CalProperty, Document, ParsedDocument};

    fn store(items: &[(&str, &str)]) -> ComponentStore {
        let components: Vec<CalComponent> = items
            .iter()
            .map(|(kind, summary)| {
                let mut c = CalComponent::new(*kind);
                c.properties.push(CalProperty::new("SUMMARY", *summary));
                c
            })
            .collect();
        let (records, details) = components.iter().map(describe).unzip();
        ComponentStore::new(ParsedDocument {
            document: Document::new(vec![], components),
            records,
            details,
        })
        .unwrap()
    }

    #[test]
    fn test_undo_requires_record() {
        let mut s = store(&[("VEVENT", "a")]);
        let mut log = UndoLog::new();
        assert!(matches!(log.undo(&mut s), Err(XcalError::UndoUnavailable)));
    }

    #[test]
    fn test_undo_is_coarse() {
        let mut s = store(&[("VEVENT", "a"), ("VTODO", "b"), ("VTODO", "c")]);
        let mut log = UndoLog::new();

        // Hidden by hand, not by the batch being undone.
        s.hide(0).unwrap();
        s.set_batch(&[(2, Visibility::Hidden)]).unwrap();
        log.record();

        assert_eq!(log.undo(&mut s).unwrap(), 2);
        assert_eq!(s.visibility().unwrap(), &[Visibility::Visible; 3]);
        assert!(!log.is_available());
    }

    #[test]
    fn test_undo_after_commit_leaves_removed() {
        let mut s = store(&[("VEVENT", "a"), ("VTODO", "b")]);
        let mut log = UndoLog::new();
        s.hide(1).unwrap();
        log.record();
        s.commit_removals().unwrap();

        assert_eq!(log.undo(&mut s).unwrap(), 0);
        assert_eq!(s.state(1).unwrap(), Visibility::Removed);
    }

    #[test]
    fn test_mark_done_labels_skip_removed() {
        let mut s = store(&[
            ("VTODO", "first"),
            ("VEVENT", "gone"),
            ("VTODO", "second"),
            ("VTODO", "hidden"),
        ]);
        s.hide(1).unwrap();
        s.commit_removals().unwrap();
        s.hide(3).unwrap();

        let session = MarkDone::begin(&s).unwrap();
        let labels: Vec<&str> = session.items().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["1: first", "2: second"]);
    }

    #[test]
    fn test_mark_done_targets() {
        let s = store(&[("VTODO", "a"), ("VTODO", "b")]);
        let mut session = MarkDone::begin(&s).unwrap();
        assert!(!session.can_commit());

        assert_eq!(session.toggle(1), Some(true));
        assert_eq!(session.toggle(5), None);
        assert!(session.can_commit());
        assert_eq!(
            session.targets(),
            vec![(0, Visibility::Visible), (1, Visibility::Hidden)]
        );
    }
}
