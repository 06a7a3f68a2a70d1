//! The component store: parsed records plus per-component visibility.

use std::fmt;

use crate::component::{ComponentDetail, ComponentKind, ComponentRecord};
use crate::document::{Document, DocumentHandle, ParsedDocument};
use crate::error::{XcalError, XcalResult};

/// Per-component visibility.
///
/// `Hidden` is reversible; `Removed` is committed by a save and lasts until
/// the store is rebuilt from a fresh read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
    Removed,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
            Visibility::Removed => "removed",
        };
        write!(f, "{}", s)
    }
}

/// Owns one parsed document and everything known about its components.
///
/// `records`, `details` and `visibility` always have the same length and
/// follow the reader's order.
#[derive(Debug)]
pub struct ComponentStore {
    document: Option<Document>,
    handle: DocumentHandle,
    records: Vec<ComponentRecord>,
    details: Vec<ComponentDetail>,
    visibility: Vec<Visibility>,
}

impl ComponentStore {
    pub fn new(parsed: ParsedDocument) -> XcalResult<Self> {
        let ParsedDocument {
            document,
            records,
            details,
        } = parsed;

        if records.len() != details.len() {
            return Err(XcalError::StoreMismatch {
                records: records.len(),
                details: details.len(),
            });
        }

        let visibility = vec![Visibility::Visible; records.len()];

        Ok(ComponentStore {
            handle: document.handle(),
            document: Some(document),
            records,
            details,
            visibility,
        })
    }

    pub fn handle(&self) -> DocumentHandle {
        self.handle
    }

    pub fn is_released(&self) -> bool {
        self.document.is_none()
    }

    fn live(&self) -> XcalResult<&Document> {
        self.document.as_ref().ok_or(XcalError::StoreReleased)
    }

    fn check_index(&self, index: usize) -> XcalResult<()> {
        self.live()?;
        if index >= self.visibility.len() {
            return Err(XcalError::ComponentIndex(index));
        }
        Ok(())
    }

    pub fn document(&self) -> XcalResult<&Document> {
        self.live()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> XcalResult<&[ComponentRecord]> {
        self.live()?;
        Ok(&self.records)
    }

    pub fn record(&self, index: usize) -> XcalResult<&ComponentRecord> {
        self.check_index(index)?;
        Ok(&self.records[index])
    }

    pub fn detail(&self, index: usize) -> XcalResult<&ComponentDetail> {
        self.check_index(index)?;
        Ok(&self.details[index])
    }

    pub fn visibility(&self) -> XcalResult<&[Visibility]> {
        self.live()?;
        Ok(&self.visibility)
    }

    pub fn state(&self, index: usize) -> XcalResult<Visibility> {
        self.check_index(index)?;
        Ok(self.visibility[index])
    }

    /// Hide a visible component. Returns whether anything changed.
    pub fn hide(&mut self, index: usize) -> XcalResult<bool> {
        self.transition(index, Visibility::Visible, Visibility::Hidden)
    }

    /// Show a hidden component. Removed components stay removed.
    pub fn show(&mut self, index: usize) -> XcalResult<bool> {
        self.transition(index, Visibility::Hidden, Visibility::Visible)
    }

    fn transition(&mut self, index: usize, from: Visibility, to: Visibility) -> XcalResult<bool> {
        self.check_index(index)?;
        if self.visibility[index] != from {
            return Ok(false);
        }
        self.visibility[index] = to;
        tracing::debug!(index, %from, %to, "visibility changed");
        Ok(true)
    }

    /// Apply a full target vector for a subset of components in one step.
    ///
    /// Every index is validated before any state changes. Removed components
    /// and targets of `Removed` are ignored.
    pub fn set_batch(&mut self, targets: &[(usize, Visibility)]) -> XcalResult<usize> {
        for &(index, _) in targets {
            self.check_index(index)?;
        }

        let mut changed = 0;
        for &(index, target) in targets {
            let current = self.visibility[index];
            if current == Visibility::Removed || target == Visibility::Removed || current == target
            {
                continue;
            }
            self.visibility[index] = target;
            changed += 1;
        }

        tracing::debug!(requested = targets.len(), changed, "batch visibility applied");
        Ok(changed)
    }

    /// Every hidden component becomes removed. Called once per successful save.
    pub fn commit_removals(&mut self) -> XcalResult<usize> {
        self.live()?;
        let mut committed = 0;
        for state in self.visibility.iter_mut() {
            if *state == Visibility::Hidden {
                *state = Visibility::Removed;
                committed += 1;
            }
        }
        tracing::debug!(committed, "hidden components removed");
        Ok(committed)
    }

    /// Coarse undo: every component not yet removed becomes visible again.
    pub fn restore_hidden(&mut self) -> XcalResult<usize> {
        self.live()?;
        let mut restored = 0;
        for state in self.visibility.iter_mut() {
            if *state == Visibility::Hidden {
                *state = Visibility::Visible;
                restored += 1;
            }
        }
        Ok(restored)
    }

    /// Writer selection: `true` for every visible component.
    pub fn include_mask(&self) -> XcalResult<Vec<bool>> {
        self.live()?;
        Ok(self.visibility.iter().map(|v| v.is_visible()).collect())
    }

    pub fn visible_indices(&self) -> XcalResult<Vec<usize>> {
        self.live()?;
        Ok(self
            .visibility
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_visible())
            .map(|(i, _)| i)
            .collect())
    }

    pub fn count(&self, state: Visibility) -> usize {
        self.visibility.iter().filter(|v| **v == state).count()
    }

    /// Visible to-do items, with the number of removed components before each.
    pub fn visible_todos(&self) -> XcalResult<Vec<(usize, usize)>> {
        self.live()?;
        let mut removed_before = 0;
        let mut todos = Vec::new();
        for (i, (record, state)) in self.records.iter().zip(&self.visibility).enumerate() {
            match state {
                Visibility::Removed => removed_before += 1,
                Visibility::Visible if record.kind == ComponentKind::Todo => {
                    todos.push((i, removed_before))
                }
                _ => {}
            }
        }
        Ok(todos)
    }

    /// Release the document. Only the first call has any effect.
    pub fn release(&mut self) -> bool {
        match self.document.take() {
            Some(doc) => {
                tracing::debug!(handle = %doc.handle(), "document released");
                true
            }
            None => false,
        }
    }
}

/// Stores are the same store iff they hold the same document.
impl PartialEq for ComponentStore {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for ComponentStore {}
