//! The controlling context for one open calendar file.
//!
//! A [`Session`] owns the current path, the unsaved-changes flag and the
//! store/tree/selection/undo state for the active document. `open` and
//! `close` are its reset points.

use std::path::{Path, PathBuf};

use crate::config::XcalConfig;
use crate::document::{read_document, render_component, write_document};
use crate::error::{XcalError, XcalResult};
use crate::persistence::{JsonRepository, Repository, store_all, store_item};
use crate::pipeline::{
    ExtractKind, FilterKind, ToolInput, ToolMode, ToolOutcome, ToolPipeline, resolve_tool,
};
use crate::selection::SelectionIndex;
use crate::store::{ComponentStore, Visibility};
use crate::tree::{RowId, TreeProjection};
use crate::undo::{MarkDone, UndoLog};

pub struct Session {
    pipeline: ToolPipeline,
    repository: Option<Box<dyn Repository + Send>>,
    path: Option<PathBuf>,
    unsaved: bool,
    store: Option<ComponentStore>,
    tree: TreeProjection,
    selection: SelectionIndex,
    undo: UndoLog,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Session {
    pub fn new(pipeline: ToolPipeline) -> Self {
        Session {
            pipeline,
            repository: None,
            path: None,
            unsaved: false,
            store: None,
            tree: TreeProjection::new(),
            selection: SelectionIndex::new(),
            undo: UndoLog::new(),
        }
    }

    pub fn with_repository(mut self, repository: Box<dyn Repository + Send>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Build a session from configuration: resolve the tool and open the
    /// database when storing is enabled.
    pub fn from_config(config: &XcalConfig) -> XcalResult<Self> {
        let mut pipeline = ToolPipeline::new(resolve_tool(&config.tool)?);
        if let Some(scratch) = config.scratch_path() {
            pipeline = pipeline.with_scratch_root(scratch);
        }

        let mut session = Session::new(pipeline);
        if config.store_enabled {
            let repo = JsonRepository::open(config.database_path())?;
            session = session.with_repository(Box::new(repo));
        }
        Ok(session)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_name(&self) -> String {
        self.path.as_deref().map(display_name).unwrap_or_default()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&ComponentStore> {
        self.store.as_ref()
    }

    pub fn tree(&self) -> &TreeProjection {
        &self.tree
    }

    pub fn selected(&self) -> Option<RowId> {
        self.selection.selected()
    }

    pub fn undo_available(&self) -> bool {
        self.undo.is_available()
    }

    pub fn has_repository(&self) -> bool {
        self.repository.is_some()
    }

    fn active(&self) -> XcalResult<&ComponentStore> {
        self.store.as_ref().ok_or(XcalError::NoDocument)
    }

    fn repository(&mut self) -> XcalResult<&mut (dyn Repository + Send + 'static)> {
        self.repository
            .as_deref_mut()
            .ok_or_else(|| XcalError::Persistence("storing is disabled".into()))
    }

    /// Make `store` the active store, releasing a different previous one, and
    /// rebuild the tree from it.
    fn install(&mut self, store: ComponentStore) -> XcalResult<()> {
        if let Some(mut previous) = self.store.take() {
            if previous != store {
                previous.release();
            }
        }
        self.tree.build(&store)?;
        self.store = Some(store);
        self.selection.clear();
        Ok(())
    }

    /// Read `path` and make it the active document. Returns the tool's
    /// summary of the file; a failing summary is reported, not fatal.
    pub async fn open(&mut self, path: &Path) -> XcalResult<String> {
        let parsed = read_document(path)?;
        let store = ComponentStore::new(parsed)?;
        self.install(store)?;

        self.undo.clear();
        self.path = Some(path.to_path_buf());
        self.unsaved = false;

        tracing::info!(path = %path.display(), "opened calendar");

        let store = self.active()?;
        let info = match self.pipeline.run(&ToolMode::Info, ToolInput::Store(store)).await {
            Ok(ToolOutcome::Success(text)) | Ok(ToolOutcome::Failure(text)) => text,
            Err(e) => e.to_string(),
        };
        Ok(info)
    }

    pub fn close(&mut self) {
        if let Some(mut store) = self.store.take() {
            store.release();
        }
        self.tree.clear();
        self.selection.clear();
        self.undo.clear();
        self.path = None;
        self.unsaved = false;
    }

    pub fn save(&mut self) -> XcalResult<String> {
        let path = self.path.clone().ok_or(XcalError::NoDocument)?;
        self.write_to(&path)
    }

    pub fn save_as(&mut self, path: &Path) -> XcalResult<String> {
        let message = self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        Ok(message)
    }

    fn write_to(&mut self, path: &Path) -> XcalResult<String> {
        let store = self.store.as_mut().ok_or(XcalError::NoDocument)?;

        let report = write_document(path, store.document()?, &store.include_mask()?)
            .into_result()?;

        store.commit_removals()?;
        self.tree.build(store)?;
        self.selection.clear();
        self.undo.clear();
        self.unsaved = false;

        Ok(format!(
            "\"{}\" Saved Successfully:\n{}",
            display_name(path),
            report
        ))
    }

    /// Merge `other` into the visible components of the active document.
    pub async fn combine(&mut self, other: &Path) -> XcalResult<String> {
        let current = self.file_name();
        let other_name = display_name(other);
        let store = self.active()?;

        let mode = ToolMode::Combine(other.to_path_buf());
        let parsed = match self.pipeline.run_and_read(&mode, ToolInput::Store(store)).await {
            Ok(parsed) => parsed,
            Err(XcalError::Tool(diagnostic)) => {
                return Err(XcalError::Tool(format!(
                    "Error in \"{other_name}\":\n{diagnostic}\nCombine \"{current}\" and \"{other_name}\" failed."
                )));
            }
            Err(e) => return Err(e),
        };

        self.install(ComponentStore::new(parsed)?)?;
        self.undo.clear();
        self.unsaved = true;

        Ok(format!(
            "Combine \"{current}\" and \"{other_name}\" successful!"
        ))
    }

    /// Keep only the visible components of `kind` within the date bounds.
    pub async fn filter(
        &mut self,
        kind: FilterKind,
        from: Option<String>,
        to: Option<String>,
    ) -> XcalResult<String> {
        let current = self.file_name();
        let store = self.active()?;

        let mode = ToolMode::Filter { kind, from, to };
        let parsed = match self.pipeline.run_and_read(&mode, ToolInput::Store(store)).await {
            Ok(parsed) => parsed,
            Err(XcalError::Tool(diagnostic)) => {
                let noun = match kind {
                    FilterKind::Events => "events",
                    FilterKind::Todos => "to-dos",
                };
                return Err(XcalError::Tool(format!(
                    "No {noun} found\nError filtering {noun}:\n{diagnostic}"
                )));
            }
            Err(e) => return Err(e),
        };

        self.install(ComponentStore::new(parsed)?)?;
        self.undo.clear();
        self.unsaved = true;

        Ok(format!("Filter \"{current}\" successful!"))
    }

    pub async fn info(&self) -> XcalResult<String> {
        let store = self.active()?;
        self.pipeline
            .run(&ToolMode::Info, ToolInput::Store(store))
            .await?
            .into_result()
    }

    pub async fn extract(&self, kind: ExtractKind) -> XcalResult<String> {
        let store = self.active()?;
        let output = self
            .pipeline
            .run(&ToolMode::Extract(kind), ToolInput::Store(store))
            .await?
            .into_result()?;

        let (title, empty) = match kind {
            ExtractKind::Events => ("Extract Events", "No Events found.\n"),
            ExtractKind::XProps => ("Extract X-Props", "No X-Properties found.\n"),
        };
        let body = if output.is_empty() { empty } else { output.as_str() };

        Ok(format!("{} - {}:\n\n{}", title, self.file_name(), body))
    }

    /// Toggle selection of `id`. Returns the selection afterwards.
    pub fn select(&mut self, id: RowId) -> Option<RowId> {
        self.selection.toggle(id)
    }

    /// Component index of the selected row.
    pub fn selected_index(&self) -> XcalResult<usize> {
        self.selection.resolve_selected(&self.tree)
    }

    pub fn show_selected(&self) -> XcalResult<String> {
        let index = self.selected_index()?;
        let document = self.active()?.document()?;
        let component = document
            .components
            .get(index)
            .ok_or(XcalError::ComponentIndex(index))?;

        Ok(format!(
            "Show-Component {}:\n\n{}",
            index + 1,
            render_component(component)
        ))
    }

    pub fn hide(&mut self, index: usize) -> XcalResult<bool> {
        let store = self.store.as_mut().ok_or(XcalError::NoDocument)?;
        let changed = store.hide(index)?;
        if changed {
            self.tree.refresh(store)?;
            self.undo.record();
            self.unsaved = true;
        }
        Ok(changed)
    }

    pub fn show(&mut self, index: usize) -> XcalResult<bool> {
        let store = self.store.as_mut().ok_or(XcalError::NoDocument)?;
        let changed = store.show(index)?;
        if changed {
            self.tree.refresh(store)?;
            self.unsaved = true;
        }
        Ok(changed)
    }

    pub fn begin_mark_done(&self) -> XcalResult<MarkDone> {
        MarkDone::begin(self.active()?)
    }

    /// Apply a mark-done batch. At least one item must be checked.
    pub fn commit_mark_done(&mut self, batch: &MarkDone) -> XcalResult<usize> {
        if !batch.can_commit() {
            return Err(XcalError::SelectionNotFound);
        }

        let store = self.store.as_mut().ok_or(XcalError::NoDocument)?;
        let changed = store.set_batch(&batch.targets())?;
        self.tree.refresh(store)?;
        self.undo.record();
        self.unsaved = true;

        tracing::info!(
            done = batch.targets().iter().filter(|(_, v)| *v == Visibility::Hidden).count(),
            changed,
            "to-do items marked done"
        );
        Ok(changed)
    }

    pub fn undo(&mut self) -> XcalResult<String> {
        let store = self.store.as_mut().ok_or(XcalError::NoDocument)?;
        self.undo.undo(store)?;
        self.tree.refresh(store)?;
        Ok("Undo successful".to_string())
    }

    pub fn store_all(&mut self) -> XcalResult<String> {
        let store = self.store.as_ref().ok_or(XcalError::NoDocument)?;
        let repo = self
            .repository
            .as_deref_mut()
            .ok_or_else(|| XcalError::Persistence("storing is disabled".into()))?;

        let summary = store_all(repo, store)?;
        let counts = repo.counts()?;

        let mut message = format!("Store all completed: {summary}\n");
        for line in &summary.messages {
            message.push_str(line);
            message.push('\n');
        }
        message.push_str(&counts.to_string());
        Ok(message)
    }

    pub fn store_selected(&mut self) -> XcalResult<String> {
        let index = self.selected_index()?;
        let store = self.store.as_ref().ok_or(XcalError::NoDocument)?;
        let record = store.record(index)?;
        let detail = store.detail(index)?;
        let repo = self
            .repository
            .as_deref_mut()
            .ok_or_else(|| XcalError::Persistence("storing is disabled".into()))?;

        let outcome = store_item(repo, record, detail)?;
        let counts = repo.counts()?;
        Ok(format!("{}\n{}", outcome.message(), counts))
    }

    pub fn db_status(&mut self) -> XcalResult<String> {
        Ok(self.repository()?.counts()?.to_string())
    }

    pub fn db_clear(&mut self) -> XcalResult<String> {
        let repo = self.repository()?;
        repo.clear()?;
        Ok(format!("Database clear successful:\n{}", repo.counts()?))
    }
}
