//! External transformation tool protocol.
//!
//! Each invocation gets its own scratch directory holding three files: the
//! calendar text bound to the tool's stdin, and captures of its stdout and
//! stderr. The directory is removed when the invocation ends, whatever the
//! outcome.
//!
//! An invocation succeeds iff the stderr capture is empty. The exit status is
//! logged and otherwise ignored.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tempfile::TempDir;
use tokio::process::Command as TokioCommand;
use tokio::sync::Mutex;

use crate::document::{ParsedDocument, read_document, write_document};
use crate::error::{XcalError, XcalResult};
use crate::store::ComponentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractKind {
    Events,
    XProps,
}

impl ExtractKind {
    fn flag(self) -> &'static str {
        match self {
            ExtractKind::Events => "e",
            ExtractKind::XProps => "x",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Events,
    Todos,
}

impl FilterKind {
    fn flag(self) -> &'static str {
        match self {
            FilterKind::Events => "e",
            FilterKind::Todos => "t",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolMode {
    Info,
    Extract(ExtractKind),
    Combine(PathBuf),
    Filter {
        kind: FilterKind,
        from: Option<String>,
        to: Option<String>,
    },
}

impl ToolMode {
    /// Command line arguments for this mode. Blank date bounds are dropped.
    pub fn args(&self) -> Vec<OsString> {
        match self {
            ToolMode::Info => vec!["-info".into()],
            ToolMode::Extract(kind) => vec!["-extract".into(), kind.flag().into()],
            ToolMode::Combine(path) => vec!["-combine".into(), path.clone().into_os_string()],
            ToolMode::Filter { kind, from, to } => {
                let mut args: Vec<OsString> = vec!["-filter".into(), kind.flag().into()];
                for (keyword, value) in [("from", from), ("to", to)] {
                    if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                        args.push(keyword.into());
                        args.push(value.into());
                    }
                }
                args
            }
        }
    }
}

/// Where the calendar text for an invocation comes from.
#[derive(Debug, Clone, Copy)]
pub enum ToolInput<'a> {
    /// The visible components of a store, serialized through the writer.
    Store(&'a ComponentStore),
    File(&'a Path),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Stdout capture; stderr was empty.
    Success(String),
    /// Stderr capture, verbatim.
    Failure(String),
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    pub fn into_result(self) -> XcalResult<String> {
        match self {
            ToolOutcome::Success(out) => Ok(out),
            ToolOutcome::Failure(err) => Err(XcalError::Tool(err)),
        }
    }
}

/// Per-invocation scratch files. Dropping this removes them.
struct Scratch {
    _dir: TempDir,
    input: PathBuf,
    output: PathBuf,
    errors: PathBuf,
}

impl Scratch {
    fn acquire(root: Option<&Path>) -> XcalResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("xcal-");

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        Ok(Scratch {
            input: dir.path().join("input"),
            output: dir.path().join("output"),
            errors: dir.path().join("errors"),
            _dir: dir,
        })
    }
}

/// Resolve the configured tool: paths are used as given (after `~`
/// expansion), bare names are looked up on `PATH`.
pub fn resolve_tool(tool: &str) -> XcalResult<PathBuf> {
    if tool.contains(std::path::MAIN_SEPARATOR) || tool.starts_with('~') {
        let path = PathBuf::from(shellexpand::tilde(tool).into_owned());
        if path.is_file() {
            return Ok(path);
        }
        return Err(XcalError::ToolNotInstalled(format!(
            "'{}' does not exist",
            path.display()
        )));
    }

    which::which(tool)
        .map_err(|_| XcalError::ToolNotInstalled(format!("'{tool}' not found on PATH")))
}

/// Runs the external tool, one invocation at a time.
#[derive(Debug)]
pub struct ToolPipeline {
    program: PathBuf,
    scratch_root: Option<PathBuf>,
    lock: Mutex<()>,
}

impl ToolPipeline {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ToolPipeline {
            program: program.into(),
            scratch_root: None,
            lock: Mutex::new(()),
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool and classify the result.
    pub async fn run(&self, mode: &ToolMode, input: ToolInput<'_>) -> XcalResult<ToolOutcome> {
        let _guard = self.lock.lock().await;
        let (_scratch, outcome) = self.invoke(mode, input).await?;
        Ok(outcome)
    }

    /// Run the tool and read its stdout capture back as a calendar.
    ///
    /// A failed run becomes [`XcalError::Tool`] carrying the diagnostic.
    pub async fn run_and_read(
        &self,
        mode: &ToolMode,
        input: ToolInput<'_>,
    ) -> XcalResult<ParsedDocument> {
        let _guard = self.lock.lock().await;
        let (scratch, outcome) = self.invoke(mode, input).await?;

        if let ToolOutcome::Failure(diagnostic) = outcome {
            return Err(XcalError::Tool(diagnostic));
        }

        read_document(&scratch.output)
    }

    async fn invoke(
        &self,
        mode: &ToolMode,
        input: ToolInput<'_>,
    ) -> XcalResult<(Scratch, ToolOutcome)> {
        let scratch = Scratch::acquire(self.scratch_root.as_deref())?;

        match input {
            ToolInput::Store(store) => {
                write_document(&scratch.input, store.document()?, &store.include_mask()?)
                    .into_result()?;
            }
            ToolInput::File(path) => {
                tokio::fs::copy(path, &scratch.input)
                    .await
                    .map_err(|e| XcalError::Tool(format!("{}: {}", path.display(), e)))?;
            }
        }

        let stdin = std::fs::File::open(&scratch.input)?;
        let stdout = std::fs::File::create(&scratch.output)?;
        let stderr = std::fs::File::create(&scratch.errors)?;

        let args = mode.args();
        tracing::debug!(program = %self.program.display(), ?args, "spawning tool");

        let mut child = TokioCommand::new(&self.program)
            .args(&args)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| {
                XcalError::Tool(format!("Failed to spawn {}: {}", self.program.display(), e))
            })?;

        let status = child.wait().await?;

        let errors = tokio::fs::read(&scratch.errors).await?;
        let outcome = if errors.is_empty() {
            let output = tokio::fs::read(&scratch.output).await?;
            ToolOutcome::Success(String::from_utf8_lossy(&output).into_owned())
        } else {
            ToolOutcome::Failure(String::from_utf8_lossy(&errors).into_owned())
        };

        tracing::debug!(
            status = ?status.code(),
            success = outcome.is_success(),
            "tool finished"
        );

        Ok((scratch, outcome))
    }
}
