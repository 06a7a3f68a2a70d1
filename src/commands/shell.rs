//! Line-oriented interactive session on one calendar file at a time.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use dialoguer::{Confirm, MultiSelect};
use owo_colors::OwoColorize;
use xcal_core::pipeline::{ExtractKind, FilterKind};
use xcal_core::undo::MarkDone;
use xcal_core::{Session, XcalError, XcalResult};

use crate::render::{render_counts, render_error, render_tree};
use crate::utils::tui::create_spinner;

const HELP: &str = "\
Commands:
  open <file>                  open a calendar file
  close                        close the current file
  save                         save the visible components
  saveas <file>                save under a new name
  combine <file>               merge another calendar into this one
  filter events|todos [from <date>] [to <date>]
                               keep events or to-dos in a date range
  info                         summarize the visible components
  extract events|xprops        list events or X- properties
  tree                         list the visible components
  select <n>                   select (or deselect) component n
  showsel                      show the selected component's properties
  hide <n> / show <n>          hide or show component n
  todo                         pick to-do items to mark done
  done <n>...                  mark the to-do items numbered n done
  undo                         show every hidden component again
  storeall / storesel          store visible / selected components
  dbstatus / dbclear           database row counts / clear the database
  help                         this text
  quit                         leave (asks to save unsaved changes)";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Open(PathBuf),
    Close,
    Save,
    SaveAs(PathBuf),
    Combine(PathBuf),
    Filter {
        kind: FilterKind,
        from: Option<String>,
        to: Option<String>,
    },
    Info,
    Extract(ExtractKind),
    Tree,
    Select(usize),
    ShowSelected,
    Hide(usize),
    Show(usize),
    Todo,
    Done(Vec<usize>),
    Undo,
    StoreAll,
    StoreSelected,
    DbStatus,
    DbClear,
    Help,
    Quit,
}

fn number(word: Option<&str>, what: &str) -> Result<usize, String> {
    word.and_then(|w| w.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| format!("{what} needs a number starting at 1"))
}

fn path(rest: &str, what: &str) -> Result<PathBuf, String> {
    if rest.is_empty() {
        Err(format!("{what} needs a file name"))
    } else {
        Ok(PathBuf::from(rest))
    }
}

/// `[from <date words>] [to <date words>]`; dates may contain spaces.
fn parse_range(words: &[&str]) -> Result<(Option<String>, Option<String>), String> {
    let to_at = words.iter().position(|w| *w == "to");
    let (head, tail) = match to_at {
        Some(i) => (&words[..i], Some(&words[i + 1..])),
        None => (words, None),
    };

    let from = match head.split_first() {
        None => None,
        Some((&"from", rest)) if !rest.is_empty() => Some(rest.join(" ")),
        Some(_) => return Err("usage: filter events|todos [from <date>] [to <date>]".into()),
    };
    let to = match tail {
        Some([]) => return Err("'to' needs a date".into()),
        Some(rest) => Some(rest.join(" ")),
        None => None,
    };
    Ok((from, to))
}

impl ShellCommand {
    fn parse(line: &str) -> Result<Option<ShellCommand>, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let words: Vec<&str> = rest.split_whitespace().collect();

        let command = match verb {
            "" => return Ok(None),
            "open" => ShellCommand::Open(path(rest, "open")?),
            "close" => ShellCommand::Close,
            "save" => ShellCommand::Save,
            "saveas" => ShellCommand::SaveAs(path(rest, "saveas")?),
            "combine" => ShellCommand::Combine(path(rest, "combine")?),
            "filter" => {
                let kind = match words.first() {
                    Some(&"events") => FilterKind::Events,
                    Some(&"todos") => FilterKind::Todos,
                    _ => return Err("filter needs 'events' or 'todos'".into()),
                };
                let (from, to) = parse_range(&words[1..])?;
                ShellCommand::Filter { kind, from, to }
            }
            "info" => ShellCommand::Info,
            "extract" => match words.first() {
                Some(&"events") => ShellCommand::Extract(ExtractKind::Events),
                Some(&"xprops") => ShellCommand::Extract(ExtractKind::XProps),
                _ => return Err("extract needs 'events' or 'xprops'".into()),
            },
            "tree" => ShellCommand::Tree,
            "select" => ShellCommand::Select(number(words.first().copied(), "select")?),
            "showsel" => ShellCommand::ShowSelected,
            "hide" => ShellCommand::Hide(number(words.first().copied(), "hide")?),
            "show" => ShellCommand::Show(number(words.first().copied(), "show")?),
            "todo" => ShellCommand::Todo,
            "done" => {
                if words.is_empty() {
                    return Err("done needs the numbers of the to-do items".into());
                }
                let items = words
                    .iter()
                    .map(|w| number(Some(*w), "done"))
                    .collect::<Result<Vec<_>, _>>()?;
                ShellCommand::Done(items)
            }
            "undo" => ShellCommand::Undo,
            "storeall" => ShellCommand::StoreAll,
            "storesel" => ShellCommand::StoreSelected,
            "dbstatus" => ShellCommand::DbStatus,
            "dbclear" => ShellCommand::DbClear,
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

enum Flow {
    Continue,
    Quit,
}

pub async fn run(mut session: Session, file: Option<PathBuf>) -> Result<()> {
    if let Some(path) = file {
        report(open(&mut session, &path).await);
    }

    let mut line = String::new();

    loop {
        prompt(&session)?;
        line.clear();
        if io::stdin().read_line(&mut line)? == 0 {
            // EOF leaves without the save question.
            println!();
            break;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{}", usage.yellow());
                continue;
            }
        };

        match execute(&mut session, command).await? {
            Flow::Continue => {}
            Flow::Quit => break,
        }
    }

    session.close();
    Ok(())
}

fn prompt(session: &Session) -> io::Result<()> {
    let name = session.file_name();
    let marker = if session.has_unsaved_changes() { "*" } else { "" };
    print!("{}{} ", format!("xcal {name}{marker}").trim_end().bold(), ">".bold());
    io::stdout().flush()
}

fn report(result: XcalResult<String>) {
    match result {
        Ok(message) => println!("{}", message.trim_end()),
        Err(e) => println!("{}", render_error(&e)),
    }
}

async fn open(session: &mut Session, path: &Path) -> XcalResult<String> {
    let spinner = create_spinner(format!("Reading {}", path.display()));
    let result = session.open(path).await;
    spinner.finish_and_clear();
    result
}

/// Offer to save before the current document goes away. Returns false when
/// the user backs out.
fn settle_unsaved(session: &mut Session) -> Result<bool> {
    if !session.has_unsaved_changes() {
        return Ok(true);
    }

    let save = Confirm::new()
        .with_prompt(format!("Save changes to \"{}\"?", session.file_name()))
        .default(true)
        .interact()?;

    if save {
        match session.save() {
            Ok(message) => println!("{}", message.trim_end()),
            Err(e) => {
                println!("{}", render_error(&e));
                return Ok(false);
            }
        }
    }
    Ok(true)
}

async fn execute(session: &mut Session, command: ShellCommand) -> Result<Flow> {
    match command {
        ShellCommand::Open(path) => {
            if settle_unsaved(session)? {
                report(open(session, &path).await);
            }
        }
        ShellCommand::Close => {
            if settle_unsaved(session)? {
                session.close();
            }
        }
        ShellCommand::Save => report(session.save()),
        ShellCommand::SaveAs(path) => report(session.save_as(&path)),
        ShellCommand::Combine(path) => {
            let spinner = create_spinner(format!("Combining {}", path.display()));
            let result = session.combine(&path).await;
            spinner.finish_and_clear();
            report(result);
        }
        ShellCommand::Filter { kind, from, to } => {
            let spinner = create_spinner("Filtering".to_string());
            let result = session.filter(kind, from, to).await;
            spinner.finish_and_clear();
            report(result);
        }
        ShellCommand::Info => report(session.info().await),
        ShellCommand::Extract(kind) => report(session.extract(kind).await),
        ShellCommand::Tree => print_tree(session),
        ShellCommand::Select(n) => report(select(session, n)),
        ShellCommand::ShowSelected => report(session.show_selected()),
        ShellCommand::Hide(n) => report(hide(session, n).map(|changed| {
            if changed {
                format!("Component {n} hidden")
            } else {
                format!("Component {n} is not visible")
            }
        })),
        ShellCommand::Show(n) => report(show(session, n).map(|changed| {
            if changed {
                format!("Component {n} shown")
            } else {
                format!("Component {n} is not hidden")
            }
        })),
        ShellCommand::Todo => match session.begin_mark_done() {
            Ok(batch) => report(pick_done(session, batch)),
            Err(e) => report(Err(e)),
        },
        ShellCommand::Done(items) => report(mark_done(session, &items)),
        ShellCommand::Undo => report(session.undo()),
        ShellCommand::StoreAll => report(session.store_all()),
        ShellCommand::StoreSelected => report(session.store_selected()),
        ShellCommand::DbStatus => report(session.db_status()),
        ShellCommand::DbClear => {
            let confirmed = Confirm::new()
                .with_prompt("Remove every stored organizer, event and to-do?")
                .default(false)
                .interact()?;
            if confirmed {
                report(session.db_clear());
            }
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {
            if settle_unsaved(session)? {
                return Ok(Flow::Quit);
            }
        }
    }
    Ok(Flow::Continue)
}

fn print_tree(session: &Session) {
    let Some(store) = session.store() else {
        println!("{}", render_error(&XcalError::NoDocument));
        return;
    };

    let tree = session.tree();
    for line in render_tree(tree.displayed(), session.selected()) {
        println!("{line}");
    }
    println!("{}", render_counts(store));
}

/// Component index of the row the tree numbers `n`.
fn component_for(session: &Session, n: usize) -> XcalResult<usize> {
    session
        .tree()
        .row_for_number(n)
        .map(|row| row.component_index)
        .ok_or(XcalError::ComponentIndex(n))
}

fn hide(session: &mut Session, n: usize) -> XcalResult<bool> {
    let index = component_for(session, n)?;
    session.hide(index)
}

fn show(session: &mut Session, n: usize) -> XcalResult<bool> {
    let index = component_for(session, n)?;
    session.show(index)
}

/// Toggle the selection of the attached row numbered `n`.
fn select(session: &mut Session, n: usize) -> XcalResult<String> {
    let id = session
        .tree()
        .row_for_number(n)
        .map(|row| row.id)
        .filter(|id| session.tree().is_attached(*id))
        .ok_or(XcalError::ComponentIndex(n))?;

    Ok(match session.select(id) {
        Some(_) => format!("Component {n} selected"),
        None => "Selection cleared".to_string(),
    })
}

fn commit(session: &mut Session, batch: &MarkDone) -> XcalResult<String> {
    let changed = session.commit_mark_done(batch)?;
    Ok(format!("{changed} to-do item(s) updated"))
}

/// Check the to-do items with the given tree numbers and commit.
fn mark_done(session: &mut Session, numbers: &[usize]) -> XcalResult<String> {
    let mut batch = session.begin_mark_done()?;
    for &n in numbers {
        let position = batch.position_of(n).ok_or(XcalError::ComponentIndex(n))?;
        batch.toggle(position);
    }
    commit(session, &batch)
}

/// Let the user tick to-do items in a checklist, then commit.
fn pick_done(session: &mut Session, mut batch: MarkDone) -> XcalResult<String> {
    if batch.is_empty() {
        return Ok("No to-do items".to_string());
    }

    let labels: Vec<&str> = batch.items().iter().map(|i| i.label.as_str()).collect();
    let picked = MultiSelect::new()
        .with_prompt("Mark done (space to toggle, enter to confirm)")
        .items(&labels)
        .interact()
        .map_err(|e| XcalError::Io(io::Error::other(e.to_string())))?;

    for position in picked {
        batch.toggle(position);
    }
    commit(session, &batch)
}
