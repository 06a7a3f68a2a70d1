//! Optional persistence of events, to-dos and their organizers.
//!
//! Storage sits behind [`Repository`], whose methods take typed values.
//! Inserts are insert-if-absent: events are keyed on `(summary, start)`,
//! to-dos on `summary`, organizers on `name`.

mod json;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::{ComponentDetail, ComponentKind, ComponentRecord};
use crate::error::{XcalError, XcalResult};
use crate::store::ComponentStore;

pub use json::JsonRepository;

pub const EVENT_CONFLICT: &str = "Event Already in dataBase:";
pub const TODO_CONFLICT: &str = "To-do already in database:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub id: u64,
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: u64,
    pub summary: String,
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRow {
    pub id: u64,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub summary: &'a str,
    pub start: &'a str,
    pub location: Option<&'a str>,
    pub organizer_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct NewTodo<'a> {
    pub summary: &'a str,
    pub priority: Option<&'a str>,
    pub organizer_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub organizers: usize,
    pub events: usize,
    pub todos: usize,
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Database has {} organizers, {} events, {} to-do items",
            self.organizers, self.events, self.todos
        )
    }
}

pub trait Repository {
    /// Id of the organizer called `name`, inserting it first when absent and
    /// a contact is known. `None` when there is no such organizer.
    fn find_or_insert_organizer(
        &mut self,
        name: &str,
        contact: Option<&str>,
    ) -> XcalResult<Option<u64>>;

    /// Insert an event; [`XcalError::PersistenceConflict`] when the key exists.
    fn insert_event(&mut self, event: NewEvent<'_>) -> XcalResult<u64>;

    /// Insert a to-do; [`XcalError::PersistenceConflict`] when the key exists.
    fn insert_todo(&mut self, todo: NewTodo<'_>) -> XcalResult<u64>;

    fn counts(&self) -> XcalResult<TableCounts>;

    /// Delete every row of every table.
    fn clear(&mut self) -> XcalResult<()>;
}

/// Result of storing a single component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Inserted,
    /// The key already exists. Informational.
    Conflict(String),
    /// The component lacks a required field or is not storable.
    Rejected(&'static str),
}

impl StoreOutcome {
    pub fn message(&self) -> &str {
        match self {
            StoreOutcome::Inserted => "Insert Successful:",
            StoreOutcome::Conflict(msg) => msg.as_str(),
            StoreOutcome::Rejected(msg) => *msg,
        }
    }
}

/// Store one component and its organizer.
///
/// Repository failures other than key conflicts are returned as errors.
pub fn store_item(
    repo: &mut dyn Repository,
    record: &ComponentRecord,
    detail: &ComponentDetail,
) -> XcalResult<StoreOutcome> {
    let organizer_id = match detail.organizer_name.as_deref() {
        Some(name) => repo.find_or_insert_organizer(name, detail.organizer_contact.as_deref())?,
        None => None,
    };

    let inserted = match record.kind {
        ComponentKind::Event => {
            let Some(start) = detail.start.as_deref() else {
                return Ok(StoreOutcome::Rejected("VEVENT insert failed; no start time:"));
            };
            if record.summary.is_empty() {
                return Ok(StoreOutcome::Rejected("VEVENT insert failed; no summary:"));
            }
            repo.insert_event(NewEvent {
                summary: &record.summary,
                start,
                location: detail.location.as_deref(),
                organizer_id,
            })
        }
        ComponentKind::Todo => {
            if record.summary.is_empty() {
                return Ok(StoreOutcome::Rejected("VTODO: Insert failed; no summary:"));
            }
            repo.insert_todo(NewTodo {
                summary: &record.summary,
                priority: detail.priority.as_deref(),
                organizer_id,
            })
        }
        _ => {
            return Ok(StoreOutcome::Rejected(
                "Insert failed; component not a VEVENT or VTODO:",
            ));
        }
    };

    match inserted {
        Ok(_) => Ok(StoreOutcome::Inserted),
        Err(XcalError::PersistenceConflict(msg)) => Ok(StoreOutcome::Conflict(msg)),
        Err(e) => Err(e),
    }
}

/// Aggregate result of a bulk store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub inserted: usize,
    pub conflicts: usize,
    pub failed: usize,
    /// One line per component that was not inserted, prefixed with its number.
    pub messages: Vec<String>,
}

impl fmt::Display for StoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} already present, {} failed",
            self.inserted, self.conflicts, self.failed
        )
    }
}

/// Store every visible component, continuing past individual failures.
pub fn store_all(repo: &mut dyn Repository, store: &ComponentStore) -> XcalResult<StoreSummary> {
    let mut summary = StoreSummary::default();

    for index in store.visible_indices()? {
        let record = store.record(index)?;
        let detail = store.detail(index)?;

        match store_item(repo, record, detail) {
            Ok(StoreOutcome::Inserted) => summary.inserted += 1,
            Ok(outcome @ StoreOutcome::Conflict(_)) => {
                summary.conflicts += 1;
                summary
                    .messages
                    .push(format!("{}: {}", index + 1, outcome.message()));
            }
            Ok(outcome @ StoreOutcome::Rejected(_)) => {
                summary.failed += 1;
                summary
                    .messages
                    .push(format!("{}: {}", index + 1, outcome.message()));
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "store failed");
                summary.failed += 1;
                summary.messages.push(format!("{}: {}", index + 1, e));
            }
        }
    }

    tracing::info!(
        inserted = summary.inserted,
        conflicts = summary.conflicts,
        failed = summary.failed,
        "store all completed"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::describe;
    use crate::document::{CalComponent, CalProperty, Document, ParsedDocument};

    fn component(kind: &str, props: &[(&str, &str)]) -> CalComponent {
        let mut c = CalComponent::new(kind);
        for (name, value) in props {
            c.properties.push(CalProperty::new(*name, *value));
        }
        c
    }

    fn repo() -> (tempfile::TempDir, JsonRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonRepository::open(dir.path().join("db.json")).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_store_item_messages() {
        let (_dir, mut repo) = repo();

        let event = component("VEVENT", &[("SUMMARY", "Meeting"), ("DTSTART", "20160404T093000")]);
        let (record, detail) = describe(&event);
        let first = store_item(&mut repo, &record, &detail).unwrap();
        assert_eq!(first.message(), "Insert Successful:");
        let second = store_item(&mut repo, &record, &detail).unwrap();
        assert_eq!(second, StoreOutcome::Conflict(EVENT_CONFLICT.into()));

        let no_start = component("VEVENT", &[("SUMMARY", "Meeting")]);
        let (record, detail) = describe(&no_start);
        assert_eq!(
            store_item(&mut repo, &record, &detail).unwrap().message(),
            "VEVENT insert failed; no start time:"
        );

        let no_summary = component("VTODO", &[("PRIORITY", "1")]);
        let (record, detail) = describe(&no_summary);
        assert_eq!(
            store_item(&mut repo, &record, &detail).unwrap().message(),
            "VTODO: Insert failed; no summary:"
        );

        let journal = component("VJOURNAL", &[("SUMMARY", "x")]);
        let (record, detail) = describe(&journal);
        assert_eq!(
            store_item(&mut repo, &record, &detail).unwrap().message(),
            "Insert failed; component not a VEVENT or VTODO:"
        );

        assert_eq!(
            repo.counts().unwrap().to_string(),
            "Database has 0 organizers, 1 events, 0 to-do items"
        );
    }

    #[test]
    fn test_organizer_needs_contact() {
        let (_dir, mut repo) = repo();

        let mut todo = component("VTODO", &[("SUMMARY", "Call")]);
        todo.properties
            .push(CalProperty::new("ORGANIZER", "mailto:jo@example.com").with_param("CN", "Jo"));
        let (record, detail) = describe(&todo);
        store_item(&mut repo, &record, &detail).unwrap();

        let counts = repo.counts().unwrap();
        assert_eq!(counts.organizers, 1);
        assert_eq!(counts.todos, 1);

        let mut nameless = component("VTODO", &[("SUMMARY", "Other")]);
        nameless
            .properties
            .push(CalProperty::new("ORGANIZER", "").with_param("CN", "Nobody"));
        let (record, detail) = describe(&nameless);
        store_item(&mut repo, &record, &detail).unwrap();
        assert_eq!(repo.counts().unwrap().organizers, 1);
    }

    #[test]
    fn test_store_all_continues_past_failures() {
        let (_dir, mut repo) = repo();
        let components = vec![
            component("VEVENT", &[("SUMMARY", "A"), ("DTSTART", "20160101")]),
            component("VEVENT", &[("SUMMARY", "no start")]),
            component("VTODO", &[("SUMMARY", "B")]),
            component("VTODO", &[("SUMMARY", "B")]),
            component("VTODO", &[("SUMMARY", "hidden")]),
        ];
        let (records, details) = components.iter().map(describe).unzip();
        let mut store = ComponentStore::new(ParsedDocument {
            document: Document::new(vec![], components),
            records,
            details,
        })
        .unwrap();
        store.hide(4).unwrap();

        let summary = store_all(&mut repo, &store).unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.conflicts, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.messages,
            vec![
                "2: VEVENT insert failed; no start time:".to_string(),
                format!("4: {TODO_CONFLICT}"),
            ]
        );
        assert_eq!(repo.counts().unwrap().todos, 1);
    }
}
