//! File-backed repository: the three tables as one JSON document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{XcalError, XcalResult};
use crate::persistence::{
    EVENT_CONFLICT, EventRow, NewEvent, NewTodo, Organizer, Repository, TODO_CONFLICT,
    TableCounts, TodoRow,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    organizers: Vec<Organizer>,
    #[serde(default)]
    events: Vec<EventRow>,
    #[serde(default)]
    todos: Vec<TodoRow>,
}

#[derive(Debug)]
pub struct JsonRepository {
    path: PathBuf,
    tables: Tables,
}

impl JsonRepository {
    /// Open the database at `path`; a missing file is an empty database.
    pub fn open(path: impl Into<PathBuf>) -> XcalResult<Self> {
        let path = path.into();

        let tables = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| XcalError::Persistence(format!("{}: {}", path.display(), e)))?;
            serde_json::from_str(&content)
                .map_err(|e| XcalError::Serialization(format!("{}: {}", path.display(), e)))?
        } else {
            Tables::default()
        };

        Ok(JsonRepository { path, tables })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> XcalResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.tables)
            .map_err(|e| XcalError::Serialization(e.to_string()))?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}

impl Repository for JsonRepository {
    fn find_or_insert_organizer(
        &mut self,
        name: &str,
        contact: Option<&str>,
    ) -> XcalResult<Option<u64>> {
        if let Some(existing) = self.tables.organizers.iter().find(|o| o.name == name) {
            return Ok(Some(existing.id));
        }

        let Some(contact) = contact else {
            return Ok(None);
        };

        let id = next_id(self.tables.organizers.iter().map(|o| o.id));
        self.tables.organizers.push(Organizer {
            id,
            name: name.to_string(),
            contact: contact.to_string(),
        });
        self.save()?;
        Ok(Some(id))
    }

    fn insert_event(&mut self, event: NewEvent<'_>) -> XcalResult<u64> {
        let exists = self
            .tables
            .events
            .iter()
            .any(|e| e.summary == event.summary && e.start == event.start);
        if exists {
            return Err(XcalError::PersistenceConflict(EVENT_CONFLICT.into()));
        }

        let id = next_id(self.tables.events.iter().map(|e| e.id));
        self.tables.events.push(EventRow {
            id,
            summary: event.summary.to_string(),
            start: event.start.to_string(),
            location: event.location.map(str::to_string),
            organizer_id: event.organizer_id,
        });
        self.save()?;
        Ok(id)
    }

    fn insert_todo(&mut self, todo: NewTodo<'_>) -> XcalResult<u64> {
        if self.tables.todos.iter().any(|t| t.summary == todo.summary) {
            return Err(XcalError::PersistenceConflict(TODO_CONFLICT.into()));
        }

        let id = next_id(self.tables.todos.iter().map(|t| t.id));
        self.tables.todos.push(TodoRow {
            id,
            summary: todo.summary.to_string(),
            priority: todo.priority.map(str::to_string),
            organizer_id: todo.organizer_id,
        });
        self.save()?;
        Ok(id)
    }

    fn counts(&self) -> XcalResult<TableCounts> {
        Ok(TableCounts {
            organizers: self.tables.organizers.len(),
            events: self.tables.events.len(),
            todos: self.tables.todos.len(),
        })
    }

    fn clear(&mut self) -> XcalResult<()> {
        self.tables = Tables::default();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/db.json");

        let mut repo = JsonRepository::open(&path).unwrap();
        let org = repo
            .find_or_insert_organizer("Jo", Some("mailto:jo@example.com"))
            .unwrap();
        repo.insert_event(NewEvent {
            summary: "Meeting",
            start: "2016-04-04 09:30:00",
            location: Some("Room 1"),
            organizer_id: org,
        })
        .unwrap();

        let reopened = JsonRepository::open(&path).unwrap();
        assert_eq!(
            reopened.counts().unwrap(),
            TableCounts {
                organizers: 1,
                events: 1,
                todos: 0
            }
        );
        assert_eq!(reopened.tables.events[0].organizer_id, Some(1));
        assert!(!dir.path().join("nested/db.json.tmp").exists());
    }

    #[test]
    fn test_event_key_is_summary_and_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = JsonRepository::open(dir.path().join("db.json")).unwrap();
        let event = |start| NewEvent {
            summary: "Standup",
            start,
            location: None,
            organizer_id: None,
        };

        assert_eq!(repo.insert_event(event("2016-04-04 09:00:00")).unwrap(), 1);
        assert_eq!(repo.insert_event(event("2016-04-05 09:00:00")).unwrap(), 2);
        assert!(matches!(
            repo.insert_event(event("2016-04-04 09:00:00")),
            Err(XcalError::PersistenceConflict(_))
        ));
    }

    #[test]
    fn test_clear_empties_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut repo = JsonRepository::open(&path).unwrap();
        repo.find_or_insert_organizer("Jo", Some("x")).unwrap();
        repo.insert_todo(NewTodo {
            summary: "Buy milk",
            priority: Some("2"),
            organizer_id: Some(1),
        })
        .unwrap();

        repo.clear().unwrap();
        assert_eq!(repo.counts().unwrap(), TableCounts::default());
        assert_eq!(
            JsonRepository::open(&path).unwrap().counts().unwrap(),
            TableCounts::default()
        );
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonRepository::open(&path),
            Err(XcalError::Serialization(_))
        ));
    }
}
