//! Parsed calendar documents and the reader/writer adapter around them.
//!
//! A [`Document`] is the owned form of one iCalendar file: the VCALENDAR's
//! own properties plus its top-level components. Every document carries a
//! [`DocumentHandle`] that identifies it for its whole lifetime.

mod datetime;
mod generate;
mod parse;

use std::fmt;

use uuid::Uuid;

pub use datetime::{format_detail_time, parse_ics_datetime};
pub use generate::{
    FOLD_LEN, RenderedIcs, WriteStatus, property_line, render_component,
    render_selected, write_document,
};
pub use parse::{ParsedDocument, parse_document, read_document};

/// Opaque identity of a parsed document. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(Uuid);

impl DocumentHandle {
    fn fresh() -> Self {
        DocumentHandle(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalParam {
    pub name: String,
    pub value: Option<String>,
}

/// One content line of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalProperty {
    pub name: String,
    pub params: Vec<CalParam>,
    pub value: String,
}

impl CalProperty {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        CalProperty {
            name: name.into(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(CalParam {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Value of the first parameter called `name`, with surrounding quotes removed.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.value.as_deref())
            .map(|v| v.trim_matches('"'))
    }

    pub fn is_x_prop(&self) -> bool {
        self.name.starts_with("X-")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalComponent {
    pub name: String,
    pub properties: Vec<CalProperty>,
    pub components: Vec<CalComponent>,
}

impl CalComponent {
    pub fn new(name: impl Into<String>) -> Self {
        CalComponent {
            name: name.into(),
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn find_prop(&self, name: &str) -> Option<&CalProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// An owned calendar: VCALENDAR properties and its top-level components.
#[derive(Debug, Clone)]
pub struct Document {
    handle: DocumentHandle,
    pub properties: Vec<CalProperty>,
    pub components: Vec<CalComponent>,
}

impl Document {
    pub fn new(properties: Vec<CalProperty>, components: Vec<CalComponent>) -> Self {
        Document {
            handle: DocumentHandle::fresh(),
            properties,
            components,
        }
    }

    pub fn handle(&self) -> DocumentHandle {
        self.handle
    }

    pub fn find_prop(&self, name: &str) -> Option<&CalProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let a = Document::new(vec![], vec![]);
        let b = Document::new(vec![], vec![]);
        assert_ne!(a.handle(), b.handle());

        let cloned = a.clone();
        assert_eq!(a.handle(), cloned.handle());
    }

    #[test]
    fn test_param_strips_quotes_and_ignores_case() {
        let prop = CalProperty::new("ORGANIZER", "mailto:jo@example.com").with_param("cn", "\"Jo\"");
        assert_eq!(prop.param("CN"), Some("Jo"));
        assert_eq!(prop.param("ROLE"), None);
    }
}
