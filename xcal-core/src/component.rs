//! Per-component summaries produced by the reader.

use std::fmt;

use crate::document::{CalComponent, format_detail_time};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    Calendar,
    Event,
    Todo,
    Other(String),
}

impl ComponentKind {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "VCALENDAR" => ComponentKind::Calendar,
            "VEVENT" => ComponentKind::Event,
            "VTODO" => ComponentKind::Todo,
            other => ComponentKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Calendar => write!(f, "VCALENDAR"),
            ComponentKind::Event => write!(f, "VEVENT"),
            ComponentKind::Todo => write!(f, "VTODO"),
            ComponentKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Immutable summary of one top-level component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    pub kind: ComponentKind,
    pub property_count: usize,
    pub subcomponent_count: usize,
    /// First SUMMARY value, empty when absent.
    pub summary: String,
}

/// Fields the persistence layer needs, aligned with [`ComponentRecord`] by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDetail {
    pub start: Option<String>,
    pub priority: Option<String>,
    pub location: Option<String>,
    pub organizer_name: Option<String>,
    pub organizer_contact: Option<String>,
}

/// Summarize a component into its record and detail.
pub fn describe(component: &CalComponent) -> (ComponentRecord, ComponentDetail) {
    let kind = ComponentKind::from_name(&component.name);
    let summary = component
        .find_prop("SUMMARY")
        .map(|p| p.value.clone())
        .unwrap_or_default();

    let record = ComponentRecord {
        kind: kind.clone(),
        property_count: component.properties.len(),
        subcomponent_count: component.components.len(),
        summary,
    };

    let mut detail = ComponentDetail::default();
    let value_of = |name: &str| component.find_prop(name).map(|p| p.value.clone());

    match kind {
        ComponentKind::Event => {
            detail.start = component
                .find_prop("DTSTART")
                .map(|p| format_detail_time(&p.value));
            detail.location = value_of("LOCATION");
        }
        ComponentKind::Todo => {
            detail.priority = value_of("PRIORITY");
        }
        _ => return (record, detail),
    }

    if let Some(organizer) = component.find_prop("ORGANIZER") {
        detail.organizer_name = organizer.param("CN").map(str::to_string);
        detail.organizer_contact = Some(organizer.value.clone()).filter(|v| !v.is_empty());
    }

    (record, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CalProperty;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(ComponentKind::from_name("VEVENT"), ComponentKind::Event);
        assert_eq!(ComponentKind::from_name("vtodo"), ComponentKind::Todo);
        assert_eq!(ComponentKind::from_name("VCALENDAR"), ComponentKind::Calendar);
        assert_eq!(
            ComponentKind::from_name("VJOURNAL"),
            ComponentKind::Other("VJOURNAL".into())
        );
        assert_eq!(ComponentKind::Other("VJOURNAL".into()).to_string(), "VJOURNAL");
    }

    #[test]
    fn test_describe_event_without_summary() {
        let mut event = CalComponent::new("VEVENT");
        event.properties.push(CalProperty::new("DTSTART", "20160404"));
        event.properties.push(CalProperty::new("PRIORITY", "1"));

        let (record, detail) = describe(&event);
        assert_eq!(record.summary, "");
        assert_eq!(record.property_count, 2);
        assert_eq!(detail.start.as_deref(), Some("2016-04-04 00:00:00"));
        // Priority is only tracked for to-dos.
        assert_eq!(detail.priority, None);
        assert_eq!(detail.organizer_contact, None);
    }

    #[test]
    fn test_describe_other_kind_has_empty_detail() {
        let mut journal = CalComponent::new("VJOURNAL");
        journal.properties.push(CalProperty::new("SUMMARY", "Notes"));
        journal
            .properties
            .push(CalProperty::new("ORGANIZER", "mailto:a@b.c").with_param("CN", "A"));

        let (record, detail) = describe(&journal);
        assert_eq!(record.summary, "Notes");
        assert_eq!(detail, ComponentDetail::default());
    }
}
