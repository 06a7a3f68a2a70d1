//! Reading .ics files using the icalendar crate's parser.

use std::path::Path;

use icalendar::parser::{Component, Property, read_calendar, unfold};

use crate::component::{ComponentDetail, ComponentRecord, describe};
use crate::document::{CalComponent, CalParam, CalProperty, Document};
use crate::error::{XcalError, XcalResult};

/// Version of the standard accepted by the reader.
const VCAL_VERSION: &str = "2.0";

/// Everything the reader hands back for one file.
#[derive(Debug)]
pub struct ParsedDocument {
    pub document: Document,
    pub records: Vec<ComponentRecord>,
    pub details: Vec<ComponentDetail>,
}

/// Read and validate a calendar file.
///
/// Errors carry the message meant for the user verbatim: an unreadable file
/// reports `"<path>: <reason>"`, malformed content reports the parser's text.
pub fn read_document(path: &Path) -> XcalResult<ParsedDocument> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| XcalError::Parse(format!("{}: {}", path.display(), e)))?;

    let document = parse_document(&content)?;
    let (records, details): (Vec<_>, Vec<_>) = document.components.iter().map(describe).unzip();

    tracing::debug!(
        path = %path.display(),
        handle = %document.handle(),
        components = document.components.len(),
        "read calendar"
    );

    Ok(ParsedDocument {
        document,
        records,
        details,
    })
}

/// Parse calendar text into a [`Document`].
pub fn parse_document(content: &str) -> XcalResult<Document> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| XcalError::Parse(e.to_string()))?;

    let properties: Vec<CalProperty> = calendar.properties.iter().map(to_property).collect();
    let components: Vec<CalComponent> = calendar.components.iter().map(to_component).collect();

    validate(&properties, &components)?;

    Ok(Document::new(properties, components))
}

fn validate(properties: &[CalProperty], components: &[CalComponent]) -> XcalResult<()> {
    let version = properties.iter().find(|p| p.name == "VERSION");
    if version.map(|v| v.value.trim()) != Some(VCAL_VERSION) {
        return Err(XcalError::Parse(format!(
            "Version of ics file is not '{VCAL_VERSION}' or is missing."
        )));
    }

    if !properties.iter().any(|p| p.name == "PRODID") {
        return Err(XcalError::Parse("PRODID is missing.".into()));
    }

    if components.is_empty() {
        return Err(XcalError::Parse(
            "No 'VCALENDAR' component or no V components found.".into(),
        ));
    }

    Ok(())
}

fn to_component(component: &Component) -> CalComponent {
    CalComponent {
        name: component.name.to_string().to_ascii_uppercase(),
        properties: component.properties.iter().map(to_property).collect(),
        components: component.components.iter().map(to_component).collect(),
    }
}

fn to_property(prop: &Property) -> CalProperty {
    CalProperty {
        name: prop.name.to_string().to_ascii_uppercase(),
        params: prop
            .params
            .iter()
            .map(|p| CalParam {
                name: p.key.to_string().to_ascii_uppercase(),
                value: p.val.as_ref().map(|v| v.to_string()),
            })
            .collect(),
        value: prop.val.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;

    const SAMPLE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//xcal//test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:ev-1\r\n\
DTSTART:20160404T093000\r\n\
SUMMARY:Meeting\r\n\
LOCATION:Room 1\r\n\
ORGANIZER;CN=Jo Bloggs:mailto:jo@example.com\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
UID:td-1\r\n\
SUMMARY:Buy milk\r\n\
PRIORITY:2\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_read_document_builds_parallel_records_and_details() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.ics");
        std::fs::write(&path, SAMPLE).unwrap();

        let parsed = read_document(&path).expect("Should read");

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.details.len(), 2);

        let event = &parsed.records[0];
        assert_eq!(event.kind, ComponentKind::Event);
        assert_eq!(event.property_count, 5);
        assert_eq!(event.subcomponent_count, 1);
        assert_eq!(event.summary, "Meeting");

        let detail = &parsed.details[0];
        assert_eq!(detail.start.as_deref(), Some("2016-04-04 09:30:00"));
        assert_eq!(detail.location.as_deref(), Some("Room 1"));
        assert_eq!(detail.organizer_name.as_deref(), Some("Jo Bloggs"));
        assert_eq!(detail.organizer_contact.as_deref(), Some("mailto:jo@example.com"));

        assert_eq!(parsed.records[1].kind, ComponentKind::Todo);
        assert_eq!(parsed.details[1].priority.as_deref(), Some("2"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_document(Path::new("/definitely/not/here.ics")).unwrap_err();
        match err {
            XcalError::Parse(msg) => assert!(msg.starts_with("/definitely/not/here.ics: ")),
            other => panic!("Expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_wrong_version() {
        let ics = SAMPLE.replace("VERSION:2.0", "VERSION:1.0");
        let err = parse_document(&ics).unwrap_err();
        assert!(err.to_string().contains("Version of ics file"));
    }

    #[test]
    fn test_rejects_missing_prodid() {
        let ics = SAMPLE.replace("PRODID:-//xcal//test//EN\r\n", "");
        let err = parse_document(&ics).unwrap_err();
        assert_eq!(err.to_string(), "PRODID is missing.");
    }

    #[test]
    fn test_rejects_calendar_without_components() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:x\r\nEND:VCALENDAR\r\n";
        let err = parse_document(ics).unwrap_err();
        assert!(matches!(err, XcalError::Parse(_)));
    }
}
