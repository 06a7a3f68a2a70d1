//! `-filter e|t`: keep events or to-dos dated within a range.

use anyhow::{Result, bail};
use xcal_core::document::{
    CalComponent, Document, RenderedIcs, parse_ics_datetime, render_selected,
};

use crate::args::FilterKind;
use crate::dates::DateRange;

const RANGE_PROPS: &[&str] = &["DTSTART", "DTEND", "DUE", "COMPLETED"];

fn kind_name(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Events => "VEVENT",
        FilterKind::Todos => "VTODO",
    }
}

/// A component matches when one of its own or nested date properties falls
/// in the range. Components without any such property never match.
fn in_range(component: &CalComponent, range: &DateRange) -> bool {
    let own = component
        .properties
        .iter()
        .filter(|p| RANGE_PROPS.contains(&p.name.as_str()))
        .filter_map(|p| parse_ics_datetime(&p.value))
        .any(|at| range.contains(at));

    own || component.components.iter().any(|c| in_range(c, range))
}

pub fn filter(document: &Document, kind: FilterKind, range: &DateRange) -> Result<RenderedIcs> {
    let wanted = kind_name(kind);
    let kept: Vec<&CalComponent> = document
        .components
        .iter()
        .filter(|c| c.name == wanted && in_range(c, range))
        .collect();

    if kept.is_empty() {
        bail!("No 'VCALENDAR' component or no V components found.");
    }

    Ok(render_selected(&document.properties, kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DatePatterns;
    use xcal_core::document::parse_document;

    const ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//t//EN\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:April\r\n\
DTSTART:20160404T093000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:May\r\n\
DTSTART:20160502T093000\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Undated\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
SUMMARY:Due April\r\n\
DUE:20160410T170000\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

    fn summaries(text: &str) -> Vec<String> {
        parse_document(text)
            .unwrap()
            .components
            .iter()
            .filter_map(|c| c.find_prop("SUMMARY").map(|p| p.value.clone()))
            .collect()
    }

    fn range(from: Option<&str>, to: Option<&str>) -> DateRange {
        DateRange::parse(&DatePatterns::builtin(), from, to).unwrap()
    }

    #[test]
    fn test_unbounded_keeps_dated_components_of_kind() {
        let doc = parse_document(ICS).unwrap();
        let out = filter(&doc, FilterKind::Events, &range(None, None)).unwrap();
        assert_eq!(summaries(&out.text), vec!["April", "May"]);
    }

    #[test]
    fn test_bounds_are_inclusive_days() {
        let doc = parse_document(ICS).unwrap();
        let out = filter(
            &doc,
            FilterKind::Events,
            &range(Some("2016-04-04"), Some("2016-04-30")),
        )
        .unwrap();
        assert_eq!(summaries(&out.text), vec!["April"]);

        let out = filter(&doc, FilterKind::Todos, &range(None, Some("2016-04-10"))).unwrap();
        assert_eq!(summaries(&out.text), vec!["Due April"]);
    }

    #[test]
    fn test_empty_result_is_an_error() {
        let doc = parse_document(ICS).unwrap();
        let err = filter(&doc, FilterKind::Todos, &range(Some("2017-01-01"), None)).unwrap_err();
        assert!(err.to_string().contains("no V components"));
    }
}
