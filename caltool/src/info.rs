//! `-info`: a short summary of a calendar.


use chrono::NaiveDateTime;
use xcal_core::ComponentKind;
use xcal_core::document::{CalComponent, CalProperty, Document, parse_ics_datetime};

const DATE_PROPS: &[&str] = &[
    "DTSTART",
    "DTEND",
    "DUE",
    "COMPLETED",
    "LAST-MODIFIED",
    "CREATED",
    "DTSTAMP",
];

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

#[derive(Debug, Default)]
struct Totals {
    events: usize,
    todos: usize,
    others: usize,
    subcomponents: usize,
    properties: usize,
    earliest: Option<NaiveDateTime>,
    latest: Option<NaiveDateTime>,
    organizers: Vec<String>,
}

impl Totals {
    fn visit_props(&mut self, props: &[CalProperty]) {
        self.properties += props.len();
        for prop in props {
            if DATE_PROPS.contains(&prop.name.as_str()) {
                if let Some(at) = parse_ics_datetime(&prop.value) {
                    self.earliest = Some(self.earliest.map_or(at, |e| e.min(at)));
                    self.latest = Some(self.latest.map_or(at, |l| l.max(at)));
                }
            }
            if prop.name == "ORGANIZER" {
                if let Some(cn) = prop.param("CN") {
                    self.organizers.push(cn.to_string());
                }
            }
        }
    }

    fn visit_nested(&mut self, component: &CalComponent) {
        self.visit_props(&component.properties);
        for sub in &component.components {
            self.subcomponents += 1;
            self.visit_nested(sub);
        }
    }
}

/// Render the summary. `lines` is the number of lines in the input text.
pub fn info(document: &Document, lines: usize) -> String {
    let mut totals = Totals::default();
    totals.visit_props(&document.properties);

    for component in &document.components {
        match ComponentKind::from_name(&component.name) {
            ComponentKind::Event => totals.events += 1,
            ComponentKind::Todo => totals.todos += 1,
            _ => totals.others += 1,
        }
        totals.visit_nested(component);
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", plural(lines, "line", "lines")));
    out.push_str(&format!(
        "{}: {}, {}, {}\n",
        plural(document.components.len(), "component", "components"),
        plural(totals.events, "event", "events"),
        plural(totals.todos, "todo", "todos"),
        plural(totals.others, "other", "others"),
    ));
    out.push_str(&format!(
        "{}\n",
        plural(totals.subcomponents, "subcomponent", "subcomponents")
    ));
    out.push_str(&format!(
        "{}\n",
        plural(totals.properties, "property", "properties")
    ));

    match (totals.earliest, totals.latest) {
        (Some(from), Some(to)) => {
            out.push_str(&format!(
                "From {} to {}\n",
                from.format("%Y-%b-%d"),
                to.format("%Y-%b-%d")
            ));
        }
        _ => out.push_str("No dates\n"),
    }

    let organizers = sorted_unique(totals.organizers);
    if organizers.is_empty() {
        out.push_str("No organizers\n");
    } else {
        out.push_str("Organizers:\n");
        for name in organizers {
            out.push_str(&name);
            out.push('\n');
        }
    }

    out
}

/// Sort ignoring case, then drop exact duplicates.
pub fn sorted_unique(mut names: Vec<String>) -> Vec<String> {
    names.sort_by_key(|n| n.to_uppercase());
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcal_core::document::parse_document;

    const ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//t//EN\r\n\
BEGIN:VEVENT\r\n\
DTSTART:20160404T093000\r\n\
DTEND:20160404T103000\r\n\
SUMMARY:Meeting\r\n\
ORGANIZER;CN=bob:mailto:bob@example.com\r\n\
BEGIN:VALARM\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
BEGIN:VTODO\r\n\
DUE:20160501T120000\r\n\
ORGANIZER;CN=Alice:mailto:alice@example.com\r\n\
END:VTODO\r\n\
BEGIN:VTODO\r\n\
ORGANIZER;CN=bob:mailto:bob@example.com\r\n\
END:VTODO\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_info_summary() {
        let doc = parse_document(ICS).unwrap();
        let text = info(&doc, 21);
        assert_eq!(
            text,
            "21 lines\n\
3 components: 1 event, 2 todos, 0 others\n\
1 subcomponent\n\
10 properties\n\
From 2016-Apr-04 to 2016-May-01\n\
Organizers:\n\
Alice\n\
bob\n"
        );
    }

    #[test]
    fn test_info_without_dates_or_organizers() {
        let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:x\r\n\
BEGIN:VJOURNAL\r\nSUMMARY:Notes\r\nEND:VJOURNAL\r\nEND:VCALENDAR\r\n";
        let doc = parse_document(ics).unwrap();
        let text = info(&doc, 7);
        assert!(text.starts_with("7 lines\n1 component: 0 events, 0 todos, 1 other\n"));
        assert!(text.ends_with("No dates\nNo organizers\n"));
    }

    #[test]
    fn test_sorted_unique_keeps_case_variants() {
        let names = vec!["bob".into(), "Alice".into(), "bob".into(), "Bob".into()];
        assert_eq!(sorted_unique(names), vec!["Alice", "bob", "Bob"]);
    }
}
