//! `-extract e|x`: list events or X- property names.

use chrono::NaiveDateTime;
use xcal_core::document::{CalComponent, CalProperty, Document, parse_ics_datetime};

use crate::info::sorted_unique;

struct ExtractedEvent<'a> {
    start: NaiveDateTime,
    summary: Option<&'a str>,
}

fn collect_events<'a>(components: &'a [CalComponent], out: &mut Vec<ExtractedEvent<'a>>) {
    for component in components {
        if component.name == "VEVENT" {
            let start = component
                .find_prop("DTSTART")
                .and_then(|p| parse_ics_datetime(&p.value));
            if let Some(start) = start {
                out.push(ExtractedEvent {
                    start,
                    summary: component.find_prop("SUMMARY").map(|p| p.value.as_str()),
                });
            }
        }
        collect_events(&component.components, out);
    }
}

/// One line per event with a start time, earliest first:
/// `2016-Apr-04  9:30 AM: Meeting`.
pub fn events(document: &Document) -> String {
    let mut found = Vec::new();
    collect_events(&document.components, &mut found);
    found.sort_by_key(|e| e.start);

    found
        .iter()
        .map(|e| {
            format!(
                "{}: {}\n",
                e.start.format("%Y-%b-%d %l:%M %p"),
                e.summary.unwrap_or("(na)")
            )
        })
        .collect()
}

fn collect_xprops(props: &[CalProperty], components: &[CalComponent], out: &mut Vec<String>) {
    out.extend(props.iter().filter(|p| p.is_x_prop()).map(|p| p.name.clone()));
    for component in components {
        collect_xprops(&component.properties, &component.components, out);
    }
}

/// Every distinct X- property name, one per line.
pub fn xprops(document: &Document) -> String {
    let mut names = Vec::new();
    collect_xprops(&document.properties, &document.components, &mut names);

    sorted_unique(names)
        .into_iter()
        .map(|n| format!("{n}\n"))
        .collect()
}
