//! `-combine <file>`: merge a second calendar with the one on stdin.

use xcal_core::document::{CalProperty, Document, RenderedIcs, render_selected};

/// The file's calendar properties come first, followed by stdin's except its
/// PRODID and VERSION. The file's components precede stdin's.
pub fn combine(file: &Document, stdin: &Document) -> RenderedIcs {
    let properties: Vec<CalProperty> = file
        .properties
        .iter()
        .chain(
            stdin
                .properties
                .iter()
                .filter(|p| p.name != "PRODID" && p.name != "VERSION"),
        )
        .cloned()
        .collect();

    render_selected(
        &properties,
        file.components.iter().chain(&stdin.components),
    )
}
