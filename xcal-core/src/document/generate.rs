//! ICS text generation and the writer side of the adapter.

use std::path::Path;

use crate::document::{CalComponent, CalProperty, Document};
use crate::error::{XcalError, XcalResult};

/// Fold lines longer than this many octets (RFC 5545 3.1).
pub const FOLD_LEN: usize = 75;

const SUCCESS_SENTINEL: &str = "OK";

/// Calendar text together with the number of physical lines it spans.
#[derive(Debug, Default)]
pub struct RenderedIcs {
    pub text: String,
    pub lines: usize,
}

impl RenderedIcs {
    fn push_line(&mut self, line: &str) {
        let mut octets = 0;
        for ch in line.chars() {
            let len = ch.len_utf8();
            if octets + len > FOLD_LEN {
                self.text.push_str("\r\n ");
                self.lines += 1;
                octets = 1;
            }
            self.text.push(ch);
            octets += len;
        }
        self.text.push_str("\r\n");
        self.lines += 1;
    }

    fn push_component(&mut self, component: &CalComponent) {
        self.push_line(&format!("BEGIN:{}", component.name));
        for prop in &component.properties {
            self.push_line(&property_line(prop));
        }
        for sub in &component.components {
            self.push_component(sub);
        }
        self.push_line(&format!("END:{}", component.name));
    }
}

/// Result text of a write, following the adapter protocol: `"OK"` plus a
/// report on success, an error message otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStatus(String);

impl WriteStatus {
    fn written(lines: usize) -> Self {
        WriteStatus(format!("{SUCCESS_SENTINEL}{lines} lines written"))
    }

    fn failed(message: &str, lines: usize) -> Self {
        WriteStatus(format!("{message}\n{lines} lines written."))
    }

    /// Wrap raw adapter text.
    fn from_raw(text: impl Into<String>) -> Self {
        WriteStatus(text.into())
    }

    /// Only the first two characters decide success.
    pub fn is_ok(&self) -> bool {
        self.0.get(..SUCCESS_SENTINEL.len()) == Some(SUCCESS_SENTINEL)
    }

    /// The report following the sentinel, or the whole error message.
    pub fn report(&self) -> &str {
        if self.is_ok() {
            &self.0[SUCCESS_SENTINEL.len()..]
        } else {
            &self.0
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_result(self) -> XcalResult<String> {
        if self.is_ok() {
            Ok(self.report().to_string())
        } else {
            Err(XcalError::Write(self.0))
        }
    }
}

/// Render one property as an unfolded content line.
pub fn property_line(prop: &CalProperty) -> String {
    let mut line = prop.name.clone();
    for param in &prop.params {
        line.push(';');
        line.push_str(&param.name);
        if let Some(ref value) = param.value {
            line.push('=');
            let needs_quotes = !value.starts_with('"') && value.contains([':', ';', ',']);
            if needs_quotes {
                line.push('"');
                line.push_str(value);
                line.push('"');
            } else {
                line.push_str(value);
            }
        }
    }
    line.push(':');
    line.push_str(&prop.value);
    line
}

/// Render a VCALENDAR holding `properties` and the given components.
pub fn render_selected<'a>(
    properties: &[CalProperty],
    components: impl IntoIterator<Item = &'a CalComponent>,
) -> RenderedIcs {
    let mut out = RenderedIcs::default();
    out.push_line("BEGIN:VCALENDAR");
    for prop in properties {
        out.push_line(&property_line(prop));
    }
    for component in components {
        out.push_component(component);
    }
    out.push_line("END:VCALENDAR");
    out
}

/// A component's own property lines, without nested components.
pub fn render_component(component: &CalComponent) -> String {
    component
        .properties
        .iter()
        .map(|p| format!("{}\n", property_line(p)))
        .collect()
}

/// Write the components whose `include` entry is `true` to `path`.
///
/// Indices past the end of `include` are not written.
pub fn write_document(path: &Path, document: &Document, include: &[bool]) -> WriteStatus {
    let selected: Vec<&CalComponent> = document
        .components
        .iter()
        .enumerate()
        .filter(|(i, _)| include.get(*i).copied().unwrap_or(false))
        .map(|(_, c)| c)
        .collect();

    if selected.is_empty() {
        return WriteStatus::failed("No 'VCALENDAR' component or no V components found.", 0);
    }

    let rendered = render_selected(&document.properties, selected);

    if let Err(e) = std::fs::write(path, &rendered.text) {
        // Failure text must never begin with the sentinel, whatever the path.
        return WriteStatus::from_raw(format!(
            "Error writing to file.\n{}: {}",
            path.display(),
            e
        ));
    }

    tracing::debug!(
        path = %path.display(),
        handle = %document.handle(),
        lines = rendered.lines,
        "wrote calendar"
    );

    WriteStatus::written(rendered.lines)
}
