//! Terminal rendering for xcal-core types.
//!
//! Extension traits that add colored output using owo_colors.

use owo_colors::OwoColorize;
use xcal_core::tree::{RowId, TreeRow};
use xcal_core::{ComponentKind, ComponentStore, Visibility};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ComponentKind {
    fn render(&self) -> String {
        let name = format!("{:<9}", self.to_string());
        match self {
            ComponentKind::Event => name.cyan().to_string(),
            ComponentKind::Todo => name.yellow().to_string(),
            ComponentKind::Calendar => name.magenta().to_string(),
            ComponentKind::Other(_) => name.dimmed().to_string(),
        }
    }
}

impl Render for Visibility {
    fn render(&self) -> String {
        match self {
            Visibility::Visible => self.to_string().green().to_string(),
            Visibility::Hidden => self.to_string().yellow().to_string(),
            Visibility::Removed => self.to_string().red().to_string(),
        }
    }
}

impl Render for TreeRow {
    fn render(&self) -> String {
        let summary = if self.record.summary.is_empty() {
            "(no summary)".dimmed().to_string()
        } else {
            self.record.summary.clone()
        };
        format!(
            "{:>4}  {} {:>3} props {:>3} subs  {}",
            self.number(),
            self.record.kind.render(),
            self.record.property_count,
            self.record.subcomponent_count,
            summary
        )
    }
}

/// One line per attached row, the selected one marked.
pub fn render_tree<'a>(
    rows: impl Iterator<Item = &'a TreeRow>,
    selected: Option<RowId>,
) -> Vec<String> {
    rows.map(|row| {
        let line = row.render();
        if Some(row.id) == selected {
            format!("{} {}", ">".bold(), line.bold())
        } else {
            format!("  {line}")
        }
    })
    .collect()
}

pub fn render_counts(store: &ComponentStore) -> String {
    let hidden = store.count(Visibility::Hidden);
    let removed = store.count(Visibility::Removed);
    let mut parts = vec![format!(
        "{} {}",
        store.count(Visibility::Visible),
        Visibility::Visible.render()
    )];
    if hidden > 0 {
        parts.push(format!("{hidden} {}", Visibility::Hidden.render()));
    }
    if removed > 0 {
        parts.push(format!("{removed} {}", Visibility::Removed.render()));
    }
    parts.join(", ").dimmed().to_string()
}

/// Status text from a failed operation. Informational errors are not
/// failures and are shown without the error color.
pub fn render_error(error: &xcal_core::XcalError) -> String {
    if error.is_informational() {
        error.to_string()
    } else {
        error.to_string().red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xcal_core::document::read_document;
    use xcal_core::tree::TreeProjection;

    fn store() -> ComponentStore {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cal.ics");
        std::fs::write(
            &path,
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:x\r\n\
BEGIN:VEVENT\r\nSUMMARY:Standup\r\nEND:VEVENT\r\n\
BEGIN:VTODO\r\nSUMMARY:Buy milk\r\nPRIORITY:1\r\nEND:VTODO\r\n\
END:VCALENDAR\r\n",
        )
        .unwrap();
        ComponentStore::new(read_document(&path).unwrap()).unwrap()
    }

    #[test]
    fn test_tree_marks_selected_row() {
        let store = store();
        let mut tree = TreeProjection::new();
        tree.build(&store).unwrap();
        let selected = tree.row_for_number(2).map(|row| row.id);

        let lines = render_tree(tree.displayed(), selected);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  "));
        assert!(lines[0].contains("VEVENT"));
        assert!(lines[0].contains("Standup"));
        assert!(!lines[1].starts_with("  "));
        assert!(lines[1].contains("VTODO"));
        assert!(lines[1].contains("Buy milk"));
    }

    #[test]
    fn test_counts_mention_hidden_only_when_present() {
        let mut store = store();
        assert!(!render_counts(&store).contains("hidden"));

        store.hide(0).unwrap();
        let counts = render_counts(&store);
        assert!(counts.contains("1 "));
        assert!(counts.contains("hidden"));
        assert!(!counts.contains("removed"));
    }
}
