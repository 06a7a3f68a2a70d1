pub mod combine;
pub mod extract;
pub mod filter;
pub mod info;
pub mod shell;

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use xcal_core::Session;
use xcal_core::document::render_selected;

/// The visible components of the open document as calendar text.
fn visible_calendar(session: &Session) -> Result<String> {
    let store = session.store().context("No calendar file is open")?;
    let document = store.document()?;
    let visible = store.visible_indices()?;

    let components = visible.iter().filter_map(|&i| document.components.get(i));
    Ok(render_selected(&document.properties, components).text)
}

/// Save the transformed document to `output`, or print it when no output
/// file was given.
fn emit(session: &mut Session, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let message = session.save_as(path)?;
            eprintln!("{}", message.green());
        }
        None => print!("{}", visible_calendar(session)?),
    }
    Ok(())
}
