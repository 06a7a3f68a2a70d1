use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use xcal_core::Session;

use super::emit;
use crate::utils::tui::create_spinner;

pub async fn run(
    mut session: Session,
    file: &Path,
    other: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let spinner = create_spinner(format!("Combining {}", other.display()));
    let result = async {
        session.open(file).await?;
        session.combine(other).await
    }
    .await;
    spinner.finish_and_clear();

    eprintln!("{}", result?.green());
    emit(&mut session, output)
}
