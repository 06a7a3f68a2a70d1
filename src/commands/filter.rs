use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use xcal_core::Session;
use xcal_core::pipeline::FilterKind;

use super::emit;
use crate::utils::tui::create_spinner;

pub async fn run(
    mut session: Session,
    file: &Path,
    kind: FilterKind,
    from: Option<String>,
    to: Option<String>,
    output: Option<&Path>,
) -> Result<()> {
    let spinner = create_spinner(format!("Filtering {}", file.display()));
    let result = async {
        session.open(file).await?;
        session.filter(kind, from, to).await
    }
    .await;
    spinner.finish_and_clear();

    eprintln!("{}", result?.green());
    emit(&mut session, output)
}
