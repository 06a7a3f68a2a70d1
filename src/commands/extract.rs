use std::path::Path;

use anyhow::Result;
use xcal_core::Session;
use xcal_core::pipeline::ExtractKind;

use crate::utils::tui::create_spinner;

pub async fn run(mut session: Session, file: &Path, kind: ExtractKind) -> Result<()> {
    let spinner = create_spinner(format!("Extracting from {}", file.display()));
    let result = async {
        session.open(file).await?;
        session.extract(kind).await
    }
    .await;
    spinner.finish_and_clear();

    print!("{}", result?);
    Ok(())
}
