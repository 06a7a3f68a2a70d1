use std::path::Path;

use anyhow::Result;
use xcal_core::Session;

use crate::utils::tui::create_spinner;

pub async fn run(mut session: Session, file: &Path) -> Result<()> {
    let spinner = create_spinner(format!("Reading {}", file.display()));
    // Opening only reports a failed info run; asking again surfaces it as an error.
    let result = async {
        session.open(file).await?;
        session.info().await
    }
    .await;
    spinner.finish_and_clear();

    print!("{}", result?);
    Ok(())
}
