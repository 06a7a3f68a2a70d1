//! caltool - calendar transformations for xcal
//!
//! Reads a calendar on stdin and writes the result on stdout:
//!   caltool -info
//!   caltool -extract e|x
//!   caltool -filter e|t [from <date>] [to <date>]
//!   caltool -combine <file>
//!
//! Diagnostics go to stderr. xcal treats any stderr output as failure, so
//! nothing else is ever written there.

mod args;
mod combine;
mod dates;
mod extract;
mod filter;
mod info;

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use xcal_core::document::parse_document;

use crate::args::{Command, ExtractKind};
use crate::dates::{DatePatterns, DateRange};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&args) {
        Ok(output) => {
            let mut stdout = io::stdout();
            if let Err(e) = stdout
                .write_all(output.as_bytes())
                .and_then(|_| stdout.flush())
            {
                eprintln!("Error writing to file.\n{e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String> {
    let command = args::parse(args)?;

    // Date arguments are checked before any input is read.
    let range = match &command {
        Command::Filter { from, to, .. } => Some(DateRange::parse(
            &DatePatterns::from_env()?,
            from.as_deref(),
            to.as_deref(),
        )?),
        _ => None,
    };

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;
    let document = parse_document(&input)?;

    let output = match command {
        Command::Info => info::info(&document, input.lines().count()),
        Command::Extract(ExtractKind::Events) => extract::events(&document),
        Command::Extract(ExtractKind::XProps) => extract::xprops(&document),
        Command::Filter { kind, .. } => {
            let range = range.context("date range missing")?;
            filter::filter(&document, kind, &range)?.text
        }
        Command::Combine(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("error opening file: {}", path.display()))?;
            let other = parse_document(&content)
                .with_context(|| format!("Error in {}", path.display()))?;
            combine::combine(&other, &document).text
        }
    };

    Ok(output)
}
