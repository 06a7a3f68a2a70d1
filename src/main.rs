mod commands;
mod logging;
mod render;
mod utils;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use xcal_core::Session;
use xcal_core::config::XcalConfig;
use xcal_core::pipeline::{ExtractKind, FilterKind};

use crate::logging::{LogConfig, init_logging};

#[derive(Parser)]
#[command(name = "xcal")]
#[command(version, about = "Inspect, filter and combine iCalendar files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only)
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// Use this config file instead of ~/.config/xcal/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Calendar tool to run (a path, or a name looked up on PATH)
    #[arg(long, global = true, value_name = "TOOL")]
    tool: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a calendar file
    Info { file: PathBuf },
    /// List the events or X- properties of a calendar file
    Extract {
        file: PathBuf,
        #[arg(value_enum)]
        what: ExtractArg,
    },
    /// Merge a second calendar file into the first
    Combine {
        file: PathBuf,
        other: PathBuf,

        /// Write the result here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Keep only events or to-dos within a date range
    Filter {
        file: PathBuf,
        #[arg(value_enum)]
        kind: FilterArg,

        /// Earliest date to keep (e.g. "2016-04-01" or "today")
        #[arg(long)]
        from: Option<String>,

        /// Latest date to keep
        #[arg(long)]
        to: Option<String>,

        /// Write the result here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interactive session on a calendar file
    Shell { file: Option<PathBuf> },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExtractArg {
    Events,
    Xprops,
}

impl From<ExtractArg> for ExtractKind {
    fn from(arg: ExtractArg) -> Self {
        match arg {
            ExtractArg::Events => ExtractKind::Events,
            ExtractArg::Xprops => ExtractKind::XProps,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    Events,
    Todos,
}

impl From<FilterArg> for FilterKind {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Events => FilterKind::Events,
            FilterArg::Todos => FilterKind::Todos,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        ..LogConfig::default()
    }
    .with_ansi(io::stderr().is_terminal());
    init_logging(&log_config)?;

    let session = build_session(&cli)?;

    match cli.command {
        Commands::Info { file } => commands::info::run(session, &file).await,
        Commands::Extract { file, what } => {
            commands::extract::run(session, &file, what.into()).await
        }
        Commands::Combine {
            file,
            other,
            output,
        } => commands::combine::run(session, &file, &other, output.as_deref()).await,
        Commands::Filter {
            file,
            kind,
            from,
            to,
            output,
        } => commands::filter::run(session, &file, kind.into(), from, to, output.as_deref()).await,
        Commands::Shell { file } => commands::shell::run(session, file).await,
    }
}

fn build_session(cli: &Cli) -> Result<Session> {
    let mut config = match &cli.config {
        Some(path) => XcalConfig::load_from(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => XcalConfig::load()?,
    };
    if let Some(tool) = &cli.tool {
        config.tool = tool.clone();
    }

    tracing::debug!(tool = %config.tool, store = config.store_enabled, "configuration loaded");
    Ok(Session::from_config(&config)?)
}
