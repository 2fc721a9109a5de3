//! Command-line interface for `zed_prompts`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use prompts_lib::PromptError;

use crate::config::{CliOverrides, DB_ENV_VAR};
use crate::logging;

/// `zed-prompts` - Import and export the Zed prompt library.
#[derive(Parser, Debug)]
#[command(name = "zed-prompts")]
#[command(
    author,
    version,
    about = "Import and export prompts from the Zed LMDB prompt library",
    long_about = None,
    after_help = "Use '-' as the input or output path to read stdin or write stdout."
)]
pub struct Cli {
    /// Machine-readable JSON output where supported
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file [default: ~/.config/zed-prompts/config.yaml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export prompts from LMDB to JSON
    Export(ExportArgs),

    /// Import prompts from JSON to LMDB
    Import(ImportArgs),

    /// List the metadata keys of the prompt library
    List(ListArgs),

    /// Show version information
    Version,
}

/// Store selection shared by every command that opens the database.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// LMDB database path [default: Zed's prompt library]
    #[arg(short = 'd', long = "db", env = DB_ENV_VAR, value_name = "PATH")]
    pub db: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Output JSON file (use '-' for stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: String,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Input JSON file (use '-' for stdin)
    #[arg(short, long, value_name = "PATH")]
    pub input: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

impl Cli {
    fn overrides(&self, store: &StoreArgs) -> CliOverrides {
        CliOverrides {
            db: store.db.clone(),
            config: self.config.clone(),
        }
    }
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .context("Failed to initialize logging")?;

    tracing::debug!(command = cli.command.name(), "Starting");
    match &cli.command {
        Commands::Export(args) => commands::export::execute(args, &cli.overrides(&args.store)),
        Commands::Import(args) => commands::import::execute(args, &cli.overrides(&args.store)),
        Commands::List(args) => commands::list::execute(&cli.overrides(&args.store), cli.json),
        Commands::Version => commands::version::execute(cli.json),
    }
}

/// Follow-up advice for `err`, printed after the error itself.
#[must_use]
pub fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PromptError>())
        .filter(|cause| cause.is_corruption())
        .map(|_| "the prompt library holds records that cannot be read; run `zed-prompts list` to inspect the stored keys")
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Export(_) => "export",
            Self::Import(_) => "import",
            Self::List(_) => "list",
            Self::Version => "version",
        }
    }
}
