//! Command line front end for the paperlink library.
//!
//! Scrapes bibliographic records from saved search pages and metadata APIs, renders them through
//! a column mapping and exports them to a Notion database.
//!
//! # Usage
//!
//! ```bash
//! # Write a configuration file with a Notion token
//! paperlink init --notion-token secret_...
//!
//! # Scrape a saved search page
//! paperlink scrape --url "https://arxiv.org/search/?query=transformers" --html page.html > works.json
//!
//! # Look records up directly
//! paperlink arxiv 1706.03762 2101.00001
//! paperlink doi 10.1145/1327452.1327492
//!
//! # Preview the payloads a mapping produces
//! paperlink render --mapping mapping.json --works works.json
//!
//! # Keep a saved mapping in sync with its database, then export
//! paperlink schema map <database id> --mapping mapping.json
//! paperlink schema refresh <database id>
//! paperlink export --database <database id> --works works.json
//! ```
//!
//! Records and payloads are printed to stdout as JSON; status messages go to stderr. Logging
//! detail grows with each `-v`, and `RUST_LOG` overrides it.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  fs::read_to_string,
  path::{Path, PathBuf},
};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use paperlink::{error::PaperlinkError, prelude::*};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Scrape bibliographic records and export them to Notion")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. If not specified, uses the default platform-specific
  /// config directory.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,
}

impl Cli {
  /// The configuration file this invocation reads and writes.
  fn config_path(&self) -> PathBuf { self.config.clone().unwrap_or_else(Config::default_path) }
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Entry point for the paperlink CLI application
///
/// # Errors
///
/// Returns [`PaperlinkdError`] when the configuration cannot be read, an input file is missing
/// or malformed, a remote service fails, or an export rejects any record.
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let config_path = cli.config_path();
  let config = Config::load_or_default(&config_path)?;
  trace!("Using configuration {:?}", config);

  let terminal = Terminal;
  let result = match cli.command {
    Commands::Init(args) => init(&terminal, &config_path, config, args),
    Commands::Scrape(args) => scrape(&terminal, &config, args).await,
    Commands::Arxiv(args) => arxiv(&terminal, &config, args).await,
    Commands::Doi(args) => doi(&terminal, &config, args).await,
    Commands::Render(args) => render(&terminal, args),
    Commands::Schema { cmd } => schema(&terminal, &config, cmd).await,
    Commands::Export(args) => export(&terminal, &config, args).await,
  };

  if let Err(e) = &result {
    debug!("Command failed: {:?}", e);
    terminal.reply(ResponseContent::Error(e))?;
  }
  result
}
