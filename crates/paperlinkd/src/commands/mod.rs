use super::*;

pub mod export;
pub mod init;
pub mod lookup;
pub mod render;
pub mod schema;
pub mod scrape;

pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use lookup::{arxiv, doi, ArxivArgs, DoiArgs};
pub use render::{render, RenderArgs};
pub use schema::{schema, SchemaCommands};
pub use scrape::{scrape, ScrapeArgs};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Write a configuration file
  Init(InitArgs),

  /// Extract records from a saved page
  Scrape(ScrapeArgs),

  /// Fetch records from the arXiv API by identifier
  Arxiv(ArxivArgs),

  /// Fetch the Crossref record of a DOI
  Doi(DoiArgs),

  /// Render records through a mapping without uploading them
  Render(RenderArgs),

  /// Manage cached destination schemas and mappings
  Schema {
    /// The schema subcommand to run
    #[command(subcommand)]
    cmd: SchemaCommands,
  },

  /// Render records through a mapping and create one page per record
  Export(ExportArgs),
}
