//! Module for keeping cached destination schemas and mappings current.

use paperlink::{
  cache::SchemaCache,
  mapping::PdToWorkMapping,
  notion::{NotionClient, SearchFor},
};

use super::*;

/// Schema and mapping subcommands
#[derive(Subcommand, Clone)]
pub enum SchemaCommands {
  /// Search the workspace for databases by title and cache what was found
  Search {
    /// Title query; empty matches every shared database
    #[arg(default_value = "")]
    query: String,
  },

  /// Save a column mapping for a database
  Map {
    /// Notion database id
    database: String,

    /// JSON file holding the column mapping
    #[arg(long)]
    mapping: PathBuf,

    /// Workspace the database belongs to
    #[arg(long)]
    workspace: Option<String>,
  },

  /// Fetch a database's current schema and bring its saved mapping in line
  Refresh {
    /// Notion database id
    database: String,
  },

  /// Print the saved mapping of a database
  Show {
    /// Notion database id
    database: String,
  },
}

/// Function for the [`Commands::Schema`] in the CLI.
pub async fn schema<I: UserInteraction>(interaction: &I, config: &Config, cmd: SchemaCommands) -> Result<()> {
  let cache = SchemaCache::open(&config.database_path).await?;

  match cmd {
    SchemaCommands::Search { query } => {
      let found = NotionClient::from_config(config)?.search(&query, SearchFor::Database).await?;
      let changed = cache.update_pd_list(&found).await?;
      for pd in &found {
        let marker = if changed.iter().any(|c| c.id == pd.id) { " (new or changed)" } else { "" };
        interaction.reply(ResponseContent::Item(&format!("{}  {}{}", pd.id, pd.plain_title(), marker)))?;
      }
      interaction.reply(ResponseContent::Info(&format!("{} databases, {} new or changed", found.len(), changed.len())))
    },
    SchemaCommands::Map { database, mapping, workspace } => {
      let mapping: PdToWorkMapping = read_json(&mapping)?;
      let saved = cache.save_mapping(&database, mapping, workspace.as_deref()).await?;
      interaction.reply(ResponseContent::Success(&format!(
        "Saved mapping of {} columns for {}",
        saved.mapping.len(),
        database
      )))
    },
    SchemaCommands::Refresh { database } => {
      let info = NotionClient::from_config(config)?.retrieve_database(&database).await?;
      match cache.refresh_mapping(&info).await? {
        Some(saved) => interaction.reply(ResponseContent::Success(&format!(
          "Schema of {} cached; mapping has {} columns",
          database,
          saved.mapping.len()
        ))),
        None => interaction.reply(ResponseContent::Info(&format!("Schema of {} cached; no mapping saved", database))),
      }
    },
    SchemaCommands::Show { database } => match cache.get_mapping(&database).await? {
      Some(saved) => interaction.emit(&saved),
      None => Err(PaperlinkdError::MissingMapping(database)),
    },
  }
}
