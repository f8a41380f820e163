//! Module for exporting records to a Notion database.

use paperlink::{
  cache::SchemaCache,
  mapping::{transform_from_work_to_pd_item, PdToWorkMapping},
  notion::NotionClient,
};

use super::*;

/// Arguments that can be used for the [`Commands::Export`]
#[derive(Args, Clone)]
pub struct ExportArgs {
  /// Notion database id
  #[arg(long)]
  pub database: String,

  /// JSON file holding an array of records, as printed by `scrape`
  #[arg(long)]
  pub works: PathBuf,

  /// JSON file holding the column mapping; defaults to the one saved for the database
  #[arg(long)]
  pub mapping: Option<PathBuf>,
}

/// Function for the [`Commands::Export`] in the CLI.
///
/// Every record is attempted; the command fails afterwards if any was rejected.
pub async fn export<I: UserInteraction>(interaction: &I, config: &Config, args: ExportArgs) -> Result<()> {
  let ExportArgs { database, works, mapping } = args;

  let mapping: PdToWorkMapping = match mapping {
    Some(path) => read_json(&path)?,
    None => SchemaCache::open(&config.database_path)
      .await?
      .get_mapping(&database)
      .await?
      .map(|saved| saved.mapping)
      .ok_or_else(|| PaperlinkdError::MissingMapping(database.clone()))?,
  };
  let works: Vec<Work> = read_json(&works)?;
  let items: Vec<_> = works.iter().map(|work| transform_from_work_to_pd_item(&mapping, work)).collect();

  interaction.reply(ResponseContent::Info(&format!("Exporting {} records to {}", items.len(), database)))?;
  let results = NotionClient::from_config(config)?.upload_items(&database, &items).await;

  let mut failed = 0;
  for (work, result) in works.iter().zip(&results) {
    match result {
      Ok(_) => interaction.reply(ResponseContent::Item(&work.title))?,
      Err(e) => {
        failed += 1;
        interaction.reply(ResponseContent::Warning(&format!("{}: {}", work.title, e)))?;
      },
    }
  }

  if failed > 0 {
    return Err(PaperlinkdError::Export { failed, total: results.len() });
  }
  interaction.reply(ResponseContent::Success(&format!("Exported {} records", results.len())))
}
