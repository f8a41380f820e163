//! Module for writing a paperlink configuration file.

use super::*;

/// Arguments that can be used for the [`Commands::Init`]
#[derive(Args, Clone)]
pub struct InitArgs {
  /// Notion integration token
  #[arg(long)]
  pub notion_token: Option<String>,

  /// Contact address sent to Crossref
  #[arg(long)]
  pub crossref_mailto: Option<String>,

  /// Where to keep the schema and mapping cache
  #[arg(long)]
  pub database_path: Option<PathBuf>,

  /// Replace an existing configuration file
  #[arg(long)]
  pub force: bool,
}

/// Function for the [`Commands::Init`] in the CLI.
///
/// Starts from the configuration already in effect, so re-running with `--force` only changes
/// the options given.
pub fn init<I: UserInteraction>(interaction: &I, path: &Path, config: Config, args: InitArgs) -> Result<()> {
  let InitArgs { notion_token, crossref_mailto, database_path, force } = args;

  if path.exists() && !force {
    interaction.reply(ResponseContent::Warning(&format!(
      "Configuration already exists at {}; pass --force to overwrite it",
      path.display()
    )))?;
    return Ok(());
  }

  let mut config = config;
  if let Some(token) = notion_token {
    config = config.with_notion_token(token);
  }
  if let Some(mailto) = crossref_mailto {
    config = config.with_crossref_mailto(mailto);
  }
  if let Some(database_path) = database_path {
    config = config.with_database_path(database_path);
  }

  config.save(path)?;
  interaction.reply(ResponseContent::Success(&format!("Configuration written to {}", path.display())))
}
