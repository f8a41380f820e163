//! Module for running the source extractors on a saved page.

use paperlink::{document::StaticDocument, extractor::Extractors};

use super::*;

/// Arguments that can be used for the [`Commands::Scrape`]
#[derive(Args, Clone)]
pub struct ScrapeArgs {
  /// Address the page was saved from; decides which extractor applies
  #[arg(long)]
  pub url: String,

  /// The saved HTML
  #[arg(long)]
  pub html: PathBuf,
}

/// Function for the [`Commands::Scrape`] in the CLI.
pub async fn scrape<I: UserInteraction>(interaction: &I, config: &Config, args: ScrapeArgs) -> Result<()> {
  let ScrapeArgs { url, html } = args;
  let page = StaticDocument::from_file(&url, &html)?;
  let extractors = Extractors::from_config(config)?;

  match extractors.scrape_works(&page).await? {
    Some(works) => {
      interaction.reply(ResponseContent::Info(&format!("Found {} records on {}", works.len(), url)))?;
      interaction.emit(&works)
    },
    None => interaction.reply(ResponseContent::Warning(&format!(
      "No extractor applies to {} (supported: {})",
      url,
      extractors.names().join(", ")
    ))),
  }
}
