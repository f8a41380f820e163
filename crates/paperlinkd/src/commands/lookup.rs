//! Module for fetching records straight from the metadata APIs.

use paperlink::{crossref::CrossrefClient, extractor::ArxivApi};

use super::*;

/// Arguments that can be used for the [`Commands::Arxiv`]
#[derive(Args, Clone)]
pub struct ArxivArgs {
  /// arXiv identifiers, e.g. "1706.03762" or "hep-th/9901001"
  #[arg(required = true)]
  pub ids: Vec<String>,
}

/// Arguments that can be used for the [`Commands::Doi`]
#[derive(Args, Clone)]
pub struct DoiArgs {
  /// The DOI, e.g. "10.1145/1327452.1327492"
  pub doi: String,
}

/// Function for the [`Commands::Arxiv`] in the CLI.
pub async fn arxiv<I: UserInteraction>(interaction: &I, config: &Config, args: ArxivArgs) -> Result<()> {
  let works = ArxivApi::from_config(config)?.fetch_works(&args.ids).await?;
  if works.len() < args.ids.len() {
    interaction.reply(ResponseContent::Warning(&format!(
      "arXiv returned {} of {} requested records",
      works.len(),
      args.ids.len()
    )))?;
  }
  interaction.emit(&works)
}

/// Function for the [`Commands::Doi`] in the CLI.
pub async fn doi<I: UserInteraction>(interaction: &I, config: &Config, args: DoiArgs) -> Result<()> {
  match CrossrefClient::from_config(config)?.fetch_work(&args.doi).await? {
    Some(work) => interaction.emit(&work),
    None => interaction.reply(ResponseContent::Warning(&format!("No Crossref record for {}", args.doi))),
  }
}
