//! Module for previewing destination payloads.

use paperlink::mapping::{transform_from_work_to_pd_item, PdToWorkMapping};

use super::*;

/// Arguments that can be used for the [`Commands::Render`]
#[derive(Args, Clone)]
pub struct RenderArgs {
  /// JSON file holding a column mapping
  #[arg(long)]
  pub mapping: PathBuf,

  /// JSON file holding an array of records, as printed by `scrape`
  #[arg(long)]
  pub works: PathBuf,
}

/// Function for the [`Commands::Render`] in the CLI.
pub fn render<I: UserInteraction>(interaction: &I, args: RenderArgs) -> Result<()> {
  let mapping: PdToWorkMapping = read_json(&args.mapping)?;
  let works: Vec<Work> = read_json(&args.works)?;

  let items: Vec<_> = works.iter().map(|work| transform_from_work_to_pd_item(&mapping, work)).collect();
  interaction.emit(&items)
}
