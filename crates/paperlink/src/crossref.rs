//! DOI metadata lookups through the Crossref REST API.
//!
//! A DOI resolves to at most one [`Work`]. Crossref answering with anything but success (most
//! often a 404 for a DOI registered elsewhere) means "no record", not an error; only transport
//! failures surface as [`PaperlinkError::Network`].
//!
//! # Examples
//!
//! ```no_run
//! use paperlink::{crossref::CrossrefClient, prelude::*};
//!
//! # async fn example() -> Result<(), PaperlinkError> {
//! let client = CrossrefClient::from_config(&Config::default())?;
//! if let Some(work) = client.fetch_work("10.1145/1327452.1327492").await? {
//!   println!("{} ({:?})", work.title, work.publish_info.and_then(|p| p.year));
//! }
//! # Ok(())
//! # }
//! ```

use super::*;

/// Envelope of a `/works/{doi}` answer.
#[derive(Debug, Clone, Deserialize)]
pub struct CrossrefResponse {
  /// The work itself
  pub message: CrossrefMessage,
}

/// The bibliographic fields of a Crossref work that map onto [`Work`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrossrefMessage {
  /// Titles, the first is the main one
  pub title:                    Vec<String>,
  /// JATS-formatted abstract
  #[serde(rename = "abstract")]
  pub abstract_text:            Option<String>,
  /// Number of works citing this one
  pub is_referenced_by_count:   Option<u64>,
  /// The DOI
  #[serde(rename = "DOI")]
  pub doi:                      Option<String>,
  /// DOI resolver URL
  #[serde(rename = "URL")]
  pub url:                      Option<String>,
  /// Crossref work type
  #[serde(rename = "type")]
  pub work_type:                Option<String>,
  /// Subtitles
  pub subtitle:                 Vec<String>,
  /// Subject headings
  pub subject:                  Vec<String>,
  /// ISBNs, for books and chapters
  #[serde(rename = "ISBN")]
  pub isbn:                     Vec<String>,
  /// Publisher name
  pub publisher:                Option<String>,
  /// Journal or proceedings titles
  pub container_title:          Vec<String>,
  /// Issue
  pub issue:                    Option<String>,
  /// Volume
  pub volume:                   Option<String>,
  /// Page range
  pub page:                     Option<String>,
  /// Earliest publication date
  pub issued:                   Option<CrossrefDate>,
  /// Authors
  pub author:                   Vec<CrossrefAuthor>,
  /// Full-text links
  pub link:                     Vec<CrossrefLink>,
  /// Clinical trial registrations
  pub clinical_trial_number:    Vec<CrossrefClinicalTrial>,
}

/// A Crossref partial date.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrossrefDate {
  /// `[[year, month, day]]`, trailing parts optional and any part possibly null
  pub date_parts: Vec<Vec<Option<i64>>>,
}

/// A Crossref contributor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrossrefAuthor {
  /// Given name
  pub given:  Option<String>,
  /// Family name
  pub family: Option<String>,
  /// ORCID URL
  #[serde(rename = "ORCID")]
  pub orcid:  Option<String>,
}

/// A Crossref full-text link.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrossrefLink {
  /// Target
  #[serde(rename = "URL")]
  pub url:          String,
  /// MIME type
  pub content_type: Option<String>,
}

/// A Crossref clinical trial reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrossrefClinicalTrial {
  /// Trial number
  pub clinical_trial_number: String,
  /// Registry DOI
  pub registry:              String,
}

/// Formats a month or day with two digits.
fn zero_padded(n: Option<i64>) -> Option<String> { n.map(|n| format!("{n:02}")) }

/// Maps a Crossref work onto a [`Work`], or `None` if it has no title.
///
/// Month and day are zero-padded; list fields are mapped element by element. Authors get a
/// `fullName` of `"given family"` when both parts are known.
pub fn work_from_message(message: CrossrefMessage) -> Option<Work> {
  let title = message.title.into_iter().next().filter(|t| !t.trim().is_empty())?;

  let date = message.issued.and_then(|issued| issued.date_parts.into_iter().next()).unwrap_or_default();
  let part = |i: usize| date.get(i).copied().flatten();
  let publish_info = PublishInfo {
    publisher: message.publisher,
    container_title: message.container_title.into_iter().next(),
    issue: message.issue,
    volume: message.volume,
    pages: message.page,
    year: part(0).map(|year| year.to_string()),
    month: zero_padded(part(1)),
    day: zero_padded(part(2)),
  };

  Some(Work {
    title,
    abstract_text: message.abstract_text,
    referenced_by_count: message.is_referenced_by_count,
    doi: message.doi,
    url: message.url,
    work_type: message.work_type.and_then(|t| t.parse().ok()),
    subtitle: message.subtitle.into_iter().next(),
    subjects: message.subject,
    isbn: message.isbn.into_iter().next(),
    publish_info: (!publish_info.is_empty()).then_some(publish_info),
    authors: message
      .author
      .into_iter()
      .map(|author| Author {
        full_name: match (&author.given, &author.family) {
          (Some(given), Some(family)) => Some(format!("{given} {family}")),
          (None, Some(family)) => Some(family.clone()),
          _ => None,
        },
        given_name: author.given,
        family_name: author.family,
        orcid: author.orcid,
      })
      .collect(),
    digital_resources: message
      .link
      .into_iter()
      .map(|link| DigitalResource { resource_link: link.url, content_type: link.content_type })
      .collect(),
    clinical_trial: message
      .clinical_trial_number
      .into_iter()
      .map(|trial| ClinicalTrial { id: trial.clinical_trial_number, registry: trial.registry })
      .collect(),
    ..Default::default()
  })
}

/// HTTP client for Crossref DOI lookups.
#[derive(Debug, Clone)]
pub struct CrossrefClient {
  /// Shared HTTP client
  client:   reqwest::Client,
  /// The `/works` endpoint
  endpoint: Url,
  /// Polite-pool contact address
  mailto:   Option<String>,
}

impl CrossrefClient {
  /// Creates a client for the `/works` endpoint at `endpoint`.
  pub fn new(endpoint: Url) -> Self { Self { client: reqwest::Client::new(), endpoint, mailto: None } }

  /// Creates a client from the configured endpoint and contact address.
  pub fn from_config(config: &Config) -> Result<Self> {
    let client = Self::new(Url::parse(&config.crossref_endpoint)?);
    Ok(match &config.crossref_mailto {
      Some(mailto) => client.with_mailto(mailto),
      None => client,
    })
  }

  /// Identifies requests with a contact address.
  pub fn with_mailto(mut self, mailto: impl Into<String>) -> Self {
    self.mailto = Some(mailto.into());
    self
  }

  /// Looks up the work registered under `doi`.
  ///
  /// # Errors
  ///
  /// Fails when Crossref cannot be reached or answers success with a body that is not a work.
  pub async fn fetch_work(&self, doi: &str) -> Result<Option<Work>> {
    let mut url = self.endpoint.clone();
    url
      .path_segments_mut()
      .map_err(|_| PaperlinkError::Config(format!("{} cannot take a DOI path", self.endpoint)))?
      .pop_if_empty()
      .extend(doi.trim().split('/'));
    if let Some(mailto) = &self.mailto {
      url.query_pairs_mut().append_pair("mailto", mailto);
    }
    debug!("Fetching Crossref record via: {}", url);

    let response = self.client.get(url).send().await?;
    if !response.status().is_success() {
      debug!("Crossref has no record for {} ({})", doi, response.status());
      return Ok(None);
    }

    let body: CrossrefResponse = response.json().await?;
    let work = work_from_message(body.message);
    if work.is_none() {
      debug!("Crossref record for {} has no title", doi);
    }
    Ok(work)
  }
}
