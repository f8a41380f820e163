//! Source extractors and the dispatching entry point.
//!
//! Every supported source implements [`Extractor`]: a cheap URL test deciding whether it applies
//! to a page, and an `extract` step turning the page into [`Work`] records. [`Extractors`] holds
//! the registered extractors in priority order and hands a page to the first one that applies.
//!
//! Two outcomes are kept apart on purpose by [`Extractors::scrape_works`]:
//!
//! - `Ok(None)`: no registered extractor recognizes the page
//! - `Ok(Some(vec![]))`: an extractor recognized the page but found no usable record
//!
//! # Examples
//!
//! ```no_run
//! use paperlink::{document::StaticDocument, extractor::Extractors, prelude::*};
//!
//! # async fn example() -> Result<(), PaperlinkError> {
//! let extractors = Extractors::from_config(&Config::default())?;
//! let page = StaticDocument::from_file("https://scholar.google.com/scholar?q=rust", "results.html")?;
//!
//! if let Some(works) = extractors.scrape_works(&page).await? {
//!   for work in works {
//!     println!("{}", work.title);
//!   }
//! }
//! # Ok(())
//! # }
//! ```

use scraper::ElementRef;

use super::*;
use crate::document::Document;

pub mod arxiv;
pub mod scholar;
pub mod sciencedirect;

pub use self::{
  arxiv::{ArxivApi, ArxivExtractor, FeedSource},
  scholar::ScholarExtractor,
  sciencedirect::ScienceDirectExtractor,
};

/// A source-specific converter from pages to [`Work`] records.
///
/// Implementors must never emit a record without a title, and should absorb per-record
/// problems instead of failing the whole page. Errors are reserved for an unreachable source.
///
/// # Examples
///
/// ```no_run
/// use paperlink::{document::Document, error::Result, prelude::*};
/// use url::Url;
///
/// struct Blog;
///
/// #[async_trait::async_trait]
/// impl Extractor for Blog {
///   fn name(&self) -> &'static str { "blog" }
///
///   fn matches(&self, url: &Url) -> bool { url.host_str() == Some("blog.example.org") }
///
///   async fn extract(&self, document: &dyn Document) -> Result<Vec<Work>> {
///     Ok(vec![Work::new(document.url())])
///   }
/// }
/// ```
#[async_trait]
pub trait Extractor: Send + Sync {
  /// Short name used in logs.
  fn name(&self) -> &'static str;

  /// Whether this extractor applies to a page at `url`.
  fn matches(&self, url: &Url) -> bool;

  /// Reads every record the page exposes, in document order.
  async fn extract(&self, document: &dyn Document) -> Result<Vec<Work>>;
}

/// Registered extractors, tried in insertion order.
#[derive(Default)]
pub struct Extractors {
  /// The registry
  extractors: Vec<Box<dyn Extractor>>,
}

impl Extractors {
  /// Creates an empty registry.
  pub fn new() -> Self { Self::default() }

  /// Builds the standard registry: arXiv, then Google Scholar, then ScienceDirect.
  ///
  /// # Errors
  ///
  /// Fails if the configured arXiv endpoint is not a valid URL.
  pub fn from_config(config: &Config) -> Result<Self> {
    Ok(
      Self::new()
        .with_extractor(ArxivExtractor::new(ArxivApi::from_config(config)?))
        .with_extractor(ScholarExtractor)
        .with_extractor(ScienceDirectExtractor::new(config.abstract_timeout())),
    )
  }

  /// Appends an extractor with the lowest priority so far.
  pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
    self.extractors.push(Box::new(extractor));
    self
  }

  /// Names of the registered extractors, in priority order.
  pub fn names(&self) -> Vec<&'static str> { self.extractors.iter().map(|e| e.name()).collect() }

  /// Returns the first extractor applying to `url`.
  pub fn find(&self, url: &Url) -> Option<&dyn Extractor> {
    self.extractors.iter().find(|e| e.matches(url)).map(|e| e.as_ref())
  }

  /// Extracts the records of a page with the first applicable extractor.
  ///
  /// Returns `Ok(None)` when no extractor applies, including when the page URL does not parse.
  ///
  /// # Errors
  ///
  /// Propagates the failure of a source that could not be reached at all, such as a feed
  /// request that never got an answer.
  pub async fn scrape_works(&self, document: &dyn Document) -> Result<Option<Vec<Work>>> {
    let address = document.url();
    let Ok(url) = Url::parse(&address) else {
      debug!("Page URL {} does not parse, no extractor applies", address);
      return Ok(None);
    };

    let Some(extractor) = self.find(&url) else {
      debug!("No extractor applies to {}", url);
      return Ok(None);
    };

    info!("Extracting works from {} with {}", url, extractor.name());
    let mut works = extractor.extract(document).await?;
    works.retain(Work::has_title);
    info!("{} produced {} works", extractor.name(), works.len());
    Ok(Some(works))
  }
}

/// Text content of an element with surrounding whitespace removed.
fn text_of(element: ElementRef) -> String { element.text().collect::<String>().trim().to_string() }

/// The first run of digits in `text`.
fn first_number(text: &str) -> Option<u64> {
  lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
  }
  DIGITS.find(text).and_then(|m| m.as_str().parse().ok())
}
