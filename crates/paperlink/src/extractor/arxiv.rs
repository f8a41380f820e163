//! arXiv listing and abstract pages, resolved through the Atom feed API.
//!
//! The page itself is only used to find arXiv identifiers: the one in the URL of an abstract
//! page, or every `https://arxiv.org/abs/...` link of a search listing. All metadata then comes
//! from a single batched request to the feed API, which is far more stable than the page markup.
//!
//! Identifiers come in two shapes, old style `hep-th/9901001` and new style `0704.0001v1`; both
//! are taken verbatim from whatever follows the `abs/` prefix.

use quick_xml::{
  events::{BytesStart, Event},
  Reader,
};
use scraper::{Html, Selector};

use super::*;
use crate::{
  extract::{extract_date_nums_from_str, extract_publish_info_from_journal_ref},
  merge::merge,
  subjects::arxiv_subject_label,
};

/// URL prefix of abstract pages.
pub const ABS_PREFIX: &str = "https://arxiv.org/abs/";
/// URL prefix of search listings.
pub const SEARCH_PREFIX: &str = "https://arxiv.org/search/";
/// Resolver used when an entry carries a DOI.
pub const DOI_RESOLVER: &str = "https://dx.doi.org/";

lazy_static! {
  /// Every anchor carrying a target.
  static ref ANCHOR: Selector = Selector::parse("a[href]").unwrap();
}

/// Something that can return the Atom feed for a batch of arXiv identifiers.
#[async_trait]
pub trait FeedSource: Send + Sync {
  /// Fetches one feed document covering every id in `ids`.
  ///
  /// Returns `Ok(None)` when the service answered but not with a feed.
  async fn fetch_feed(&self, ids: &[String]) -> Result<Option<String>>;
}

/// HTTP client for the arXiv Atom API.
#[derive(Debug, Clone)]
pub struct ArxivApi {
  /// Shared HTTP client
  client:   reqwest::Client,
  /// Query endpoint
  endpoint: Url,
}

impl ArxivApi {
  /// Creates a client for `endpoint`.
  pub fn new(endpoint: Url) -> Self { Self { client: reqwest::Client::new(), endpoint } }

  /// Creates a client for the configured endpoint.
  pub fn from_config(config: &Config) -> Result<Self> { Ok(Self::new(Url::parse(&config.arxiv_endpoint)?)) }

  /// Fetches and parses the works for `ids`.
  ///
  /// A non-success answer yields no works.
  pub async fn fetch_works(&self, ids: &[String]) -> Result<Vec<Work>> {
    match self.fetch_feed(ids).await? {
      Some(feed) => parse_works(&feed),
      None => Ok(Vec::new()),
    }
  }
}

#[async_trait]
impl FeedSource for ArxivApi {
  async fn fetch_feed(&self, ids: &[String]) -> Result<Option<String>> {
    let url = format!("{}?max_results={}&id_list={}", self.endpoint, ids.len(), ids.join(","));
    debug!("Fetching arXiv feed via: {}", url);

    let response = self.client.get(&url).send().await?;
    if !response.status().is_success() {
      warn!("arXiv feed request for {} ids answered {}", ids.len(), response.status());
      return Ok(None);
    }

    let feed = response.text().await?;
    trace!("arXiv response: {}", feed);
    Ok(Some(feed))
  }
}

/// Extractor for arXiv abstract pages and search listings.
#[derive(Debug, Clone)]
pub struct ArxivExtractor<F = ArxivApi> {
  /// Where feeds come from
  feed: F,
}

impl<F: FeedSource> ArxivExtractor<F> {
  /// Creates an extractor reading metadata from `feed`.
  pub fn new(feed: F) -> Self { Self { feed } }
}

#[async_trait]
impl<F: FeedSource + 'static> Extractor for ArxivExtractor<F> {
  fn name(&self) -> &'static str { "arxiv" }

  fn matches(&self, url: &Url) -> bool {
    url.as_str().starts_with(ABS_PREFIX) || url.as_str().starts_with(SEARCH_PREFIX)
  }

  async fn extract(&self, document: &dyn Document) -> Result<Vec<Work>> {
    let ids = work_ids(&document.url(), &document.html());
    if ids.is_empty() {
      debug!("No arXiv identifiers on {}", document.url());
      return Ok(Vec::new());
    }

    debug!("Found {} arXiv identifiers", ids.len());
    match self.feed.fetch_feed(&ids).await? {
      Some(feed) => parse_works(&feed),
      None => Ok(Vec::new()),
    }
  }
}

/// Returns the identifier following the abstract page prefix, if any.
pub fn extract_id_from_url(url: &str) -> Option<&str> {
  url.strip_prefix(ABS_PREFIX).filter(|id| !id.is_empty())
}

/// Identifiers of the works shown on a page, in document order.
///
/// An abstract page yields the one id in its URL. A listing yields the id of every anchor
/// pointing at an abstract page, with relative targets resolved against the page URL.
pub fn work_ids(page_url: &str, html: &str) -> Vec<String> {
  if let Some(id) = extract_id_from_url(page_url) {
    return vec![id.to_string()];
  }
  if !page_url.starts_with(SEARCH_PREFIX) {
    return Vec::new();
  }

  let base = Url::parse(page_url).ok();
  let document = Html::parse_document(html);
  document
    .select(&ANCHOR)
    .filter_map(|anchor| anchor.value().attr("href"))
    .filter_map(|href| match &base {
      Some(base) => base.join(href).ok().map(String::from),
      None => Some(href.to_string()),
    })
    .filter_map(|href| extract_id_from_url(&href).map(String::from))
    .collect()
}

/// Element of an entry whose text is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
  /// `<title>`
  Title,
  /// `<id>`
  Id,
  /// `<summary>`
  Summary,
  /// `<published>`
  Published,
  /// `<arxiv:journal_ref>`
  JournalRef,
  /// `<arxiv:doi>`
  Doi,
  /// `<arxiv:comment>`
  Comment,
  /// `<author><name>`
  AuthorName,
}

/// Raw pieces of one `<entry>` before they become a [`Work`].
#[derive(Debug, Default)]
struct Entry {
  /// Title text
  title:       String,
  /// Entry id, the abstract page URL
  id:          String,
  /// Abstract text
  summary:     String,
  /// Publication timestamp
  published:   String,
  /// Journal reference, possibly empty
  journal_ref: String,
  /// DOI, possibly empty
  doi:         String,
  /// One string per comment element
  comments:    Vec<String>,
  /// One string per author element
  authors:     Vec<String>,
  /// Landing page, set by links in document order
  url:         Option<String>,
  /// The PDF link
  pdf:         Option<DigitalResource>,
  /// Category terms in document order
  categories:  Vec<String>,
}

impl Entry {
  /// Appends text to the element currently being captured.
  fn push_text(&mut self, capture: Capture, text: &str) {
    let target = match capture {
      Capture::Title => &mut self.title,
      Capture::Id => &mut self.id,
      Capture::Summary => &mut self.summary,
      Capture::Published => &mut self.published,
      Capture::JournalRef => &mut self.journal_ref,
      Capture::Doi => &mut self.doi,
      Capture::Comment => match self.comments.last_mut() {
        Some(comment) => comment,
        None => return,
      },
      Capture::AuthorName => match self.authors.last_mut() {
        Some(author) => author,
        None => return,
      },
    };
    target.push_str(text);
  }

  /// Applies one `<link>`: the first alternate link is the landing page, a related `pdf` link
  /// is the download, and a related `doi` link replaces the landing page.
  fn apply_link(&mut self, link: &BytesStart) -> Result<()> {
    let rel = attribute(link, "rel")?;
    let title = attribute(link, "title")?;
    let Some(href) = attribute(link, "href")? else {
      return Ok(());
    };

    match (rel.as_deref(), title.as_deref()) {
      (Some("alternate"), _) if self.url.is_none() => self.url = Some(href),
      (Some("related"), Some("pdf")) =>
        self.pdf = Some(DigitalResource { resource_link: href, content_type: attribute(link, "type")? }),
      (Some("related"), Some("doi")) => self.url = Some(href),
      _ => {},
    }
    Ok(())
  }

  /// Builds the record, or `None` if the entry has no title.
  fn into_work(self) -> Option<Work> {
    let title = collapse_whitespace(&self.title);
    if title.is_empty() {
      debug!("Skipping arXiv entry {} without a title", self.id.trim());
      return None;
    }

    let date = extract_date_nums_from_str(&self.published).map(PublishInfo::from);
    let journal = Some(self.journal_ref.trim())
      .filter(|r| !r.is_empty())
      .map(|r| PublishInfo::from(extract_publish_info_from_journal_ref(r)));
    let publish_info = match (date, journal) {
      (Some(date), Some(journal)) => Some(merge(&date, &journal)),
      (date, journal) => date.or(journal),
    };

    let doi = non_empty(self.doi.trim());
    let url = match &doi {
      Some(doi) => Some(format!("{DOI_RESOLVER}{doi}")),
      None => self.url,
    };

    Some(Work {
      title,
      abstract_text: non_empty(self.summary.trim()),
      platform: Some(Platform::Arxiv),
      platform_id: non_empty(self.id.trim()),
      publish_info,
      authors: self
        .authors
        .iter()
        .map(|name| collapse_whitespace(name))
        .filter(|name| !name.is_empty())
        .map(Author::from_full_name)
        .collect(),
      url,
      digital_resources: self.pdf.into_iter().collect(),
      subjects: self
        .categories
        .iter()
        .filter_map(|term| arxiv_subject_label(term))
        .map(String::from)
        .collect(),
      author_comments: self
        .comments
        .iter()
        .map(|comment| comment.trim())
        .filter(|comment| !comment.is_empty())
        .map(String::from)
        .collect(),
      doi,
      ..Default::default()
    })
  }
}

/// Parses an arXiv Atom feed into one [`Work`] per titled `<entry>`, in feed order.
///
/// # Errors
///
/// Fails only if the document is not well-formed XML.
///
/// # Examples
///
/// ```
/// use paperlink::extractor::arxiv::parse_works;
///
/// let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom">
///   <entry><title>Attention Is All You Need</title></entry>
/// </feed>"#;
/// let works = parse_works(feed).unwrap();
/// assert_eq!(works[0].title, "Attention Is All You Need");
/// ```
pub fn parse_works(xml: &str) -> Result<Vec<Work>> {
  let mut reader = Reader::from_str(xml);
  let mut works = Vec::new();

  let mut entry: Option<Entry> = None;
  let mut depth = 0usize;
  let mut in_author = false;
  let mut capture: Option<Capture> = None;

  loop {
    match reader.read_event()? {
      Event::Start(e) => {
        let name = e.local_name();
        let Some(current) = entry.as_mut() else {
          if name.as_ref() == b"entry" {
            entry = Some(Entry::default());
            depth = 0;
          }
          continue;
        };

        depth += 1;
        capture = match (depth, name.as_ref()) {
          (1, b"title") => Some(Capture::Title),
          (1, b"id") => Some(Capture::Id),
          (1, b"summary") => Some(Capture::Summary),
          (1, b"published") => Some(Capture::Published),
          (1, b"journal_ref") => Some(Capture::JournalRef),
          (1, b"doi") => Some(Capture::Doi),
          (1, b"comment") => {
            current.comments.push(String::new());
            Some(Capture::Comment)
          },
          (1, b"author") => {
            current.authors.push(String::new());
            in_author = true;
            None
          },
          (2, b"name") if in_author => Some(Capture::AuthorName),
          (1, b"link") => {
            current.apply_link(&e)?;
            None
          },
          (1, b"category") => {
            current.categories.extend(attribute(&e, "term")?);
            None
          },
          _ => None,
        };
      },
      Event::Empty(e) => {
        let Some(current) = entry.as_mut() else { continue };
        if depth != 0 {
          continue;
        }
        match e.local_name().as_ref() {
          b"link" => current.apply_link(&e)?,
          b"category" => current.categories.extend(attribute(&e, "term")?),
          _ => {},
        }
      },
      Event::Text(e) =>
        if let (Some(current), Some(target)) = (entry.as_mut(), capture) {
          let text = e.unescape().map_err(quick_xml::Error::from)?;
          current.push_text(target, &text);
        },
      Event::CData(e) =>
        if let (Some(current), Some(target)) = (entry.as_mut(), capture) {
          current.push_text(target, &String::from_utf8_lossy(&e));
        },
      Event::End(e) => {
        if entry.is_none() {
          continue;
        }
        capture = None;
        if depth == 0 {
          if let Some(work) = entry.take().and_then(Entry::into_work) {
            works.push(work);
          }
          continue;
        }
        if depth == 1 && e.local_name().as_ref() == b"author" {
          in_author = false;
        }
        depth -= 1;
      },
      Event::Eof => break,
      _ => {},
    }
  }

  debug!("Parsed {} works from arXiv feed", works.len());
  Ok(works)
}

/// Reads and unescapes an attribute.
fn attribute(element: &BytesStart, name: &str) -> Result<Option<String>> {
  let Some(attribute) = element.try_get_attribute(name).map_err(quick_xml::Error::from)? else {
    return Ok(None);
  };
  Ok(Some(attribute.unescape_value().map_err(quick_xml::Error::from)?.into_owned()))
}

/// Joins all whitespace runs into single spaces.
fn collapse_whitespace(text: &str) -> String { text.split_whitespace().collect::<Vec<_>>().join(" ") }

/// `Some` for non-empty text.
fn non_empty(text: &str) -> Option<String> { (!text.is_empty()).then(|| text.to_string()) }
