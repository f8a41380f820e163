//! ScienceDirect search results and article pages.
//!
//! The two page kinds expose the same facts through different markup, so every field reader
//! takes a [`Mode`]. Search results only show abstracts to signed-in users, and only once the
//! abstract panel of a result has been opened; [`ScienceDirectExtractor`] opens every closed
//! panel and waits for each one independently before reading the page.

use futures::future::join_all;
use scraper::{ElementRef, Html, Selector};

use super::*;
use crate::{
  config::ABSTRACT_TIMEOUT_MS,
  document::wait_for_element,
  extract::{extract_date_nums_from_str, extract_pages, extract_volume},
};

/// URL prefix of search result pages.
pub const SEARCH_URL: &str = "https://www.sciencedirect.com/search?";
/// URL prefix of article pages.
pub const ARTICLE_URL: &str = "https://www.sciencedirect.com/science/article/";
/// Origin that relative links are resolved against.
const ORIGIN: &str = "https://www.sciencedirect.com";

/// Container of one result's preview links.
const PANEL: &str = ".PreviewLinks";
/// The button opening a result's abstract.
const EXPAND_BUTTON: &str = r#"button[aria-label="Abstract"]"#;
/// Present once a panel has been opened.
const PANEL_BODY: &str = ".preview-body-container";
/// Either marks a panel as loaded.
const PANEL_LOADED: [&str; 2] = [".abstract-section", ".empty-abstract"];

lazy_static! {
  /// One search result.
  static ref RESULT: Selector = Selector::parse(".result-item-content").unwrap();
  /// Result title link.
  static ref RESULT_TITLE: Selector = Selector::parse("h2 a").unwrap();
  /// "venue, date" label of a result.
  static ref SOURCE_AND_DATE: Selector = Selector::parse(".srctitle-date-fields").unwrap();
  /// Result author names.
  static ref RESULT_AUTHORS: Selector = Selector::parse(".Authors li").unwrap();
  /// PDF link, signed-in users only.
  static ref RESULT_DOWNLOAD: Selector = Selector::parse(".DownloadPdf a").unwrap();
  /// Loaded abstract of a result.
  static ref RESULT_ABSTRACT: Selector = Selector::parse(".abstract-section").unwrap();

  /// Article title.
  static ref ARTICLE_TITLE: Selector = Selector::parse("#screen-reader-main-title").unwrap();
  /// Journal heading.
  static ref JOURNAL: Selector = Selector::parse("#publication-title").unwrap();
  /// Combined volume, date and pages line.
  static ref VOLUME_LINE: Selector = Selector::parse(".publication-volume div").unwrap();
  /// Structured author buttons.
  static ref ARTICLE_AUTHORS: Selector =
    Selector::parse(r#"button[data-xocs-content-type="author"]"#).unwrap();
  /// Given name inside an author button.
  static ref GIVEN_NAME: Selector = Selector::parse(".given-name").unwrap();
  /// Family name inside an author button.
  static ref SURNAME: Selector = Selector::parse(".surname").unwrap();
  /// Article PDF link.
  static ref ARTICLE_DOWNLOAD: Selector = Selector::parse(".ViewPDF a").unwrap();
  /// Abstract section of an article.
  static ref ABSTRACTS: Selector = Selector::parse("#abstracts").unwrap();
  /// Author abstract paragraphs.
  static ref ABSTRACT_TEXT: Selector = Selector::parse(".author div").unwrap();
  /// Author highlight bullets.
  static ref HIGHLIGHTS: Selector = Selector::parse(".author-highlights li").unwrap();
  /// Keyword tags.
  static ref KEYWORDS: Selector = Selector::parse(".keyword").unwrap();
  /// "Cited by" header.
  static ref CITING: Selector = Selector::parse("#citing-articles-header").unwrap();

  /// Preview link containers.
  static ref PANELS: Selector = Selector::parse(PANEL).unwrap();
  /// Abstract toggle of a panel.
  static ref PANEL_BUTTON: Selector = Selector::parse(EXPAND_BUTTON).unwrap();
  /// Body of an opened panel.
  static ref PANEL_OPENED: Selector = Selector::parse(PANEL_BODY).unwrap();
}

/// Which kind of page a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// One entry of a search result list
  SearchResult,
  /// A full article page
  Article,
}

/// Extractor for ScienceDirect search results and article pages.
#[derive(Debug, Clone)]
pub struct ScienceDirectExtractor {
  /// Upper bound on the wait for each abstract panel
  abstract_timeout: Duration,
}

impl Default for ScienceDirectExtractor {
  fn default() -> Self { Self::new(Duration::from_millis(ABSTRACT_TIMEOUT_MS)) }
}

impl ScienceDirectExtractor {
  /// Creates an extractor waiting at most `abstract_timeout` for each abstract panel.
  pub fn new(abstract_timeout: Duration) -> Self { Self { abstract_timeout } }

  /// Opens every closed abstract panel, then waits for all panels to settle.
  ///
  /// A panel that does not load in time is left as it is; the others are unaffected.
  pub async fn expand_abstracts(&self, document: &dyn Document) {
    let panels = abstract_panels(&document.html());
    if panels.is_empty() {
      return;
    }

    for panel in panels.iter().filter(|p| !p.opened) {
      if let Some(button) = panel.button {
        if let Err(e) = document.click(&format!("{PANEL} {EXPAND_BUTTON}"), button).await {
          debug!("Could not open abstract panel {}: {}", panel.index, e);
        }
      }
    }

    let waits = panels
      .iter()
      .map(|panel| wait_for_element(document, PANEL, panel.index, &PANEL_LOADED, self.abstract_timeout));
    let loaded = join_all(waits).await.into_iter().flatten().count();
    debug!("{} of {} abstract panels loaded", loaded, panels.len());
  }
}

#[async_trait]
impl Extractor for ScienceDirectExtractor {
  fn name(&self) -> &'static str { "sciencedirect" }

  fn matches(&self, url: &Url) -> bool {
    url.as_str().starts_with(SEARCH_URL) || url.as_str().starts_with(ARTICLE_URL)
  }

  async fn extract(&self, document: &dyn Document) -> Result<Vec<Work>> {
    let url = document.url();
    if url.starts_with(SEARCH_URL) {
      self.expand_abstracts(document).await;
      Ok(parse_search_results(&document.html()))
    } else if url.starts_with(ARTICLE_URL) {
      Ok(parse_article(&url, &document.html()).into_iter().collect())
    } else {
      Ok(Vec::new())
    }
  }
}

/// An abstract panel of a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Panel {
  /// Position among all panels
  index:  usize,
  /// Position of its expand button among all expand buttons inside panels
  button: Option<usize>,
  /// Whether the panel body is already there
  opened: bool,
}

/// Panels that are open or can be opened, in page order.
fn abstract_panels(html: &str) -> Vec<Panel> {
  let document = Html::parse_document(html);
  let mut buttons_seen = 0;
  let mut panels = Vec::new();

  for (index, panel) in document.select(&PANELS).enumerate() {
    let buttons = panel.select(&PANEL_BUTTON).count();
    let button = (buttons > 0).then_some(buttons_seen);
    buttons_seen += buttons;

    let opened = panel.select(&PANEL_OPENED).next().is_some();
    if opened || button.is_some() {
      panels.push(Panel { index, button, opened });
    }
  }
  panels
}

/// Parses every titled entry of a search result page.
pub fn parse_search_results(html: &str) -> Vec<Work> {
  let document = Html::parse_document(html);
  document
    .select(&RESULT)
    .filter_map(|result| {
      let Some(title) = result.select(&RESULT_TITLE).next().filter(|t| !text_of(*t).is_empty()) else {
        trace!("Skipping ScienceDirect result without a title");
        return None;
      };

      let mut work = Work::new(text_of(title));
      work.url = title.value().attr("href").map(|href| format!("{ORIGIN}{href}"));
      read_fields(result, &mut work, Mode::SearchResult);
      Some(work)
    })
    .collect()
}

/// Parses an article page, `None` if it has no title.
pub fn parse_article(url: &str, html: &str) -> Option<Work> {
  let document = Html::parse_document(html);
  let root = document.root_element();
  let title = root.select(&ARTICLE_TITLE).next().map(text_of).filter(|t| !t.is_empty())?;

  let mut work = Work::new(title);
  work.url = Some(url.to_string());
  read_fields(root, &mut work, Mode::Article);

  work.subjects = root.select(&KEYWORDS).map(text_of).filter(|k| !k.is_empty()).collect();
  work.referenced_by_count = root.select(&CITING).next().and_then(|e| first_number(&text_of(e)));
  Some(work)
}

/// Reads the fields both page kinds carry.
fn read_fields(parent: ElementRef, work: &mut Work, mode: Mode) {
  work.publish_info = publish_info(parent, mode);
  work.authors = authors(parent, mode);
  work.digital_resources = download_link(parent, mode).into_iter().collect();
  read_abstract(parent, work, mode);
}

/// Venue and date, plus volume and pages on article pages.
fn publish_info(parent: ElementRef, mode: Mode) -> Option<PublishInfo> {
  let info = match mode {
    Mode::SearchResult => {
      // "Journal of Nuclear Materials, July 2023", one span each; the comma is CSS.
      let fields = parent.select(&SOURCE_AND_DATE).next()?;
      let spans: Vec<ElementRef> = fields
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "span")
        .collect();
      let [venue, date] = spans.as_slice() else {
        return None;
      };

      let mut info = PublishInfo { container_title: Some(text_of(*venue)), ..Default::default() };
      if let Some(date) = extract_date_nums_from_str(&text_of(*date)) {
        info = PublishInfo { container_title: info.container_title, ..PublishInfo::from(date) };
      }
      info
    },
    Mode::Article => {
      let mut info = PublishInfo {
        container_title: parent.select(&JOURNAL).next().map(text_of).filter(|t| !t.is_empty()),
        ..Default::default()
      };
      // "Volume 101, 28 February 2022, Pages 226-233" and its variants.
      if let Some(line) = parent.select(&VOLUME_LINE).next().map(text_of) {
        info.volume = extract_volume(&line);
        info.pages = extract_pages(&line);
        if let Some(date) = extract_date_nums_from_str(&line) {
          info.year = Some(date.year);
          info.month = Some(date.month);
          info.day = Some(date.day);
        }
      }
      info
    },
  };
  (!info.is_empty()).then_some(info)
}

/// Author names; article pages also split given and family names.
fn authors(parent: ElementRef, mode: Mode) -> Vec<Author> {
  match mode {
    Mode::SearchResult => parent
      .select(&RESULT_AUTHORS)
      .map(text_of)
      .filter(|name| !name.is_empty())
      .map(Author::from_full_name)
      .collect(),
    Mode::Article => parent
      .select(&ARTICLE_AUTHORS)
      .filter_map(|button| {
        let given = button.select(&GIVEN_NAME).next().map(text_of).filter(|n| !n.is_empty())?;
        let family = button.select(&SURNAME).next().map(text_of).filter(|n| !n.is_empty())?;
        Some(Author {
          full_name: Some(format!("{given} {family}")),
          given_name: Some(given),
          family_name: Some(family),
          orcid: None,
        })
      })
      .collect(),
  }
}

/// The PDF link, only rendered for signed-in sessions.
fn download_link(parent: ElementRef, mode: Mode) -> Option<DigitalResource> {
  let selector = match mode {
    Mode::SearchResult => &*RESULT_DOWNLOAD,
    Mode::Article => &*ARTICLE_DOWNLOAD,
  };
  let href = parent.select(selector).next()?.value().attr("href")?;
  Some(DigitalResource::new(format!("{ORIGIN}{href}"), "application/pdf"))
}

/// Abstract text, plus highlights on article pages.
fn read_abstract(parent: ElementRef, work: &mut Work, mode: Mode) {
  match mode {
    Mode::SearchResult => {
      work.abstract_text = parent.select(&RESULT_ABSTRACT).next().map(text_of).filter(|a| !a.is_empty());
    },
    Mode::Article => {
      let Some(abstracts) = parent.select(&ABSTRACTS).next() else {
        return;
      };
      work.abstract_text = abstracts.select(&ABSTRACT_TEXT).next().map(text_of).filter(|a| !a.is_empty());
      work.highlights = abstracts.select(&HIGHLIGHTS).map(text_of).filter(|h| !h.is_empty()).collect();
    },
  }
}
