//! Google Scholar result lists.
//!
//! Each `.gs_r` block of a result page becomes one [`Work`]. Scholar exposes little structure,
//! so most of the record comes from the grey metadata line under the title, which reads
//! `authors - venue, year - site`.

use scraper::{ElementRef, Html, Selector};

use super::*;

lazy_static! {
  /// One search result.
  static ref RESULT: Selector = Selector::parse(".gs_r").unwrap();
  /// Result title link.
  static ref TITLE: Selector = Selector::parse(".gs_rt a").unwrap();
  /// "Cited by" link.
  static ref CITED_BY: Selector = Selector::parse(r#".gs_ri .gs_fl a[href^="/scholar?cites="]"#).unwrap();
  /// Authors, venue and site line.
  static ref META: Selector = Selector::parse(".gs_a").unwrap();
  /// Side links to full texts.
  static ref RESOURCES: Selector = Selector::parse(".gs_or_ggsm a").unwrap();
}

/// Extractor for Google Scholar search result pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScholarExtractor;

#[async_trait]
impl Extractor for ScholarExtractor {
  fn name(&self) -> &'static str { "scholar" }

  fn matches(&self, url: &Url) -> bool {
    url.host_str().is_some_and(|host| host.starts_with("scholar.google.com")) && url.path() == "/scholar"
  }

  async fn extract(&self, document: &dyn Document) -> Result<Vec<Work>> {
    Ok(parse_results(&document.html()))
  }
}

/// Parses every titled result of a Scholar page, in page order.
pub fn parse_results(html: &str) -> Vec<Work> {
  let document = Html::parse_document(html);
  document.select(&RESULT).filter_map(parse_result).collect()
}

/// Reads one result block; `None` if it has no title.
fn parse_result(result: ElementRef) -> Option<Work> {
  let Some(title) = result.select(&TITLE).next().filter(|t| !text_of(*t).is_empty()) else {
    trace!("Skipping Scholar result without a title");
    return None;
  };

  let mut work = Work::new(text_of(title));
  work.url = title.value().attr("href").map(String::from);
  work.platform = Some(Platform::GoogleScholar);
  work.referenced_by_count = result.select(&CITED_BY).next().and_then(|link| first_number(&text_of(link)));

  if let Some(meta) = result.select(&META).next() {
    apply_metadata_line(&text_of(meta), &mut work);
  }
  for link in result.select(&RESOURCES) {
    apply_resource_link(link, &mut work);
  }

  Some(work)
}

/// Splits `authors - venue, year - site` into authors and publication details.
///
/// The venue may itself contain commas, so only the last comma separates it from the year. A
/// segment without any comma is taken to be the year alone. Hyphens inside names make the plain
/// split run past three segments; the line is then split on ` - ` instead, and if that still
/// does not give three segments only the authors are kept.
fn apply_metadata_line(line: &str, work: &mut Work) {
  let mut parts: Vec<&str> = line.split('-').map(str::trim).collect();
  if parts.len() > 3 {
    parts = line.split(" - ").map(str::trim).collect();
  }
  if parts.len() > 3 {
    debug!("Metadata line of \"{}\" is not authors - venue - site: {}", work.title, line);
    parts.truncate(1);
  }
  let mut segments = parts.into_iter();

  if let Some(authors) = segments.next() {
    work.authors = authors
      .split(',')
      .map(str::trim)
      .filter(|name| !name.is_empty())
      .map(Author::from_full_name)
      .collect();
  }

  let Some(venue_and_year) = segments.next().filter(|s| !s.is_empty()) else {
    return;
  };
  let info = match venue_and_year.rsplit_once(',') {
    Some((venue, year)) => PublishInfo {
      container_title: Some(venue.trim().to_string()).filter(|v| !v.is_empty()),
      year: Some(year.trim().to_string()).filter(|y| !y.is_empty()),
      ..Default::default()
    },
    None => PublishInfo { year: Some(venue_and_year.to_string()), ..Default::default() },
  };
  if !info.is_empty() {
    work.publish_info = Some(info);
  }
}

/// Classifies a side link by its `[TAG]` prefix.
fn apply_resource_link(link: ElementRef, work: &mut Work) {
  let label = text_of(link);
  let Some(href) = link.value().attr("href").filter(|h| !h.is_empty()) else {
    return;
  };
  if label.is_empty() {
    return;
  }

  let content_type = if label.starts_with("[PDF]") || href.ends_with(".pdf") {
    "application/pdf"
  } else if label.starts_with("[HTML]") {
    "text/html"
  } else if label.starts_with('[') {
    "application/octet-stream"
  } else {
    if work.url.is_none() {
      work.url = Some(href.to_string());
    }
    return;
  };
  work.digital_resources.push(DigitalResource::new(href, content_type));
}
