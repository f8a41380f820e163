//! Atomic field extraction from free text.
//!
//! Sources expose dates, volumes and page ranges inside human-formatted strings such as
//! `"Volume 173, 20 February 2024, Pages 192-201"`. The functions here pull single values out
//! of such strings with ordered patterns, canonical form first. A string that does not match
//! simply yields `None`; nothing here fails.
//!
//! # Examples
//!
//! ```
//! use paperlink::extract::{extract_date_nums_from_str, extract_pages, extract_volume};
//!
//! let text = "Volume 173, 20 February 2024, Pages 192-201";
//! assert_eq!(extract_volume(text).as_deref(), Some("173"));
//! assert_eq!(extract_pages(text).as_deref(), Some("192-201"));
//!
//! let date = extract_date_nums_from_str(text).unwrap();
//! assert_eq!((date.year.as_str(), date.month.as_str(), date.day.as_str()), ("2024", "02", "20"));
//! ```

use chrono::NaiveDate;

use super::*;

lazy_static! {
  /// `YYYY-MM-DD`, the canonical form.
  static ref ISO_DATE: Regex = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
  /// `[D] MonthName YYYY` with English month names.
  static ref NAMED_MONTH_DATE: Regex = Regex::new(
    r"\b(?:(\d{1,2})\s+)?(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{4})\b"
  )
  .unwrap();
  /// `Volume <digits>`, any case.
  static ref VOLUME: Regex = Regex::new(r"(?i)\bvolume\s+(\d+)").unwrap();
  /// `Pages <digits>-<digits>`.
  static ref PAGES: Regex = Regex::new(r"\bPages\s+(\d+-\d+)").unwrap();
}

/// Year, month and day pulled out of a string.
///
/// `month` and `day` are zero-padded to two characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateNums {
  /// Four digit year
  pub year:  String,
  /// `"01"` to `"12"`
  pub month: String,
  /// `"01"` to `"31"`
  pub day:   String,
}

impl DateNums {
  /// Builds the value from numeric parts if they form a real calendar date.
  fn from_parts(year: i32, month: u32, day: u32) -> Option<Self> {
    NaiveDate::from_ymd_opt(year, month, day)?;
    Some(Self { year: format!("{year:04}"), month: format!("{month:02}"), day: format!("{day:02}") })
  }

  /// The date as `YYYY-MM-DD`.
  pub fn to_iso(&self) -> String { format!("{}-{}-{}", self.year, self.month, self.day) }
}

impl From<DateNums> for PublishInfo {
  fn from(date: DateNums) -> Self {
    PublishInfo {
      year: Some(date.year),
      month: Some(date.month),
      day: Some(date.day),
      ..Default::default()
    }
  }
}

/// Maps an English month name to its number.
fn month_number(name: &str) -> Option<u32> {
  const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
  ];
  MONTHS.iter().position(|m| *m == name).map(|i| i as u32 + 1)
}

/// Extracts a calendar date from free text.
///
/// Patterns are tried in order: `YYYY-MM-DD`, then `[D] MonthName YYYY` where a missing day
/// defaults to the first. The first match that is also a valid calendar date wins, so
/// `"2024-02-30"` is rejected rather than rolled over.
///
/// ```
/// use paperlink::extract::extract_date_nums_from_str;
///
/// let date = extract_date_nums_from_str("xx July 2014").unwrap();
/// assert_eq!(date.to_iso(), "2014-07-01");
/// assert!(extract_date_nums_from_str("no date here").is_none());
/// ```
pub fn extract_date_nums_from_str(text: &str) -> Option<DateNums> {
  let iso = ISO_DATE.captures_iter(text).find_map(|caps| {
    DateNums::from_parts(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
  });
  if iso.is_some() {
    return iso;
  }

  NAMED_MONTH_DATE.captures_iter(text).find_map(|caps| {
    let day = caps.get(1).map_or(Some(1), |m| m.as_str().parse().ok())?;
    DateNums::from_parts(caps[3].parse().ok()?, month_number(&caps[2])?, day)
  })
}

/// Extracts the digits following `Volume`.
pub fn extract_volume(text: &str) -> Option<String> {
  VOLUME.captures(text).map(|caps| caps[1].to_string())
}

/// Extracts the page range following `Pages`.
pub fn extract_pages(text: &str) -> Option<String> {
  PAGES.captures(text).map(|caps| caps[1].to_string())
}

/// Publication details parsed out of a journal reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalRef {
  /// Abbreviated journal name
  pub container_title: Option<String>,
  /// Volume, possibly several tokens
  pub volume:          Option<String>,
  /// Year of publication
  pub year_num:        Option<u32>,
  /// Page range
  pub pages:           Option<String>,
}

impl From<JournalRef> for PublishInfo {
  fn from(journal_ref: JournalRef) -> Self {
    PublishInfo {
      container_title: journal_ref.container_title,
      volume: journal_ref.volume,
      year: journal_ref.year_num.map(|year| year.to_string()),
      pages: journal_ref.pages,
      ..Default::default()
    }
  }
}

/// Parses a citation of the shape `"<Journal> <Volume> (<Year>) <Pages>"`.
///
/// Only the part before the first `;` is read, which drops erratum notices. The last token is
/// the page range, the one before it the parenthesised year, the first token the journal and
/// whatever sits in between the volume. Tokens that are missing stay `None`.
///
/// ```
/// use paperlink::extract::extract_publish_info_from_journal_ref;
///
/// let r = extract_publish_info_from_journal_ref("Phys.Lett. B305 (1993) 115-118");
/// assert_eq!(r.container_title.as_deref(), Some("Phys.Lett."));
/// assert_eq!(r.volume.as_deref(), Some("B305"));
/// assert_eq!(r.year_num, Some(1993));
/// assert_eq!(r.pages.as_deref(), Some("115-118"));
/// ```
pub fn extract_publish_info_from_journal_ref(journal_ref: &str) -> JournalRef {
  let first = journal_ref.split(';').next().unwrap_or_default();
  let mut tokens: Vec<&str> = first.split_whitespace().collect();

  let pages = tokens.pop().map(String::from);
  let year_num = tokens.pop().and_then(|year| {
    let digits: String = year.trim_start_matches('(').chars().take(4).collect();
    digits.parse().ok()
  });
  let container_title = (!tokens.is_empty()).then(|| tokens.remove(0).to_string());
  let volume = (!tokens.is_empty()).then(|| tokens.join(" "));

  JournalRef { container_title, volume, year_num, pages }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(year: &str, month: &str, day: &str) -> Option<DateNums> {
    Some(DateNums { year: year.into(), month: month.into(), day: day.into() })
  }

  #[test]
  fn test_iso_date_inside_text() {
    assert_eq!(extract_date_nums_from_str("xx 2014-07-02 00:00:00"), date("2014", "07", "02"));
    assert_eq!(extract_date_nums_from_str("1993-03-15T00:00:00Z"), date("1993", "03", "15"));
  }

  #[test]
  fn test_named_month_date() {
    assert_eq!(
      extract_date_nums_from_str("Volume 173, 20 February 2024, Pages 192-201"),
      date("2024", "02", "20")
    );
    assert_eq!(extract_date_nums_from_str("Available online 1 February 2024"), date("2024", "02", "01"));
  }

  #[test]
  fn test_missing_day_defaults_to_first() {
    assert_eq!(extract_date_nums_from_str("xx July 2014"), date("2014", "07", "01"));
    assert_eq!(extract_date_nums_from_str("Journal of Nuclear Materials, July 2023"), date("2023", "07", "01"));
  }

  #[test]
  fn test_invalid_calendar_dates_are_rejected() {
    assert_eq!(extract_date_nums_from_str("2023-02-30"), None);
    assert_eq!(extract_date_nums_from_str("30 February 2024"), None);
    assert_eq!(extract_date_nums_from_str("2023-13-01"), None);
  }

  #[test]
  fn test_invalid_iso_falls_back_to_named_month() {
    assert_eq!(extract_date_nums_from_str("2023-02-30 or 3 March 2023"), date("2023", "03", "03"));
  }

  #[test]
  fn test_no_date() {
    assert_eq!(extract_date_nums_from_str("Pages 1-9"), None);
    assert_eq!(extract_date_nums_from_str(""), None);
  }

  #[test]
  fn test_extract_volume() {
    assert_eq!(extract_volume("Volume 219, Part A, January 2024, 112744").as_deref(), Some("219"));
    assert_eq!(extract_volume("VOLUME 12").as_deref(), Some("12"));
    assert_eq!(extract_volume("Available online 1 February 2024"), None);
  }

  #[test]
  fn test_extract_pages() {
    assert_eq!(
      extract_pages("Volume 173, 20 February 2024, Pages 192-201").as_deref(),
      Some("192-201")
    );
    assert_eq!(extract_pages("pages 192-201"), None);
    assert_eq!(extract_pages("Volume 219, Part A, January 2024, 112744"), None);
  }

  #[test]
  fn test_journal_ref_with_erratum() {
    let r = extract_publish_info_from_journal_ref(
      "J.Hasty Results 1 (2008) 1-9; Erratum: J.Hasty Results 2 (2008) 1-2",
    );
    assert_eq!(r.container_title.as_deref(), Some("J.Hasty"));
    assert_eq!(r.volume.as_deref(), Some("Results 1"));
    assert_eq!(r.year_num, Some(2008));
    assert_eq!(r.pages.as_deref(), Some("1-9"));
  }

  #[test]
  fn test_malformed_journal_ref_leaves_fields_absent() {
    let r = extract_publish_info_from_journal_ref("Nature");
    assert_eq!(r.pages.as_deref(), Some("Nature"));
    assert_eq!(r.year_num, None);
    assert_eq!(r.container_title, None);
    assert_eq!(r.volume, None);

    assert_eq!(extract_publish_info_from_journal_ref(""), JournalRef::default());

    let r = extract_publish_info_from_journal_ref("Phys.Rev. (n.d.) 1-2");
    assert_eq!(r.year_num, None);
    assert_eq!(r.container_title.as_deref(), Some("Phys.Rev."));
    assert_eq!(r.volume, None);
  }

  #[test]
  fn test_journal_ref_into_publish_info() {
    let info: PublishInfo = extract_publish_info_from_journal_ref("Phys.Lett. B305 (1993) 115-118").into();
    assert_eq!(info.year.as_deref(), Some("1993"));
    assert_eq!(info.month, None);
  }
}
