//! Canonical bibliographic record types.
//!
//! Every extractor, whatever its input, produces [`Work`] values. Optional scalar fields are
//! `Option`s and list fields are `Vec`s where an empty list means "absent"; both are skipped
//! when serializing, so the JSON form of a [`Work`] only carries the keys a source actually
//! supplied. That is the form [`merge`](crate::merge) operates on.
//!
//! # Examples
//!
//! ```
//! use paperlink::work::{Author, PublishInfo, Work};
//!
//! let work = Work {
//!   title: "Attention Is All You Need".to_string(),
//!   authors: vec![Author::from_full_name("Ashish Vaswani")],
//!   publish_info: Some(PublishInfo { year: Some("2017".to_string()), ..Default::default() }),
//!   ..Default::default()
//! };
//! assert!(work.has_title());
//! ```

use super::*;

/// Complete representation of a scraped work.
///
/// `title` is the one field every emitted record carries; extractors drop candidates without
/// one instead of emitting a partial record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
  /// The work's full title
  pub title:               String,
  /// Abstract or summary text
  #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
  pub abstract_text:       Option<String>,
  /// Publication type
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub work_type:           Option<WorkType>,
  /// Subtitle, when the source separates it from the title
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subtitle:            Option<String>,
  /// Topical tags, free text or translated subject codes
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub subjects:            Vec<String>,
  /// ISBN for books and book parts
  #[serde(rename = "ISBN", default, skip_serializing_if = "Option::is_none")]
  pub isbn:                Option<String>,
  /// Digital Object Identifier
  #[serde(rename = "DOI", default, skip_serializing_if = "Option::is_none")]
  pub doi:                 Option<String>,
  /// Canonical landing page
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url:                 Option<String>,
  /// Platform the record was scraped from
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub platform:            Option<Platform>,
  /// Platform-specific identifier
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub platform_id:         Option<String>,
  /// Number of works citing this one
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub referenced_by_count: Option<u64>,
  /// Venue and date information
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub publish_info:        Option<PublishInfo>,
  /// Authors in byline order
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub authors:             Vec<Author>,
  /// Downloadable representations (PDF, HTML full text, ...)
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub digital_resources:   Vec<DigitalResource>,
  /// Free-text comments left by the authors
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub author_comments:     Vec<String>,
  /// Clinical trial registrations
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub clinical_trial:      Vec<ClinicalTrial>,
  /// Highlight bullets published alongside the abstract
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub highlights:          Vec<String>,
}

impl Work {
  /// Creates a record holding only a title.
  pub fn new(title: impl Into<String>) -> Self { Self { title: title.into(), ..Default::default() } }

  /// Whether this record carries the minimum viable field.
  pub fn has_title(&self) -> bool { !self.title.trim().is_empty() }
}

/// Venue and date information of a [`Work`].
///
/// `month` and `day` are always two-character, zero-padded strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishInfo {
  /// Publisher name
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub publisher:       Option<String>,
  /// Journal or venue name
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub container_title: Option<String>,
  /// Issue number
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub issue:           Option<String>,
  /// Volume
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub volume:          Option<String>,
  /// Page range such as `"192-201"`
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pages:           Option<String>,
  /// Four digit year
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub year:            Option<String>,
  /// Month, `"01"` to `"12"`
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub month:           Option<String>,
  /// Day of month, `"01"` to `"31"`
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub day:             Option<String>,
}

impl PublishInfo {
  /// Whether no field is set.
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// A single author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
  /// Name as displayed by the source
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub full_name:   Option<String>,
  /// Given name
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub given_name:  Option<String>,
  /// Family name
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub family_name: Option<String>,
  /// ORCID identifier URL
  #[serde(rename = "ORCID", default, skip_serializing_if = "Option::is_none")]
  pub orcid:       Option<String>,
}

impl Author {
  /// Author known only by the name the source displays.
  pub fn from_full_name(name: impl Into<String>) -> Self {
    Self { full_name: Some(name.into()), ..Default::default() }
  }
}

/// A downloadable representation of a work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalResource {
  /// Download link
  pub resource_link: String,
  /// MIME type of the linked resource
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_type:  Option<String>,
}

impl DigitalResource {
  /// Resource with a known content type.
  pub fn new(link: impl Into<String>, content_type: impl Into<String>) -> Self {
    Self { resource_link: link.into(), content_type: Some(content_type.into()) }
  }
}

/// Clinical trial registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClinicalTrial {
  /// Trial number within its registry
  pub id:       String,
  /// Registry identifier
  pub registry: String,
}

/// Platform a record was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
  /// arXiv.org
  #[serde(rename = "arXiv")]
  Arxiv,
  /// Google Scholar
  #[serde(rename = "GoogleScholar")]
  GoogleScholar,
  /// Anything else
  #[serde(rename = "other")]
  Other,
}

impl Display for Platform {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Platform::Arxiv => write!(f, "arXiv"),
      Platform::GoogleScholar => write!(f, "GoogleScholar"),
      Platform::Other => write!(f, "other"),
    }
  }
}

/// Defines [`WorkType`] and its string table in one place.
macro_rules! work_types {
  ($($(#[$doc:meta])* $variant:ident => $name:literal,)*) => {
    /// Publication type vocabulary, as used by Crossref.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum WorkType {
      $($(#[$doc])* #[serde(rename = $name)] $variant,)*
    }

    impl WorkType {
      /// The kebab-case name of this type.
      pub fn as_str(&self) -> &'static str {
        match self {
          $(WorkType::$variant => $name,)*
        }
      }
    }

    impl FromStr for WorkType {
      type Err = PaperlinkError;

      fn from_str(s: &str) -> Result<Self> {
        match s {
          $($name => Ok(WorkType::$variant),)*
          other => Err(PaperlinkError::Config(format!("Unknown work type: {other}"))),
        }
      }
    }
  };
}

work_types! {
  /// Book section
  BookSection => "book-section",
  /// Monograph
  Monograph => "monograph",
  /// Report component
  ReportComponent => "report-component",
  /// Report
  Report => "report",
  /// Peer review
  PeerReview => "peer-review",
  /// Book track
  BookTrack => "book-track",
  /// Journal article
  JournalArticle => "journal-article",
  /// Book part
  BookPart => "book-part",
  /// Anything not covered by the vocabulary
  Other => "other",
  /// Book
  Book => "book",
  /// Journal volume
  JournalVolume => "journal-volume",
  /// Book set
  BookSet => "book-set",
  /// Reference entry
  ReferenceEntry => "reference-entry",
  /// Proceedings article
  ProceedingsArticle => "proceedings-article",
  /// Journal
  Journal => "journal",
  /// Component
  Component => "component",
  /// Book chapter
  BookChapter => "book-chapter",
  /// Proceedings series
  ProceedingsSeries => "proceedings-series",
  /// Report series
  ReportSeries => "report-series",
  /// Proceedings
  Proceedings => "proceedings",
  /// Database
  Database => "database",
  /// Standard
  Standard => "standard",
  /// Reference book
  ReferenceBook => "reference-book",
  /// Posted content (preprints)
  PostedContent => "posted-content",
  /// Journal issue
  JournalIssue => "journal-issue",
  /// Dissertation
  Dissertation => "dissertation",
  /// Grant
  Grant => "grant",
  /// Dataset
  Dataset => "dataset",
  /// Book series
  BookSeries => "book-series",
  /// Edited book
  EditedBook => "edited-book",
}

impl Display for WorkType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// Name of a [`Work`] field a destination column can be linked to.
///
/// Besides the top-level fields this covers the nested [`PublishInfo`] and
/// [`DigitalResource`] fields, plus the synthetic `date` assembled from year, month and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkField {
  /// [`Work::title`]
  Title,
  /// [`Work::abstract_text`]
  Abstract,
  /// [`Work::work_type`]
  Type,
  /// [`Work::subtitle`]
  Subtitle,
  /// [`Work::subjects`]
  Subjects,
  /// [`Work::isbn`]
  #[serde(rename = "ISBN")]
  Isbn,
  /// [`Work::doi`]
  #[serde(rename = "DOI")]
  Doi,
  /// [`Work::url`]
  Url,
  /// [`Work::platform`]
  Platform,
  /// [`Work::platform_id`]
  PlatformId,
  /// [`Work::referenced_by_count`]
  ReferencedByCount,
  /// [`Work::publish_info`]
  PublishInfo,
  /// [`Work::authors`]
  Authors,
  /// [`Work::digital_resources`]
  DigitalResources,
  /// [`Work::author_comments`]
  AuthorComments,
  /// [`Work::clinical_trial`]
  ClinicalTrial,
  /// [`Work::highlights`]
  Highlights,
  /// [`PublishInfo::publisher`]
  Publisher,
  /// [`PublishInfo::container_title`]
  ContainerTitle,
  /// [`PublishInfo::issue`]
  Issue,
  /// [`PublishInfo::volume`]
  Volume,
  /// [`PublishInfo::pages`]
  Pages,
  /// [`PublishInfo::year`]
  Year,
  /// [`PublishInfo::month`]
  Month,
  /// [`PublishInfo::day`]
  Day,
  /// [`DigitalResource::resource_link`] of the first resource
  ResourceLink,
  /// [`DigitalResource::content_type`] of the first resource
  ContentType,
  /// `year-month-day` built from [`PublishInfo`]
  Date,
}
