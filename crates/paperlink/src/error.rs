//! Error types for the paperlink library.
//!
//! Only conditions that make a whole source unreachable surface as errors. Per-record
//! problems (a missing title, a date that does not parse, an abstract panel that never
//! loads) are absorbed by the extractors and never reach the caller.
//!
//! # Examples
//!
//! ```no_run
//! use paperlink::{crossref::CrossrefClient, error::PaperlinkError};
//!
//! # async fn example(client: CrossrefClient) {
//! match client.fetch_work("10.1145/1327452.1327492").await {
//!   Ok(Some(work)) => println!("Found: {}", work.title),
//!   Ok(None) => println!("No record for this DOI"),
//!   Err(PaperlinkError::Network(e)) => println!("Network error: {}", e),
//!   Err(e) => println!("Other error: {}", e),
//! }
//! # }
//! ```

use thiserror::Error;

/// Error type alias used for the [`paperlink`](crate) crate.
pub type Result<T> = core::result::Result<T, PaperlinkError>;

/// Errors that can occur when working with the paperlink library.
#[derive(Error, Debug)]
pub enum PaperlinkError {
  /// A network request failed.
  ///
  /// Covers unreachable hosts, TLS failures and timeouts of the HTTP collaborators. No
  /// retry is attempted inside the library.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The destination API answered with a non-success status.
  ///
  /// The string carries the status code and the message returned by the API.
  #[error("API error: {0}")]
  ApiError(String),

  /// The XML feed could not be tokenized at all.
  #[error(transparent)]
  Xml(#[from] quick_xml::Error),

  /// A JSON payload could not be (de)serialized.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A page URL could not be parsed.
  #[error(transparent)]
  Url(#[from] url::ParseError),

  /// A SQLite operation failed.
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// An async SQLite operation failed.
  #[error(transparent)]
  AsyncSqlite(#[from] tokio_rusqlite::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// A configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// A configuration could not be written out.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// A destination column type has no payload representation.
  ///
  /// Columns of such types never pass [`is_compatible_pd_property_type`], so this only
  /// shows up when a mapping was built by hand around that check.
  ///
  /// [`is_compatible_pd_property_type`]: crate::mapping::is_compatible_pd_property_type
  #[error("Unsupported destination property type: {0}")]
  UnsupportedPropertyType(String),

  /// Invalid or missing configuration.
  #[error("{0}")]
  Config(String),
}
