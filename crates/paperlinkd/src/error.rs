//! Error types for the paperlink command line.

use thiserror::Error;

use super::*;

/// Error type alias used for the paperlink CLI.
pub type Result<T> = core::result::Result<T, PaperlinkdError>;

/// Errors that can occur while running a CLI command.
#[derive(Error, Debug)]
pub enum PaperlinkdError {
  /// Error from the paperlink library
  #[error(transparent)]
  Paperlink(#[from] PaperlinkError),

  /// Reading an input file or writing output failed
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// An input file is not the JSON shape the command expects
  #[error("Invalid JSON in {path}: {source}")]
  InvalidInput {
    /// The offending file
    path:   PathBuf,
    /// What the parser rejected
    source: serde_json::Error,
  },

  /// Output could not be serialized
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// No mapping was given or saved for the target database
  #[error("No mapping for database {0}; pass --mapping or run `paperlink schema map` first")]
  MissingMapping(String),

  /// Some records were rejected by the destination
  #[error("{failed} of {total} records could not be exported")]
  Export {
    /// Number of rejected records
    failed: usize,
    /// Number of records attempted
    total:  usize,
  },
}
