//! Terminal output.
//!
//! Machine-readable results go to stdout as JSON so they can be piped into other commands;
//! everything meant for a person goes to stderr with a styled prefix.

use std::io::Write;

use serde::Serialize;

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for list items
pub static ITEM_PREFIX: &str = "├─";

/// Something a command reports back.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Neutral progress or status message
  Info(&'a str),
  /// Completed step
  Success(&'a str),
  /// Something the user should look at, not fatal
  Warning(&'a str),
  /// Fatal failure of the command
  Error(&'a PaperlinkdError),
  /// One line of a listing
  Item(&'a str),
}

/// Where command output goes.
pub trait UserInteraction {
  /// Reports a message to the user.
  fn reply(&self, content: ResponseContent) -> Result<()>;

  /// Emits a result as pretty JSON.
  fn emit<T: Serialize + ?Sized>(&self, value: &T) -> Result<()>;
}

/// Interaction over the process's standard streams.
pub struct Terminal;

impl UserInteraction for Terminal {
  fn reply(&self, content: ResponseContent) -> Result<()> {
    let mut stderr = std::io::stderr().lock();
    match content {
      ResponseContent::Info(message) => writeln!(stderr, "{} {}", style(INFO_PREFIX).blue(), message)?,
      ResponseContent::Success(message) =>
        writeln!(stderr, "{} {}", style(SUCCESS_PREFIX).green(), message)?,
      ResponseContent::Warning(message) =>
        writeln!(stderr, "{} {}", style(WARNING_PREFIX).yellow(), message)?,
      ResponseContent::Error(error) =>
        writeln!(stderr, "{} {}", style(ERROR_PREFIX).red().bold(), style(error).red())?,
      ResponseContent::Item(line) => writeln!(stderr, "{} {}", style(ITEM_PREFIX).dim(), line)?,
    }
    Ok(())
  }

  fn emit<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
  }
}

/// Reads a JSON input file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
  let content = read_to_string(path)?;
  serde_json::from_str(&content)
    .map_err(|source| PaperlinkdError::InvalidInput { path: path.to_path_buf(), source })
}
