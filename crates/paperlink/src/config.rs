//! Endpoints, credentials, timeouts and paths.
//!
//! Configuration lives in a TOML file, by default under the platform config directory:
//!
//! - On Unix: `~/.config/paperlink/config.toml`
//! - On macOS: `~/Library/Application Support/paperlink/config.toml`
//! - On Windows: `%APPDATA%\paperlink\config.toml`
//!
//! Every key is optional; missing keys take their defaults.
//!
//! ```toml
//! arxiv_endpoint = "http://export.arxiv.org/api/query"
//! crossref_mailto = "me@example.org"
//! notion_token = "secret_..."
//! abstract_timeout_ms = 8000
//! ```

use super::*;

/// Default arXiv Atom API endpoint.
pub const ARXIV_ENDPOINT: &str = "http://export.arxiv.org/api/query";
/// Default Crossref works endpoint.
pub const CROSSREF_ENDPOINT: &str = "https://api.crossref.org/works";
/// Default Notion API root.
pub const NOTION_ENDPOINT: &str = "https://api.notion.com/v1";
/// Notion API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";
/// How long to wait for each lazily loaded abstract panel, in milliseconds.
pub const ABSTRACT_TIMEOUT_MS: u64 = 5000;

/// Runtime configuration for clients, extractors and the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// arXiv Atom API endpoint
  pub arxiv_endpoint:      String,
  /// Crossref works endpoint
  pub crossref_endpoint:   String,
  /// Contact address sent to Crossref for the polite pool
  #[serde(skip_serializing_if = "Option::is_none")]
  pub crossref_mailto:     Option<String>,
  /// Notion API root
  pub notion_endpoint:     String,
  /// Value of the `Notion-Version` header
  pub notion_version:      String,
  /// Integration token for the Notion API
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notion_token:        Option<String>,
  /// How long to wait for each lazily loaded abstract panel
  pub abstract_timeout_ms: u64,
  /// Location of the schema and mapping cache
  pub database_path:       PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      arxiv_endpoint:      ARXIV_ENDPOINT.to_string(),
      crossref_endpoint:   CROSSREF_ENDPOINT.to_string(),
      crossref_mailto:     None,
      notion_endpoint:     NOTION_ENDPOINT.to_string(),
      notion_version:      NOTION_VERSION.to_string(),
      notion_token:        None,
      abstract_timeout_ms: ABSTRACT_TIMEOUT_MS,
      database_path:       Self::default_database_path(),
    }
  }
}

impl Config {
  /// Creates a configuration with every value at its default.
  pub fn new() -> Self { Self::default() }

  /// Returns the default location of the configuration file.
  ///
  /// Falls back to `./paperlink/config.toml` when the platform has no config directory.
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("paperlink").join("config.toml")
  }

  /// Returns the default location of the cache database.
  ///
  /// - On Unix: `~/.local/share/paperlink/paperlink.db`
  /// - On macOS: `~/Library/Application Support/paperlink/paperlink.db`
  /// - On Windows: `%APPDATA%\paperlink\paperlink.db`
  /// - Fallback: `./paperlink/paperlink.db`
  pub fn default_database_path() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("paperlink").join("paperlink.db")
  }

  /// Reads a configuration file.
  ///
  /// # Errors
  ///
  /// Fails if the file cannot be read or is not valid TOML for this shape.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config = toml::from_str(&content)?;
    debug!("Loaded configuration from {}", path.as_ref().display());
    Ok(config)
  }

  /// Reads a configuration file, or returns the defaults if there is none.
  pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
    if path.as_ref().exists() {
      Self::load(path)
    } else {
      debug!("No configuration at {}, using defaults", path.as_ref().display());
      Ok(Self::default())
    }
  }

  /// Writes the configuration as TOML, creating parent directories as needed.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    info!("Saved configuration to {}", path.display());
    Ok(())
  }

  /// Sets the arXiv API endpoint.
  pub fn with_arxiv_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.arxiv_endpoint = endpoint.into();
    self
  }

  /// Sets the Crossref works endpoint.
  pub fn with_crossref_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.crossref_endpoint = endpoint.into();
    self
  }

  /// Sets the Crossref polite-pool contact address.
  pub fn with_crossref_mailto(mut self, mailto: impl Into<String>) -> Self {
    self.crossref_mailto = Some(mailto.into());
    self
  }

  /// Sets the Notion API root.
  pub fn with_notion_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.notion_endpoint = endpoint.into();
    self
  }

  /// Sets the Notion integration token.
  pub fn with_notion_token(mut self, token: impl Into<String>) -> Self {
    self.notion_token = Some(token.into());
    self
  }

  /// Sets the abstract panel timeout in milliseconds.
  pub fn with_abstract_timeout_ms(mut self, millis: u64) -> Self {
    self.abstract_timeout_ms = millis;
    self
  }

  /// Sets the cache database location.
  pub fn with_database_path(mut self, path: impl AsRef<Path>) -> Self {
    self.database_path = path.as_ref().to_path_buf();
    self
  }

  /// The abstract panel timeout as a [`Duration`].
  pub fn abstract_timeout(&self) -> Duration { Duration::from_millis(self.abstract_timeout_ms) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::new();
    assert_eq!(config.arxiv_endpoint, ARXIV_ENDPOINT);
    assert_eq!(config.notion_version, "2022-06-28");
    assert_eq!(config.abstract_timeout(), Duration::from_secs(5));
    assert!(config.database_path.ends_with("paperlink/paperlink.db"));
    assert!(Config::default_path().ends_with("paperlink/config.toml"));
  }

  #[test]
  fn test_partial_file_fills_defaults() {
    let config: Config = toml::from_str("crossref_mailto = \"me@example.org\"").unwrap();
    assert_eq!(config.crossref_mailto.as_deref(), Some("me@example.org"));
    assert_eq!(config.crossref_endpoint, CROSSREF_ENDPOINT);
    assert_eq!(config.abstract_timeout_ms, 5000);
  }

  #[test]
  fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config::new()
      .with_notion_token("secret_abc")
      .with_abstract_timeout_ms(250)
      .with_database_path(dir.path().join("cache.db"));
    config.save(&path).unwrap();

    assert_eq!(Config::load(&path).unwrap(), config);
  }

  #[test]
  fn test_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(Config::load(&path).is_err());
    assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
  }
}
