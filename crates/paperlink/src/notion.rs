//! HTTP client for the Notion API, the destination workspace.
//!
//! Covers the three calls an export needs: finding the user's databases by title, reading one
//! database's schema, and creating one page per rendered record. Requests carry the
//! integration token as a bearer token and the configured `Notion-Version`.
//!
//! Any non-success answer becomes [`PaperlinkError::ApiError`] carrying the status and the
//! message Notion returned. Nothing is retried.

use reqwest::RequestBuilder;

use super::*;
use crate::mapping::{NpdInfo, PdItem};

/// Largest page Notion's search returns.
const PAGE_SIZE: u32 = 100;

/// Kind of object a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFor {
  /// Databases
  Database,
  /// Pages
  Page,
}

/// OAuth access token of a workspace integration, as returned by the token exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
  /// Bearer token
  pub access_token:           String,
  /// Always `bearer`
  #[serde(default)]
  pub token_type:             String,
  /// Id of the integration's bot user, the key tokens are stored under
  pub bot_id:                 String,
  /// Workspace the token grants access to
  pub workspace_id:           String,
  /// Workspace display name
  #[serde(default)]
  pub workspace_name:         Option<String>,
  /// Workspace icon
  #[serde(default)]
  pub workspace_icon:         Option<String>,
  /// Who authorized the integration
  #[serde(default)]
  pub owner:                  Value,
  /// Template duplicated during authorization
  #[serde(default)]
  pub duplicated_template_id: Option<String>,
}

/// Body of `POST /search`.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
  /// Title query
  query:        &'a str,
  /// Object kind filter
  filter:       SearchFilter,
  /// Ordering
  sort:         SearchSort,
  /// Results per page
  page_size:    u32,
  /// Where the previous page ended
  #[serde(skip_serializing_if = "Option::is_none")]
  start_cursor: Option<String>,
}

/// `{"value": "database", "property": "object"}`
#[derive(Debug, Serialize)]
struct SearchFilter {
  /// Object kind
  value:    SearchFor,
  /// Always `object`
  property: &'static str,
}

/// `{"direction": "descending", "timestamp": "last_edited_time"}`
#[derive(Debug, Serialize)]
struct SearchSort {
  /// Sort direction
  direction: &'static str,
  /// Sort key
  timestamp: &'static str,
}

/// One page of search results.
#[derive(Debug, Deserialize)]
struct SearchResponse {
  /// Matches
  results:     Vec<NpdInfo>,
  /// Whether another page follows
  #[serde(default)]
  has_more:    bool,
  /// Cursor of the next page
  #[serde(default)]
  next_cursor: Option<String>,
}

/// Client for one Notion integration.
#[derive(Debug, Clone)]
pub struct NotionClient {
  /// Shared HTTP client
  client:   reqwest::Client,
  /// API root, without trailing slash
  endpoint: String,
  /// `Notion-Version` header value
  version:  String,
  /// Integration or OAuth token
  token:    String,
}

impl NotionClient {
  /// Creates a client for the API rooted at `endpoint`.
  pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
    Self {
      client:   reqwest::Client::new(),
      endpoint: endpoint.into().trim_end_matches('/').to_string(),
      version:  config::NOTION_VERSION.to_string(),
      token:    token.into(),
    }
  }

  /// Creates a client from the configured endpoint, version and token.
  ///
  /// # Errors
  ///
  /// Fails with [`PaperlinkError::Config`] when no token is configured.
  pub fn from_config(config: &Config) -> Result<Self> {
    let token = config
      .notion_token
      .as_deref()
      .ok_or_else(|| PaperlinkError::Config("No Notion token configured (notion_token)".to_string()))?;
    Ok(Self::new(&config.notion_endpoint, token).with_version(&config.notion_version))
  }

  /// Overrides the `Notion-Version` header.
  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = version.into();
    self
  }

  /// Authenticates and sends `request`, returning the JSON body of a success.
  async fn send(&self, request: RequestBuilder) -> Result<Value> {
    let response = request.bearer_auth(&self.token).header("Notion-Version", &self.version).send().await?;
    let status = response.status();
    let text = response.text().await?;
    trace!("Notion answered {}: {}", status, text);

    if !status.is_success() {
      let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| "Notion API error".to_string());
      return Err(PaperlinkError::ApiError(format!("{} {}", status.as_u16(), message)));
    }
    Ok(serde_json::from_str(&text)?)
  }

  /// Finds every database or page whose title matches `query`, most recently edited first.
  ///
  /// Follows `next_cursor` until Notion reports no more results.
  pub async fn search(&self, query: &str, search_for: SearchFor) -> Result<Vec<NpdInfo>> {
    let url = format!("{}/search", self.endpoint);
    let mut found = Vec::new();
    let mut start_cursor = None;

    loop {
      let body = SearchRequest {
        query,
        filter: SearchFilter { value: search_for, property: "object" },
        sort: SearchSort { direction: "descending", timestamp: "last_edited_time" },
        page_size: PAGE_SIZE,
        start_cursor,
      };
      debug!("Searching Notion via: {}", url);
      let page: SearchResponse = serde_json::from_value(self.send(self.client.post(&url).json(&body)).await?)?;
      found.extend(page.results.into_iter().map(NpdInfo::with_property_names));

      match page.next_cursor {
        Some(cursor) if page.has_more => start_cursor = Some(cursor),
        _ => break,
      }
    }

    info!("Notion search for {:?} found {} results", query, found.len());
    Ok(found)
  }

  /// Reads a database and its schema.
  pub async fn retrieve_database(&self, database_id: &str) -> Result<NpdInfo> {
    let url = format!("{}/databases/{}", self.endpoint, database_id);
    debug!("Fetching Notion database via: {}", url);
    let info: NpdInfo = serde_json::from_value(self.send(self.client.get(&url)).await?)?;
    Ok(info.with_property_names())
  }

  /// Reads a page and its properties.
  pub async fn retrieve_page(&self, page_id: &str) -> Result<NpdInfo> {
    let url = format!("{}/pages/{}", self.endpoint, page_id);
    debug!("Fetching Notion page via: {}", url);
    let info: NpdInfo = serde_json::from_value(self.send(self.client.get(&url)).await?)?;
    Ok(info.with_property_names())
  }

  /// Creates one page in `database_id` holding `properties`, returning the created page.
  pub async fn create_page(&self, database_id: &str, properties: &PdItem) -> Result<Value> {
    let url = format!("{}/pages", self.endpoint);
    let body = serde_json::json!({
      "parent": { "database_id": database_id },
      "properties": properties,
    });
    debug!("Creating page in {} with {} properties", database_id, properties.len());
    self.send(self.client.post(&url).json(&body)).await
  }

  /// Creates one page per item, in order.
  ///
  /// Every item is attempted; each gets its own result so one rejected record does not hide the
  /// outcome of the others.
  pub async fn upload_items(&self, database_id: &str, items: &[PdItem]) -> Vec<Result<Value>> {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
      let result = self.create_page(database_id, item).await;
      if let Err(e) = &result {
        warn!("Failed to create page in {}: {}", database_id, e);
      }
      results.push(result);
    }
    results
  }
}
