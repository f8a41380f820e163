//! Local persistence for destination schemas, column mappings and access tokens.
//!
//! Everything lives in one SQLite file (by default
//! [`Config::default_database_path`](crate::config::Config::default_database_path)). Records are
//! stored as JSON in their wire shape, so whatever the destination sent comes back unchanged.
//!
//! Each call is one read-then-write step. Nothing locks across calls: two processes doing a
//! read-modify-write on the same mapping at the same time can lose one of the updates.
//!
//! # Examples
//!
//! ```no_run
//! use paperlink::{cache::SchemaCache, notion::NotionClient, prelude::*};
//!
//! # async fn example() -> Result<(), PaperlinkError> {
//! let config = Config::default();
//! let cache = SchemaCache::open(&config.database_path).await?;
//! let notion = NotionClient::from_config(&config)?;
//!
//! let schema = notion.retrieve_database("a1b2c3").await?;
//! if let Some(saved) = cache.refresh_mapping(&schema).await? {
//!   println!("{} mapped columns", saved.mapping.len());
//! }
//! # Ok(())
//! # }
//! ```

use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use super::*;
use crate::{
  mapping::{are_same_properties, update_existed_pd_to_work_mapping, NpdInfo, PdToWorkMapping, SavedMapping},
  notion::AccessToken,
};

/// Which key to look an access token up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLookup<'a> {
  /// The integration's bot id
  Bot(&'a str),
  /// The workspace the token grants access to
  Workspace(&'a str),
}

/// Handle on the local cache database.
pub struct SchemaCache {
  /// Async SQLite connection handle
  conn: Connection,
}

impl SchemaCache {
  /// Opens the cache at `path`, creating the file, its directory and the tables as needed.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let conn = Connection::open(path.as_ref()).await?;

    conn
      .call(|conn| {
        conn.execute_batch(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations/init.sql")))?;
        Ok(())
      })
      .await?;

    debug!("Opened schema cache at {}", path.as_ref().display());
    Ok(Self { conn })
  }

  /// Merges a fresh search result into the cached list of pages and databases.
  ///
  /// Unknown entries are appended and changed entries replaced in place; entries missing from
  /// `new_list` are kept. Returns the entries that were new or differed from the cached copy,
  /// in `new_list` order.
  pub async fn update_pd_list(&self, new_list: &[NpdInfo]) -> Result<Vec<NpdInfo>> {
    let rows =
      new_list.iter().map(|pd| Ok((pd.id.clone(), serde_json::to_string(pd)?))).collect::<Result<Vec<_>>>()?;

    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut changed = Vec::new();
        {
          let mut select = tx.prepare_cached("SELECT info FROM pd_list WHERE id = ?1")?;
          let mut insert = tx.prepare_cached(
            "INSERT INTO pd_list (id, position, info)
             VALUES (?1, (SELECT COALESCE(MAX(position), -1) + 1 FROM pd_list), ?2)",
          )?;
          let mut update = tx.prepare_cached("UPDATE pd_list SET info = ?2 WHERE id = ?1")?;

          for (index, (id, info)) in rows.iter().enumerate() {
            let existing: Option<String> = select.query_row(params![id], |row| row.get(0)).optional()?;
            match existing {
              None => {
                insert.execute(params![id, info])?;
                changed.push(index);
              },
              Some(existing) => {
                if existing != *info {
                  changed.push(index);
                }
                update.execute(params![id, info])?;
              },
            }
          }
        }
        tx.commit()?;
        Ok(changed)
      })
      .await?;

    info!("{} of {} destinations are new or changed", changed.len(), new_list.len());
    Ok(changed.into_iter().map(|i| new_list[i].clone()).collect())
  }

  /// The cached list of pages and databases, in the order first seen.
  pub async fn pd_list(&self) -> Result<Vec<NpdInfo>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached("SELECT info FROM pd_list ORDER BY position")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
      })
      .await?;
    rows.iter().map(|info| serde_json::from_str(info).map_err(PaperlinkError::from)).collect()
  }

  /// Stores the schema of a destination, replacing any earlier copy.
  pub async fn save_pd_info(&self, info: &NpdInfo) -> Result<()> {
    let id = info.id.clone();
    let json = serde_json::to_string(info)?;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pd_info (id, info) VALUES (?1, ?2)
           ON CONFLICT(id) DO UPDATE SET info = excluded.info",
          params![id, json],
        )?;
        Ok(())
      })
      .await?;
    trace!("Cached schema of {}", info.id);
    Ok(())
  }

  /// The cached schema of one destination.
  pub async fn get_pd_info(&self, id: &str) -> Result<Option<NpdInfo>> {
    let id = id.to_string();
    let info: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row("SELECT info FROM pd_info WHERE id = ?1", params![id], |row| row.get(0)).optional()?)
      })
      .await?;
    info.map(|info| serde_json::from_str(&info).map_err(PaperlinkError::from)).transpose()
  }

  /// Every cached schema, by destination id.
  pub async fn all_pd_info(&self) -> Result<BTreeMap<String, NpdInfo>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached("SELECT id, info FROM pd_info")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
      })
      .await?;
    rows.into_iter().map(|(id, info)| Ok((id, serde_json::from_str(&info)?))).collect()
  }

  /// Stores the mapping of destination `pd_id`, stamped with the current time.
  pub async fn save_mapping(
    &self,
    pd_id: &str,
    mapping: PdToWorkMapping,
    workspace_id: Option<&str>,
  ) -> Result<SavedMapping> {
    let saved =
      SavedMapping { mapping, last_save_time: Utc::now(), workspace_id: workspace_id.map(String::from) };
    let json = serde_json::to_string(&saved)?;
    let (id, workspace_id, time) =
      (pd_id.to_string(), saved.workspace_id.clone(), saved.last_save_time.to_rfc3339());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO mappings (pd_id, workspace_id, last_save_time, saved) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(pd_id) DO UPDATE SET
             workspace_id = excluded.workspace_id,
             last_save_time = excluded.last_save_time,
             saved = excluded.saved",
          params![id, workspace_id, time, json],
        )?;
        Ok(())
      })
      .await?;

    debug!("Saved mapping of {} with {} columns", pd_id, saved.mapping.len());
    Ok(saved)
  }

  /// The saved mapping of one destination.
  pub async fn get_mapping(&self, pd_id: &str) -> Result<Option<SavedMapping>> {
    let id = pd_id.to_string();
    let saved: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row("SELECT saved FROM mappings WHERE pd_id = ?1", params![id], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;
    saved.map(|saved| serde_json::from_str(&saved).map_err(PaperlinkError::from)).transpose()
  }

  /// Every saved mapping, by destination id.
  pub async fn all_mappings(&self) -> Result<BTreeMap<String, SavedMapping>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached("SELECT pd_id, saved FROM mappings")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
      })
      .await?;
    rows.into_iter().map(|(id, saved)| Ok((id, serde_json::from_str(&saved)?))).collect()
  }

  /// Reconciles the saved mapping of a destination with its freshly fetched schema.
  ///
  /// The new schema always replaces the cached one. When a mapping exists and the compatible
  /// columns changed since the cached schema, the mapping is updated and saved again. Returns
  /// the mapping as it now stands, or `None` when the destination has none.
  pub async fn refresh_mapping(&self, info: &NpdInfo) -> Result<Option<SavedMapping>> {
    let previous = self.get_pd_info(&info.id).await?;
    self.save_pd_info(info).await?;

    let Some(mut saved) = self.get_mapping(&info.id).await? else {
      debug!("No mapping saved for {}", info.id);
      return Ok(None);
    };
    if previous.is_some_and(|previous| are_same_properties(&previous.properties, &info.properties)) {
      trace!("Schema of {} is unchanged", info.id);
      return Ok(Some(saved));
    }

    info!("Schema of {} changed, updating its mapping", info.id);
    update_existed_pd_to_work_mapping(&mut saved.mapping, info);
    self.save_mapping(&info.id, saved.mapping, saved.workspace_id.as_deref()).await.map(Some)
  }

  /// Stores an access token under its bot id.
  pub async fn save_access_token(&self, token: &AccessToken) -> Result<()> {
    let (bot_id, workspace_id) = (token.bot_id.clone(), token.workspace_id.clone());
    let json = serde_json::to_string(token)?;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO access_tokens (bot_id, workspace_id, token) VALUES (?1, ?2, ?3)
           ON CONFLICT(bot_id) DO UPDATE SET workspace_id = excluded.workspace_id, token = excluded.token",
          params![bot_id, workspace_id, json],
        )?;
        Ok(())
      })
      .await?;
    debug!("Saved access token for workspace {}", token.workspace_id);
    Ok(())
  }

  /// Looks an access token up by bot id or by workspace id.
  pub async fn get_access_token(&self, lookup: TokenLookup<'_>) -> Result<Option<AccessToken>> {
    let (sql, key) = match lookup {
      TokenLookup::Bot(id) => ("SELECT token FROM access_tokens WHERE bot_id = ?1", id.to_string()),
      TokenLookup::Workspace(id) =>
        ("SELECT token FROM access_tokens WHERE workspace_id = ?1 ORDER BY bot_id LIMIT 1", id.to_string()),
    };
    let token: Option<String> = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, params![key], |row| row.get(0)).optional()?))
      .await?;
    token.map(|token| serde_json::from_str(&token).map_err(PaperlinkError::from)).transpose()
  }

  /// Every stored access token, by bot id.
  pub async fn all_access_tokens(&self) -> Result<BTreeMap<String, AccessToken>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached("SELECT bot_id, token FROM access_tokens")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
      })
      .await?;
    rows.into_iter().map(|(id, token)| Ok((id, serde_json::from_str(&token)?))).collect()
  }
}
