//! Bibliographic record scraping and destination-schema mapping.
//!
//! `paperlink` turns academic search pages and metadata APIs into one canonical
//! record shape, [`Work`](work::Work), and projects those records onto the column
//! schema of a user's destination database:
//!
//! - Per-source extractors for arXiv (listing and detail pages, backed by the Atom feed API),
//!   Google Scholar result lists and ScienceDirect search/article pages
//! - A DOI metadata client backed by Crossref
//! - Tolerant field extractors for dates, volumes, page ranges and journal references
//! - A deep merge for combining partial records describing the same work
//! - A schema-mapping engine that renders a [`Work`](work::Work) into column payloads and keeps
//!   saved column mappings in sync with a changing destination schema
//! - A local SQLite cache for destination schemas and mappings
//!
//! # Getting Started
//!
//! ```no_run
//! use paperlink::{
//!   document::StaticDocument,
//!   extractor::Extractors,
//!   mapping::transform_from_work_to_pd_item,
//!   prelude::*,
//! };
//!
//! # async fn example(mapping: paperlink::mapping::PdToWorkMapping) -> Result<(), PaperlinkError> {
//! let config = Config::default();
//! let extractors = Extractors::from_config(&config)?;
//!
//! let page = StaticDocument::new(
//!   "https://arxiv.org/search/?query=transformers",
//!   std::fs::read_to_string("search.html")?,
//! );
//!
//! match extractors.scrape_works(&page).await? {
//!   Some(works) =>
//!     for work in &works {
//!       let payload = transform_from_work_to_pd_item(&mapping, work);
//!       println!("{}", serde_json::to_string(&payload)?);
//!     },
//!   None => println!("No extractor applies to this page"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`work`]: The canonical record types
//! - [`extract`]: Atomic field extractors working on free text
//! - [`merge`]: Deep merge of partial records
//! - [`document`]: The page abstraction DOM extractors read from
//! - [`extractor`]: Source extractors and the dispatching entry point
//! - [`crossref`]: DOI metadata lookups
//! - [`mapping`]: Destination schemas, column mappings and payload rendering
//! - [`notion`]: HTTP client for the destination workspace API
//! - [`cache`]: Local persistence for schemas and mappings
//! - [`config`]: Endpoints, timeouts and paths
//! - [`prelude`]: Common traits and types for ergonomic imports

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::BTreeMap,
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
  time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, trace, warn};
use url::Url;
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod cache;
pub mod config;
pub mod crossref;
pub mod document;
pub mod error;
pub mod extract;
pub mod extractor;
pub mod mapping;
pub mod merge;
pub mod notion;
pub mod subjects;
pub mod work;

use crate::{config::Config, error::*, work::*};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use paperlink::prelude::*;
///
/// fn example() -> Result<Config, PaperlinkError> { Config::load_or_default(Config::default_path()) }
/// ```
pub mod prelude {
  pub use crate::{
    config::Config,
    document::Document,
    error::PaperlinkError,
    extractor::Extractor,
    work::{Work, WorkField},
  };
}
