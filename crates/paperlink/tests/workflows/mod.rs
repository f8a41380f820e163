use super::*;

mod scrape_and_export;
mod schema_sync;
