//! Integration tests for the paperlink CLI commands.
//!
//! Every test writes its own configuration into a temporary directory, so nothing touches the
//! user's config or cache, and remote services are mocked.

use std::{fs, path::PathBuf};

use assert_cmd::Command;
use mockito::Server;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

// Helper function to create a clean command instance
fn paperlink() -> Command { Command::cargo_bin("paperlink").unwrap() }

// Helper to write a config file pointing every endpoint and the cache into a temp dir
fn temp_config(endpoint: &str) -> (TempDir, PathBuf) {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.toml");
  fs::write(
    &config,
    format!(
      "arxiv_endpoint = \"{endpoint}/api/query\"\ncrossref_endpoint = \"{endpoint}/works\"\n\
       notion_endpoint = \"{endpoint}\"\nnotion_token = \"secret_cli\"\ndatabase_path = \"{}\"\n",
      dir.path().join("cache.db").display()
    ),
  )
  .unwrap();
  (dir, config)
}

const MAPPING: &str = r#"{
  "Name": {
    "PDPropertyName": "Name",
    "PDProperty": { "id": "title", "name": "Name", "type": "title" },
    "workPropertyName": "title",
    "workPropertyLabel": "Title"
  },
  "Tags": {
    "PDPropertyName": "Tags",
    "PDProperty": { "name": "Tags", "type": "multi_select" },
    "workPropertyName": "subjects",
    "workPropertyLabel": "Subjects"
  }
}"#;

const WORKS: &str = r#"[
  { "title": "Attention Is All You Need", "subjects": ["cs.AI", "cs.LG"] },
  { "title": "Deep Learning" }
]"#;

const SCHOLAR_PAGE: &str = r#"<html><body>
  <div class="gs_r gs_or gs_scl"><div class="gs_ri">
    <h3 class="gs_rt"><a href="https://example.org/attention">Attention is all you need</a></h3>
    <div class="gs_a">A Vaswani, N Shazeer - Advances in neural information processing systems, 2017 - neurips.cc</div>
  </div></div>
</body></html>"#;

#[test]
fn test_help_lists_commands() {
  paperlink()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("scrape"))
    .stdout(predicate::str::contains("export"))
    .stdout(predicate::str::contains("schema"));
}

#[test]
fn test_render_prints_payloads() {
  let (dir, config) = temp_config("http://127.0.0.1:1");
  fs::write(dir.path().join("mapping.json"), MAPPING).unwrap();
  fs::write(dir.path().join("works.json"), WORKS).unwrap();

  let output = paperlink()
    .arg("--config")
    .arg(&config)
    .arg("render")
    .arg("--mapping")
    .arg(dir.path().join("mapping.json"))
    .arg("--works")
    .arg(dir.path().join("works.json"))
    .output()
    .unwrap();
  assert!(output.status.success());

  let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(items[0]["Tags"]["multi_select"][1]["name"], "cs.LG");
  assert_eq!(items[1]["Name"]["title"][0]["text"]["content"], "Deep Learning");
  assert!(items[1].get("Tags").is_none());
}

#[test]
fn test_render_rejects_malformed_mapping() {
  let (dir, config) = temp_config("http://127.0.0.1:1");
  fs::write(dir.path().join("mapping.json"), "{ not json").unwrap();
  fs::write(dir.path().join("works.json"), WORKS).unwrap();

  paperlink()
    .arg("--config")
    .arg(&config)
    .arg("render")
    .arg("--mapping")
    .arg(dir.path().join("mapping.json"))
    .arg("--works")
    .arg(dir.path().join("works.json"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn test_scrape_saved_scholar_page() {
  let (dir, config) = temp_config("http://127.0.0.1:1");
  let page = dir.path().join("page.html");
  fs::write(&page, SCHOLAR_PAGE).unwrap();

  paperlink()
    .arg("--config")
    .arg(&config)
    .arg("scrape")
    .arg("--url")
    .arg("https://scholar.google.com/scholar?q=attention")
    .arg("--html")
    .arg(&page)
    .assert()
    .success()
    .stdout(predicate::str::contains("\"title\": \"Attention is all you need\""))
    .stdout(predicate::str::contains("\"platform\": \"GoogleScholar\""))
    .stderr(predicate::str::contains("Found 1 records"));
}

#[test]
fn test_scrape_unknown_site() {
  let (dir, config) = temp_config("http://127.0.0.1:1");
  let page = dir.path().join("page.html");
  fs::write(&page, "<html></html>").unwrap();

  paperlink()
    .arg("--config")
    .arg(&config)
    .arg("scrape")
    .arg("--url")
    .arg("https://example.org/")
    .arg("--html")
    .arg(&page)
    .assert()
    .success()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("No extractor applies to https://example.org/"));
}

#[test]
fn test_init_writes_config_once() {
  let dir = tempdir().unwrap();
  let config = dir.path().join("nested").join("config.toml");

  paperlink()
    .arg("--config")
    .arg(&config)
    .arg("init")
    .arg("--notion-token")
    .arg("secret_init")
    .assert()
    .success()
    .stderr(predicate::str::contains("Configuration written"));
  assert!(fs::read_to_string(&config).unwrap().contains("notion_token = \"secret_init\""));

  paperlink()
    .arg("--config")
    .arg(&config)
    .arg("init")
    .assert()
    .success()
    .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_doi_lookup() {
  let mut server = Server::new();
  let mock = server
    .mock("GET", "/works/10.1000/xyz123")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(r#"{"status":"ok","message":{"title":["A Journal Article"],"DOI":"10.1000/xyz123"}}"#)
    .create();
  let (_dir, config) = temp_config(&server.url());

  paperlink()
    .arg("--config")
    .arg(&config)
    .arg("doi")
    .arg("10.1000/xyz123")
    .assert()
    .success()
    .stdout(predicate::str::contains("A Journal Article"));
  mock.assert();
}

#[test]
fn test_doi_without_record() {
  let mut server = Server::new();
  server.mock("GET", "/works/10.9999/missing").with_status(404).create();
  let (_dir, config) = temp_config(&server.url());

  paperlink()
    .arg("--config")
    .arg(&config)
    .arg("doi")
    .arg("10.9999/missing")
    .assert()
    .success()
    .stderr(predicate::str::contains("No Crossref record for 10.9999/missing"));
}

#[test]
fn test_saved_mapping_drives_export() {
  let mut server = Server::new();
  let pages = server
    .mock("POST", "/pages")
    .match_header("authorization", "Bearer secret_cli")
    .with_status(200)
    .with_body(r#"{"object":"page","id":"created"}"#)
    .expect(2)
    .create();
  let (dir, config) = temp_config(&server.url());
  fs::write(dir.path().join("mapping.json"), MAPPING).unwrap();
  fs::write(dir.path().join("works.json"), WORKS).unwrap();

  paperlink()
    .arg("--config")
    .arg(&config)
    .args(["schema", "map", "db-papers", "--mapping"])
    .arg(dir.path().join("mapping.json"))
    .assert()
    .success()
    .stderr(predicate::str::contains("Saved mapping of 2 columns for db-papers"));

  paperlink()
    .arg("--config")
    .arg(&config)
    .args(["schema", "show", "db-papers"])
    .assert()
    .success()
    .stdout(predicate::str::contains("lastSaveTime"));

  paperlink()
    .arg("--config")
    .arg(&config)
    .args(["export", "--database", "db-papers", "--works"])
    .arg(dir.path().join("works.json"))
    .assert()
    .success()
    .stderr(predicate::str::contains("Exported 2 records"));
  pages.assert();
}

#[test]
fn test_export_without_mapping_fails() {
  let (dir, config) = temp_config("http://127.0.0.1:1");
  fs::write(dir.path().join("works.json"), WORKS).unwrap();

  paperlink()
    .arg("--config")
    .arg(&config)
    .args(["export", "--database", "db-unknown", "--works"])
    .arg(dir.path().join("works.json"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("No mapping for database db-unknown"));
}
