use super::*;

fn database(id: &str, properties: Value) -> Value {
  json!({ "object": "database", "id": id, "properties": properties })
}

#[traced_test]
#[tokio::test]
async fn test_schema_refresh_reconciles_saved_mapping() -> TestResult<()> {
  let (mut server, config) = arxiv_server().await;
  let (config, _dir) = with_temp_cache(config);
  let cache = SchemaCache::open(&config.database_path).await?;

  let original: NpdInfo = serde_json::from_str(&fixture("notion_database.json"))?;
  cache.save_pd_info(&original).await?;
  let mapping = PdToWorkMapping::from([
    ("Name".to_string(), MappingEntry::new(original.properties["Name"].clone(), WorkField::Title, "Title")),
    ("Venue".to_string(), MappingEntry::new(original.properties["Venue"].clone(), WorkField::ContainerTitle, "Venue")),
    ("PDF".to_string(), MappingEntry::new(original.properties["PDF"].clone(), WorkField::ResourceLink, "PDF")),
  ]);
  cache.save_mapping("db-papers", mapping, Some("ws-1")).await?;

  // Venue became free text and PDF was deleted.
  server
    .mock("GET", "/databases/db-papers")
    .match_header("notion-version", "2022-06-28")
    .with_status(200)
    .with_body(
      database("db-papers", json!({
        "Name": { "id": "title", "name": "Name", "type": "title", "title": {} },
        "Venue": { "id": "v1", "name": "Venue", "type": "rich_text", "rich_text": {} },
        "Notes": { "id": "n1", "name": "Notes", "type": "rich_text", "rich_text": {} }
      }))
      .to_string(),
    )
    .create_async()
    .await;

  let notion = NotionClient::from_config(&config)?;
  let fresh = notion.retrieve_database("db-papers").await?;
  let saved = cache.refresh_mapping(&fresh).await?.expect("a mapping was saved");

  assert_eq!(saved.mapping.keys().map(String::as_str).collect::<Vec<_>>(), vec!["Name", "Venue"]);
  assert_eq!(saved.mapping["Venue"].pd_property.property_type.as_str(), "rich_text");
  assert_eq!(saved.mapping["Venue"].work_property_name, WorkField::ContainerTitle);
  assert_eq!(saved.workspace_id.as_deref(), Some("ws-1"));
  assert_eq!(cache.get_pd_info("db-papers").await?, Some(fresh));
  assert!(logs_contain("Schema of db-papers changed"));
  Ok(())
}

#[tokio::test]
async fn test_search_results_update_cached_list() -> TestResult<()> {
  let (mut server, config) = arxiv_server().await;
  let (config, _dir) = with_temp_cache(config);
  let cache = SchemaCache::open(&config.database_path).await?;

  server
    .mock("POST", "/search")
    .with_status(200)
    .with_body(
      json!({
        "results": [
          serde_json::from_str::<Value>(&fixture("notion_database.json"))?,
          database("db-empty", json!({}))
        ],
        "has_more": false,
        "next_cursor": null
      })
      .to_string(),
    )
    .expect(2)
    .create_async()
    .await;

  let notion = NotionClient::from_config(&config)?;
  let found = notion.search("Papers", SearchFor::Database).await?;
  assert_eq!(cache.update_pd_list(&found).await?.len(), 2);

  let again = notion.search("Papers", SearchFor::Database).await?;
  assert!(cache.update_pd_list(&again).await?.is_empty());
  assert_eq!(cache.pd_list().await?.iter().map(|pd| pd.id.as_str()).collect::<Vec<_>>(), vec![
    "db-papers",
    "db-empty"
  ]);
  Ok(())
}
