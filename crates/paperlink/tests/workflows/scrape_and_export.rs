use super::*;

#[traced_test]
#[tokio::test]
async fn test_scrape_arxiv_listing() -> TestResult<()> {
  let (_server, config) = arxiv_server().await;
  let extractors = Extractors::from_config(&config)?;
  let page = StaticDocument::new("https://arxiv.org/search/?query=quantum+groups", fixture("arxiv_search.html"));

  let works = extractors.scrape_works(&page).await?.expect("arxiv applies to search listings");
  assert_eq!(works.len(), 2);

  let first = &works[0];
  assert_eq!(first.title, "Quantum Groups and Their Representations");
  assert_eq!(first.subjects, vec!["High Energy Physics - Theory", "Quantum Algebra"]);
  assert_eq!(
    serde_json::to_value(&first.publish_info)?,
    json!({
      "containerTitle": "Phys.Lett.",
      "volume": "B305",
      "pages": "115-118",
      "year": "1993",
      "month": "03",
      "day": "15"
    })
  );
  assert_eq!(works[1].url.as_deref(), Some("https://dx.doi.org/10.1000/xyz123"));
  assert!(logs_contain("Found 2 arXiv identifiers"));
  Ok(())
}

#[tokio::test]
async fn test_unknown_page_is_not_applicable() -> TestResult<()> {
  let extractors = Extractors::from_config(&Config::default())?;
  let page = StaticDocument::new("https://example.org/papers", "<html></html>");
  assert!(extractors.scrape_works(&page).await?.is_none());
  Ok(())
}

#[tokio::test]
async fn test_enrich_with_crossref_then_render() -> TestResult<()> {
  let (mut server, config) = arxiv_server().await;
  server
    .mock("GET", "/works/10.1000/xyz123")
    .with_status(200)
    .with_header("content-type", "application/json")
    .with_body(fixture("crossref_work.json"))
    .create_async()
    .await;

  let page = StaticDocument::new("https://arxiv.org/search/?query=quantum+groups", fixture("arxiv_search.html"));
  let works = Extractors::from_config(&config)?.scrape_works(&page).await?.unwrap_or_default();
  let preprint = &works[1];

  let crossref = CrossrefClient::from_config(&config)?;
  let published = crossref.fetch_work(preprint.doi.as_deref().unwrap()).await?.unwrap();
  let merged = merge(preprint, &published);

  // Scalars the preprint already had stay; the rest comes from the journal record.
  assert_eq!(merged.platform, Some(Platform::Arxiv));
  assert_eq!(merged.url, preprint.url);
  assert_eq!(merged.referenced_by_count, Some(7));
  assert_eq!(merged.subjects, vec!["Machine Learning", "Artificial Intelligence"]);
  let info = merged.publish_info.clone().unwrap();
  assert_eq!(info.year.as_deref(), Some("2021"));
  assert_eq!(info.month.as_deref(), Some("01"));
  assert_eq!(info.container_title.as_deref(), Some("Journal of Examples"));
  assert_eq!(info.pages.as_deref(), Some("45-67"));

  let schema: NpdInfo = serde_json::from_str(&fixture("notion_database.json"))?;
  let mapping = PdToWorkMapping::from([
    ("Name".to_string(), MappingEntry::new(schema.properties["Name"].clone(), WorkField::Title, "Title")),
    ("Tags".to_string(), MappingEntry::new(schema.properties["Tags"].clone(), WorkField::Subjects, "Subjects")),
    ("Venue".to_string(), MappingEntry::new(schema.properties["Venue"].clone(), WorkField::ContainerTitle, "Venue")),
    ("Published".to_string(), MappingEntry::new(schema.properties["Published"].clone(), WorkField::Date, "Date")),
    ("PDF".to_string(), MappingEntry::new(schema.properties["PDF"].clone(), WorkField::ResourceLink, "PDF")),
  ]);

  let item = serde_json::to_value(transform_from_work_to_pd_item(&mapping, &merged))?;
  assert_eq!(
    item,
    json!({
      "Name": { "title": [{ "text": { "content": "Second Entry" } }] },
      "Tags": { "multi_select": [{ "name": "Machine Learning" }, { "name": "Artificial Intelligence" }] },
      "Venue": { "select": { "name": "Journal of Examples" } },
      "Published": { "date": { "start": "2021-01-01" } }
    })
  );
  Ok(())
}

#[tokio::test]
async fn test_export_creates_one_page_per_work() -> TestResult<()> {
  let (mut server, config) = arxiv_server().await;
  let pages = server
    .mock("POST", "/pages")
    .match_header("authorization", "Bearer secret_test")
    .match_body(Matcher::PartialJson(json!({ "parent": { "database_id": "db-papers" } })))
    .with_status(200)
    .with_body(json!({ "object": "page", "id": "created" }).to_string())
    .expect(2)
    .create_async()
    .await;

  let page = StaticDocument::new("https://arxiv.org/search/?query=quantum+groups", fixture("arxiv_search.html"));
  let works = Extractors::from_config(&config)?.scrape_works(&page).await?.unwrap_or_default();

  let schema: NpdInfo = serde_json::from_str(&fixture("notion_database.json"))?;
  let mapping = PdToWorkMapping::from([(
    "Name".to_string(),
    MappingEntry::new(schema.properties["Name"].clone(), WorkField::Title, "Title"),
  )]);
  let items: Vec<_> = works.iter().map(|work| transform_from_work_to_pd_item(&mapping, work)).collect();

  let results = NotionClient::from_config(&config)?.upload_items("db-papers", &items).await;
  pages.assert_async().await;
  assert!(results.iter().all(Result::is_ok));
  Ok(())
}
