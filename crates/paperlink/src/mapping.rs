//! Destination schemas, column mappings and payload rendering.
//!
//! A destination database ("PD", page or database) has a schema: a set of named, typed columns.
//! A user links some of those columns to [`Work`] fields, producing a [`PdToWorkMapping`]. This
//! module renders a [`Work`] through such a mapping into the column payloads the destination API
//! accepts, and keeps a saved mapping consistent when the destination schema changes.
//!
//! # Examples
//!
//! ```
//! use paperlink::{
//!   mapping::{transform_from_work_to_pd_item, MappingEntry, NProperty, PdToWorkMapping, PropertyType},
//!   work::{Work, WorkField},
//! };
//!
//! let tags = NProperty::new("Tags", PropertyType::MultiSelect);
//! let mut mapping = PdToWorkMapping::new();
//! mapping.insert("Tags".to_string(), MappingEntry::new(tags, WorkField::Subjects, "Subjects"));
//!
//! let work = Work { subjects: vec!["cs.AI".into(), "cs.LG".into()], ..Work::new("A title") };
//! let payload = transform_from_work_to_pd_item(&mapping, &work);
//! assert_eq!(
//!   serde_json::to_value(&payload).unwrap(),
//!   serde_json::json!({ "Tags": { "multi_select": [{ "name": "cs.AI" }, { "name": "cs.LG" }] } })
//! );
//! ```

use crate::extract::extract_date_nums_from_str;

use super::*;

/// Longest text a rich-text column accepts.
pub const RICH_TEXT_LIMIT: usize = 2000;
/// Longest display name of an external file reference.
pub const FILE_NAME_LIMIT: usize = 100;

/// Type of a destination column.
///
/// The named variants are the types a payload can be rendered for. Everything else the
/// destination knows about (formulas, relations, rollups, people, ...) is kept verbatim in
/// [`PropertyType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
  /// `rich_text`
  RichText,
  /// `title`
  Title,
  /// `select`
  Select,
  /// `status`
  Status,
  /// `multi_select`
  MultiSelect,
  /// `url`
  Url,
  /// `checkbox`
  Checkbox,
  /// `number`
  Number,
  /// `date`
  Date,
  /// `files`
  Files,
  /// Any other destination type
  Other(String),
}

impl PropertyType {
  /// The destination's name for this type.
  pub fn as_str(&self) -> &str {
    match self {
      PropertyType::RichText => "rich_text",
      PropertyType::Title => "title",
      PropertyType::Select => "select",
      PropertyType::Status => "status",
      PropertyType::MultiSelect => "multi_select",
      PropertyType::Url => "url",
      PropertyType::Checkbox => "checkbox",
      PropertyType::Number => "number",
      PropertyType::Date => "date",
      PropertyType::Files => "files",
      PropertyType::Other(other) => other,
    }
  }
}

impl From<String> for PropertyType {
  fn from(s: String) -> Self {
    match s.as_str() {
      "rich_text" => PropertyType::RichText,
      "title" => PropertyType::Title,
      "select" => PropertyType::Select,
      "status" => PropertyType::Status,
      "multi_select" => PropertyType::MultiSelect,
      "url" => PropertyType::Url,
      "checkbox" => PropertyType::Checkbox,
      "number" => PropertyType::Number,
      "date" => PropertyType::Date,
      "files" => PropertyType::Files,
      _ => PropertyType::Other(s),
    }
  }
}

impl From<PropertyType> for String {
  fn from(t: PropertyType) -> Self { t.as_str().to_string() }
}

impl Display for PropertyType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// One column of a destination schema.
///
/// Type-specific configuration the destination sends along (select options, number formats,
/// ...) is not needed for rendering and is dropped on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NProperty {
  /// Destination-assigned column id
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:            Option<String>,
  /// Column name; page properties arrive without one, see [`NpdInfo::with_property_names`]
  #[serde(default)]
  pub name:          String,
  /// Column type
  #[serde(rename = "type")]
  pub property_type: PropertyType,
}

impl NProperty {
  /// Column without a destination id.
  pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
    Self { id: None, name: name.into(), property_type }
  }
}

/// Column name to column definition.
pub type Properties = BTreeMap<String, NProperty>;

/// A destination page or database and its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpdInfo {
  /// Destination id
  pub id:               String,
  /// `"database"` or `"page"`
  #[serde(default = "default_object")]
  pub object:           String,
  /// Rich-text title segments as sent by the destination
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub title:            Vec<Value>,
  /// Link to the destination in the browser
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url:              Option<String>,
  /// Last edit timestamp as sent by the destination
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_edited_time: Option<String>,
  /// Columns by name
  #[serde(default)]
  pub properties:       Properties,
}

/// Objects without a declared kind are databases.
fn default_object() -> String { "database".to_string() }

impl NpdInfo {
  /// Database with the given columns and no title.
  pub fn new(id: impl Into<String>, properties: impl IntoIterator<Item = NProperty>) -> Self {
    Self {
      id:               id.into(),
      object:           default_object(),
      title:            Vec::new(),
      url:              None,
      last_edited_time: None,
      properties:       properties.into_iter().map(|p| (p.name.clone(), p)).collect(),
    }
  }

  /// Names every column after its key where the destination left the name out.
  pub fn with_property_names(mut self) -> Self {
    for (key, property) in self.properties.iter_mut() {
      if property.name.is_empty() {
        property.name = key.clone();
      }
    }
    self
  }

  /// The title as plain text.
  pub fn plain_title(&self) -> String {
    self.title.iter().filter_map(|segment| segment.get("plain_text").and_then(Value::as_str)).collect()
  }
}

/// Link from one destination column to one [`Work`] field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
  /// Name of the linked column
  #[serde(rename = "PDPropertyName")]
  pub pd_property_name:    String,
  /// Column definition at the time of linking, or of the last reconciliation
  #[serde(rename = "PDProperty")]
  pub pd_property:         NProperty,
  /// Linked record field
  pub work_property_name:  WorkField,
  /// Label shown to the user for the linked field
  pub work_property_label: String,
}

impl MappingEntry {
  /// Links `property` to `field`.
  pub fn new(property: NProperty, field: WorkField, label: impl Into<String>) -> Self {
    Self {
      pd_property_name: property.name.clone(),
      pd_property: property,
      work_property_name: field,
      work_property_label: label.into(),
    }
  }
}

/// Column name to the record field it is linked to.
pub type PdToWorkMapping = BTreeMap<String, MappingEntry>;

/// A mapping as persisted, with the time it was last saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMapping {
  /// The mapping
  pub mapping:        PdToWorkMapping,
  /// When the mapping was last written
  pub last_save_time: DateTime<Utc>,
  /// Workspace the destination belongs to
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub workspace_id:   Option<String>,
}

/// The value of a [`Work`] field, once resolved for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
  /// A string
  Text(String),
  /// A count
  Number(f64),
  /// A list of strings
  TextList(Vec<String>),
  /// A flag
  Bool(bool),
}

/// Rich-text segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichText {
  /// Segment body
  pub text: TextContent,
}

/// Body of a [`RichText`] segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
  /// The text
  pub content: String,
}

/// Named option of a select-like column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
  /// Option name
  pub name: String,
}

/// Value of a date column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
  /// ISO 8601 date
  pub start: String,
}

/// File hosted outside the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReference {
  /// Display name
  pub name:     String,
  /// Where the file lives
  pub external: ExternalUrl,
}

/// Location of an external file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrl {
  /// Download URL
  pub url: String,
}

/// Payload for one column, tagged by column type.
///
/// Serializes in the destination's shape, e.g. `{"select": {"name": "Preprint"}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
  /// `rich_text` column
  RichText(Vec<RichText>),
  /// `title` column
  Title(Vec<RichText>),
  /// `select` column
  Select(SelectOption),
  /// `status` column
  Status(SelectOption),
  /// `multi_select` column
  MultiSelect(Vec<SelectOption>),
  /// `url` column
  Url(FieldValue),
  /// `checkbox` column
  Checkbox(FieldValue),
  /// `number` column
  Number(f64),
  /// `date` column
  Date(DateValue),
  /// `files` column
  Files(Vec<FileReference>),
}

/// Column name to column payload, for one record.
pub type PdItem = BTreeMap<String, PropertyValue>;

/// Keeps at most `limit` characters of `s`.
fn truncate(s: &str, limit: usize) -> String { s.chars().take(limit).collect() }

/// `year-month-day` from the record's publication info, with month and day defaulting to
/// `01`. `None` without a year or when the result is not a calendar date.
fn extract_date(work: &Work) -> Option<String> {
  let info = work.publish_info.as_ref()?;
  let year = info.year.as_deref()?;
  let month = info.month.as_deref().unwrap_or("01");
  let day = info.day.as_deref().unwrap_or("01");
  extract_date_nums_from_str(&format!("{year}-{month}-{day}")).map(|date| date.to_iso())
}

/// Resolves a record field to a renderable value.
///
/// Nested publication fields and the first digital resource are reached through; authors are
/// projected onto their full names. Structured fields with no scalar form resolve to `None`,
/// as does anything the record does not carry.
pub fn resolve_field(work: &Work, field: WorkField) -> Option<FieldValue> {
  let text = |s: &Option<String>| s.clone().map(FieldValue::Text);
  let list = |l: &[String]| (!l.is_empty()).then(|| FieldValue::TextList(l.to_vec()));
  let info = work.publish_info.as_ref();
  let resource = work.digital_resources.first();

  match field {
    WorkField::Title => Some(FieldValue::Text(work.title.clone())),
    WorkField::Abstract => text(&work.abstract_text),
    WorkField::Type => work.work_type.map(|t| FieldValue::Text(t.to_string())),
    WorkField::Subtitle => text(&work.subtitle),
    WorkField::Subjects => list(&work.subjects),
    WorkField::Isbn => text(&work.isbn),
    WorkField::Doi => text(&work.doi),
    WorkField::Url => text(&work.url),
    WorkField::Platform => work.platform.map(|p| FieldValue::Text(p.to_string())),
    WorkField::PlatformId => text(&work.platform_id),
    WorkField::ReferencedByCount => work.referenced_by_count.map(|n| FieldValue::Number(n as f64)),
    WorkField::Authors => {
      let names: Vec<String> = work.authors.iter().filter_map(|a| a.full_name.clone()).collect();
      list(&names)
    },
    WorkField::AuthorComments => list(&work.author_comments),
    WorkField::Highlights => list(&work.highlights),
    WorkField::Publisher => info.and_then(|i| text(&i.publisher)),
    WorkField::ContainerTitle => info.and_then(|i| text(&i.container_title)),
    WorkField::Issue => info.and_then(|i| text(&i.issue)),
    WorkField::Volume => info.and_then(|i| text(&i.volume)),
    WorkField::Pages => info.and_then(|i| text(&i.pages)),
    WorkField::Year => info.and_then(|i| text(&i.year)),
    WorkField::Month => info.and_then(|i| text(&i.month)),
    WorkField::Day => info.and_then(|i| text(&i.day)),
    WorkField::ResourceLink => resource.map(|r| FieldValue::Text(r.resource_link.clone())),
    WorkField::ContentType => resource.and_then(|r| text(&r.content_type)),
    WorkField::Date => extract_date(work).map(FieldValue::Text),
    WorkField::PublishInfo | WorkField::DigitalResources | WorkField::ClinicalTrial => None,
  }
}

/// Renders one resolved value for a column of the given type.
///
/// `Ok(None)` when the value has no representation in that column type (a list in a date
/// column, an empty string in a text column, ...).
///
/// # Errors
///
/// Fails with [`PaperlinkError::UnsupportedPropertyType`] for column types outside the render
/// union.
pub fn render_property(property: &NProperty, value: FieldValue, work: &Work) -> Result<Option<PropertyValue>> {
  let rendered = match &property.property_type {
    PropertyType::RichText | PropertyType::Title => {
      let content = match value {
        FieldValue::Text(s) => truncate(&s, RICH_TEXT_LIMIT),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::TextList(l) => truncate(&l.join(";\n"), RICH_TEXT_LIMIT),
        FieldValue::Bool(_) => {
          warn!("Column {} is {} and cannot hold a checkbox value", property.name, property.property_type);
          return Ok(None);
        },
      };
      (!content.is_empty()).then(|| {
        let segments = vec![RichText { text: TextContent { content } }];
        match property.property_type {
          PropertyType::Title => PropertyValue::Title(segments),
          _ => PropertyValue::RichText(segments),
        }
      })
    },
    PropertyType::Select | PropertyType::Status => {
      let name = match value {
        FieldValue::Text(s) => Some(s),
        FieldValue::Number(n) => Some(n.to_string()),
        FieldValue::TextList(_) | FieldValue::Bool(_) => None,
      };
      name.map(|name| match property.property_type {
        PropertyType::Status => PropertyValue::Status(SelectOption { name }),
        _ => PropertyValue::Select(SelectOption { name }),
      })
    },
    PropertyType::MultiSelect => match value {
      FieldValue::TextList(l) =>
        Some(PropertyValue::MultiSelect(l.into_iter().map(|name| SelectOption { name }).collect())),
      _ => None,
    },
    PropertyType::Url => Some(PropertyValue::Url(value)),
    PropertyType::Checkbox => Some(PropertyValue::Checkbox(value)),
    PropertyType::Number => match value {
      FieldValue::Number(n) => Some(PropertyValue::Number(n)),
      FieldValue::Text(s) => s.trim().parse().ok().map(PropertyValue::Number),
      FieldValue::TextList(_) | FieldValue::Bool(_) => None,
    },
    PropertyType::Date => match value {
      FieldValue::Text(start) => Some(PropertyValue::Date(DateValue { start })),
      _ => None,
    },
    PropertyType::Files => match value {
      FieldValue::Text(url) => Some(PropertyValue::Files(vec![FileReference {
        name:     truncate(&work.title, FILE_NAME_LIMIT),
        external: ExternalUrl { url },
      }])),
      _ => None,
    },
    PropertyType::Other(other) => return Err(PaperlinkError::UnsupportedPropertyType(other.clone())),
  };
  Ok(rendered)
}

/// Renders `work` into the payload for every mapped column whose field resolves.
///
/// Columns whose field the record does not carry, or whose value has no form in the column's
/// type, are left out of the payload.
pub fn transform_from_work_to_pd_item(mapping: &PdToWorkMapping, work: &Work) -> PdItem {
  let mut item = PdItem::new();
  for (column, entry) in mapping {
    let Some(value) = resolve_field(work, entry.work_property_name) else {
      trace!("\"{}\" has no {:?} for column {}", work.title, entry.work_property_name, column);
      continue;
    };
    match render_property(&entry.pd_property, value, work) {
      Ok(Some(rendered)) => {
        item.insert(column.clone(), rendered);
      },
      Ok(None) => trace!("Value for column {} does not fit type {}", column, entry.pd_property.property_type),
      Err(e) => warn!("Skipping column {}: {}", column, e),
    }
  }
  item
}

/// Whether a column of this type can receive a record field at all.
pub fn is_compatible_pd_property_type(property: &NProperty) -> bool {
  matches!(
    property.property_type,
    PropertyType::Date
      | PropertyType::Files
      | PropertyType::MultiSelect
      | PropertyType::Number
      | PropertyType::RichText
      | PropertyType::Select
      | PropertyType::Title
      | PropertyType::Url
  )
}

/// Whether two schemas agree on every compatible column's name and type.
///
/// Columns of incompatible types are ignored on both sides.
pub fn are_same_properties(old: &Properties, new: &Properties) -> bool {
  let compatible = |properties: &Properties| -> Vec<(String, PropertyType)> {
    properties
      .values()
      .filter(|p| is_compatible_pd_property_type(p))
      .map(|p| (p.name.clone(), p.property_type.clone()))
      .collect()
  };
  let (old, new) = (compatible(old), compatible(new));
  if old.len() != new.len() {
    return false;
  }
  old.into_iter().collect::<BTreeMap<_, _>>() == new.into_iter().collect::<BTreeMap<_, _>>()
}

/// Brings a saved mapping in line with a changed schema, in place.
///
/// Entries for columns the schema no longer has are removed. Entries for columns whose type
/// changed take the new column definition but keep their linked field, even when that field no
/// longer renders into the new type. New columns stay unmapped.
pub fn update_existed_pd_to_work_mapping<'a>(
  mapping: &'a mut PdToWorkMapping,
  new_info: &NpdInfo,
) -> &'a mut PdToWorkMapping {
  mapping.retain(|column, _| {
    let kept = new_info.properties.contains_key(column);
    if !kept {
      debug!("Column {} was removed from {}, dropping its mapping", column, new_info.id);
    }
    kept
  });

  for (column, property) in &new_info.properties {
    if let Some(entry) = mapping.get_mut(column) {
      if entry.pd_property.property_type != property.property_type {
        debug!(
          "Column {} of {} changed type from {} to {}",
          column, new_info.id, entry.pd_property.property_type, property.property_type
        );
        entry.pd_property = property.clone();
      }
    }
  }
  mapping
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn entry(name: &str, property_type: PropertyType, field: WorkField) -> (String, MappingEntry) {
    (name.to_string(), MappingEntry::new(NProperty::new(name, property_type), field, format!("{field:?}")))
  }

  fn sample_work() -> Work {
    Work {
      title: "Attention Is All You Need".into(),
      subjects: vec!["cs.AI".into(), "cs.LG".into()],
      url: Some("https://arxiv.org/abs/1706.03762".into()),
      referenced_by_count: Some(42),
      publish_info: Some(PublishInfo {
        container_title: Some("NeurIPS".into()),
        year: Some("2017".into()),
        month: Some("06".into()),
        ..Default::default()
      }),
      authors: vec![Author::from_full_name("Ashish Vaswani"), Author::from_full_name("Noam Shazeer")],
      digital_resources: vec![DigitalResource::new("https://arxiv.org/pdf/1706.03762", "application/pdf")],
      ..Default::default()
    }
  }

  #[test]
  fn test_property_type_names() {
    let property: NProperty = serde_json::from_value(json!({
      "id": "%3AbC", "name": "Tags", "type": "multi_select",
      "multi_select": { "options": [] }
    }))
    .unwrap();
    assert_eq!(property.property_type, PropertyType::MultiSelect);
    assert_eq!(property.id.as_deref(), Some("%3AbC"));

    let formula: NProperty = serde_json::from_value(json!({ "name": "F", "type": "formula" })).unwrap();
    assert_eq!(formula.property_type, PropertyType::Other("formula".into()));
    assert_eq!(serde_json::to_value(&formula).unwrap(), json!({ "name": "F", "type": "formula" }));
  }

  #[test]
  fn test_multi_select_keeps_subject_order() {
    let mapping = PdToWorkMapping::from([entry("Tags", PropertyType::MultiSelect, WorkField::Subjects)]);
    let item = transform_from_work_to_pd_item(&mapping, &sample_work());
    assert_eq!(
      item["Tags"],
      PropertyValue::MultiSelect(vec![SelectOption { name: "cs.AI".into() }, SelectOption {
        name: "cs.LG".into(),
      }])
    );
  }

  #[test]
  fn test_render_table() {
    let mapping = PdToWorkMapping::from([
      entry("Name", PropertyType::Title, WorkField::Title),
      entry("Authors", PropertyType::RichText, WorkField::Authors),
      entry("Venue", PropertyType::Select, WorkField::ContainerTitle),
      entry("Link", PropertyType::Url, WorkField::Url),
      entry("Citations", PropertyType::Number, WorkField::ReferencedByCount),
      entry("Year", PropertyType::Number, WorkField::Year),
      entry("Published", PropertyType::Date, WorkField::Date),
      entry("PDF", PropertyType::Files, WorkField::ResourceLink),
      entry("Cites", PropertyType::RichText, WorkField::ReferencedByCount),
    ]);

    let item = transform_from_work_to_pd_item(&mapping, &sample_work());
    assert_eq!(
      serde_json::to_value(&item).unwrap(),
      json!({
        "Name": { "title": [{ "text": { "content": "Attention Is All You Need" } }] },
        "Authors": { "rich_text": [{ "text": { "content": "Ashish Vaswani;\nNoam Shazeer" } }] },
        "Venue": { "select": { "name": "NeurIPS" } },
        "Link": { "url": "https://arxiv.org/abs/1706.03762" },
        "Citations": { "number": 42.0 },
        "Year": { "number": 2017.0 },
        "Published": { "date": { "start": "2017-06-01" } },
        "PDF": { "files": [{
          "name": "Attention Is All You Need",
          "external": { "url": "https://arxiv.org/pdf/1706.03762" }
        }] },
        "Cites": { "rich_text": [{ "text": { "content": "42" } }] },
      })
    );
  }

  #[test]
  fn test_unresolvable_columns_are_omitted() {
    let mapping = PdToWorkMapping::from([
      entry("DOI", PropertyType::RichText, WorkField::Doi),
      entry("Issue", PropertyType::RichText, WorkField::Issue),
      entry("Tags", PropertyType::Date, WorkField::Subjects),
      entry("Info", PropertyType::RichText, WorkField::PublishInfo),
    ]);
    assert!(transform_from_work_to_pd_item(&mapping, &sample_work()).is_empty());

    let bare = Work::new("Untitled venue");
    let date = PdToWorkMapping::from([entry("Published", PropertyType::Date, WorkField::Date)]);
    assert!(transform_from_work_to_pd_item(&date, &bare).is_empty());
  }

  #[traced_test]
  #[test]
  fn test_unsupported_type_is_skipped() {
    let mapping = PdToWorkMapping::from([
      entry("Name", PropertyType::Title, WorkField::Title),
      entry("Formula", PropertyType::Other("formula".into()), WorkField::Title),
    ]);
    let item = transform_from_work_to_pd_item(&mapping, &sample_work());
    assert_eq!(item.keys().collect::<Vec<_>>(), vec!["Name"]);
    assert!(logs_contain("Unsupported destination property type: formula"));
  }

  #[test]
  fn test_truncation() {
    let long = "é".repeat(RICH_TEXT_LIMIT + 10);
    let work = Work { abstract_text: Some(long), ..Work::new("x".repeat(150)) };

    let property = NProperty::new("Abstract", PropertyType::RichText);
    let value = resolve_field(&work, WorkField::Abstract).unwrap();
    let Some(PropertyValue::RichText(segments)) = render_property(&property, value, &work).unwrap() else {
      panic!("expected rich text");
    };
    assert_eq!(segments[0].text.content.chars().count(), RICH_TEXT_LIMIT);

    let files = NProperty::new("File", PropertyType::Files);
    let rendered = render_property(&files, FieldValue::Text("https://x.org/a.pdf".into()), &work).unwrap();
    let Some(PropertyValue::Files(files)) = rendered else { panic!("expected files") };
    assert_eq!(files[0].name.len(), FILE_NAME_LIMIT);

    let long_url = format!("https://x.org/{}", "a".repeat(RICH_TEXT_LIMIT));
    let url = NProperty::new("Link", PropertyType::Url);
    let rendered = render_property(&url, FieldValue::Text(long_url.clone()), &work).unwrap();
    assert_eq!(rendered, Some(PropertyValue::Url(FieldValue::Text(long_url))));
  }

  #[traced_test]
  #[test]
  fn test_checkbox_value_in_text_column_is_skipped() {
    let property = NProperty::new("Notes", PropertyType::RichText);
    let rendered = render_property(&property, FieldValue::Bool(true), &sample_work()).unwrap();
    assert!(rendered.is_none());
    assert!(logs_contain("Column Notes is rich_text and cannot hold a checkbox value"));
  }

  #[test]
  fn test_date_defaults_and_validation() {
    let mut work = Work::new("T");
    work.publish_info = Some(PublishInfo { year: Some("2014".into()), ..Default::default() });
    assert_eq!(resolve_field(&work, WorkField::Date), Some(FieldValue::Text("2014-01-01".into())));

    work.publish_info = Some(PublishInfo {
      year: Some("2014".into()),
      month: Some("02".into()),
      day: Some("30".into()),
      ..Default::default()
    });
    assert_eq!(resolve_field(&work, WorkField::Date), None);
  }

  #[test]
  fn test_compatible_types() {
    for t in ["date", "files", "multi_select", "number", "rich_text", "select", "title", "url"] {
      assert!(is_compatible_pd_property_type(&NProperty::new("c", PropertyType::from(t.to_string()))), "{t}");
    }
    for t in ["status", "checkbox", "formula", "relation", "people"] {
      assert!(!is_compatible_pd_property_type(&NProperty::new("c", PropertyType::from(t.to_string()))), "{t}");
    }
  }

  #[test]
  fn test_same_properties_ignores_incompatible_columns() {
    let old = NpdInfo::new("db", [
      NProperty::new("Name", PropertyType::Title),
      NProperty::new("Score", PropertyType::Other("formula".into())),
    ]);
    let new = NpdInfo::new("db", [
      NProperty::new("Name", PropertyType::Title),
      NProperty::new("Done", PropertyType::Checkbox),
    ]);
    assert!(are_same_properties(&old.properties, &new.properties));

    let retyped = NpdInfo::new("db", [NProperty::new("Name", PropertyType::RichText)]);
    assert!(!are_same_properties(&old.properties, &retyped.properties));

    let grown = NpdInfo::new("db", [
      NProperty::new("Name", PropertyType::Title),
      NProperty::new("Tags", PropertyType::MultiSelect),
    ]);
    assert!(!are_same_properties(&old.properties, &grown.properties));
  }

  #[test]
  fn test_update_mapping_drops_and_retypes() {
    let mut mapping = PdToWorkMapping::from([
      entry("A", PropertyType::Number, WorkField::ReferencedByCount),
      entry("B", PropertyType::RichText, WorkField::Abstract),
    ]);
    let new_info = NpdInfo::new("db", [
      NProperty { id: Some("a1".into()), ..NProperty::new("A", PropertyType::RichText) },
      NProperty::new("C", PropertyType::Url),
    ]);

    update_existed_pd_to_work_mapping(&mut mapping, &new_info);

    assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["A"]);
    let a = &mapping["A"];
    assert_eq!(a.pd_property.property_type, PropertyType::RichText);
    assert_eq!(a.pd_property.id.as_deref(), Some("a1"));
    assert_eq!(a.work_property_name, WorkField::ReferencedByCount);
    assert_eq!(a.work_property_label, "ReferencedByCount");
  }

  #[test]
  fn test_saved_mapping_wire_names() {
    let saved = SavedMapping {
      mapping:        PdToWorkMapping::from([entry("Name", PropertyType::Title, WorkField::Title)]),
      last_save_time: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z").unwrap().with_timezone(&Utc),
      workspace_id:   Some("ws".into()),
    };
    let json = serde_json::to_value(&saved).unwrap();
    assert_eq!(json["lastSaveTime"], "2024-01-02T03:04:05Z");
    assert_eq!(json["mapping"]["Name"]["PDPropertyName"], "Name");
    assert_eq!(json["mapping"]["Name"]["PDProperty"]["type"], "title");
    assert_eq!(json["mapping"]["Name"]["workPropertyName"], "title");

    let back: SavedMapping = serde_json::from_value(json).unwrap();
    assert_eq!(back, saved);
  }
}
