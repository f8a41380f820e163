//! Deep merge of two partial records describing the same entity.
//!
//! Records are merged on their JSON shape, key by key over the union of keys:
//!
//! - two arrays are concatenated and deduplicated, keeping the first occurrence
//! - a missing or `null` value yields to the other side
//! - two objects are merged recursively
//! - any other conflict keeps the left value
//!
//! Merging never fails and never touches its inputs.
//!
//! # Examples
//!
//! ```
//! use paperlink::{merge::merge, work::PublishInfo};
//!
//! let from_date = PublishInfo { year: Some("1993".into()), month: Some("03".into()), ..Default::default() };
//! let from_ref = PublishInfo {
//!   year: Some("1992".into()),
//!   pages: Some("115-118".into()),
//!   ..Default::default()
//! };
//!
//! let merged = merge(&from_date, &from_ref);
//! assert_eq!(merged.year.as_deref(), Some("1993"));
//! assert_eq!(merged.pages.as_deref(), Some("115-118"));
//! ```

use serde::de::DeserializeOwned;
use serde_json::Map;

use super::*;

/// Merges two JSON values, `a` taking precedence on scalar conflicts.
pub fn merge_objects(a: &Value, b: &Value) -> Value {
  match (a, b) {
    (Value::Null, other) | (other, Value::Null) => other.clone(),
    (Value::Array(left), Value::Array(right)) => {
      let mut merged: Vec<Value> = Vec::with_capacity(left.len() + right.len());
      for item in left.iter().chain(right) {
        if !merged.contains(item) {
          merged.push(item.clone());
        }
      }
      Value::Array(merged)
    },
    (Value::Object(left), Value::Object(right)) => {
      let mut merged = Map::new();
      for (key, value) in left {
        let value = match right.get(key) {
          Some(other) => merge_objects(value, other),
          None => value.clone(),
        };
        merged.insert(key.clone(), value);
      }
      for (key, value) in right {
        if !left.contains_key(key) {
          merged.insert(key.clone(), value.clone());
        }
      }
      Value::Object(merged)
    },
    (left, _) => left.clone(),
  }
}

/// Merges two typed records through their JSON representation.
///
/// If either side fails to serialize or the merged value no longer fits `T`, `a` is returned
/// unchanged.
pub fn merge<T>(a: &T, b: &T) -> T
where T: Serialize + DeserializeOwned + Clone {
  let (Ok(left), Ok(right)) = (serde_json::to_value(a), serde_json::to_value(b)) else {
    warn!("Could not serialize records for merging, keeping the left record");
    return a.clone();
  };
  serde_json::from_value(merge_objects(&left, &right)).unwrap_or_else(|e| {
    warn!("Merged record did not deserialize: {}", e);
    a.clone()
  })
}
