//! The conversion result: one recipe as a JSON object.
//!
//! No schema is enforced. The vision model decides which keys it fills in,
//! so [`RecipeRecord`] wraps the parsed object as-is and offers `Option`-
//! returning accessors for the conventional fields. Serialising a record
//! yields exactly the object the model produced (same keys, same order).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed recipe, stored as the JSON object returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeRecord(Map<String, Value>);

impl RecipeRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw access to any field, conventional or not.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// `servings` is left as a [`Value`]: models return both `4` and `"4-6"`.
    pub fn servings(&self) -> Option<&Value> {
        self.get("servings")
    }

    pub fn cuisine(&self) -> Option<&str> {
        self.get("cuisine").and_then(Value::as_str)
    }

    pub fn difficulty(&self) -> Option<&str> {
        self.get("difficulty").and_then(Value::as_str)
    }

    /// Ingredient entries, each normally an object with `amount`, `unit`,
    /// `item` and optional `notes`. Empty when absent or not an array.
    pub fn ingredients(&self) -> &[Value] {
        self.array("ingredients")
    }

    /// Instruction steps that are strings; other entries are skipped.
    pub fn instructions(&self) -> Vec<&str> {
        self.array("instructions")
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.array("tags").iter().filter_map(Value::as_str).collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Serialise with 2-space indentation; non-ASCII is written literally.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }

    fn array(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl From<Map<String, Value>> for RecipeRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl From<RecipeRecord> for Value {
    fn from(record: RecipeRecord) -> Self {
        Value::Object(record.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> RecipeRecord {
        match v {
            Value::Object(m) => RecipeRecord::new(m),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn accessors_read_conventional_fields() {
        let r = record(json!({
            "title": "Pancakes",
            "servings": 4,
            "ingredients": [{"amount": "1", "unit": "cup", "item": "flour"}],
            "instructions": ["Mix", "Fry"],
            "tags": ["breakfast", "quick"],
            "cuisine": "American",
            "difficulty": "easy"
        }));
        assert_eq!(r.title(), Some("Pancakes"));
        assert_eq!(r.servings(), Some(&json!(4)));
        assert_eq!(r.ingredients().len(), 1);
        assert_eq!(r.instructions(), vec!["Mix", "Fry"]);
        assert_eq!(r.tags(), vec!["breakfast", "quick"]);
        assert_eq!(r.cuisine(), Some("American"));
        assert_eq!(r.difficulty(), Some("easy"));
    }

    #[test]
    fn missing_and_mistyped_fields_are_tolerated() {
        let r = record(json!({"title": 7, "ingredients": "flour", "extra": true}));
        assert_eq!(r.title(), None);
        assert!(r.ingredients().is_empty());
        assert!(r.instructions().is_empty());
        assert_eq!(r.get("extra"), Some(&json!(true)));
    }

    #[test]
    fn pretty_json_keeps_key_order_and_unicode() {
        let r = record(json!({"title": "Crème brûlée", "cuisine": "Français", "servings": 2}));
        let out = r.to_pretty_json().unwrap();
        assert_eq!(
            out,
            "{\n  \"title\": \"Crème brûlée\",\n  \"cuisine\": \"Français\",\n  \"servings\": 2\n}"
        );
    }

    #[test]
    fn serialises_transparently() {
        let r = record(json!({"title": "Soup"}));
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({"title": "Soup"}));
    }
}
