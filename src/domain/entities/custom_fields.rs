use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalizer::parse_numeric;

/// One value from a schema-less custom-field bag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Unset in CMS terms. ACF reports empty image and select fields as
    /// `false`, so that counts as blank too.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null | FieldValue::Bool(false) => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Display text for scalar values.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            FieldValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric value, coercing numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Some(*n),
            FieldValue::Text(s) => parse_numeric(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> &[FieldValue] {
        match self {
            FieldValue::List(items) => items,
            _ => &[],
        }
    }

    /// Human label of a list entry: plain text, or the `label`/`name`/`title`
    /// of a select/repeater row.
    fn label(&self) -> Option<String> {
        match self {
            FieldValue::Map(map) => ["label", "name", "title", "value"]
                .iter()
                .find_map(|key| map.get(*key).and_then(FieldValue::as_text)),
            other => other.as_text(),
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(FieldValue::from).collect()),
            Value::Object(map) => FieldValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&FieldValue> for Value {
    fn from(field: &FieldValue) -> Self {
        match field {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            // Integral values go back as integers so ids stay readable as u64.
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Value::from(*n as i64),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(Value::from).collect()),
            FieldValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// Per-entity custom-field bag (`acf`, with `meta` as a lower-priority source).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CustomFields(BTreeMap<String, FieldValue>);

impl CustomFields {
    /// Builds the bag from a raw CMS item. Anything other than an object
    /// (ACF sends `[]` or `false` when nothing is set) contributes nothing.
    pub fn from_wp(item: &Value) -> Self {
        let mut fields = BTreeMap::new();

        for source in ["meta", "custom_fields", "acf"] {
            if let Some(Value::Object(map)) = item.get(source) {
                for (key, value) in map {
                    let field = FieldValue::from(value);
                    if !field.is_blank() || !fields.contains_key(key) {
                        fields.insert(key.clone(), field);
                    }
                }
            }
        }

        CustomFields(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The stored value, even when blank.
    pub fn raw(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// The value when it is set to something non-blank.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key).filter(|v| !v.is_blank())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_number)
    }

    /// First key, in order, holding usable text.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// First key, in order, holding a usable number.
    pub fn first_number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.number(key))
    }

    /// Labels from a list field, or from a comma/newline separated text field.
    pub fn text_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(FieldValue::List(items)) => items.iter().filter_map(FieldValue::label).collect(),
            Some(FieldValue::Text(text)) => text
                .split(|c| c == ',' || c == '\n')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}
