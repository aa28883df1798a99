use serde_json::{Map, Value};

/// How an inbound form arrived; the contact route forwards in the same style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionEncoding {
    Json,
    Form,
    Multipart,
}

/// A decoded inbound form: a flat field map plus its original encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub fields: Map<String, Value>,
    pub encoding: SubmissionEncoding,
}

impl Submission {
    pub fn json(fields: Map<String, Value>) -> Self {
        Self { fields, encoding: SubmissionEncoding::Json }
    }

    /// Stringified fields without nulls or blank strings, ready for typed
    /// deserialization.
    pub fn compact_fields(&self) -> Map<String, Value> {
        compact_fields(&self.fields)
    }
}

/// String form of a submitted value; `None` for null.
/// Numbers and booleans use their display form, nested values compact JSON.
pub fn stringify_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

pub fn stringify_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(key, value)| stringify_value(value).map(|s| (key.clone(), Value::String(s))))
        .collect()
}

pub fn compact_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(_, value)| !is_blank(value))
        .filter_map(|(key, value)| stringify_value(value).map(|s| (key.clone(), Value::String(s))))
        .collect()
}

/// Folds alias keys into their canonical key, so a form sending both
/// spellings still deserializes. The canonical key wins, then aliases in
/// order; a blank value never shadows a filled one.
pub fn collapse_aliases(fields: &Map<String, Value>, aliases: &[(&str, &[&str])]) -> Map<String, Value> {
    let mut collapsed = fields.clone();

    for (canonical, names) in aliases {
        let chosen = std::iter::once(canonical)
            .chain(names.iter())
            .find_map(|key| fields.get(*key).filter(|v| !is_blank(v)).cloned());

        for name in names.iter() {
            collapsed.remove(*name);
        }
        match chosen {
            Some(value) => {
                collapsed.insert(canonical.to_string(), value);
            }
            None => {
                collapsed.remove(*canonical);
            }
        }
    }

    collapsed
}

pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
