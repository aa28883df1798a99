use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

pub const FULL_SIZE: &str = "full";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAsset {
    pub id: u64,
    pub source_url: String,
    pub alt_text: String,
    pub mime_type: Option<String>,
    /// Named size -> URL. Always contains `full`.
    pub sizes: BTreeMap<String, String>,
}

impl MediaAsset {
    /// Normalizes a WordPress media object, an ACF image object, or a bare
    /// URL string. Returns `None` when no usable URL can be found (for
    /// example an embedded `rest_forbidden` error, or an ACF image field
    /// configured to return only the attachment id).
    pub fn from_wp(value: &Value) -> Option<Self> {
        match value {
            Value::String(url) if is_url(url) => Some(Self::from_url(url.trim())),
            Value::Object(obj) => Self::from_object(obj),
            _ => None,
        }
    }

    pub fn from_url(url: &str) -> Self {
        let mut sizes = BTreeMap::new();
        sizes.insert(FULL_SIZE.to_string(), url.to_string());

        MediaAsset {
            id: 0,
            source_url: url.to_string(),
            alt_text: String::new(),
            mime_type: None,
            sizes,
        }
    }

    fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        let mut sizes = collect_sizes(obj);

        let source_url = ["source_url", "url", "guid"]
            .iter()
            .find_map(|key| url_of(obj.get(*key)?))
            .or_else(|| sizes.get(FULL_SIZE).cloned())?;

        sizes
            .entry(FULL_SIZE.to_string())
            .or_insert_with(|| source_url.clone());

        let id = ["id", "ID"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_u64))
            .unwrap_or(0);

        let alt_text = ["alt_text", "alt"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .trim()
            .to_string();

        let mime_type = obj
            .get("mime_type")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(MediaAsset { id, source_url, alt_text, mime_type, sizes })
    }

    /// URL for a named size, falling back to the full image.
    pub fn url_for(&self, size: &str) -> &str {
        self.sizes
            .get(size)
            .or_else(|| self.sizes.get(FULL_SIZE))
            .map(String::as_str)
            .unwrap_or(&self.source_url)
    }
}

/// Sizes from `media_details.sizes` (WordPress media) or `sizes` (ACF).
fn collect_sizes(obj: &Map<String, Value>) -> BTreeMap<String, String> {
    let table = obj
        .get("media_details")
        .and_then(|d| d.get("sizes"))
        .or_else(|| obj.get("sizes"))
        .and_then(Value::as_object);

    let Some(table) = table else {
        return BTreeMap::new();
    };

    table
        .iter()
        .filter_map(|(name, entry)| {
            // ACF also lists `thumbnail-width` style numeric keys; url_of skips them.
            let url = match entry {
                Value::Object(inner) => inner.get("source_url").or_else(|| inner.get("url")).and_then(url_of),
                other => url_of(other),
            }?;
            Some((name.clone(), url))
        })
        .collect()
}

fn url_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if is_url(s) => Some(s.trim().to_string()),
        // `guid` is `{ "rendered": "https://..." }`
        Value::Object(obj) => obj.get("rendered").and_then(url_of),
        _ => None,
    }
}

fn is_url(s: &str) -> bool {
    let s = s.trim();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with('/')
}
