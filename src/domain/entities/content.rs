use serde::Serialize;
use serde_json::Value;

use crate::{
    entities::{custom_fields::CustomFields, media::MediaAsset},
    normalizer::{featured_media, rendered_text, sanitize_html, strip_tags},
};

/// Normalized CMS entity shared by every content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: u64,
    pub slug: String,
    pub content_type: String,
    /// Rendered HTML title, sanitized like the body.
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub link: Option<String>,
    pub fields: CustomFields,
    pub featured_media: Option<MediaAsset>,
}

impl ContentItem {
    /// Never fails: absent wrappers become empty strings, an absent or
    /// non-object custom-field bag becomes an empty one.
    pub fn from_wp(value: &Value) -> Self {
        ContentItem {
            id: value.get("id").and_then(Value::as_u64).unwrap_or(0),
            slug: string_field(value, "slug").unwrap_or_default(),
            content_type: string_field(value, "type").unwrap_or_default(),
            title: sanitize_html(&rendered_text(value, "title")),
            content: sanitize_html(&rendered_text(value, "content")),
            excerpt: sanitize_html(&rendered_text(value, "excerpt")),
            link: string_field(value, "link"),
            fields: CustomFields::from_wp(value),
            featured_media: featured_media(value),
        }
    }

    pub fn title_text(&self) -> String {
        strip_tags(&self.title)
    }

    pub fn excerpt_text(&self) -> String {
        strip_tags(&self.excerpt)
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
