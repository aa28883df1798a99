//! Shared helpers for turning raw WordPress JSON into the internal
//! entities. Per-entity factories (`ContentItem::from_wp`,
//! `RoomListing::from_wp`, ...) are built on top of these.
//!
//! Missing optional fields never fail; only a top-level payload of the
//! wrong container type does.

use serde_json::Value;

use crate::{
    entities::{
        custom_fields::{CustomFields, FieldValue},
        media::MediaAsset,
        room::Price,
    },
    errors::ShapeError,
};

const EMBEDDED_FEATURED_MEDIA: &str = "wp:featuredmedia";

/// `value[key].rendered`, a plain string at `value[key]`, or `""`.
pub fn rendered_text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::Object(wrapper)) => wrapper
            .get("rendered")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Sanitized CMS HTML, safe to render as-is.
pub fn sanitize_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    ammonia::clean(html)
}

/// Text content of a rendered HTML fragment.
pub fn strip_tags(html: &str) -> String {
    ammonia::Builder::empty().clean(html).to_string().trim().to_string()
}

/// Parses numeric text such as `"150"`, `" 99.5 "`, `"$1,200"`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// Nightly price from the custom-field bag, then the top-level `price`
/// field. Zero is a real price; anything negative or non-numeric is unknown.
pub fn extract_price(fields: &CustomFields, item: &Value) -> Price {
    let from_fields = fields
        .raw("price")
        .and_then(FieldValue::as_number);
    let from_item = || item.get("price").and_then(coerce_number);

    from_fields
        .filter(|n| *n >= 0.0)
        .or_else(|| from_item().filter(|n| *n >= 0.0))
        .map(Price::Amount)
        .unwrap_or(Price::Unknown)
}

/// First embedded featured media entry, when it carries a usable URL.
pub fn featured_media(item: &Value) -> Option<MediaAsset> {
    item.get("_embedded")
        .and_then(|embedded| embedded.get(EMBEDDED_FEATURED_MEDIA))
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .and_then(MediaAsset::from_wp)
}

/// Gallery images from a custom gallery field. An empty gallery becomes
/// the featured image alone, so every room renders at least one picture
/// when it has one.
pub fn gallery(field: Option<&FieldValue>, featured: Option<&MediaAsset>) -> Vec<MediaAsset> {
    let images: Vec<MediaAsset> = field
        .map(FieldValue::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| MediaAsset::from_wp(&Value::from(entry)))
        .collect();

    if images.is_empty() {
        featured.cloned().into_iter().collect()
    } else {
        images
    }
}

pub fn is_image_media(item: &Value) -> bool {
    let mime_is_image = item
        .get("mime_type")
        .and_then(Value::as_str)
        .map(|m| m.starts_with("image/"));

    match mime_is_image {
        Some(is_image) => is_image,
        None => item.get("media_type").and_then(Value::as_str) == Some("image"),
    }
}

/// Image-only media assets from a media listing.
pub fn image_assets(items: &[Value]) -> Vec<MediaAsset> {
    items
        .iter()
        .filter(|item| is_image_media(item))
        .filter_map(MediaAsset::from_wp)
        .collect()
}

pub fn expect_array<'a>(value: &'a Value) -> Result<&'a [Value], ShapeError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ShapeError {
            expected: "array",
            actual: describe(other),
        }),
    }
}

/// Normalizes every object in a list payload with `factory`. Non-object
/// entries are skipped.
pub fn normalize_list<T>(value: &Value, factory: impl Fn(&Value) -> T) -> Result<Vec<T>, ShapeError> {
    Ok(normalize_items(expect_array(value)?, factory))
}

pub fn normalize_items<T>(items: &[Value], factory: impl Fn(&Value) -> T) -> Vec<T> {
    items
        .iter()
        .filter(|item| {
            let keep = item.is_object();
            if !keep {
                tracing::warn!("Skipping non-object CMS entry: {}", describe(item));
            }
            keep
        })
        .map(factory)
        .collect()
}

/// Short diagnostic rendering: JSON type plus a truncated value, or the
/// WordPress REST error code and message when the payload is one.
pub fn describe(value: &Value) -> String {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };

    if let (Some(code), Some(message)) = (
        value.get("code").and_then(Value::as_str),
        value.get("message").and_then(Value::as_str),
    ) {
        return format!("{kind} (CMS error {code}: {message})");
    }

    let rendered = value.to_string();
    let preview: String = rendered.chars().take(120).collect();
    if preview.len() < rendered.len() {
        format!("{kind} {preview}…")
    } else {
        format!("{kind} {preview}")
    }
}
