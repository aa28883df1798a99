use serde::Serialize;
use serde_json::Value;

use crate::entities::{content::ContentItem, media::MediaAsset};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Amenity {
    #[serde(flatten)]
    pub item: ContentItem,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub hours: Option<String>,
    pub image: Option<MediaAsset>,
}

impl Amenity {
    pub fn from_wp(value: &Value) -> Self {
        let item = ContentItem::from_wp(value);
        let fields = &item.fields;

        let image = fields
            .get("image")
            .and_then(|field| MediaAsset::from_wp(&Value::from(field)))
            .or_else(|| item.featured_media.clone());

        Amenity {
            icon: fields.first_text(&["icon", "icon_name"]),
            category: fields.first_text(&["category", "type"]),
            hours: fields.first_text(&["hours", "opening_hours"]),
            image,
            item,
        }
    }
}
