use serde::Serialize;
use serde_json::Value;

use crate::entities::{content::ContentItem, media::MediaAsset};

/// Nearby point of interest shown on the explore pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attraction {
    #[serde(flatten)]
    pub item: ContentItem,
    pub distance: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub image: Option<MediaAsset>,
}

impl Attraction {
    pub fn from_wp(value: &Value) -> Self {
        let item = ContentItem::from_wp(value);
        let fields = &item.fields;

        let image = fields
            .get("image")
            .and_then(|field| MediaAsset::from_wp(&Value::from(field)))
            .or_else(|| item.featured_media.clone());

        Attraction {
            distance: fields.first_text(&["distance", "distance_from_hotel"]),
            address: fields.first_text(&["address", "location"]),
            website: fields.first_text(&["website", "url", "link"]),
            image,
            item,
        }
    }
}
