use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{
    constants::DEFAULT_MAX_GUESTS,
    entities::{content::ContentItem, media::MediaAsset},
    normalizer::{extract_price, gallery},
};

/// Nightly rate. `Unknown` is distinct from a zero price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Amount(f64),
    Unknown,
}

impl Price {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Amount(amount) => Some(*amount),
            Price::Unknown => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Price::Amount(amount) if amount.fract() == 0.0 => format!("${:.0} / night", amount),
            Price::Amount(amount) => format!("${:.2} / night", amount),
            Price::Unknown => "Contact for pricing".to_string(),
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.amount().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomListing {
    #[serde(flatten)]
    pub item: ContentItem,
    pub price: Price,
    pub price_label: String,
    pub max_guests: u32,
    pub size: Option<String>,
    pub bed_type: Option<String>,
    pub view: Option<String>,
    pub amenities: Vec<String>,
    pub gallery: Vec<MediaAsset>,
}

impl RoomListing {
    pub fn from_wp(value: &Value) -> Self {
        let item = ContentItem::from_wp(value);
        let fields = &item.fields;

        let price = extract_price(fields, value);
        let max_guests = fields
            .first_number(&["max_guests", "capacity", "occupancy", "guests"])
            .filter(|n| *n >= 1.0)
            .map(|n| n.floor().min(u32::MAX as f64) as u32)
            .unwrap_or(DEFAULT_MAX_GUESTS);

        let size = fields.first_text(&["size", "room_size"]);
        let bed_type = fields.first_text(&["bed_type", "beds", "bed"]);
        let view = fields.first_text(&["view", "room_view"]);

        let mut amenities = fields.text_list("amenities");
        if amenities.is_empty() {
            amenities = fields.text_list("features");
        }

        let gallery = gallery(fields.raw("gallery"), item.featured_media.as_ref());

        RoomListing {
            price_label: price.label(),
            price,
            max_guests,
            size,
            bed_type,
            view,
            amenities,
            gallery,
            item,
        }
    }
}
