use hotel_gateway::{
    entities::{
        amenity::Amenity,
        attraction::Attraction,
        content::ContentItem,
        custom_fields::{CustomFields, FieldValue},
        media::MediaAsset,
        room::{Price, RoomListing},
    },
    normalizer::{describe, expect_array, extract_price, image_assets, normalize_list, parse_numeric},
};
use serde_json::{json, Value};

#[test]
fn content_item_tolerates_missing_fields() {
    let item = ContentItem::from_wp(&json!({ "id": 7 }));

    assert_eq!(item.id, 7);
    assert_eq!(item.title, "");
    assert_eq!(item.content, "");
    assert_eq!(item.excerpt, "");
    assert!(item.fields.is_empty());
    assert!(item.featured_media.is_none());
    assert!(item.link.is_none());
}

#[test]
fn acf_sent_as_empty_array_or_false_is_an_empty_bag() {
    for acf in [json!([]), json!(false), Value::Null] {
        let fields = CustomFields::from_wp(&json!({ "id": 1, "acf": acf }));
        assert!(fields.is_empty(), "{acf}");
    }
}

#[test]
fn acf_values_win_over_meta_unless_blank() {
    let fields = CustomFields::from_wp(&json!({
        "meta": { "price": "120", "view": "Garden" },
        "acf": { "price": "150", "view": "" }
    }));

    assert_eq!(fields.number("price"), Some(150.0));
    assert_eq!(fields.text("view").as_deref(), Some("Garden"));
}

#[test]
fn first_text_follows_key_order() {
    let fields = CustomFields::from_wp(&json!({
        "acf": { "room_size": "32 m²", "size": "" }
    }));

    assert_eq!(fields.first_text(&["size", "room_size"]).as_deref(), Some("32 m²"));
    assert_eq!(fields.first_text(&["missing"]), None);
}

#[test]
fn text_list_accepts_lists_rows_and_comma_text() {
    let fields = CustomFields::from_wp(&json!({
        "acf": {
            "amenities": [{ "label": "WiFi" }, "Minibar", { "name": "Safe" }],
            "features": "Balcony, Bathtub\nDesk"
        }
    }));

    assert_eq!(fields.text_list("amenities"), vec!["WiFi", "Minibar", "Safe"]);
    assert_eq!(fields.text_list("features"), vec!["Balcony", "Bathtub", "Desk"]);
    assert!(fields.text_list("nothing").is_empty());
}

#[test]
fn price_coercion_table() {
    let cases = [
        (json!(150), Price::Amount(150.0)),
        (json!("150"), Price::Amount(150.0)),
        (json!(" 99.5 "), Price::Amount(99.5)),
        (json!("$1,200"), Price::Amount(1200.0)),
        (json!(0), Price::Amount(0.0)),
        (json!(-10), Price::Unknown),
        (json!("abc"), Price::Unknown),
        (json!(""), Price::Unknown),
        (Value::Null, Price::Unknown),
        (json!(true), Price::Unknown),
    ];

    for (raw, expected) in cases {
        let item = json!({ "acf": { "price": raw } });
        let price = extract_price(&CustomFields::from_wp(&item), &item);
        assert_eq!(price, expected, "{raw}");
    }
}

#[test]
fn top_level_price_is_the_fallback() {
    let item = json!({ "price": "210", "acf": { "price": "call us" } });
    assert_eq!(extract_price(&CustomFields::from_wp(&item), &item), Price::Amount(210.0));

    let item = json!({ "id": 3 });
    assert_eq!(extract_price(&CustomFields::from_wp(&item), &item), Price::Unknown);
}

#[test]
fn parse_numeric_rejects_non_finite() {
    assert_eq!(parse_numeric("NaN"), None);
    assert_eq!(parse_numeric("inf"), None);
    assert_eq!(parse_numeric("12.50"), Some(12.5));
}

#[test]
fn price_labels() {
    assert_eq!(Price::Amount(150.0).label(), "$150 / night");
    assert_eq!(Price::Amount(99.5).label(), "$99.50 / night");
    assert_eq!(Price::Unknown.label(), "Contact for pricing");
    assert_eq!(serde_json::to_value(Price::Unknown).unwrap(), Value::Null);
}

#[test]
fn room_defaults_when_fields_absent() {
    let room = RoomListing::from_wp(&json!({ "id": 9, "slug": "standard", "title": { "rendered": "Standard" } }));

    assert_eq!(room.price, Price::Unknown);
    assert_eq!(room.price_label, "Contact for pricing");
    assert_eq!(room.max_guests, 2);
    assert!(room.size.is_none());
    assert!(room.gallery.is_empty());
    assert!(room.amenities.is_empty());
}

#[test]
fn room_gallery_uses_field_entries_before_featured_media() {
    let room = RoomListing::from_wp(&json!({
        "id": 4,
        "acf": {
            "gallery": [
                { "ID": 31, "url": "https://cdn.example.com/a.jpg", "alt": "Bed", "sizes": { "medium": "https://cdn.example.com/a-300.jpg", "medium-width": 300 } },
                "https://cdn.example.com/b.jpg",
                42
            ]
        },
        "_embedded": { "wp:featuredmedia": [{ "id": 1, "source_url": "https://cdn.example.com/featured.jpg" }] }
    }));

    assert_eq!(room.gallery.len(), 2);
    assert_eq!(room.gallery[0].id, 31);
    assert_eq!(room.gallery[0].alt_text, "Bed");
    assert_eq!(room.gallery[0].url_for("medium"), "https://cdn.example.com/a-300.jpg");
    assert_eq!(room.gallery[0].url_for("large"), "https://cdn.example.com/a.jpg");
    assert_eq!(room.gallery[1].sizes["full"], "https://cdn.example.com/b.jpg");
}

#[test]
fn featured_media_takes_first_usable_entry_only() {
    let item = json!({
        "_embedded": {
            "wp:featuredmedia": [
                { "code": "rest_forbidden", "message": "Sorry", "data": { "status": 401 } },
                { "id": 2, "source_url": "https://cdn.example.com/second.jpg" }
            ]
        }
    });

    assert!(ContentItem::from_wp(&item).featured_media.is_none());
}

#[test]
fn media_asset_always_has_full_size() {
    let asset = MediaAsset::from_wp(&json!({
        "id": 5,
        "guid": { "rendered": "https://cdn.example.com/pool.jpg" },
        "media_details": { "sizes": { "thumbnail": { "source_url": "https://cdn.example.com/pool-150.jpg" } } }
    }))
    .unwrap();

    assert_eq!(asset.source_url, "https://cdn.example.com/pool.jpg");
    assert_eq!(asset.sizes["full"], "https://cdn.example.com/pool.jpg");
    assert_eq!(asset.url_for("thumbnail"), "https://cdn.example.com/pool-150.jpg");

    assert!(MediaAsset::from_wp(&json!({ "id": 6 })).is_none());
    assert!(MediaAsset::from_wp(&json!(17)).is_none());
}

#[test]
fn image_filter_drops_other_media_kinds() {
    let items = vec![
        json!({ "id": 1, "source_url": "https://cdn.example.com/a.png", "mime_type": "image/png" }),
        json!({ "id": 2, "source_url": "https://cdn.example.com/b.mp4", "mime_type": "video/mp4" }),
        json!({ "id": 3, "source_url": "https://cdn.example.com/c.jpg", "media_type": "image" }),
    ];

    let ids: Vec<u64> = image_assets(&items).iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn amenity_and_attraction_fields() {
    let amenity = Amenity::from_wp(&json!({
        "id": 20,
        "title": { "rendered": "Rooftop Pool" },
        "acf": { "icon": "pool", "opening_hours": "7am - 10pm", "image": false }
    }));
    assert_eq!(amenity.icon.as_deref(), Some("pool"));
    assert_eq!(amenity.hours.as_deref(), Some("7am - 10pm"));
    assert!(amenity.image.is_none());
    assert_eq!(amenity.item.title_text(), "Rooftop Pool");

    let attraction = Attraction::from_wp(&json!({
        "id": 21,
        "acf": { "distance": "1.2 km", "website": "https://museum.example.com", "image": "https://cdn.example.com/museum.jpg" }
    }));
    assert_eq!(attraction.distance.as_deref(), Some("1.2 km"));
    assert_eq!(attraction.image.unwrap().source_url, "https://cdn.example.com/museum.jpg");
}

#[test]
fn content_html_is_sanitized() {
    let item = ContentItem::from_wp(&json!({
        "content": { "rendered": "<p onclick=\"steal()\">Hello</p><script>x()</script>" },
        "excerpt": { "rendered": "<p>Short <strong>intro</strong></p>" }
    }));

    assert!(!item.content.contains("script"));
    assert!(!item.content.contains("onclick"));
    assert!(item.content.contains("Hello"));
    assert_eq!(item.excerpt_text(), "Short intro");
}

#[test]
fn title_html_is_sanitized() {
    let item = ContentItem::from_wp(&json!({
        "title": { "rendered": "Sea <em>View</em><img src=x onerror=\"steal()\"><script>x()</script>" }
    }));

    assert!(!item.title.contains("onerror"));
    assert!(!item.title.contains("script"));
    assert!(item.title.contains("<em>View</em>"));
    assert_eq!(item.title_text(), "Sea View");
}

#[test]
fn non_array_payload_is_unexpected_shape() {
    let err = expect_array(&json!({ "code": "rest_no_route", "message": "No route" })).unwrap_err();
    assert_eq!(err.expected, "array");
    assert!(err.actual.starts_with("object"));
    assert!(err.actual.contains("rest_no_route"));

    assert!(describe(&json!("x".repeat(500))).ends_with('…'));
}

#[test]
fn normalize_list_skips_non_objects() {
    let rooms = normalize_list(&json!([{ "id": 1 }, "junk", 3, { "id": 2 }]), RoomListing::from_wp).unwrap();
    let ids: Vec<u64> = rooms.iter().map(|r| r.item.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn field_value_blankness() {
    assert!(FieldValue::Bool(false).is_blank());
    assert!(FieldValue::Text("  ".into()).is_blank());
    assert!(!FieldValue::Number(0.0).is_blank());
}
