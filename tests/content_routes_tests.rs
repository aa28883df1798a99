mod test_utils;

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

const ROOMS: &str = "/wp-json/wp/v2/rooms";
const MEDIA: &str = "/wp-json/wp/v2/media";

fn room(id: u64, slug: &str, price: Value) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "type": "rooms",
        "link": format!("https://hotel.example.com/rooms/{slug}"),
        "title": { "rendered": "Deluxe King &#8211; Sea View" },
        "content": { "rendered": "<p>Spacious room</p><script>alert(1)</script>" },
        "excerpt": { "rendered": "<p>Big bed</p>" },
        "acf": {
            "price": price,
            "max_guests": "3",
            "bed_type": "King",
            "amenities": ["WiFi", "Minibar"],
            "gallery": []
        },
        "_embedded": {
            "wp:featuredmedia": [{
                "id": 88,
                "source_url": "https://cdn.example.com/king.jpg",
                "alt_text": "King room",
                "mime_type": "image/jpeg",
                "media_details": {
                    "sizes": {
                        "thumbnail": { "source_url": "https://cdn.example.com/king-150.jpg" }
                    }
                }
            }]
        }
    })
}

#[actix_rt::test]
async fn rooms_are_normalized() {
    let upstream = FakeUpstream::spawn().await;
    upstream.script(
        &format!("{ROOMS}?page=1"),
        Scripted::json(200, json!([room(12, "deluxe-king", json!("$1,250")), room(13, "twin", json!("abc"))])),
    );
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/rooms").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let first = &body["data"][0];
    assert_eq!(first["id"], 12);
    assert_eq!(first["price"], 1250.0);
    assert_eq!(first["price_label"], "$1250 / night");
    assert_eq!(first["max_guests"], 3);
    assert_eq!(first["bed_type"], "King");
    assert_eq!(first["amenities"], json!(["WiFi", "Minibar"]));
    assert!(!first["content"].as_str().unwrap().contains("<script"));

    // Empty gallery falls back to the featured image.
    assert_eq!(first["gallery"].as_array().unwrap().len(), 1);
    assert_eq!(first["gallery"][0]["sizes"]["full"], "https://cdn.example.com/king.jpg");

    let second = &body["data"][1];
    assert_eq!(second["price"], Value::Null);
    assert_eq!(second["price_label"], "Contact for pricing");

    let query = &upstream.requests_to(ROOMS)[0].query;
    assert!(query.contains("_embed=true"), "{query}");
    assert!(query.contains("per_page=50"), "{query}");
}

#[actix_rt::test]
async fn room_by_slug_and_missing_room() {
    let upstream = FakeUpstream::spawn().await;
    upstream.script(ROOMS, Scripted::json(200, json!([room(12, "deluxe-king", json!(180))])));
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/rooms/deluxe-king").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["slug"], "deluxe-king");
    assert_eq!(body["data"]["price"], 180.0);

    upstream.script(ROOMS, Scripted::json(200, json!([])));
    let response = app.get("/api/rooms/penthouse").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[actix_rt::test]
async fn gallery_keeps_only_images() {
    let upstream = FakeUpstream::spawn().await;
    upstream.script(
        &format!("{MEDIA}?page=1"),
        Scripted::json(
            200,
            json!([
                { "id": 1, "source_url": "https://cdn.example.com/pool.jpg", "mime_type": "image/jpeg", "media_type": "image" },
                { "id": 2, "source_url": "https://cdn.example.com/menu.pdf", "mime_type": "application/pdf", "media_type": "file" },
                { "id": 3, "source_url": "https://cdn.example.com/lobby.webp", "mime_type": "image/webp", "media_type": "image" }
            ]),
        ),
    );
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/gallery").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let ids: Vec<u64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[actix_rt::test]
async fn rest_error_object_is_an_unexpected_shape() {
    let upstream = FakeUpstream::spawn().await;
    upstream.script(
        &format!("{ROOMS}?page=1"),
        Scripted::json(200, json!({ "code": "rest_forbidden", "message": "Sorry, you are not allowed" })),
    );
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/rooms").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "unexpected_shape");
}

#[actix_rt::test]
async fn cms_html_error_page_is_bad_gateway() {
    let upstream = FakeUpstream::spawn().await;
    upstream.script(
        &format!("{ROOMS}?page=1"),
        Scripted::html(500, "<html><body>There has been a critical error.</body></html>"),
    );
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/rooms").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "upstream_html_response");
}

#[actix_rt::test]
async fn unreachable_cms_is_503() {
    let app = TestApp::spawn(test_config(&closed_address())).await;

    let response = app.get("/api/amenities").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_rt::test]
async fn passthrough_forwards_path_and_params() {
    let upstream = FakeUpstream::spawn().await;
    upstream.script("/wp-json/wp/v2/pages", Scripted::json(200, json!([{ "id": 5, "slug": "about" }])));
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/content?path=pages&slug=about").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body[0]["slug"], "about");

    let recorded = &upstream.requests_to("/wp-json/wp/v2/pages")[0];
    assert_eq!(recorded.query, "slug=about");
}

#[actix_rt::test]
async fn passthrough_rejects_missing_or_unsafe_paths() {
    let upstream = FakeUpstream::spawn().await;
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/content").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Missing required parameter: path");

    for path in ["..%2Fwp-admin", "http%3A%2F%2Fevil.example.com%2Fx", "rooms%2F..%2F..%2Fusers"] {
        let response = app.get(&format!("/api/content?path={path}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
    }

    assert!(upstream.requests().is_empty());
}

#[actix_rt::test]
async fn passthrough_relays_cms_rest_errors() {
    let upstream = FakeUpstream::spawn().await;
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/content?path=no-such-type").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "upstream_rejected");
    assert_eq!(body["message"], "No route was found");
}

#[actix_rt::test]
async fn content_without_cms_is_misconfigured() {
    let upstream = FakeUpstream::spawn().await;
    let mut config = test_config(&upstream.address);
    config.cms_base_url = None;
    let app = TestApp::spawn(config).await;

    let response = app.get("/api/rooms").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "server_misconfigured");
}

#[actix_rt::test]
async fn unknown_route_is_json_404() {
    let upstream = FakeUpstream::spawn().await;
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    let response = app.get("/api/spa").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn slow_cms_is_gateway_timeout() {
    let upstream = FakeUpstream::spawn().await;
    let mut config = test_config(&upstream.address);
    config.upstream_timeout_secs = 1;
    let app = TestApp::spawn(config).await;

    upstream.script(
        &format!("{ROOMS}?page=1"),
        Scripted::json(200, json!([])).delayed(Duration::from_secs(3)),
    );

    let response = app.get("/api/rooms").await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "upstream_timeout");
}

#[actix_rt::test]
async fn passthrough_accepts_api_prefixed_paths() {
    let upstream = FakeUpstream::spawn().await;
    upstream.script("/wp-json/wp/v2/pages", Scripted::json(200, json!([{ "id": 5 }])));
    let app = TestApp::spawn(test_config(&upstream.address)).await;

    for path in ["wp%2Fv2%2Fpages", "wp-json%2Fwp%2Fv2%2Fpages", "%2Fpages%2F"] {
        let response = app.get(&format!("/api/content?path={path}")).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }

    assert_eq!(upstream.requests_to("/wp-json/wp/v2/pages").len(), 3);
    assert!(upstream.requests_to("/wp-json/wp/v2/wp/v2/pages").is_empty());
}
