use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    cms::{pagination::fetch_all, query::ContentQuery, wp_client::ContentSource},
    constants::WP_API_PREFIX,
    entities::{amenity::Amenity, attraction::Attraction, media::MediaAsset, room::RoomListing},
    errors::AppError,
    normalizer::{expect_array, image_assets, normalize_items},
};

pub const ROOMS: &str = "rooms";
pub const AMENITIES: &str = "amenities";
pub const ATTRACTIONS: &str = "attractions";
pub const MEDIA: &str = "media";

/// Typed CMS reads plus the raw passthrough.
///
/// `source` is `None` when no CMS is configured; every read then fails
/// with `ServerMisconfigured` instead of the service refusing to start.
pub struct ContentHandler<S>
where
    S: ContentSource,
{
    pub source: Option<S>,
    page_size: u32,
}

impl<S> ContentHandler<S>
where
    S: ContentSource,
{
    pub fn new(source: Option<S>, page_size: u32) -> Self {
        ContentHandler { source, page_size }
    }

    fn source(&self) -> Result<&S, AppError> {
        self.source
            .as_ref()
            .ok_or(AppError::ServerMisconfigured("cms_base_url"))
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomListing>, AppError> {
        let items = fetch_all(self.source()?, ROOMS, &ContentQuery::new().embed(), self.page_size).await?;
        Ok(normalize_items(&items, RoomListing::from_wp))
    }

    pub async fn room_by_slug(&self, raw_slug: &str) -> Result<RoomListing, AppError> {
        let slug = slug::slugify(raw_slug);
        if slug.is_empty() {
            return Err(AppError::Validation("Room slug is required".into()));
        }

        let query = ContentQuery::new().embed().slug(slug.as_str());
        let body = self.source()?.fetch(ROOMS, &query).await?;

        normalize_items(expect_array(&body)?, RoomListing::from_wp)
            .into_iter()
            .find(|room| room.item.slug == slug)
            .ok_or_else(|| AppError::NotFound(format!("Room '{}' not found", slug)))
    }

    pub async fn list_amenities(&self) -> Result<Vec<Amenity>, AppError> {
        let items = fetch_all(self.source()?, AMENITIES, &ContentQuery::new().embed(), self.page_size).await?;
        Ok(normalize_items(&items, Amenity::from_wp))
    }

    pub async fn list_attractions(&self) -> Result<Vec<Attraction>, AppError> {
        let items = fetch_all(self.source()?, ATTRACTIONS, &ContentQuery::new().embed(), self.page_size).await?;
        Ok(normalize_items(&items, Attraction::from_wp))
    }

    /// Image attachments only; the media library also holds PDFs and video.
    pub async fn gallery(&self) -> Result<Vec<MediaAsset>, AppError> {
        let query = ContentQuery::new().param("media_type", "image");
        let items = fetch_all(self.source()?, MEDIA, &query, self.page_size).await?;
        Ok(image_assets(&items))
    }

    /// Raw CMS JSON for `path` with the caller's remaining query params.
    pub async fn passthrough(
        &self,
        path: Option<&str>,
        params: &BTreeMap<String, String>,
    ) -> Result<Value, AppError> {
        let resource = resource_path(path)?;
        let source = self.source()?;

        let query = params
            .iter()
            .filter(|(key, _)| key.as_str() != "path")
            .fold(ContentQuery::new(), |query, (key, value)| {
                query.param(key.as_str(), value.as_str())
            });

        Ok(source.fetch(&resource, &query).await?)
    }

    pub async fn check_connection(&self) -> &'static str {
        match &self.source {
            Some(source) => match source.check_connection().await {
                Ok(()) => "OK",
                Err(e) => {
                    tracing::warn!("CMS health probe failed: {}", e);
                    "Unavailable"
                }
            },
            None => "Not configured",
        }
    }
}

/// Normalizes a passthrough path to a resource under `wp/v2`.
/// Absolute URLs and parent segments are refused.
pub fn resource_path(path: Option<&str>) -> Result<String, AppError> {
    let path = path.map(str::trim).unwrap_or_default();
    if path.is_empty() {
        return Err(AppError::Validation("Missing required parameter: path".into()));
    }

    let invalid = || AppError::Validation("Invalid content path".into());

    if path.contains("://") || path.starts_with("//") {
        return Err(invalid());
    }

    let resource = strip_api_prefix(path.trim_matches('/'));

    let valid_segment = |segment: &str| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };

    if resource.is_empty() || !resource.split('/').all(valid_segment) {
        return Err(invalid());
    }

    Ok(resource.to_string())
}

/// Drops a leading `wp-json/wp/v2` or bare `wp/v2`; the client adds it back.
fn strip_api_prefix(path: &str) -> &str {
    for prefix in [WP_API_PREFIX, "wp/v2"] {
        if path == prefix {
            return "";
        }
        if let Some(rest) = path.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('/')) {
            return rest.trim_start_matches('/');
        }
    }
    path
}
