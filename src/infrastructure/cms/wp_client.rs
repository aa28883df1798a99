use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde_json::Value;
use tokio::time::Instant;

use crate::{
    cms::{cache::ResponseCache, query::ContentQuery},
    constants::WP_API_PREFIX,
    errors::{FetchError, UpstreamBody},
};

/// Read access to the CMS collections.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, resource: &str, query: &ContentQuery) -> Result<Value, FetchError>;
    async fn check_connection(&self) -> Result<(), FetchError>;
}

/// WordPress REST API client over `reqwest`.
#[derive(Clone)]
pub struct WpClient {
    http: Client,
    base_url: String,
    cache: ResponseCache,
}

impl WpClient {
    /// `base_url` is the site root; a trailing `/wp-json/wp/v2` is tolerated.
    pub fn new(base_url: &str, timeout: Duration, cache_ttl: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = base_url
            .trim_end_matches('/')
            .trim_end_matches(WP_API_PREFIX)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            cache: ResponseCache::new(cache_ttl),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn endpoint(&self, resource: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            WP_API_PREFIX,
            resource.trim_matches('/')
        )
    }

    /// Full request URL; the query string is only appended when non-empty.
    pub fn request_url(&self, resource: &str, query: &ContentQuery) -> String {
        let endpoint = self.endpoint(resource);
        let pairs = query.to_pairs();
        if pairs.is_empty() {
            return endpoint;
        }

        let query_string = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{endpoint}?{query_string}")
    }
}

#[async_trait]
impl ContentSource for WpClient {
    async fn fetch(&self, resource: &str, query: &ContentQuery) -> Result<Value, FetchError> {
        let url = self.request_url(resource, query);

        if let Some(cached) = self.cache.get(&url) {
            tracing::debug!(endpoint = %url, "CMS cache hit");
            return Ok(cached);
        }

        let started = Instant::now();
        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let text = response.text().await.map_err(classify)?;

        tracing::info!(
            endpoint = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "CMS request completed"
        );

        if !status.is_success() {
            return Err(FetchError::UpstreamHttp {
                status: status.as_u16(),
                body: UpstreamBody::parse(text),
            });
        }

        let value: Value = serde_json::from_str(&text).map_err(|_| FetchError::InvalidJson(text))?;
        self.cache.insert(url, value.clone());

        Ok(value)
    }

    async fn check_connection(&self) -> Result<(), FetchError> {
        let response = self
            .http
            .get(format!("{}/wp-json/", self.base_url))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(FetchError::UpstreamHttp {
                status: status.as_u16(),
                body: UpstreamBody::Text(String::new()),
            })
        }
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}
