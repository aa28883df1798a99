mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, normalizer, use_cases};
pub use interfaces::{handlers, routes};
pub use infrastructure::{cms, limiter, upstream, utils};

use anyhow::Context;

use cms::wp_client::WpClient;
use limiter::{rate_limiter::{RateLimiter, SlidingWindowStore}, redis_store::RedisWindowStore};
use settings::AppConfig;
use upstream::forwarder::Forwarder;
use use_cases::{
    booking::BookingHandler,
    contact::ContactHandler,
    content::ContentHandler,
    recaptcha::RecaptchaHandler,
};

pub struct AppState {
    pub config: AppConfig,
    pub content_handler: AppContentHandler,
    pub booking_handler: BookingHandler,
    pub contact_handler: ContactHandler,
    pub recaptcha_handler: RecaptchaHandler,
}

pub type AppContentHandler = ContentHandler<WpClient>;

impl AppState {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let timeout = config.upstream_timeout();
        let forwarder = Forwarder::new(timeout).context("Failed to build the upstream HTTP client")?;

        let cms = config
            .cms_base_url
            .as_deref()
            .map(|url| WpClient::new(url, timeout, config.cms_cache_ttl()))
            .transpose()
            .context("Failed to build the CMS client")?;
        if cms.is_none() {
            tracing::warn!("CMS base URL not configured; content routes will report a configuration error");
        }

        let window = config.rate_limit_window();
        let redis_store = config.redis_url.as_ref().and_then(|url| {
            RedisWindowStore::connect(url, config.recaptcha_rate_limit, window)
                .map_err(|e| tracing::error!("Redis rate limiter disabled: {}", e))
                .ok()
        });
        let limiter = RateLimiter::new(
            "recaptcha",
            SlidingWindowStore::new(config.recaptcha_rate_limit, window),
            redis_store,
        );

        Ok(AppState {
            config: config.clone(),
            content_handler: ContentHandler::new(cms, config.cms_page_size),
            booking_handler: BookingHandler::new(forwarder.clone(), config.booking_service_url.clone()),
            contact_handler: ContactHandler::new(
                forwarder.clone(),
                config.contact_base_url().map(str::to_string),
            ),
            recaptcha_handler: RecaptchaHandler::new(
                forwarder,
                limiter,
                config.recaptcha_secret_key.clone(),
                config.recaptcha_verify_url.clone(),
                config.recaptcha_min_score,
            ),
        })
    }
}
