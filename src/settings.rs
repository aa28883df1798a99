use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};

use crate::constants::RECAPTCHA_VERIFY_URL;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub cms_base_url: Option<String>,

    #[serde(default = "default_cms_page_size")]
    pub cms_page_size: u32,

    #[serde(default = "default_cms_cache_ttl")]
    pub cms_cache_ttl_secs: u64,

    #[serde(default)]
    pub booking_service_url: Option<String>,

    #[serde(default)]
    pub contact_service_url: Option<String>,

    #[serde(default)]
    pub recaptcha_secret_key: Option<String>,

    #[serde(default = "default_recaptcha_min_score")]
    pub recaptcha_min_score: f64,

    #[serde(default = "default_recaptcha_verify_url")]
    pub recaptcha_verify_url: String,

    #[serde(default = "default_recaptcha_rate_limit")]
    pub recaptcha_rate_limit: u32,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,

    #[serde(default = "default_trust_forwarded_for")]
    pub trust_forwarded_for: bool,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Hotel-Gateway".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_cms_page_size() -> u32 {
    100
}
fn default_cms_cache_ttl() -> u64 {
    60
}
fn default_recaptcha_min_score() -> f64 {
    0.5
}
fn default_recaptcha_verify_url() -> String {
    RECAPTCHA_VERIFY_URL.to_string()
}
fn default_recaptcha_rate_limit() -> u32 {
    10
}
fn default_rate_limit_window() -> u64 {
    60
}
fn default_upstream_timeout() -> u64 {
    8
}
fn default_trust_forwarded_for() -> bool {
    true
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Names used by existing deployments of the site
        config.cms_base_url = config.cms_base_url.or_else(|| env_fallback("WORDPRESS_API_URL"));
        config.booking_service_url = config.booking_service_url.or_else(|| env_fallback("BOOKING_API_URL"));
        config.contact_service_url = config.contact_service_url.or_else(|| env_fallback("CONTACT_API_URL"));
        config.recaptcha_secret_key = config.recaptcha_secret_key.or_else(|| env_fallback("RECAPTCHA_SECRET_KEY"));
        config.redis_url = config.redis_url.or_else(|| env_fallback("REDIS_URL"));

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&self.recaptcha_min_score) {
            errors.push("RECAPTCHA_MIN_SCORE must be between 0.0 and 1.0".to_string());
        }
        if self.cms_page_size == 0 || self.cms_page_size > 100 {
            errors.push("CMS_PAGE_SIZE must be between 1 and 100".to_string());
        }
        if self.recaptcha_rate_limit == 0 {
            errors.push("RECAPTCHA_RATE_LIMIT must be greater than zero".to_string());
        }
        if self.rate_limit_window_secs == 0 {
            errors.push("RATE_LIMIT_WINDOW_SECS must be greater than zero".to_string());
        }
        if self.upstream_timeout_secs == 0 {
            errors.push("UPSTREAM_TIMEOUT_SECS must be greater than zero".to_string());
        }

        let urls = [
            ("CMS_BASE_URL", self.cms_base_url.as_deref()),
            ("BOOKING_SERVICE_URL", self.booking_service_url.as_deref()),
            ("CONTACT_SERVICE_URL", self.contact_service_url.as_deref()),
            ("RECAPTCHA_VERIFY_URL", Some(self.recaptcha_verify_url.as_str())),
        ];
        for (key, value) in urls {
            if let Some(raw) = value {
                if url::Url::parse(raw).is_err() {
                    errors.push(format!("{key} is not a valid URL"));
                }
            }
        }

        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn is_development(&self) -> bool {
        self.env == AppEnvironment::Development
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn cms_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cms_cache_ttl_secs)
    }

    /// Contact submissions go to the booking service host unless a
    /// dedicated contact host is configured.
    pub fn contact_base_url(&self) -> Option<&str> {
        self.contact_service_url
            .as_deref()
            .or(self.booking_service_url.as_deref())
    }
}

fn env_fallback(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self.as_deref() {
            None | Some("") => "[MISSING]",
            Some(_) => "[REDACTED]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("cms_base_url", &self.cms_base_url)
            .field("cms_page_size", &self.cms_page_size)
            .field("cms_cache_ttl_secs", &self.cms_cache_ttl_secs)
            .field("booking_service_url", &self.booking_service_url)
            .field("contact_service_url", &self.contact_service_url)
            .field("recaptcha_secret_key", &self.recaptcha_secret_key.redact())
            .field("recaptcha_min_score", &self.recaptcha_min_score)
            .field("recaptcha_verify_url", &self.recaptcha_verify_url)
            .field("recaptcha_rate_limit", &self.recaptcha_rate_limit)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("redis_url", &self.redis_url.redact())
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .finish()
    }
}
