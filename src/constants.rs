use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

pub const RECAPTCHA_TOKEN_MIN_LEN: usize = 20;
pub const RECAPTCHA_TOKEN_MAX_LEN: usize = 4096;

/// Bucket shared by every caller that arrives without an address header.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub const WP_API_PREFIX: &str = "wp-json/wp/v2";

/// Upper bound on pages followed by a single listing fetch.
pub const MAX_CMS_PAGES: u32 = 100;

pub const DEFAULT_MAX_GUESTS: u32 = 2;

pub const MAX_SUBMISSION_BYTES: usize = 64 * 1024;

pub const BOOKING_SERVICE: &str = "booking service";
pub const CONTACT_SERVICE: &str = "contact service";
pub const RECAPTCHA_SERVICE: &str = "verification service";
