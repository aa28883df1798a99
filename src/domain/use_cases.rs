pub mod booking;
pub mod contact;
pub mod content;
pub mod extractors;
pub mod recaptcha;
