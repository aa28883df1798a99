pub mod booking;
pub mod contact;
pub mod content;
pub mod home;
pub mod payload;
pub mod recaptcha;
pub mod system;
