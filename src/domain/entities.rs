pub mod amenity;
pub mod attraction;
pub mod booking;
pub mod contact;
pub mod content;
pub mod custom_fields;
pub mod media;
pub mod recaptcha;
pub mod room;
pub mod submission;
