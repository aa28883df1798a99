use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    entities::{
        booking::PHONE_REGEX,
        submission::{collapse_aliases, compact_fields},
    },
    errors::AppError,
};

const TOKEN_ALIASES: &[(&str, &[&str])] = &[("recaptchaToken", &["token", "g-recaptcha-response"])];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Name is too long"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(regex(path = *PHONE_REGEX, message = "Please enter a valid phone number"))]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 150, message = "Subject is too long"))]
    pub subject: Option<String>,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Message is too long"))]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recaptcha_token: Option<String>,
}

impl ContactRequest {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, AppError> {
        let fields = collapse_aliases(&compact_fields(fields), TOKEN_ALIASES);
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| AppError::Validation(format!("Invalid contact request: {}", e)))
    }

    /// Required fields first, one at a time, in form order; then formats.
    pub fn check(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        if self.email.trim().is_empty() {
            return Err(AppError::Validation("Email is required".into()));
        }
        if self.message.trim().is_empty() {
            return Err(AppError::Validation("Message is required".into()));
        }

        self.validate()?;
        Ok(())
    }
}
