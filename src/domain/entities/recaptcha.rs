use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    constants::{RECAPTCHA_TOKEN_MAX_LEN, RECAPTCHA_TOKEN_MIN_LEN},
    errors::AppError,
};

/// Inbound verification request. Only the token is required.
#[derive(Debug, Clone, PartialEq)]
pub struct RecaptchaRequest {
    pub token: String,
    pub action: Option<String>,
}

impl RecaptchaRequest {
    /// Rejects anything that is not a plausibly sized token string, so
    /// junk never reaches the verification service.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, AppError> {
        let token = ["token", "recaptchaToken", "g-recaptcha-response"]
            .iter()
            .find_map(|key| fields.get(*key).filter(|v| !v.is_null()));

        let token = match token {
            None => return Err(AppError::Validation("reCAPTCHA token is required".into())),
            Some(Value::String(token)) => token.trim(),
            Some(_) => {
                return Err(AppError::Validation("reCAPTCHA token must be a string".into()));
            }
        };

        let len = token.chars().count();
        if len == 0 {
            return Err(AppError::Validation("reCAPTCHA token is required".into()));
        }
        if !(RECAPTCHA_TOKEN_MIN_LEN..=RECAPTCHA_TOKEN_MAX_LEN).contains(&len) {
            return Err(AppError::Validation("Invalid reCAPTCHA token format".into()));
        }

        let action = fields
            .get("action")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self { token: token.to_string(), action })
    }
}

/// Google `siteverify` reply. v2 replies carry no score or action.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SiteVerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub challenge_ts: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationOutcome {
    pub success: bool,
    pub score: Option<f64>,
    pub action: Option<String>,
    pub hostname: Option<String>,
    pub challenge_ts: Option<String>,
}

impl From<SiteVerifyResponse> for VerificationOutcome {
    fn from(reply: SiteVerifyResponse) -> Self {
        VerificationOutcome {
            success: reply.success,
            score: reply.score,
            action: reply.action,
            hostname: reply.hostname,
            challenge_ts: reply.challenge_ts,
        }
    }
}
