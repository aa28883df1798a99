use serde_json::{Map, Value};

use crate::{
    constants::{RECAPTCHA_SERVICE, UNKNOWN_CLIENT},
    entities::recaptcha::{RecaptchaRequest, SiteVerifyResponse, VerificationOutcome},
    errors::{AppError, MalformedKind},
    limiter::rate_limiter::{RateDecision, RateLimiter},
    upstream::forwarder::{Forwarder, OutboundBody},
};

pub struct RecaptchaHandler {
    forwarder: Forwarder,
    pub limiter: RateLimiter,
    secret: Option<String>,
    verify_url: String,
    min_score: f64,
}

impl RecaptchaHandler {
    pub fn new(
        forwarder: Forwarder,
        limiter: RateLimiter,
        secret: Option<String>,
        verify_url: String,
        min_score: f64,
    ) -> Self {
        RecaptchaHandler {
            forwarder,
            limiter,
            secret,
            verify_url,
            min_score,
        }
    }

    /// Counts the request against the caller's window.
    pub async fn admit(&self, client_id: &str) -> Result<RateDecision, AppError> {
        let decision = self.limiter.check(client_id).await;
        if decision.allowed {
            Ok(decision)
        } else {
            tracing::warn!(client_id, "reCAPTCHA verification rate limit exceeded");
            Err(AppError::RateLimited { retry_after: decision.retry_after })
        }
    }

    /// Verifies a token with the siteverify service. Call `admit` first.
    pub async fn verify(
        &self,
        client_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<VerificationOutcome, AppError> {
        let request = RecaptchaRequest::from_fields(fields)?;

        let secret = self
            .secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(AppError::ServerMisconfigured("recaptcha_secret_key"))?;

        let mut form = vec![
            ("secret".to_string(), secret.to_string()),
            ("response".to_string(), request.token.clone()),
        ];
        if client_id != UNKNOWN_CLIENT {
            form.push(("remoteip".to_string(), client_id.to_string()));
        }

        let reply = self
            .forwarder
            .post(RECAPTCHA_SERVICE, &self.verify_url, OutboundBody::Form(form))
            .await?;

        let status = reply.status;
        let reply: SiteVerifyResponse =
            serde_json::from_value(reply.body).map_err(|e| AppError::UpstreamMalformed {
                service: RECAPTCHA_SERVICE.to_string(),
                kind: MalformedKind::InvalidJson,
                status,
                detail: e.to_string(),
            })?;

        self.judge(&request, reply)
    }

    fn judge(
        &self,
        request: &RecaptchaRequest,
        reply: SiteVerifyResponse,
    ) -> Result<VerificationOutcome, AppError> {
        if !reply.success {
            let codes = if reply.error_codes.is_empty() {
                "unknown-error".to_string()
            } else {
                reply.error_codes.join(", ")
            };
            return Err(AppError::UpstreamRejected {
                status: 400,
                message: format!("reCAPTCHA verification failed: {codes}"),
                body: Some(serde_json::json!({ "error-codes": reply.error_codes })),
            });
        }

        if let (Some(expected), Some(actual)) = (&request.action, &reply.action) {
            if expected != actual {
                return Err(AppError::Validation(format!(
                    "reCAPTCHA action mismatch: expected '{expected}', got '{actual}'"
                )));
            }
        }

        if let Some(score) = reply.score {
            if score < self.min_score {
                tracing::warn!(score, min_score = self.min_score, "reCAPTCHA score below threshold");
                return Err(AppError::Forbidden(
                    "reCAPTCHA score too low. Please try again.".into(),
                ));
            }
        }

        Ok(reply.into())
    }
}
