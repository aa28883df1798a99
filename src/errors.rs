use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{
    error::ResponseError,
    http::{header::{self, ContentType}, StatusCode},
    HttpResponse,
};
use derive_more::Display;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::ValidationErrors;

use crate::upstream::forwarder::looks_like_html;

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Toggles diagnostic `detail` fields in error bodies.
/// Set once at startup; only the development environment turns it on.
pub fn expose_error_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    Html,
    InvalidJson,
}

#[derive(Debug, Display)]
pub enum AppError {
    #[display("{_0}")]
    Validation(String),

    #[display("Validation failed: {}", join_field_errors(_0))]
    InvalidFields(Vec<FieldError>),

    #[display("Method {method} not allowed (allow: {allow})")]
    MethodNotAllowed { method: String, allow: &'static str },

    #[display("Not found: {_0}")]
    NotFound(String),

    #[display("Forbidden: {_0}")]
    Forbidden(String),

    #[display("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[display("{_0} unreachable")]
    UpstreamUnreachable(String),

    #[display("{_0} timed out")]
    UpstreamTimeout(String),

    #[display("{service} returned a malformed response ({kind:?}, HTTP {status})")]
    UpstreamMalformed {
        service: String,
        kind: MalformedKind,
        status: u16,
        detail: String,
    },

    #[display("upstream rejected request with HTTP {status}: {message}")]
    UpstreamRejected {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    #[display("Server configuration error: {_0} is not configured")]
    ServerMisconfigured(&'static str),

    #[display("Unexpected response shape: expected {expected}, got {actual}")]
    UnexpectedShape { expected: &'static str, actual: String },

    #[display("Internal server error: {_0}")]
    InternalError(String),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Stable machine-readable code sent as `error` in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::InvalidFields(_) => "validation_error",
            AppError::MethodNotAllowed { .. } => "method_not_allowed",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::RateLimited { .. } => "rate_limited",
            AppError::UpstreamUnreachable(_) => "upstream_unreachable",
            AppError::UpstreamTimeout(_) => "upstream_timeout",
            AppError::UpstreamMalformed { kind: MalformedKind::Html, .. } => "upstream_html_response",
            AppError::UpstreamMalformed { kind: MalformedKind::InvalidJson, .. } => "upstream_invalid_json",
            AppError::UpstreamRejected { .. } => "upstream_rejected",
            AppError::ServerMisconfigured(_) => "server_misconfigured",
            AppError::UnexpectedShape { .. } => "unexpected_shape",
            AppError::InternalError(_) => "internal_error",
        }
    }

    /// Message safe to show next to a form or on a page.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidFields(errors) => match errors.as_slice() {
                [only] => only.message.clone(),
                _ => "Please correct the highlighted fields".to_string(),
            },
            AppError::MethodNotAllowed { method, allow } => {
                format!("Method {method} is not allowed. Use {allow}.")
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::RateLimited { .. } => {
                "Too many requests. Please try again later.".to_string()
            }
            AppError::UpstreamUnreachable(service) => {
                format!("Unable to connect to the {service}. Please try again later.")
            }
            AppError::UpstreamTimeout(service) => {
                format!("The {service} took too long to respond. Please try again later.")
            }
            AppError::UpstreamMalformed { service, kind: MalformedKind::Html, .. } => {
                format!("The {service} is misconfigured and returned an HTML page instead of JSON.")
            }
            AppError::UpstreamMalformed { service, kind: MalformedKind::InvalidJson, .. } => {
                format!("The {service} returned an invalid response.")
            }
            AppError::UpstreamRejected { message, .. } => message.clone(),
            AppError::ServerMisconfigured(_) => {
                "Server configuration error. Please contact the site administrator.".to_string()
            }
            AppError::UnexpectedShape { .. } => {
                "The content service returned an unexpected response.".to_string()
            }
            AppError::InternalError(_) => "Internal server error".to_string(),
        }
    }

    fn detail(&self) -> Option<Value> {
        match self {
            AppError::UpstreamMalformed { detail, status, .. } => {
                Some(json!({ "upstream_status": status, "body": truncate(detail, 500) }))
            }
            AppError::UpstreamRejected { body: Some(body), .. } => Some(body.clone()),
            AppError::UnexpectedShape { expected, actual } => {
                Some(json!({ "expected": expected, "actual": actual }))
            }
            AppError::ServerMisconfigured(setting) => Some(json!({ "setting": setting })),
            AppError::InternalError(msg) => Some(Value::String(msg.clone())),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::UpstreamMalformed { .. } => StatusCode::BAD_GATEWAY,
            AppError::UpstreamRejected { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            AppError::ServerMisconfigured(_)
            | AppError::UnexpectedShape { .. }
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_id = Uuid::new_v4();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = self.code(),
                status_code = status.as_u16(),
                "Request failed: {}", self
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_code = self.code(),
                status_code = status.as_u16(),
                "Request rejected: {}", self
            );
        }

        let mut body = json!({
            "success": false,
            "error": self.code(),
            "message": self.public_message(),
        });

        if let AppError::InvalidFields(errors) = self {
            body["errors"] = json!(errors);
        }

        if details_exposed() {
            if let Some(detail) = self.detail() {
                body["detail"] = detail;
            }
            body["error_id"] = json!(error_id.to_string());
        }

        let mut builder = HttpResponse::build(status);
        builder.insert_header(ContentType::json());

        match self {
            AppError::RateLimited { retry_after } => {
                builder.insert_header((header::RETRY_AFTER, retry_after.to_string()));
            }
            AppError::MethodNotAllowed { allow, .. } => {
                builder.insert_header((header::ALLOW, *allow));
            }
            _ => {}
        }

        builder.json(body)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                let field = if *field == "__all__" { "form" } else { field.as_ref() };
                errors.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        // HashMap order is arbitrary; keep responses stable.
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::InvalidFields(field_errors)
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        const SERVICE: &str = "content service";

        match err {
            FetchError::Network(_) => AppError::UpstreamUnreachable(SERVICE.to_string()),
            FetchError::Timeout => AppError::UpstreamTimeout(SERVICE.to_string()),
            FetchError::UpstreamHttp { status, body: UpstreamBody::Text(text) }
                if looks_like_html(&text) =>
            {
                AppError::UpstreamMalformed {
                    service: SERVICE.to_string(),
                    kind: MalformedKind::Html,
                    status,
                    detail: text,
                }
            }
            FetchError::UpstreamHttp { status, body } => AppError::UpstreamRejected {
                status,
                message: body
                    .message()
                    .unwrap_or_else(|| "The content service rejected the request".to_string()),
                body: Some(body.into_value()),
            },
            FetchError::InvalidJson(raw) => AppError::UpstreamMalformed {
                service: SERVICE.to_string(),
                kind: if looks_like_html(&raw) { MalformedKind::Html } else { MalformedKind::InvalidJson },
                status: 200,
                detail: raw,
            },
        }
    }
}

impl From<ShapeError> for AppError {
    fn from(err: ShapeError) -> Self {
        AppError::UnexpectedShape {
            expected: err.expected,
            actual: err.actual,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// Failure of a single CMS fetch, before any reclassification.
#[derive(Debug, Display)]
pub enum FetchError {
    #[display("network error: {_0}")]
    Network(String),

    #[display("request timed out")]
    Timeout,

    #[display("upstream returned HTTP {status}")]
    UpstreamHttp { status: u16, body: UpstreamBody },

    #[display("upstream returned a body that is not JSON")]
    InvalidJson(String),
}

/// An upstream error body: JSON when it parsed, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(Value),
    Text(String),
}

impl UpstreamBody {
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => UpstreamBody::Json(value),
            Err(_) => UpstreamBody::Text(text),
        }
    }

    /// `message` or `error` field of a JSON body.
    pub fn message(&self) -> Option<String> {
        match self {
            UpstreamBody::Json(value) => ["message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            UpstreamBody::Text(_) => None,
        }
    }

    /// WordPress REST error code (`rest_no_route`, `rest_post_invalid_page_number`, ...).
    pub fn rest_code(&self) -> Option<&str> {
        match self {
            UpstreamBody::Json(value) => value.get("code").and_then(Value::as_str),
            UpstreamBody::Text(_) => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            UpstreamBody::Json(value) => value,
            UpstreamBody::Text(text) => Value::String(truncate(&text, 500)),
        }
    }
}

/// Top-level CMS payload was not the container the caller expected.
#[derive(Debug, Display, Clone, PartialEq)]
#[display("expected {expected}, got {actual}")]
pub struct ShapeError {
    pub expected: &'static str,
    pub actual: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
