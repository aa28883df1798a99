use std::time::{Duration, Instant};

use reqwest::{header::ACCEPT, multipart, Client};
use serde_json::{json, Map, Value};

use crate::{
    entities::submission::{stringify_fields, stringify_value},
    errors::{AppError, MalformedKind, UpstreamBody},
};

/// Body of an outbound POST. Every value is already a string.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundBody {
    Json(Map<String, Value>),
    Form(Vec<(String, String)>),
    Multipart(Vec<(String, String)>),
}

impl OutboundBody {
    /// JSON object whose values are all strings, nulls dropped.
    pub fn json_from(fields: &Map<String, Value>) -> Self {
        OutboundBody::Json(stringify_fields(fields))
    }

    pub fn multipart_from(fields: &Map<String, Value>) -> Self {
        OutboundBody::Multipart(string_pairs(fields))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    /// Body relayed to the browser: the upstream object with
    /// `success: true` added when it does not say otherwise. Non-object
    /// bodies are wrapped under `data`.
    pub fn into_client_body(self) -> Value {
        match self.body {
            Value::Object(mut map) => {
                map.entry("success").or_insert(Value::Bool(true));
                Value::Object(map)
            }
            Value::Null => json!({ "success": true }),
            other => json!({ "success": true, "data": other }),
        }
    }
}

/// Shared outbound transport for every proxy route.
/// Built once at startup; cloning shares the connection pool.
#[derive(Clone)]
pub struct Forwarder {
    http: Client,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }

    pub async fn post(
        &self,
        service: &str,
        url: &str,
        body: OutboundBody,
    ) -> Result<UpstreamResponse, AppError> {
        let started = Instant::now();
        let request = self.http.post(url).header(ACCEPT, "application/json");

        let request = match body {
            OutboundBody::Json(fields) => request.json(&fields),
            OutboundBody::Form(pairs) => request.form(&pairs),
            OutboundBody::Multipart(pairs) => {
                let form = pairs
                    .into_iter()
                    .fold(multipart::Form::new(), |form, (name, value)| form.text(name, value));
                request.multipart(form)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport_error(service, url, e))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport_error(service, url, e))?;

        tracing::info!(
            service,
            url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream call completed"
        );

        interpret_response(service, status, text)
    }
}

/// Classify an upstream reply. HTML is checked before anything else so a
/// misconfigured server is reported as such whatever status it sent.
pub fn interpret_response(service: &str, status: u16, text: String) -> Result<UpstreamResponse, AppError> {
    if looks_like_html(&text) {
        return Err(AppError::UpstreamMalformed {
            service: service.to_string(),
            kind: MalformedKind::Html,
            status,
            detail: text,
        });
    }

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(_) => {
                return Err(AppError::UpstreamMalformed {
                    service: service.to_string(),
                    kind: MalformedKind::InvalidJson,
                    status,
                    detail: text,
                });
            }
        }
    };

    if (200..300).contains(&status) {
        return Ok(UpstreamResponse { status, body });
    }

    let body = UpstreamBody::Json(body);
    Err(AppError::UpstreamRejected {
        status,
        message: body
            .message()
            .unwrap_or_else(|| format!("The {service} rejected the request")),
        body: Some(body.into_value()),
    })
}

fn classify_transport_error(service: &str, url: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        tracing::warn!(service, url, "Upstream call timed out: {}", err);
        AppError::UpstreamTimeout(service.to_string())
    } else if err.is_decode() {
        AppError::UpstreamMalformed {
            service: service.to_string(),
            kind: MalformedKind::InvalidJson,
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            detail: err.to_string(),
        }
    } else {
        tracing::warn!(service, url, "Upstream unreachable: {}", err);
        AppError::UpstreamUnreachable(service.to_string())
    }
}

/// Joins a service base URL and a script name.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Case-insensitive `<!doctype` / `<html` prefix check, ignoring leading
/// whitespace and a byte-order mark.
pub fn looks_like_html(body: &str) -> bool {
    let head: String = body
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(9)
        .collect::<String>()
        .to_ascii_lowercase();

    head.starts_with("<!doctype") || head.starts_with("<html")
}

fn string_pairs(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|(key, value)| stringify_value(value).map(|s| (key.clone(), s)))
        .collect()
}
