use actix_multipart::{Multipart, MultipartError};
use actix_web::{
    error::PayloadError,
    http::StatusCode,
    web::{self, BytesMut},
    HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::StreamExt;
use serde_json::{Map, Value};

use crate::{
    constants::MAX_SUBMISSION_BYTES,
    entities::submission::{Submission, SubmissionEncoding},
    errors::AppError,
    upstream::forwarder::UpstreamResponse,
};

/// Decodes a form submission sent as JSON, urlencoded or multipart.
///
/// File parts of a multipart body are skipped; only text fields are
/// collected. Repeated keys keep the last value.
pub async fn read_submission(req: &HttpRequest, payload: web::Payload) -> Result<Submission, AppError> {
    let content_type = req.content_type().to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let fields = read_multipart(Multipart::new(req.headers(), payload)).await?;
        return Ok(Submission { fields, encoding: SubmissionEncoding::Multipart });
    }

    let body = read_body(payload).await?;

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let fields = url::form_urlencoded::parse(&body)
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();
        return Ok(Submission { fields, encoding: SubmissionEncoding::Form });
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Submission::json(Map::new()));
    }

    match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(fields)) => Ok(Submission::json(fields)),
        Ok(_) => Err(AppError::Validation("Request body must be a JSON object".into())),
        Err(e) => Err(AppError::Validation(format!("Invalid JSON body: {}", e))),
    }
}

/// Relays a successful upstream reply with its own status.
pub fn relay(reply: UpstreamResponse) -> HttpResponse {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    HttpResponse::build(status).json(reply.into_client_body())
}

async fn read_body(mut payload: web::Payload) -> Result<BytesMut, AppError> {
    let mut body = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > MAX_SUBMISSION_BYTES {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

async fn read_multipart(mut multipart: Multipart) -> Result<Map<String, Value>, AppError> {
    let mut fields = Map::new();
    let mut total = 0usize;

    while let Some(field) = multipart.next().await {
        let mut field = field?;

        let is_file = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();
        let name = field.name().map(str::to_string);

        let mut value = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            total += chunk.len();
            if total > MAX_SUBMISSION_BYTES {
                return Err(too_large());
            }
            if !is_file {
                value.extend_from_slice(&chunk);
            }
        }

        if let (Some(name), false) = (name, is_file) {
            let text = String::from_utf8_lossy(&value).into_owned();
            fields.insert(name, Value::String(text));
        }
    }

    Ok(fields)
}

fn too_large() -> AppError {
    AppError::Validation("Request body is too large".into())
}

impl From<PayloadError> for AppError {
    fn from(err: PayloadError) -> Self {
        AppError::Validation(format!("Could not read request body: {}", err))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::Payload(e) => e.into(),
            _ => AppError::Validation(format!("Invalid multipart body: {}", err)),
        }
    }
}
