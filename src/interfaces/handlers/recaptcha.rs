use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    errors::AppError,
    handlers::payload::read_submission,
    use_cases::extractors::ClientIp,
    AppState,
};

/// The limit is taken before the body is read, so flooding callers cost
/// neither parsing nor an upstream call.
#[tracing::instrument(name = "verify_recaptcha", skip_all, fields(client = %client.0))]
pub async fn verify_recaptcha(
    req: HttpRequest,
    client: ClientIp,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let decision = state.recaptcha_handler.admit(&client.0).await?;

    let submission = read_submission(&req, payload).await?;
    let outcome = state
        .recaptcha_handler
        .verify(&client.0, &submission.fields)
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header(("X-RateLimit-Remaining", decision.remaining.to_string()))
        .json(outcome))
}
