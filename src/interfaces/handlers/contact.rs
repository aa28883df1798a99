use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    errors::AppError,
    handlers::payload::{read_submission, relay},
    AppState,
};

#[tracing::instrument(name = "submit_contact", skip_all)]
pub async fn submit_contact(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let submission = read_submission(&req, payload).await?;
    let reply = state.contact_handler.submit(submission).await?;

    Ok(relay(reply))
}
