use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{utils::get_client_ip::get_client_ip, AppState};

/// Rate-limit identity of the caller.
/// Usage: add `client: ClientIp` as a handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequest for ClientIp {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let trust = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.config.trust_forwarded_for)
            .unwrap_or(true);

        ready(Ok(ClientIp(get_client_ip(req.headers(), trust))))
    }
}
