use actix_web::web;

use crate::handlers::{booking, contact, recaptcha};
use super::only_allow;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/booking")
            .route(web::post().to(booking::submit_booking))
            .default_service(only_allow("POST"))
    )
    .service(
        web::resource("/contact")
            .route(web::post().to(contact::submit_contact))
            .default_service(only_allow("POST"))
    )
    .service(
        web::resource("/verify-recaptcha")
            .route(web::post().to(recaptcha::verify_recaptcha))
            .default_service(only_allow("POST"))
    );
}
