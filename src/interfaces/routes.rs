use actix_web::{web, HttpRequest, HttpResponse, Route};

use crate::{
    errors::AppError,
    handlers::{home::home, system::health_check},
};

mod content;
mod extractor_errors;
mod proxy;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.service(
        web::scope("/api")
            .configure(proxy::config_routes)
            .configure(content::config_routes)
    );

    cfg.configure(extractor_errors::config_routes);
}

/// Fallback for a resource: any method other than `allow` gets a 405.
pub(crate) fn only_allow(allow: &'static str) -> Route {
    web::route().to(move |req: HttpRequest| async move {
        Err::<HttpResponse, AppError>(AppError::MethodNotAllowed {
            method: req.method().to_string(),
            allow,
        })
    })
}
