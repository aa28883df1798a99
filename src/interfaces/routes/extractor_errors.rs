use actix_web::web;

use crate::errors::AppError;

/// Renders query, path and JSON extractor failures in the common error shape.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid query string: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid path parameter: {}", err)).into()
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid JSON body: {}", err)).into()
    }));
}
