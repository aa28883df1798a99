use actix_web::web;

use crate::handlers::content;
use super::only_allow;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/content")
            .route(web::get().to(content::passthrough))
            .default_service(only_allow("GET"))
    )
    .service(
        web::resource("/rooms")
            .route(web::get().to(content::list_rooms))
            .default_service(only_allow("GET"))
    )
    .service(
        web::resource("/rooms/{slug}")
            .route(web::get().to(content::get_room))
            .default_service(only_allow("GET"))
    )
    .service(
        web::resource("/amenities")
            .route(web::get().to(content::list_amenities))
            .default_service(only_allow("GET"))
    )
    .service(
        web::resource("/attractions")
            .route(web::get().to(content::list_attractions))
            .default_service(only_allow("GET"))
    )
    .service(
        web::resource("/gallery")
            .route(web::get().to(content::gallery))
            .default_service(only_allow("GET"))
    );
}
