use actix_web::{get, web, HttpRequest, HttpResponse, Responder};

use crate::{errors::AppError, AppState};

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Welcome to the {} API", state.config.name),
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "endpoints": [
            "POST /api/booking",
            "POST /api/contact",
            "POST /api/verify-recaptcha",
            "GET /api/content?path=",
            "GET /api/rooms",
            "GET /api/rooms/{slug}",
            "GET /api/amenities",
            "GET /api/attractions",
            "GET /api/gallery"
        ]
    }))
}

pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!("No route for {} {}", req.method(), req.path())))
}
