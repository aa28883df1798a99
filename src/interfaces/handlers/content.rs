use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::{errors::AppError, AppState};

fn listing<T: Serialize>(items: Vec<T>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "count": items.len(),
        "data": items,
    }))
}

pub async fn list_rooms(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(listing(state.content_handler.list_rooms().await?))
}

pub async fn get_room(
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let room = state.content_handler.room_by_slug(&slug).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": room })))
}

pub async fn list_amenities(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(listing(state.content_handler.list_amenities().await?))
}

pub async fn list_attractions(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(listing(state.content_handler.list_attractions().await?))
}

pub async fn gallery(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(listing(state.content_handler.gallery().await?))
}

/// Raw CMS JSON for `?path=<resource>`; other params are passed along.
#[tracing::instrument(name = "content_passthrough", skip(state))]
pub async fn passthrough(
    state: web::Data<AppState>,
    params: web::Query<BTreeMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let body = state
        .content_handler
        .passthrough(params.get("path").map(String::as_str), &params)
        .await?;

    Ok(HttpResponse::Ok().json(body))
}
