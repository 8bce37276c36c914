pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
};

use crate::{response::ErrorBody, routes::doc::scalar_docs, state::AppState};

/// The full application: API routes, docs and the JSON 404 fallback.
pub fn app(state: AppState) -> Router {
    routes::create_api_router()
        .merge(scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    let body = ErrorBody {
        error: format!("No route for {}", uri.path()),
        fields: None,
    };
    (StatusCode::NOT_FOUND, Json(body))
}
