use axum::{Router, routing::get};

use crate::state::AppState;

pub mod admin;
pub mod carts;
pub mod collections;
pub mod customers;
pub mod doc;
pub mod extract;
pub mod health;
pub mod images;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;

// Paths are absolute and keep their trailing slash. Every route under
// `/products/{product_id}` uses the same parameter name for that segment.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(collections::router())
        .merge(products::router())
        .merge(images::router())
        .merge(reviews::router())
        .merge(carts::router())
        .merge(orders::router())
        .merge(customers::router())
        .merge(admin::router())
}
