use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::orders::{CreateOrderRequest, UpdateOrderRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::{ErrorBody, Page},
    routes::{
        extract::{Json, Path, Query},
        params::Pagination,
    },
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders/", get(list_orders).post(create_order))
        .route("/orders/{id}/", get(get_order).patch(update_order))
}

#[utoipa::path(
    get,
    path = "/orders/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
    ),
    responses(
        (status = 200, description = "Orders visible to the caller", body = Page<Order>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Page<Order>>> {
    let page = order_service::list_orders(&state, &user, &pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = Order),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    let order = order_service::get_order(&state, &user, id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/orders/",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed from the cart; the cart is deleted", body = Order),
        (status = 400, description = "Missing, unknown or empty cart", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Staff identities cannot place orders", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = order_service::create_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Payment status updated", body = Order),
        (status = 400, description = "Invalid status", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<Order>> {
    let order = order_service::update_order(&state, &user, id, payload).await?;
    Ok(Json(order))
}
