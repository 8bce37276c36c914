use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, UpdateCartItemRequest},
    error::AppResult,
    models::{AddedCartItem, Cart, CartItem},
    response::{ErrorBody, Page},
    routes::{
        extract::{Json, Path, Query},
        params::Pagination,
    },
    services::cart_service,
    state::AppState,
};

// Carts are anonymous: whoever holds the id may use the cart.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/carts/", post(create_cart))
        .route("/carts/{cart_id}/", get(get_cart).delete(delete_cart))
        .route("/carts/{cart_id}/items/", get(list_items).post(add_item))
        .route(
            "/carts/{cart_id}/items/{id}/",
            get(get_item).patch(update_item).delete(delete_item),
        )
}

#[utoipa::path(
    post,
    path = "/carts/",
    responses(
        (status = 201, description = "Empty cart created", body = Cart)
    ),
    tag = "Carts"
)]
pub async fn create_cart(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Cart>)> {
    let cart = cart_service::create_cart(&state).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

#[utoipa::path(
    get,
    path = "/carts/{cart_id}/",
    params(("cart_id" = Uuid, Path, description = "Cart ID")),
    responses(
        (status = 200, description = "Cart with items and totals", body = Cart),
        (status = 404, description = "Cart not found", body = ErrorBody),
    ),
    tag = "Carts"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> AppResult<Json<Cart>> {
    let cart = cart_service::get_cart(&state, cart_id).await?;
    Ok(Json(cart))
}

#[utoipa::path(
    delete,
    path = "/carts/{cart_id}/",
    params(("cart_id" = Uuid, Path, description = "Cart ID")),
    responses(
        (status = 204, description = "Cart deleted"),
        (status = 404, description = "Cart not found", body = ErrorBody),
    ),
    tag = "Carts"
)]
pub async fn delete_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    cart_service::delete_cart(&state, cart_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/carts/{cart_id}/items/",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
    ),
    responses(
        (status = 200, description = "Items in the cart", body = Page<CartItem>),
        (status = 404, description = "Cart not found", body = ErrorBody),
    ),
    tag = "Carts"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Page<CartItem>>> {
    let page = cart_service::list_items(&state, cart_id, &pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/carts/{cart_id}/items/{id}/",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("id" = i64, Path, description = "Cart item ID"),
    ),
    responses(
        (status = 200, description = "Cart item", body = CartItem),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    tag = "Carts"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path((cart_id, id)): Path<(Uuid, i64)>,
) -> AppResult<Json<CartItem>> {
    let item = cart_service::get_item(&state, cart_id, id).await?;
    Ok(Json(item))
}

#[utoipa::path(
    post,
    path = "/carts/{cart_id}/items/",
    params(("cart_id" = Uuid, Path, description = "Cart ID")),
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Product added; an existing line is incremented", body = AddedCartItem),
        (status = 400, description = "Invalid input or unknown product", body = ErrorBody),
        (status = 404, description = "Cart not found", body = ErrorBody),
    ),
    tag = "Carts"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<(StatusCode, Json<AddedCartItem>)> {
    let item = cart_service::add_item(&state, cart_id, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    patch,
    path = "/carts/{cart_id}/items/{id}/",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("id" = i64, Path, description = "Cart item ID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity replaced", body = CartItem),
        (status = 400, description = "Invalid quantity", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    tag = "Carts"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path((cart_id, id)): Path<(Uuid, i64)>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<CartItem>> {
    let item = cart_service::update_item(&state, cart_id, id, payload).await?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/carts/{cart_id}/items/{id}/",
    params(
        ("cart_id" = Uuid, Path, description = "Cart ID"),
        ("id" = i64, Path, description = "Cart item ID"),
    ),
    responses(
        (status = 204, description = "Item removed"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    tag = "Carts"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path((cart_id, id)): Path<(Uuid, i64)>,
) -> AppResult<StatusCode> {
    cart_service::delete_item(&state, cart_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
