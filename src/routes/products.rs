use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::products::{CreateProductRequest, UpdateProductRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Product,
    response::{ErrorBody, Page},
    routes::{
        extract::{Json, Path, Query},
        params::ProductQuery,
    },
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products/", get(list_products).post(create_product))
        .route(
            "/products/{product_id}/",
            get(get_product)
                .put(update_product)
                .patch(update_product)
                .delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/products/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("collection_id" = Option<i64>, Query, description = "Only products of this collection"),
        ("unit_price__gt" = Option<String>, Query, description = "Unit price greater than"),
        ("unit_price__lt" = Option<String>, Query, description = "Unit price less than"),
        ("search" = Option<String>, Query, description = "Title or description contains"),
        ("ordering" = Option<String>, Query, description = "unit_price, -unit_price, last_update, -last_update"),
    ),
    responses(
        (status = 200, description = "List products", body = Page<Product>),
        (status = 400, description = "Unknown ordering", body = ErrorBody),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Page<Product>>> {
    let page = product_service::list_products(&state, query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/",
    params(("product_id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = Product),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = product_service::get_product(&state, id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/products/",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = Product),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    patch,
    path = "/products/{product_id}/",
    params(("product_id" = i64, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<Product>> {
    let product = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/products/{product_id}/",
    params(("product_id" = i64, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted product"),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 409, description = "Product is referenced by an order item", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    product_service::delete_product(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
