use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::products::CreateProductImageRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::ProductImage,
    response::{ErrorBody, Page},
    routes::{
        extract::{Json, Path, Query},
        params::Pagination,
    },
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/products/{product_id}/images/",
            get(list_images).post(create_image),
        )
        .route(
            "/products/{product_id}/images/{id}/",
            get(get_image).delete(delete_image),
        )
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/images/",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
    ),
    responses(
        (status = 200, description = "Images of the product", body = Page<ProductImage>),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    tag = "Product Images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Page<ProductImage>>> {
    let page = product_service::list_images(&state, product_id, &pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/images/{id}/",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("id" = i64, Path, description = "Image ID"),
    ),
    responses(
        (status = 200, description = "Image", body = ProductImage),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    tag = "Product Images"
)]
pub async fn get_image(
    State(state): State<AppState>,
    Path((product_id, id)): Path<(i64, i64)>,
) -> AppResult<Json<ProductImage>> {
    let image = product_service::get_image(&state, product_id, id).await?;
    Ok(Json(image))
}

#[utoipa::path(
    post,
    path = "/products/{product_id}/images/",
    params(("product_id" = i64, Path, description = "Product ID")),
    request_body = CreateProductImageRequest,
    responses(
        (status = 201, description = "Image attached", body = ProductImage),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn create_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<i64>,
    Json(payload): Json<CreateProductImageRequest>,
) -> AppResult<(StatusCode, Json<ProductImage>)> {
    let image = product_service::create_image(&state, &user, product_id, payload).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    delete,
    path = "/products/{product_id}/images/{id}/",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("id" = i64, Path, description = "Image ID"),
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((product_id, id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    product_service::delete_image(&state, &user, product_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
