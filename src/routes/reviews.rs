use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::reviews::{CreateReviewRequest, UpdateReviewRequest},
    error::AppResult,
    models::Review,
    response::{ErrorBody, Page},
    routes::{
        extract::{Json, Path, Query},
        params::Pagination,
    },
    services::review_service,
    state::AppState,
};

// Reviews are open to anonymous visitors.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/products/{product_id}/reviews/",
            get(list_reviews).post(create_review),
        )
        .route(
            "/products/{product_id}/reviews/{id}/",
            get(get_review)
                .put(update_review)
                .patch(update_review)
                .delete(delete_review),
        )
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/reviews/",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
    ),
    responses(
        (status = 200, description = "Reviews of the product, newest first", body = Page<Review>),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Page<Review>>> {
    let page = review_service::list_reviews(&state, product_id, &pagination).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}/reviews/{id}/",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("id" = i64, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review", body = Review),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    tag = "Reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path((product_id, id)): Path<(i64, i64)>,
) -> AppResult<Json<Review>> {
    let review = review_service::get_review(&state, product_id, id).await?;
    Ok(Json(review))
}

#[utoipa::path(
    post,
    path = "/products/{product_id}/reviews/",
    params(("product_id" = i64, Path, description = "Product ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = review_service::create_review(&state, product_id, payload).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[utoipa::path(
    patch,
    path = "/products/{product_id}/reviews/{id}/",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("id" = i64, Path, description = "Review ID"),
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    Path((product_id, id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<Review>> {
    let review = review_service::update_review(&state, product_id, id, payload).await?;
    Ok(Json(review))
}

#[utoipa::path(
    delete,
    path = "/products/{product_id}/reviews/{id}/",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("id" = i64, Path, description = "Review ID"),
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Path((product_id, id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    review_service::delete_review(&state, product_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
