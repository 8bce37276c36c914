use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::collections::{CreateCollectionRequest, UpdateCollectionRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Collection,
    response::{ErrorBody, Page},
    routes::{
        extract::{Json, Path, Query},
        params::{Pagination, SearchQuery},
    },
    services::collection_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/collections/", get(list_collections).post(create_collection))
        .route(
            "/collections/{id}/",
            get(get_collection)
                .put(update_collection)
                .patch(update_collection)
                .delete(delete_collection),
        )
}

#[utoipa::path(
    get,
    path = "/collections/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("search" = Option<String>, Query, description = "Title contains"),
    ),
    responses(
        (status = 200, description = "Collections with product counts", body = Page<Collection>)
    ),
    tag = "Collections"
)]
pub async fn list_collections(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Page<Collection>>> {
    let page =
        collection_service::list_collections(&state, &query, Pagination::DEFAULT_PER_PAGE).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/collections/{id}/",
    params(("id" = i64, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection", body = Collection),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    tag = "Collections"
)]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Collection>> {
    let collection = collection_service::get_collection(&state, id).await?;
    Ok(Json(collection))
}

#[utoipa::path(
    post,
    path = "/collections/",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = Collection),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Collections"
)]
pub async fn create_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCollectionRequest>,
) -> AppResult<(StatusCode, Json<Collection>)> {
    let collection = collection_service::create_collection(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

#[utoipa::path(
    put,
    path = "/collections/{id}/",
    params(("id" = i64, Path, description = "Collection ID")),
    request_body = UpdateCollectionRequest,
    responses(
        (status = 200, description = "Collection updated", body = Collection),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Collections"
)]
pub async fn update_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCollectionRequest>,
) -> AppResult<Json<Collection>> {
    let collection = collection_service::update_collection(&state, &user, id, payload).await?;
    Ok(Json(collection))
}

#[utoipa::path(
    delete,
    path = "/collections/{id}/",
    params(("id" = i64, Path, description = "Collection ID")),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 409, description = "Collection still has products", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Collections"
)]
pub async fn delete_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    collection_service::delete_collection(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
