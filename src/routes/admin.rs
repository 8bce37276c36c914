use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::admin::ClearInventoryRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{AdminCustomer, AdminOrder, AdminProduct, ClearInventoryResult, Collection},
    response::{ErrorBody, Page},
    routes::{
        extract::{Json, Query},
        params::{AdminProductQuery, Pagination, SearchQuery},
    },
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/products/", get(list_products))
        .route("/admin/products/clear-inventory/", post(clear_inventory))
        .route("/admin/customers/", get(list_customers))
        .route("/admin/collections/", get(list_collections))
        .route("/admin/orders/", get(list_orders))
}

#[utoipa::path(
    get,
    path = "/admin/products/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("inventory" = Option<String>, Query, description = "low or ok"),
        ("collection_id" = Option<i64>, Query, description = "Only products of this collection"),
        ("search" = Option<String>, Query, description = "Title contains"),
    ),
    responses(
        (status = 200, description = "Products with inventory status (staff only)", body = Page<AdminProduct>),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminProductQuery>,
) -> AppResult<Json<Page<AdminProduct>>> {
    let page = admin_service::list_products(&state, &user, query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/admin/products/clear-inventory/",
    request_body = ClearInventoryRequest,
    responses(
        (status = 200, description = "Inventory set to zero", body = ClearInventoryResult),
        (status = 400, description = "No products selected", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn clear_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ClearInventoryRequest>,
) -> AppResult<Json<ClearInventoryResult>> {
    let result = admin_service::clear_inventory(&state, &user, payload).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/admin/customers/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("search" = Option<String>, Query, description = "First or last name starts with"),
    ),
    responses(
        (status = 200, description = "Customers with order counts", body = Page<AdminCustomer>),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Page<AdminCustomer>>> {
    let page = admin_service::list_customers(&state, &user, &query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/admin/collections/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("search" = Option<String>, Query, description = "Title contains"),
    ),
    responses(
        (status = 200, description = "Collections with product counts", body = Page<Collection>),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_collections(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Page<Collection>>> {
    let page = admin_service::list_collections(&state, &user, &query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/admin/orders/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
    ),
    responses(
        (status = 200, description = "Orders with customer names", body = Page<AdminOrder>),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Page<AdminOrder>>> {
    let page = admin_service::list_orders(&state, &user, &pagination).await?;
    Ok(Json(page))
}
