use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Customer,
    response::{ErrorBody, Page},
    routes::{
        extract::{Json, Path, Query},
        params::SearchQuery,
    },
    services::customer_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers/", get(list_customers).post(create_customer))
        .route("/customers/me/", get(get_me).put(update_me).patch(update_me))
        .route(
            "/customers/{id}/",
            get(get_customer).put(update_customer).patch(update_customer),
        )
}

#[utoipa::path(
    get,
    path = "/customers/me/",
    responses(
        (status = 200, description = "The caller's profile, created on first access", body = Customer),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Customer>> {
    let customer = customer_service::get_me(&state, &user).await?;
    Ok(Json(customer))
}

#[utoipa::path(
    put,
    path = "/customers/me/",
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Profile updated", body = Customer),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<Customer>> {
    let customer = customer_service::update_me(&state, &user, payload).await?;
    Ok(Json(customer))
}

#[utoipa::path(
    get,
    path = "/customers/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("search" = Option<String>, Query, description = "First or last name starts with"),
    ),
    responses(
        (status = 200, description = "Customers", body = Page<Customer>),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Page<Customer>>> {
    let page = customer_service::list_customers(&state, &user, &query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/customers/",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = customer_service::create_customer(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    get,
    path = "/customers/{id}/",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let customer = customer_service::get_customer(&state, &user, id).await?;
    Ok(Json(customer))
}

#[utoipa::path(
    put,
    path = "/customers/{id}/",
    params(("id" = i64, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<Customer>> {
    let customer = customer_service::update_customer(&state, &user, id, payload).await?;
    Ok(Json(customer))
}
