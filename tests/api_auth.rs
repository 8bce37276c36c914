// Request-level checks that are decided before the database is touched, so
// they run against a disconnected connection.
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use storefront_api::{
    app, config::AppConfig, middleware::auth::encode_token, state::AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret";

fn test_app() -> Router {
    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/unused".into()),
        "JWT_SECRET" => Some(SECRET.into()),
        _ => None,
    })
    .unwrap();
    app(AppState::new(DatabaseConnection::Disconnected, config))
}

fn token(is_staff: bool) -> String {
    encode_token(SECRET, Uuid::new_v4(), is_staff, None, chrono::Duration::minutes(5)).unwrap()
}

fn post(uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn anonymous_collection_create_is_unauthorized() {
    let response = test_app()
        .oneshot(post("/collections/", None, json!({ "title": "test" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_token_is_unauthorized() {
    let response = test_app()
        .oneshot(post("/collections/", Some("not-a-jwt"), json!({ "title": "test" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_staff_product_create_is_forbidden() {
    let customer = token(false);
    let response = test_app()
        .oneshot(post("/products/", Some(&customer), json!({ "title": "test" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn staff_product_create_reports_field_errors() {
    let staff = token(true);
    let response = test_app()
        .oneshot(post("/products/", Some(&staff), json!({ "title": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["fields"]["title"][0], "This field may not be blank.");
    assert_eq!(body["fields"]["slug"][0], "This field is required.");
}

#[tokio::test]
async fn staff_cannot_place_orders() {
    let staff = token(true);
    let response = test_app()
        .oneshot(post(
            "/orders/",
            Some(&staff),
            json!({ "cart_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_without_cart_id_is_a_validation_error() {
    let customer = token(false);
    let response = test_app()
        .oneshot(post("/orders/", Some(&customer), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["fields"]["cart_id"][0], "This field is required.");
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/nowhere/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("/nowhere/"));
}

#[tokio::test]
async fn health_is_public() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn mistyped_body_field_is_a_field_error() {
    let uri = format!("/carts/{}/items/", Uuid::new_v4());
    let response = test_app()
        .oneshot(post(&uri, None, json!({ "product_id": 1, "quantity": "two" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let body = json_body(response).await;
    let messages = body["fields"]["quantity"].as_array().unwrap();
    assert!(messages[0].as_str().unwrap().contains("invalid type"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/carts/{}/items/", Uuid::new_v4()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"product_id\": 1,"))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Bad request"));
}

#[tokio::test]
async fn unparseable_cart_id_is_json_not_found() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/carts/not-a-uuid/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Not found.");
}

#[tokio::test]
async fn unparseable_page_is_bad_request() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/collections/?page=first")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}
