use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};
use storefront_api::{
    app,
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        cart::AddCartItemRequest,
        collections::CreateCollectionRequest,
        orders::{CreateOrderRequest, EMPTY_CART, NO_SUCH_CART, UpdateOrderRequest},
        products::{CreateProductRequest, UpdateProductRequest},
        reviews::CreateReviewRequest,
    },
    entity::{order_items, orders::PaymentStatus},
    error::AppError,
    middleware::auth::{AuthUser, encode_token},
    routes::params::Pagination,
    services::{
        cart_service, collection_service, order_service, product_service, review_service,
    },
    state::AppState,
};
use tokio::sync::broadcast::error::TryRecvError;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "flow-secret";

// Integration flow against a real database: catalog -> cart -> order.
// Every run creates its own rows, so nothing is truncated.
#[tokio::test]
async fn cart_to_order_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let staff = AuthUser {
        user_id: Uuid::new_v4(),
        is_staff: true,
        email: None,
    };
    let customer = AuthUser {
        user_id: Uuid::new_v4(),
        is_staff: false,
        email: Some("buyer@example.com".into()),
    };
    let tag = Uuid::new_v4().simple().to_string();

    // Catalog
    let collection = collection_service::create_collection(
        &state,
        &staff,
        CreateCollectionRequest {
            title: Some(format!("Flow {tag}")),
            featured_product: None,
        },
    )
    .await?;
    assert!(collection.id > 0);
    let fetched = collection_service::get_collection(&state, collection.id).await?;
    assert_eq!(fetched.products_count, 0);
    assert_eq!(fetched.title, collection.title);

    let mug = create_product(&state, &staff, collection.id, &tag, "mug", 1000).await?;
    assert_eq!(mug.price_with_tax, Decimal::new(1100, 2));
    let shirt = create_product(&state, &staff, collection.id, &tag, "shirt", 2550).await?;
    let poster = create_product(&state, &staff, collection.id, &tag, "poster", 300).await?;
    assert_eq!(
        collection_service::get_collection(&state, collection.id)
            .await?
            .products_count,
        3
    );

    // Collection with products cannot go away.
    let err = collection_service::delete_collection(&state, &staff, collection.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Reviews are scoped to the product in the path.
    let review = review_service::create_review(
        &state,
        mug.id,
        CreateReviewRequest {
            name: Some("Sam".into()),
            description: Some("Holds coffee.".into()),
        },
    )
    .await?;
    let reviews = review_service::list_reviews(&state, mug.id, &Pagination::default()).await?;
    assert_eq!(reviews.count, 1);
    assert_eq!(reviews.results[0].id, review.id);
    assert!(matches!(
        review_service::get_review(&state, shirt.id, review.id).await,
        Err(AppError::NotFound)
    ));

    // Cart: the same product twice merges into one line.
    let cart = cart_service::create_cart(&state).await?;
    assert!(cart.items.is_empty());
    add(&state, cart.id, mug.id, 2).await?;
    let merged = add(&state, cart.id, mug.id, 3).await?;
    assert_eq!(merged.quantity, 5);
    add(&state, cart.id, shirt.id, 1).await?;

    let err = add(&state, cart.id, i64::MAX, 1).await.unwrap_err();
    match err {
        AppError::Validation(errors) => assert!(errors.get("product_id").is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }

    let loaded = cart_service::get_cart(&state, cart.id).await?;
    assert_eq!(loaded.items.len(), 2);
    assert_eq!(loaded.total_price, Decimal::new(7550, 2));

    // The order takes the price current at checkout time.
    product_service::update_product(
        &state,
        &staff,
        mug.id,
        UpdateProductRequest {
            unit_price: Some(Decimal::new(1200, 2)),
            ..Default::default()
        },
    )
    .await?;

    let mut events = state.events.subscribe();
    let order = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            cart_id: Some(cart.id.to_string()),
        },
    )
    .await?;
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    let mug_line = order
        .items
        .iter()
        .find(|item| item.product.id == mug.id)
        .expect("mug line");
    assert_eq!(mug_line.quantity, 5);
    assert_eq!(mug_line.unit_price, Decimal::new(1200, 2));
    assert_eq!(order.total_price, Decimal::new(8550, 2));

    let event = events.recv().await?;
    assert_eq!(event.order_id, order.id);
    assert_eq!(event.customer_id, order.customer_id);
    assert_eq!(event.customer_email.as_deref(), Some("buyer@example.com"));

    // The cart is gone, so a second attempt fails validation.
    assert!(matches!(
        cart_service::get_cart(&state, cart.id).await,
        Err(AppError::NotFound)
    ));
    expect_cart_error(&state, &customer, cart.id, NO_SUCH_CART).await;

    // Later price changes do not touch the order.
    product_service::update_product(
        &state,
        &staff,
        mug.id,
        UpdateProductRequest {
            unit_price: Some(Decimal::new(9900, 2)),
            ..Default::default()
        },
    )
    .await?;
    let stored = order_service::get_order(&state, &customer, order.id).await?;
    assert_eq!(stored.total_price, order.total_price);

    // Other customers cannot see it; staff can and may mark it paid.
    let stranger = AuthUser {
        user_id: Uuid::new_v4(),
        is_staff: false,
        email: None,
    };
    assert!(matches!(
        order_service::get_order(&state, &stranger, order.id).await,
        Err(AppError::NotFound)
    ));
    let paid = order_service::update_order(
        &state,
        &staff,
        order.id,
        UpdateOrderRequest {
            payment_status: Some("complete".into()),
        },
    )
    .await?;
    assert_eq!(paid.payment_status, PaymentStatus::Complete);

    let mine = order_service::list_orders(&state, &customer, &Pagination::default()).await?;
    assert_eq!(mine.count, 1);

    // Empty carts never become orders.
    let empty = cart_service::create_cart(&state).await?;
    expect_cart_error(&state, &customer, empty.id, EMPTY_CART).await;
    expect_cart_error(&state, &customer, Uuid::new_v4(), NO_SUCH_CART).await;
    let mine = order_service::list_orders(&state, &customer, &Pagination::default()).await?;
    assert_eq!(mine.count, 1);

    // Ordered products stay; unordered ones can be deleted.
    let err = product_service::delete_product(&state, &staff, mug.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(product_service::get_product(&state, mug.id).await.is_ok());

    product_service::delete_product(&state, &staff, poster.id).await?;
    assert!(matches!(
        product_service::get_product(&state, poster.id).await,
        Err(AppError::NotFound)
    ));

    Ok(())
}

// A failing order item insert rolls back the order and leaves the cart usable.
#[tokio::test]
async fn failed_materialization_leaves_no_trace() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (staff, customer) = (staff(), customer());
    let tag = Uuid::new_v4().simple().to_string();

    let collection = create_collection(&state, &staff, &tag).await?;
    let mug = create_product(&state, &staff, collection, &tag, "mug", 1000).await?;
    let lamp = create_product(&state, &staff, collection, &tag, "lamp", 4500).await?;

    let cart = cart_service::create_cart(&state).await?;
    add(&state, cart.id, mug.id, 2).await?;
    add(&state, cart.id, lamp.id, 1).await?;

    let function = format!("reject_order_item_{tag}");
    state
        .orm
        .execute_unprepared(&format!(
            "CREATE FUNCTION {function}() RETURNS trigger AS $$ \
             BEGIN \
               IF NEW.product_id = {lamp_id} THEN RAISE EXCEPTION 'order item rejected'; END IF; \
               RETURN NEW; \
             END $$ LANGUAGE plpgsql",
            lamp_id = lamp.id
        ))
        .await?;
    state
        .orm
        .execute_unprepared(&format!(
            "CREATE TRIGGER {function} BEFORE INSERT ON order_items \
             FOR EACH ROW EXECUTE FUNCTION {function}()"
        ))
        .await?;

    let mut events = state.events.subscribe();
    let outcome = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            cart_id: Some(cart.id.to_string()),
        },
    )
    .await;

    state
        .orm
        .execute_unprepared(&format!("DROP TRIGGER {function} ON order_items"))
        .await?;
    state
        .orm
        .execute_unprepared(&format!("DROP FUNCTION {function}()"))
        .await?;

    assert!(matches!(outcome, Err(AppError::OrmError(_))));

    let orders = order_service::list_orders(&state, &customer, &Pagination::default()).await?;
    assert_eq!(orders.count, 0);
    let lines = order_items::Entity::find()
        .filter(order_items::Column::ProductId.is_in([mug.id, lamp.id]))
        .count(&state.orm)
        .await?;
    assert_eq!(lines, 0);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    let intact = cart_service::get_cart(&state, cart.id).await?;
    assert_eq!(intact.items.len(), 2);
    assert_eq!(intact.total_price, Decimal::new(6500, 2));

    // With the fault gone the same cart goes through.
    let order = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            cart_id: Some(cart.id.to_string()),
        },
    )
    .await?;
    assert_eq!(order.items.len(), 2);
    assert_eq!(events.recv().await?.order_id, order.id);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_from_one_cart_create_one_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let (staff, customer) = (staff(), customer());
    let tag = Uuid::new_v4().simple().to_string();

    let collection = create_collection(&state, &staff, &tag).await?;
    let mug = create_product(&state, &staff, collection, &tag, "mug", 1000).await?;
    let cart = cart_service::create_cart(&state).await?;
    add(&state, cart.id, mug.id, 4).await?;
    let cart_id = cart.id;

    let attempts: Vec<_> = (0..2)
        .map(|_| {
            let state = state.clone();
            let customer = customer.clone();
            tokio::spawn(async move {
                order_service::create_order(
                    &state,
                    &customer,
                    CreateOrderRequest {
                        cart_id: Some(cart_id.to_string()),
                    },
                )
                .await
            })
        })
        .collect();

    let mut placed = Vec::new();
    let mut rejected = Vec::new();
    for attempt in attempts {
        match attempt.await? {
            Ok(order) => placed.push(order),
            Err(err) => rejected.push(err),
        }
    }

    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].items.len(), 1);
    assert_eq!(placed[0].items[0].quantity, 4);
    match rejected.as_slice() {
        [AppError::Validation(errors)] => {
            assert_eq!(errors.get("cart_id"), Some(&[NO_SUCH_CART.to_string()][..]));
        }
        other => panic!("expected one cart_id validation error, got {other:?}"),
    }

    let orders = order_service::list_orders(&state, &customer, &Pagination::default()).await?;
    assert_eq!(orders.count, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_lose_no_quantity() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let staff = staff();
    let tag = Uuid::new_v4().simple().to_string();

    let collection = create_collection(&state, &staff, &tag).await?;
    let mug = create_product(&state, &staff, collection, &tag, "mug", 1000).await?;
    let cart_id = cart_service::create_cart(&state).await?.id;
    let product_id = mug.id;

    let adds: Vec<_> = (1..=8)
        .map(|quantity| {
            let state = state.clone();
            tokio::spawn(async move { add(&state, cart_id, product_id, quantity).await })
        })
        .collect();
    for added in adds {
        added.await??;
    }

    let loaded = cart_service::get_cart(&state, cart_id).await?;
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded.items[0].quantity, 36);
    Ok(())
}

// Wire-level checks through the full router.
#[tokio::test]
async fn collection_and_cart_scenarios_over_http() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let staff_token = encode_token(
        SECRET,
        Uuid::new_v4(),
        true,
        None,
        chrono::Duration::minutes(5),
    )?;
    let tag = Uuid::new_v4().simple().to_string();
    let title = format!("Wire {tag}");

    let response = app(state.clone())
        .oneshot(json_request(
            "POST",
            "/collections/",
            Some(&staff_token),
            json!({ "title": &title }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await?;
    let id = created["id"].as_i64().expect("integer id");
    assert!(id > 0);

    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .uri(format!("/collections/{id}/"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await?,
        json!({ "id": id, "title": title, "products_count": 0 })
    );

    let mug = create_product(&state, &staff(), id, &tag, "mug", 1000).await?;
    let cart = cart_service::create_cart(&state).await?;
    let items_uri = format!("/carts/{}/items/", cart.id);
    for quantity in [2, 3] {
        let response = app(state.clone())
            .oneshot(json_request(
                "POST",
                &items_uri,
                None,
                json!({ "product_id": mug.id, "quantity": quantity }),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app(state.clone())
        .oneshot(Request::builder().uri(&items_uri).body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let items = json_body(response).await?;
    assert_eq!(items["count"], 1);
    assert_eq!(items["results"][0]["quantity"], 5);
    Ok(())
}

fn staff() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        is_staff: true,
        email: None,
    }
}

fn customer() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        is_staff: false,
        email: None,
    }
}

async fn create_collection(state: &AppState, staff: &AuthUser, tag: &str) -> anyhow::Result<i64> {
    let collection = collection_service::create_collection(
        state,
        staff,
        CreateCollectionRequest {
            title: Some(format!("Collection {tag}")),
            featured_product: None,
        },
    )
    .await?;
    Ok(collection.id)
}

fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

async fn json_body(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "JWT_SECRET" => Some(SECRET.into()),
        _ => None,
    })?;
    Ok(Some(AppState::new(orm, config)))
}

async fn create_product(
    state: &AppState,
    staff: &AuthUser,
    collection_id: i64,
    tag: &str,
    name: &str,
    cents: i64,
) -> anyhow::Result<storefront_api::models::Product> {
    let product = product_service::create_product(
        state,
        staff,
        CreateProductRequest {
            title: Some(format!("{name} {tag}")),
            slug: Some(format!("{name}-{tag}")),
            description: None,
            unit_price: Some(Decimal::new(cents, 2)),
            inventory: Some(20),
            collection: Some(collection_id),
        },
    )
    .await?;
    Ok(product)
}

async fn add(
    state: &AppState,
    cart_id: Uuid,
    product_id: i64,
    quantity: i32,
) -> Result<storefront_api::models::AddedCartItem, AppError> {
    cart_service::add_item(
        state,
        cart_id,
        AddCartItemRequest {
            product_id: Some(product_id),
            quantity: Some(quantity),
        },
    )
    .await
}

async fn expect_cart_error(state: &AppState, user: &AuthUser, cart_id: Uuid, message: &str) {
    let err = order_service::create_order(
        state,
        user,
        CreateOrderRequest {
            cart_id: Some(cart_id.to_string()),
        },
    )
    .await
    .unwrap_err();
    match err {
        AppError::Validation(errors) => {
            assert_eq!(errors.get("cart_id"), Some(&[message.to_string()][..]));
        }
        other => panic!("expected cart_id validation error, got {other:?}"),
    }
}
