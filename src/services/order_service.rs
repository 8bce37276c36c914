use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, EMPTY_CART, NO_SUCH_CART, UpdateOrderRequest},
    entity::{
        CartItems, Carts, Customers, OrderItems, Orders, Products,
        cart_items::Column as CartItemCol,
        customers::Column as CustomerCol,
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Model as OrderModel, PaymentStatus},
    },
    error::{AppError, AppResult},
    events::OrderCreated,
    middleware::auth::{AuthUser, ensure_customer, ensure_staff},
    models::{Order, OrderItem},
    response::Page,
    routes::params::Pagination,
    services::customer_service::get_or_create_customer,
    state::AppState,
};

/// Order items with their products, grouped by order id.
async fn load_items<C: ConnectionTrait>(
    db: &C,
    order_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<OrderItem>>> {
    let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.iter().copied()))
        .order_by_asc(OrderItemCol::Id)
        .find_also_related(Products)
        .all(db)
        .await?;

    for (item, product) in rows {
        if let Some(product) = product {
            grouped
                .entry(item.order_id)
                .or_default()
                .push(OrderItem::from_entity(item, &product));
        }
    }
    Ok(grouped)
}

async fn with_items<C: ConnectionTrait>(db: &C, order: OrderModel) -> AppResult<Order> {
    let mut items = load_items(db, &[order.id]).await?;
    let items = items.remove(&order.id).unwrap_or_default();
    Ok(Order::from_entity(order, items))
}

/// Checks that the cart exists and is not empty, reporting each as a `cart_id` error.
async fn check_cart<C: ConnectionTrait>(db: &C, cart_id: Uuid) -> AppResult<()> {
    if Carts::find_by_id(cart_id).one(db).await?.is_none() {
        return Err(AppError::field("cart_id", NO_SUCH_CART));
    }
    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .count(db)
        .await?;
    if items == 0 {
        return Err(AppError::field("cart_id", EMPTY_CART));
    }
    Ok(())
}

/// Staff see every order; everyone else only the orders of their own customer.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: &Pagination,
) -> AppResult<Page<Order>> {
    let (page, per_page, offset) = pagination.normalize();

    let mut finder = Orders::find();
    if !user.is_staff {
        let customer = Customers::find()
            .filter(CustomerCol::UserId.eq(user.user_id))
            .one(&state.orm)
            .await?;
        let Some(customer) = customer else {
            return Ok(Page::new(Vec::new(), page, per_page, 0));
        };
        finder = finder.filter(OrderCol::CustomerId.eq(customer.id));
    }
    finder = finder
        .order_by_desc(OrderCol::PlacedAt)
        .order_by_desc(OrderCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<i64> = orders.iter().map(|order| order.id).collect();
    let mut items = load_items(&state.orm, &ids).await?;
    let results = orders
        .into_iter()
        .map(|order| {
            let lines = items.remove(&order.id).unwrap_or_default();
            Order::from_entity(order, lines)
        })
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

pub async fn get_order(state: &AppState, user: &AuthUser, id: i64) -> AppResult<Order> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !user.is_staff {
        let owner = Customers::find_by_id(order.customer_id)
            .one(&state.orm)
            .await?;
        if owner.map(|customer| customer.user_id) != Some(user.user_id) {
            return Err(AppError::NotFound);
        }
    }

    with_items(&state.orm, order).await
}

/// Turns a cart into an order owned by the caller's customer.
///
/// The cart row is locked for the whole transaction, so two concurrent
/// requests for the same cart cannot both produce an order. Every order item
/// carries the product's unit price at this moment. The cart and its items are
/// gone once the transaction commits, and only then is [`OrderCreated`]
/// published.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<Order> {
    ensure_customer(user)?;
    let cart_id = payload.validate()?;
    check_cart(&state.orm, cart_id).await?;

    let customer = get_or_create_customer(&state.orm, user.user_id).await?;

    let txn = state.orm.begin().await?;

    let cart = Carts::find_by_id(cart_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::field("cart_id", NO_SUCH_CART))?;

    let rows = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::Id)
        .find_also_related(Products)
        .all(&txn)
        .await?;
    if rows.is_empty() {
        return Err(AppError::field("cart_id", EMPTY_CART));
    }

    let order = OrderActive {
        customer_id: Set(customer.id),
        payment_status: Set(PaymentStatus::Pending),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut new_items = Vec::with_capacity(rows.len());
    for (item, product) in rows {
        let product = product.ok_or_else(|| {
            anyhow::anyhow!("cart item {} references a missing product", item.id)
        })?;
        new_items.push(OrderItemActive {
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(item.quantity),
            unit_price: Set(product.unit_price),
            ..Default::default()
        });
    }
    let line_count = new_items.len();
    OrderItems::insert_many(new_items).exec(&txn).await?;

    Carts::delete_by_id(cart.id).exec(&txn).await?;

    let order = with_items(&txn, order).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = order.id,
        customer_id = order.customer_id,
        items = line_count,
        cart_id = %cart_id,
        "order placed"
    );

    state.events.publish(OrderCreated {
        order_id: order.id,
        customer_id: order.customer_id,
        customer_email: user.email.clone(),
        placed_at: order.placed_at,
    });

    Ok(order)
}

pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateOrderRequest,
) -> AppResult<Order> {
    ensure_staff(user)?;
    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let payment_status = payload.validate()?;

    let mut active: OrderActive = existing.into();
    active.payment_status = Set(payment_status);
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = order.id, ?payment_status, "payment status updated");
    with_items(&state.orm, order).await
}
