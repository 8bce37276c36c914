use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::{Expr, OnConflict};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, UpdateCartItemRequest},
    entity::{
        CartItems, Carts, Products,
        cart_items::{ActiveModel as CartItemActive, Column as CartItemCol, Model as CartItemModel},
        carts::{ActiveModel as CartActive, Model as CartModel},
    },
    error::{AppError, AppResult},
    models::{AddedCartItem, Cart, CartItem},
    response::Page,
    routes::params::Pagination,
    state::AppState,
};

pub const NO_SUCH_PRODUCT: &str = "No product with the given ID was found.";

pub async fn find_cart<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<CartModel> {
    Carts::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

/// Cart items with their products, oldest first.
async fn load_items<C: ConnectionTrait>(db: &C, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
    let rows = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .order_by_asc(CartItemCol::Id)
        .find_also_related(Products)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| product.map(|product| CartItem::from_entity(item, &product)))
        .collect())
}

async fn find_item(state: &AppState, cart_id: Uuid, id: i64) -> AppResult<CartItemModel> {
    CartItems::find_by_id(id)
        .filter(CartItemCol::CartId.eq(cart_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn item_with_product(state: &AppState, item: CartItemModel) -> AppResult<CartItem> {
    let product = Products::find_by_id(item.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(CartItem::from_entity(item, &product))
}

pub async fn create_cart(state: &AppState) -> AppResult<Cart> {
    let cart = CartActive {
        id: Set(Uuid::new_v4()),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::debug!(cart_id = %cart.id, "cart created");
    Ok(Cart::from_entity(cart, Vec::new()))
}

pub async fn get_cart(state: &AppState, id: Uuid) -> AppResult<Cart> {
    let cart = find_cart(&state.orm, id).await?;
    let items = load_items(&state.orm, cart.id).await?;
    Ok(Cart::from_entity(cart, items))
}

pub async fn delete_cart(state: &AppState, id: Uuid) -> AppResult<()> {
    let result = Carts::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn list_items(
    state: &AppState,
    cart_id: Uuid,
    pagination: &Pagination,
) -> AppResult<Page<CartItem>> {
    let cart = find_cart(&state.orm, cart_id).await?;
    let (page, per_page, offset) = pagination.normalize();

    let finder = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .order_by_asc(CartItemCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let results = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(item, product)| product.map(|product| CartItem::from_entity(item, &product)))
        .collect();

    Ok(Page::new(results, page, per_page, total))
}

pub async fn get_item(state: &AppState, cart_id: Uuid, id: i64) -> AppResult<CartItem> {
    let item = find_item(state, cart_id, id).await?;
    item_with_product(state, item).await
}

/// Adds `quantity` of a product, merging into an existing line in one statement.
pub async fn add_item(
    state: &AppState,
    cart_id: Uuid,
    payload: AddCartItemRequest,
) -> AppResult<AddedCartItem> {
    let cart = find_cart(&state.orm, cart_id).await?;
    let input = payload.validate()?;

    if Products::find_by_id(input.product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::field("product_id", NO_SUCH_PRODUCT));
    }

    let item = CartItems::insert(CartItemActive {
        cart_id: Set(cart.id),
        product_id: Set(input.product_id),
        quantity: Set(input.quantity),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([CartItemCol::CartId, CartItemCol::ProductId])
            .value(
                CartItemCol::Quantity,
                Expr::col((CartItems, CartItemCol::Quantity))
                    .add(Expr::cust("EXCLUDED.quantity")),
            )
            .to_owned(),
    )
    .exec_with_returning(&state.orm)
    .await?;

    tracing::debug!(
        cart_id = %cart.id,
        product_id = item.product_id,
        quantity = item.quantity,
        "cart item saved"
    );
    Ok(AddedCartItem::from(item))
}

/// Sets an absolute quantity.
pub async fn update_item(
    state: &AppState,
    cart_id: Uuid,
    id: i64,
    payload: UpdateCartItemRequest,
) -> AppResult<CartItem> {
    let existing = find_item(state, cart_id, id).await?;
    let quantity = payload.validate()?;

    let mut active: CartItemActive = existing.into();
    active.quantity = Set(quantity);
    let item = active.update(&state.orm).await?;

    item_with_product(state, item).await
}

pub async fn delete_item(state: &AppState, cart_id: Uuid, id: i64) -> AppResult<()> {
    let result = CartItems::delete_many()
        .filter(CartItemCol::Id.eq(id))
        .filter(CartItemCol::CartId.eq(cart_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
