//! Wire representations returned by the API, and the projections that build
//! them from entity rows.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    cart_items, carts, collections, customers, customers::Membership, order_items, orders,
    orders::PaymentStatus, product_images, products, reviews,
};

/// Products below this inventory are reported as `Low`.
pub const LOW_INVENTORY_THRESHOLD: i32 = 10;

/// Rounded to cents.
pub fn price_with_tax(unit_price: Decimal) -> Decimal {
    (unit_price * Decimal::new(11, 1)).round_dp(2)
}

pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

pub fn inventory_status(inventory: i32) -> &'static str {
    if inventory < LOW_INVENTORY_THRESHOLD {
        "Low"
    } else {
        "OK"
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Collection {
    pub id: i64,
    pub title: String,
    pub products_count: i64,
}

impl Collection {
    pub fn from_entity(model: collections::Model, products_count: i64) -> Self {
        Self {
            id: model.id,
            title: model.title,
            products_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub inventory: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub price_with_tax: Decimal,
    pub collection: i64,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            slug: model.slug,
            inventory: model.inventory,
            price_with_tax: price_with_tax(model.unit_price),
            unit_price: model.unit_price,
            collection: model.collection_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct SimpleProduct {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
}

impl From<&products::Model> for SimpleProduct {
    fn from(model: &products::Model) -> Self {
        Self {
            id: model.id,
            title: model.title.clone(),
            unit_price: model.unit_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub image: String,
}

impl From<product_images::Model> for ProductImage {
    fn from(model: product_images::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            image: model.image,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Review {
    pub id: i64,
    pub date: NaiveDate,
    pub name: String,
    pub description: String,
}

impl From<reviews::Model> for Review {
    fn from(model: reviews::Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            name: model.name,
            description: model.description,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct CartItem {
    pub id: i64,
    pub product: SimpleProduct,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

impl CartItem {
    pub fn from_entity(item: cart_items::Model, product: &products::Model) -> Self {
        Self {
            id: item.id,
            product: SimpleProduct::from(product),
            quantity: item.quantity,
            total_price: line_total(item.quantity, product.unit_price),
        }
    }
}

/// Result of adding a product to a cart.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct AddedCartItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

impl From<cart_items::Model> for AddedCartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Cart {
    pub id: Uuid,
    pub items: Vec<CartItem>,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

impl Cart {
    pub fn from_entity(cart: carts::Model, items: Vec<CartItem>) -> Self {
        let total_price = items.iter().map(|item| item.total_price).sum();
        Self {
            id: cart.id,
            items,
            total_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: Membership,
}

impl From<customers::Model> for Customer {
    fn from(model: customers::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            birth_date: model.birth_date,
            membership: model.membership,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i64,
    pub product: SimpleProduct,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

impl OrderItem {
    /// Prices come from the snapshot on the item, not from the product.
    pub fn from_entity(item: order_items::Model, product: &products::Model) -> Self {
        Self {
            id: item.id,
            product: SimpleProduct::from(product),
            unit_price: item.unit_price,
            quantity: item.quantity,
            total_price: line_total(item.quantity, item.unit_price),
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub placed_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItem>,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

impl Order {
    pub fn from_entity(order: orders::Model, items: Vec<OrderItem>) -> Self {
        let total_price = items.iter().map(|item| item.total_price).sum();
        Self {
            id: order.id,
            customer_id: order.customer_id,
            placed_at: order.placed_at.with_timezone(&Utc),
            payment_status: order.payment_status,
            items,
            total_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct AdminProduct {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub inventory: i32,
    pub inventory_status: String,
    pub collection_title: String,
}

impl AdminProduct {
    pub fn from_entity(model: products::Model, collection_title: String) -> Self {
        Self {
            id: model.id,
            title: model.title,
            unit_price: model.unit_price,
            inventory: model.inventory,
            inventory_status: inventory_status(model.inventory).to_string(),
            collection_title,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct AdminCustomer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub membership: Membership,
    pub orders_count: i64,
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct AdminOrder {
    pub id: i64,
    pub placed_at: DateTime<Utc>,
    pub customer_id: i64,
    pub customer_name: String,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct ClearInventoryResult {
    pub updated_count: u64,
}
