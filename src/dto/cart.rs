use serde::Deserialize;
use utoipa::ToSchema;

use super::{at_least, required};
use crate::error::ValidationErrors;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_id: i64,
    pub quantity: i32,
}

impl AddCartItemRequest {
    /// Shape only; whether the product exists is checked against the catalog.
    pub fn validate(self) -> Result<NewCartItem, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let product_id = required(&mut errors, "product_id", self.product_id);
        let quantity = required(&mut errors, "quantity", self.quantity)
            .and_then(|q| at_least(&mut errors, "quantity", q, 1));
        match (product_id, quantity) {
            (Some(product_id), Some(quantity)) => Ok(NewCartItem {
                product_id,
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: Option<i32>,
}

impl UpdateCartItemRequest {
    pub fn validate(self) -> Result<i32, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let quantity = required(&mut errors, "quantity", self.quantity)
            .and_then(|q| at_least(&mut errors, "quantity", q, 1));
        quantity.ok_or(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        let errors = AddCartItemRequest {
            product_id: Some(1),
            quantity: Some(0),
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("quantity").is_some());

        assert!(UpdateCartItemRequest { quantity: Some(-2) }.validate().is_err());
        assert_eq!(UpdateCartItemRequest { quantity: Some(4) }.validate().unwrap(), 4);
    }

    #[test]
    fn product_is_required() {
        let errors = AddCartItemRequest {
            product_id: None,
            quantity: Some(1),
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("product_id").is_some());
    }
}
