use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::required;
use crate::{entity::orders::PaymentStatus, error::ValidationErrors};

pub const NO_SUCH_CART: &str = "No cart with the given ID was found.";
pub const EMPTY_CART: &str = "The cart is empty.";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub cart_id: Option<String>,
}

impl CreateOrderRequest {
    pub fn validate(self) -> Result<Uuid, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(raw) = required(&mut errors, "cart_id", self.cart_id) else {
            return Err(errors);
        };
        Uuid::parse_str(raw.trim())
            .map_err(|_| ValidationErrors::single("cart_id", "Must be a valid UUID."))
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub payment_status: Option<String>,
}

impl UpdateOrderRequest {
    pub fn validate(self) -> Result<PaymentStatus, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let Some(raw) = required(&mut errors, "payment_status", self.payment_status) else {
            return Err(errors);
        };
        match raw.trim() {
            "pending" => Ok(PaymentStatus::Pending),
            "complete" => Ok(PaymentStatus::Complete),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(ValidationErrors::single(
                "payment_status",
                format!("\"{other}\" is not a valid choice."),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_id_must_be_a_uuid() {
        assert!(CreateOrderRequest::default().validate().is_err());

        let errors = CreateOrderRequest {
            cart_id: Some("not-a-uuid".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            errors.get("cart_id"),
            Some(&["Must be a valid UUID.".to_string()][..])
        );

        let id = Uuid::new_v4();
        assert_eq!(
            CreateOrderRequest {
                cart_id: Some(id.to_string())
            }
            .validate()
            .unwrap(),
            id
        );
    }

    #[test]
    fn payment_status_choices() {
        let status = UpdateOrderRequest {
            payment_status: Some("complete".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(status, PaymentStatus::Complete);

        assert!(UpdateOrderRequest {
            payment_status: Some("refunded".into())
        }
        .validate()
        .is_err());
    }
}
