use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use super::{at_least, price, required, required_text, slug, text};
use crate::error::ValidationErrors;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub inventory: Option<i32>,
    pub collection: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub inventory: i32,
    pub collection_id: i64,
}

fn description(value: Option<String>) -> Option<String> {
    value
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = required_text(&mut errors, "title", self.title);
        let slug = required(&mut errors, "slug", self.slug).and_then(|s| slug(&mut errors, "slug", s));
        let unit_price = required(&mut errors, "unit_price", self.unit_price)
            .and_then(|p| price(&mut errors, "unit_price", p));
        let inventory = required(&mut errors, "inventory", self.inventory)
            .and_then(|i| at_least(&mut errors, "inventory", i, 0));
        let collection_id = required(&mut errors, "collection", self.collection);

        match (title, slug, unit_price, inventory, collection_id) {
            (Some(title), Some(slug), Some(unit_price), Some(inventory), Some(collection_id))
                if errors.is_empty() =>
            {
                Ok(NewProduct {
                    title,
                    slug,
                    description: description(self.description),
                    unit_price,
                    inventory,
                    collection_id,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub inventory: Option<i32>,
    pub collection: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub unit_price: Option<Decimal>,
    pub inventory: Option<i32>,
    pub collection_id: Option<i64>,
}

impl UpdateProductRequest {
    pub fn validate(self) -> Result<ProductChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let changes = ProductChanges {
            title: self.title.and_then(|t| text(&mut errors, "title", t)),
            slug: self.slug.and_then(|s| slug(&mut errors, "slug", s)),
            description: self.description.map(|d| description(Some(d))),
            unit_price: self
                .unit_price
                .and_then(|p| price(&mut errors, "unit_price", p)),
            inventory: self
                .inventory
                .and_then(|i| at_least(&mut errors, "inventory", i, 0)),
            collection_id: self.collection,
        };
        errors.into_result(changes)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProductImageRequest {
    pub image: Option<String>,
}

impl CreateProductImageRequest {
    pub fn validate(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match required_text(&mut errors, "image", self.image) {
            Some(image) => Ok(image),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateProductRequest {
        CreateProductRequest {
            title: Some("Test Product".into()),
            slug: Some("test-product".into()),
            description: Some("This is a test product.".into()),
            unit_price: Some(Decimal::new(1000, 2)),
            inventory: Some(100),
            collection: Some(1),
        }
    }

    #[test]
    fn accepts_complete_product() {
        let product = valid().validate().unwrap();
        assert_eq!(product.title, "Test Product");
        assert_eq!(product.collection_id, 1);
        assert_eq!(product.unit_price, Decimal::new(1000, 2));
    }

    #[test]
    fn blank_title_is_rejected() {
        let errors = CreateProductRequest {
            title: Some(String::new()),
            ..valid()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("title").is_some());
        assert!(errors.get("slug").is_none());
    }

    #[test]
    fn title_only_reports_every_missing_field() {
        let errors = CreateProductRequest {
            title: Some("test".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        for field in ["slug", "unit_price", "inventory", "collection"] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
    }

    #[test]
    fn negative_values_are_rejected() {
        let errors = CreateProductRequest {
            unit_price: Some(Decimal::new(-100, 2)),
            inventory: Some(-1),
            ..valid()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("unit_price").is_some());
        assert!(errors.get("inventory").is_some());
    }

    #[test]
    fn blank_description_clears_it() {
        let changes = UpdateProductRequest {
            description: Some("  ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.description, Some(None));
        assert_eq!(changes.title, None);
    }

    #[test]
    fn image_reference_is_required() {
        assert!(CreateProductImageRequest::default().validate().is_err());
        assert_eq!(
            CreateProductImageRequest {
                image: Some("products/mug.png".into())
            }
            .validate()
            .unwrap(),
            "products/mug.png"
        );
    }
}
