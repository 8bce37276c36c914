use serde::Deserialize;
use utoipa::ToSchema;

use super::{required_text, text};
use crate::error::ValidationErrors;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateCollectionRequest {
    pub title: Option<String>,
    pub featured_product: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollection {
    pub title: String,
    pub featured_product: Option<i64>,
}

impl CreateCollectionRequest {
    pub fn validate(self) -> Result<NewCollection, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = required_text(&mut errors, "title", self.title);
        match title {
            Some(title) if errors.is_empty() => Ok(NewCollection {
                title,
                featured_product: self.featured_product,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCollectionRequest {
    pub title: Option<String>,
    pub featured_product: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionChanges {
    pub title: Option<String>,
    pub featured_product: Option<i64>,
}

impl UpdateCollectionRequest {
    pub fn validate(self) -> Result<CollectionChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let title = self.title.and_then(|t| text(&mut errors, "title", t));
        errors.into_result(CollectionChanges {
            title,
            featured_product: self.featured_product,
        })
    }
}
