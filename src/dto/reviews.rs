use serde::Deserialize;
use utoipa::ToSchema;

use super::{required, text};
use crate::error::ValidationErrors;

/// The product comes from the path, never from the body.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub name: String,
    pub description: String,
}

fn body(errors: &mut ValidationErrors, value: String) -> Option<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        errors.add("description", super::BLANK);
        return None;
    }
    Some(value)
}

impl CreateReviewRequest {
    pub fn validate(self) -> Result<NewReview, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(&mut errors, "name", self.name).and_then(|n| text(&mut errors, "name", n));
        let description = required(&mut errors, "description", self.description)
            .and_then(|d| body(&mut errors, d));
        match (name, description) {
            (Some(name), Some(description)) => Ok(NewReview { name, description }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateReviewRequest {
    pub fn validate(self) -> Result<ReviewChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let changes = ReviewChanges {
            name: self.name.and_then(|n| text(&mut errors, "name", n)),
            description: self.description.and_then(|d| body(&mut errors, d)),
        };
        errors.into_result(changes)
    }
}
