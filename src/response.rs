use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ValidationErrors;

/// One page of a list endpoint.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Page<T> {
    pub count: i64,
    pub page: i64,
    pub per_page: i64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, page: i64, per_page: i64, count: i64) -> Self {
        Self {
            count,
            page,
            per_page,
            results,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub fields: Option<ValidationErrors>,
}
