use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ValidationErrors;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ClearInventoryRequest {
    #[serde(default)]
    pub product_ids: Vec<i64>,
}

impl ClearInventoryRequest {
    pub fn validate(self) -> Result<Vec<i64>, ValidationErrors> {
        if self.product_ids.is_empty() {
            return Err(ValidationErrors::single(
                "product_ids",
                "Select at least one product.",
            ));
        }
        let mut ids = self.product_ids;
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_deduplicated() {
        let ids = ClearInventoryRequest {
            product_ids: vec![3, 1, 3],
        }
        .validate()
        .unwrap();
        assert_eq!(ids, vec![1, 3]);
        assert!(ClearInventoryRequest::default().validate().is_err());
    }
}
