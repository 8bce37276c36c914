use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{MAX_TEXT_LEN, required};
use crate::{entity::customers::Membership, error::ValidationErrors};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub profile: UpdateCustomerRequest,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub membership: Option<Membership>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub membership: Option<Membership>,
}

/// Blank is allowed for profile fields; only the length is bounded.
fn optional_text(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<String> {
    let value = value?.trim().to_string();
    if value.chars().count() > MAX_TEXT_LEN {
        errors.add(
            field,
            format!("Ensure this field has no more than {MAX_TEXT_LEN} characters."),
        );
        return None;
    }
    Some(value)
}

impl UpdateCustomerRequest {
    pub fn validate(self) -> Result<CustomerChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let changes = CustomerChanges {
            first_name: optional_text(&mut errors, "first_name", self.first_name),
            last_name: optional_text(&mut errors, "last_name", self.last_name),
            phone: optional_text(&mut errors, "phone", self.phone),
            birth_date: self.birth_date,
            membership: self.membership,
        };
        errors.into_result(changes)
    }
}

impl CreateCustomerRequest {
    pub fn validate(self) -> Result<(Uuid, CustomerChanges), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let user_id = required(&mut errors, "user_id", self.user_id);
        let profile = match self.profile.validate() {
            Ok(profile) => Some(profile),
            Err(profile_errors) => {
                errors.merge(profile_errors);
                None
            }
        };
        match (user_id, profile) {
            (Some(user_id), Some(profile)) => Ok((user_id, profile)),
            _ => Err(errors),
        }
    }
}
