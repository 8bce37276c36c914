//! Request bodies and the pure validation that turns each into the input a
//! service accepts.

use rust_decimal::Decimal;

use crate::error::ValidationErrors;

pub mod admin;
pub mod cart;
pub mod collections;
pub mod customers;
pub mod orders;
pub mod products;
pub mod reviews;

pub const MAX_TEXT_LEN: usize = 255;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const BLANK: &str = "This field may not be blank.";

/// Checks a present value: trimmed, non-blank, within the length limit.
pub(crate) fn text(errors: &mut ValidationErrors, field: &str, value: String) -> Option<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() > MAX_TEXT_LEN {
        errors.add(
            field,
            format!("Ensure this field has no more than {MAX_TEXT_LEN} characters."),
        );
        return None;
    }
    Some(value)
}

/// Like [`text`] but a missing value is an error too.
pub(crate) fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    match value {
        Some(value) => text(errors, field, value),
        None => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

pub(crate) fn required<T>(errors: &mut ValidationErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

pub(crate) fn at_least(errors: &mut ValidationErrors, field: &str, value: i32, min: i32) -> Option<i32> {
    if value < min {
        errors.add(
            field,
            format!("Ensure this value is greater than or equal to {min}."),
        );
        return None;
    }
    Some(value)
}

/// Fits `NUMERIC(6, 2)` and is not negative.
pub(crate) fn price(errors: &mut ValidationErrors, field: &str, value: Decimal) -> Option<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
        return None;
    }
    if value.normalize().scale() > 2 {
        errors.add(field, "Ensure that there are no more than 2 decimal places.");
        return None;
    }
    if value >= Decimal::new(10_000, 0) {
        errors.add(field, "Ensure that there are no more than 6 digits in total.");
        return None;
    }
    Some(value)
}

/// Letters, digits, hyphens and underscores only.
pub(crate) fn slug(errors: &mut ValidationErrors, field: &str, value: String) -> Option<String> {
    let value = text(errors, field, value)?;
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        errors.add(
            field,
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        );
        return None;
    }
    Some(value)
}
