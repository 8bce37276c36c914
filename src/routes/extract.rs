//! `Json`, `Path` and `Query` extractors whose rejections render as
//! [`AppError`], so input that does not parse gets the same JSON error shape
//! as every other failure.

use axum::{
    extract::{
        FromRequest, FromRequestParts, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, ValidationErrors};

/// Key used when a body error cannot be pinned to one field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(AppError::from)?;
        Ok(Json(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(AppError::from)?;
        Ok(Path(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(AppError::from)?;
        Ok(Query(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let (field, message) = split_data_error(&err.body_text());
                AppError::Validation(ValidationErrors::single(&field, message))
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

// An id that does not parse cannot name an existing row.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => {
                tracing::debug!(error = %err.body_text(), "unparseable path parameter");
                AppError::NotFound
            }
            other => AppError::Internal(anyhow::anyhow!(other.body_text())),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Splits `"<prefix>: <path>: <message>"` into the offending field and its
/// message. Errors at the document root go under [`NON_FIELD_ERRORS`].
fn split_data_error(text: &str) -> (String, String) {
    let detail = text.split_once(": ").map_or(text, |(_, rest)| rest);

    if let Some((path, message)) = detail.split_once(": ").filter(|(path, _)| is_field_path(path)) {
        return (path.to_string(), message.to_string());
    }

    if let Some(field) = detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field)
    {
        return (field.to_string(), "This field is required.".to_string());
    }

    (NON_FIELD_ERRORS.to_string(), detail.to_string())
}

fn is_field_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "Failed to deserialize the JSON body into the target type";

    #[test]
    fn type_errors_name_the_field() {
        let (field, message) = split_data_error(&format!(
            "{PREFIX}: quantity: invalid type: string \"two\", expected i32 at line 1 column 33"
        ));
        assert_eq!(field, "quantity");
        assert!(message.starts_with("invalid type: string \"two\""));
    }

    #[test]
    fn nested_paths_are_kept() {
        let (field, _) = split_data_error(&format!(
            "{PREFIX}: product_ids[1]: invalid type: string \"x\", expected i64"
        ));
        assert_eq!(field, "product_ids[1]");
    }

    #[test]
    fn missing_fields_are_required() {
        let (field, message) = split_data_error(&format!(
            "{PREFIX}: missing field `title` at line 1 column 2"
        ));
        assert_eq!(field, "title");
        assert_eq!(message, "This field is required.");
    }

    #[test]
    fn root_errors_are_not_field_errors() {
        let (field, message) = split_data_error(&format!(
            "{PREFIX}: invalid type: sequence, expected struct AddCartItemRequest"
        ));
        assert_eq!(field, NON_FIELD_ERRORS);
        assert!(message.starts_with("invalid type: sequence"));
    }
}
