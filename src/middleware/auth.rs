use axum::{extract::FromRequestParts, http::header};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Claims issued by the identity provider.
#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_staff: bool,
    /// Where order confirmations go, when the provider shares it.
    pub email: Option<String>,
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Orders are placed by customers, not by staff identities.
pub fn ensure_customer(user: &AuthUser) -> Result<(), AppError> {
    if user.is_staff {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Signs an HS256 token with the shared secret; used by the seed tool and tests.
pub fn encode_token(
    secret: &str,
    user_id: Uuid,
    is_staff: bool,
    email: Option<&str>,
    ttl: Duration,
) -> anyhow::Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| anyhow::anyhow!("Failed to set expiration"))?;
    let claims = Claims {
        sub: user_id.to_string(),
        is_staff,
        email: email.map(str::to_string),
        exp: expiration.timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "rejected bearer token");
        AppError::Unauthorized
    })?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        is_staff: decoded.claims.is_staff,
        email: decoded.claims.email.filter(|e| !e.is_empty()),
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        decode_token(&state.config.jwt_secret, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_identity() {
        let user_id = Uuid::new_v4();
        let token = encode_token("secret", user_id, true, None, Duration::minutes(5)).unwrap();

        let user = decode_token("secret", &token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert!(user.is_staff);
        assert_eq!(user.email, None);
    }

    #[test]
    fn email_claim_is_carried() {
        let token = encode_token(
            "secret",
            Uuid::new_v4(),
            false,
            Some("ada@example.com"),
            Duration::minutes(5),
        )
        .unwrap();

        let user = decode_token("secret", &token).unwrap();
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token =
            encode_token("secret", Uuid::new_v4(), false, None, Duration::minutes(5)).unwrap();
        assert!(matches!(
            decode_token("other", &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let token =
            encode_token("secret", Uuid::new_v4(), false, None, Duration::hours(-2)).unwrap();
        assert!(matches!(
            decode_token("secret", &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn role_guards() {
        let staff = AuthUser {
            user_id: Uuid::new_v4(),
            is_staff: true,
            email: None,
        };
        let customer = AuthUser {
            user_id: Uuid::new_v4(),
            is_staff: false,
            email: None,
        };
        assert!(ensure_staff(&staff).is_ok());
        assert!(matches!(ensure_staff(&customer), Err(AppError::Forbidden)));
        assert!(ensure_customer(&customer).is_ok());
        assert!(matches!(ensure_customer(&staff), Err(AppError::Forbidden)));
    }
}
