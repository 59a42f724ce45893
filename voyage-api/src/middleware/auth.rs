use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::{AppState, AuthConfig}};

pub const CUSTOMER_ROLE: &str = "CUSTOMER";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerClaims {
    /// User id.
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

pub fn issue_token(auth: &AuthConfig, user_id: Uuid) -> Result<String, AppError> {
    let claims = CustomerClaims {
        sub: user_id.to_string(),
        role: CUSTOMER_ROLE.to_owned(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

/// Customer identity behind a valid `Authorization: Bearer <jwt>` header.
/// Handlers that take this argument reject anonymous callers with 401 and
/// tokens for any other role with 403.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                AppError::AuthenticationError("Authentication credentials were not provided.".to_string())
            })?;

        let token_data = decode::<CustomerClaims>(
            bearer.token(),
            &DecodingKey::from_secret(state.auth.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::AuthenticationError(format!("Invalid token: {}", e)))?;

        if token_data.claims.role != CUSTOMER_ROLE {
            return Err(AppError::AuthorizationError(
                "You do not have permission to perform this action.".to_string(),
            ));
        }

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|_| AppError::AuthenticationError("Invalid token subject.".to_string()))?;

        Ok(AuthUser { user_id })
    }
}
