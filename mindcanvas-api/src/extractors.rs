//! Request extractors.
//!
//! The user's identity is the raw value of the `Authorization` header. There is
//! no credential check; the header only partitions storage.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use mindcanvas_core::UserId;
use uuid::Uuid;

use crate::error::ApiError;

/// Authenticated user id taken from the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl AuthUser {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("Missing user_id"))?;

        let user_id = value
            .to_str()
            .map_err(|_| ApiError::unauthorized("Authorization header is not valid text"))?
            .trim();

        if user_id.is_empty() {
            return Err(ApiError::unauthorized("Missing user_id"));
        }

        Ok(AuthUser(user_id.to_string()))
    }
}

/// Parse an id taken from a URL path. Anything that is not a UUID cannot name a
/// stored entity, so the caller's not-found error is returned.
pub fn parse_path_id(raw: &str, not_found: fn() -> ApiError) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| not_found())
}
