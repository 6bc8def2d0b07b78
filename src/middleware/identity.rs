use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::Error;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller-supplied user identity, trusted as-is. There is no
/// authentication layer in front of it; the header is the identity.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Validation(format!("Missing {} header", USER_ID_HEADER)))?;

        Ok(UserId(value.to_string()))
    }
}
