//! Authentication for protected routes.
//!
//! Tokens are read from the `Authorization: Bearer` header first and the
//! `accessToken` cookie second.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use catalog_core::catalog::Actor;
use catalog_shared::{Claims, JwtError};
use tracing::debug;

use crate::{AppState, error::ApiError};

/// Cookie set by the auth service.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Finds the access token in the request headers.
fn find_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_owned);

    from_header.or_else(|| {
        CookieJar::from_headers(headers)
            .get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned())
    })
}

/// Extractor for authenticated user claims.
///
/// Rejects with 401 when the token is missing, malformed or expired.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The caller as seen by the catalog services.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(Self(claims.clone()));
        }

        let token = find_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Authentication token is required"))?;

        let claims = state.jwt_service.validate_token(&token).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            match e {
                JwtError::Expired => ApiError::unauthorized("Token has expired"),
                _ => ApiError::unauthorized("Invalid or malformed token"),
            }
        })?;

        parts.extensions.insert(claims.clone());
        Ok(Self(claims))
    }
}

/// Authenticated user whose role may create and edit catalog entries.
///
/// Rejects with 403 for any other role.
#[derive(Debug, Clone)]
pub struct CatalogEditor(pub AuthUser);

impl CatalogEditor {
    /// The caller as seen by the catalog services.
    #[must_use]
    pub fn actor(&self) -> Actor {
        self.0.actor()
    }
}

impl FromRequestParts<AppState> for CatalogEditor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.actor().can_edit_catalog() {
            return Err(ApiError::forbidden(
                "You are not allowed to access this resource",
            ));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::COOKIE};

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("accessToken=from-cookie"));

        assert_eq!(find_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=from-cookie"),
        );

        assert_eq!(find_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(find_token(&headers).is_none());
    }
}
