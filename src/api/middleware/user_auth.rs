//! Access-token extractor (Bearer header or `access_token` cookie)

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::api::auth::cookies::{token_from_jar, ACCESS_TOKEN_COOKIE};
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::token::{TokenClaims, TokenKind};
use crate::domain::DomainError;

/// Extractor that requires a valid access token
///
/// Reads `Authorization: Bearer <token>`, falling back to the
/// `access_token` cookie. The token is trusted until it expires, so the
/// store is not consulted here.
#[derive(Debug, Clone)]
pub struct RequireAccessToken(pub TokenClaims);

impl FromRequestParts<AppState> for RequireAccessToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_access_token(&parts.headers)?;

        debug!("Validating access token");

        let claims = state.credential_service.validate_token(&token)?;
        claims
            .require_kind(TokenKind::Access)
            .map_err(DomainError::from)?;

        Ok(RequireAccessToken(claims))
    }
}

/// Bearer header first, then the access token cookie
pub fn extract_access_token(headers: &HeaderMap) -> Result<String, ApiError> {
    extract_bearer_token(headers).or_else(|missing| {
        token_from_jar(&CookieJar::from_headers(headers), ACCESS_TOKEN_COOKIE).ok_or(missing)
    })
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide an access token via 'Authorization: Bearer <token>' header or the access_token cookie",
    )
    .with_code("missing_token"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJIUzI1NiJ9.test".parse().unwrap(),
        );

        assert_eq!(
            extract_bearer_token(&headers).unwrap(),
            "eyJhbGciOiJIUzI1NiJ9.test"
        );
    }

    #[test]
    fn test_missing_token() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.response.error.code.as_deref(), Some("missing_token"));
    }

    #[test]
    fn test_invalid_auth_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        assert!(extract_bearer_token(&headers).is_err());
    }

    #[test]
    fn test_access_token_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "theme=dark; access_token=from-cookie".parse().unwrap());

        assert_eq!(extract_access_token(&headers).unwrap(), "from-cookie");

        headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());
        assert_eq!(extract_access_token(&headers).unwrap(), "from-header");
    }

    #[test]
    fn test_refresh_cookie_is_not_an_access_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "refresh_token=abc".parse().unwrap());

        let err = extract_access_token(&headers).unwrap_err();
        assert_eq!(err.response.error.code.as_deref(), Some("missing_token"));
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   token-with-spaces   ".parse().unwrap(),
        );

        assert_eq!(extract_bearer_token(&headers).unwrap(), "token-with-spaces");
    }
}
