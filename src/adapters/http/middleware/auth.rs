//! Bearer-token extraction.
//!
//! The settings handlers establish identity themselves through the
//! `SessionValidator` port, so the HTTP layer only lifts the raw token out of
//! the `Authorization` header:
//!
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! A missing header, a non-Bearer scheme or an empty token all yield `None`,
//! which the handlers report as "not authenticated".

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

/// The raw access token from the `Authorization` header, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    fn from_header(value: &str) -> Option<String> {
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(Self::from_header);
        Ok(BearerToken(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Option<String> {
        let mut builder = Request::builder().uri("/api/settings/profile");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _body) = builder.body(()).unwrap().into_parts();

        let BearerToken(token) = BearerToken::from_request_parts(&mut parts, &()).await.unwrap();
        token
    }

    #[tokio::test]
    async fn extracts_bearer_token() {
        assert_eq!(extract(Some("Bearer abc.def")).await.as_deref(), Some("abc.def"));
    }

    #[tokio::test]
    async fn scheme_is_case_insensitive() {
        assert_eq!(extract(Some("bearer abc")).await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn missing_header_is_none() {
        assert_eq!(extract(None).await, None);
    }

    #[tokio::test]
    async fn other_schemes_are_ignored() {
        assert_eq!(extract(Some("Basic dXNlcjpwYXNz")).await, None);
        assert_eq!(extract(Some("abc")).await, None);
    }

    #[tokio::test]
    async fn empty_token_is_none() {
        assert_eq!(extract(Some("Bearer    ")).await, None);
    }
}
