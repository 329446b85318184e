//! Sources of the caller's access token.
//!
//! The pipeline never issues, refreshes or stores tokens. It asks an
//! [`AccessTokenProvider`] for the token of the current caller once per
//! call and forwards it untouched.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::Secret;
use std::convert::Infallible;

/// Capability to read the current caller's bearer token.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// The token, or `None` when the caller has none.
    async fn access_token(&self) -> Option<Secret<String>>;
}

/// A fixed (possibly absent) token.
#[derive(Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<Secret<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(Secret::new(token.into())),
        }
    }

    pub fn absent() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Option<Secret<String>> {
        self.token.clone()
    }
}

/// The bearer token presented on the incoming request.
///
/// Extraction never fails: a missing or malformed `Authorization` header
/// yields an empty token and the identity provider decides.
#[derive(Clone, Default)]
pub struct BearerToken(Option<Secret<String>>);

impl BearerToken {
    pub fn from_header(value: Option<&str>) -> Self {
        let token = value
            .and_then(|v| {
                let (scheme, token) = v.trim().split_once(' ')?;
                scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
            })
            .filter(|token| !token.is_empty())
            .map(|token| Secret::new(token.to_string()));
        Self(token)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        Ok(BearerToken::from_header(header))
    }
}

#[async_trait]
impl AccessTokenProvider for BearerToken {
    async fn access_token(&self) -> Option<Secret<String>> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn parses_bearer_scheme_case_insensitively() {
        let token = BearerToken::from_header(Some("bearer abc.def.ghi"));
        assert!(token.is_present());
        assert_eq!(token.0.unwrap().expose_secret(), "abc.def.ghi");
    }

    #[test]
    fn ignores_other_schemes_and_empty_tokens() {
        assert!(!BearerToken::from_header(Some("Basic dXNlcjpwYXNz")).is_present());
        assert!(!BearerToken::from_header(Some("Bearer ")).is_present());
        assert!(!BearerToken::from_header(Some("Bearer")).is_present());
        assert!(!BearerToken::from_header(None).is_present());
    }

    #[tokio::test]
    async fn static_provider_returns_configured_token() {
        let provider = StaticTokenProvider::new("token-1");
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), "token-1");

        assert!(StaticTokenProvider::absent().access_token().await.is_none());
    }
}
