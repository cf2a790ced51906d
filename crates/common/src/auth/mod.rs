//! Caller identity
//!
//! Authentication itself happens upstream. This module only resolves who
//! the caller is:
//! - a `Bearer` JWT verified with the configured HS256 secret, or
//! - the identity header set by the upstream auth proxy, or
//! - nobody (anonymous demo mode).
//!
//! With a secret configured only tokens count; the identity header is
//! ignored.

use crate::config::AuthConfig;
use crate::errors::{AppError, Result};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderName},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (owner identity)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// HS256 token verifier
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtVerifier {
    /// Create a verifier for the given shared secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token for `subject`, valid for `ttl_secs`
    pub fn issue_token(&self, subject: &str, ttl_secs: i64) -> Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: subject.to_string(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AppError::Internal {
            message: format!("Failed to generate token: {}", e),
        })
    }

    /// Validate and decode a token
    pub fn verify(&self, token: &str) -> Result<JwtClaims> {
        decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })
    }
}

/// How identities are resolved; installed as a request extension
#[derive(Clone)]
pub struct IdentitySettings {
    verifier: Option<Arc<JwtVerifier>>,
    header: HeaderName,
}

impl IdentitySettings {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let header = HeaderName::try_from(config.identity_header.as_str()).map_err(|e| {
            AppError::Configuration {
                message: format!("Invalid identity header '{}': {}", config.identity_header, e),
            }
        })?;

        let verifier = config
            .jwt_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(|secret| Arc::new(JwtVerifier::new(secret)));

        Ok(Self { verifier, header })
    }

    pub fn verifies_tokens(&self) -> bool {
        self.verifier.is_some()
    }

    fn resolve(&self, parts: &Parts) -> Result<Option<String>> {
        if let Some(verifier) = &self.verifier {
            let token = parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(extract_bearer);

            return match token {
                Some(token) => verifier.verify(token).map(|claims| Some(claims.sub)),
                None => Ok(None),
            };
        }

        Ok(parts
            .headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from))
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            verifier: None,
            header: HeaderName::from_static("x-user-id"),
        }
    }
}

/// Extract the token from an `Authorization: Bearer` header value
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The caller's owner identity, `None` when anonymous
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub Option<String>);

impl Identity {
    pub fn owner(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let identity = match parts.extensions.get::<IdentitySettings>() {
            Some(settings) => settings.resolve(parts)?,
            None => IdentitySettings::default().resolve(parts)?,
        };

        Ok(Identity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)], settings: Option<IdentitySettings>) -> Parts {
        let mut builder = Request::builder().uri("/api/query");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        if let Some(settings) = settings {
            parts.extensions.insert(settings);
        }
        parts
    }

    fn jwt_settings(secret: &str) -> IdentitySettings {
        IdentitySettings::from_config(&AuthConfig {
            jwt_secret: Some(secret.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("Basic abc"), None);
    }

    #[test]
    fn test_jwt_roundtrip() {
        let verifier = JwtVerifier::new("test_secret");
        let token = verifier.issue_token("user_42", 3600).unwrap();
        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "user_42");

        let other = JwtVerifier::new("other_secret");
        assert!(matches!(other.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let verifier = JwtVerifier::new("test_secret");
        let token = verifier.issue_token("user_42", -3600).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AppError::ExpiredToken)));
    }

    #[tokio::test]
    async fn test_anonymous_without_headers() {
        let mut parts = parts(&[], None);
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn test_identity_header() {
        let mut parts = parts(&[("x-user-id", "user_7")], None);
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.owner(), Some("user_7"));
    }

    #[tokio::test]
    async fn test_blank_identity_header_is_anonymous() {
        let mut parts = parts(&[("x-user-id", "  ")], None);
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn test_bearer_token_wins_over_header() {
        let settings = jwt_settings("s3cret");
        assert!(settings.verifies_tokens());
        let token = JwtVerifier::new("s3cret").issue_token("user_jwt", 60).unwrap();
        let bearer = format!("Bearer {}", token);

        let mut parts = parts(
            &[("authorization", bearer.as_str()), ("x-user-id", "user_hdr")],
            Some(settings),
        );
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.owner(), Some("user_jwt"));
    }

    #[tokio::test]
    async fn test_identity_header_ignored_when_tokens_verified() {
        let mut parts = parts(&[("x-user-id", "victim")], Some(jwt_settings("s3cret")));
        let identity = Identity::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(identity.is_anonymous());
    }

    #[tokio::test]
    async fn test_invalid_bearer_token_rejected() {
        let mut parts = parts(
            &[("authorization", "Bearer not-a-token")],
            Some(jwt_settings("s3cret")),
        );
        let result = Identity::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_invalid_header_name_is_configuration_error() {
        let result = IdentitySettings::from_config(&AuthConfig {
            identity_header: "bad header".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
