//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request's correlation ID
//! - `BearerToken`: the raw token from `Authorization: Bearer <token>`
//!
//! # Examples
//!
//! ```ignore
//! use openhouse_web::extractors::{BearerToken, CorrelationId};
//!
//! async fn handler(correlation_id: CorrelationId, token: BearerToken) -> String {
//!     tracing::info!(correlation_id = %correlation_id.0, "Processing request");
//!     verifier.verify(token.as_str())?.email
//! }
//! ```

use crate::error::AppError;
use crate::middleware::correlation_id_from;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use openhouse_core::DomainError;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Uses the ID stored by the correlation middleware when it is installed,
/// otherwise the `X-Correlation-ID` header, otherwise a fresh UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }
        Ok(Self(
            correlation_id_from(&parts.headers).unwrap_or_else(Uuid::new_v4),
        ))
    }
}

/// Bearer credential from the `Authorization` header.
///
/// Rejects with 401 `MISSING_CREDENTIAL` when the header is absent and 401
/// `INVALID_CREDENTIAL` when it is not a non-empty `Bearer` token. The
/// token itself is not verified here.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens must not end up in logs.
impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(DomainError::MissingCredential)?;

        let invalid = |reason: &str| DomainError::InvalidCredential {
            reason: reason.to_string(),
        };
        let value = header
            .to_str()
            .map_err(|_| invalid("authorization header is not valid text"))?;
        let (scheme, token) = value
            .split_once(' ')
            .ok_or_else(|| invalid("expected a Bearer token"))?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(invalid("expected a Bearer token").into());
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid("bearer token is empty").into());
        }

        Ok(Self(token.to_string()))
    }
}
