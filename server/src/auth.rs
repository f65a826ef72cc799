//! Authenticated caller extractor.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use openhouse_core::providers::IdentityVerifier;
use openhouse_core::types::Identity;
use openhouse_web::{AppError, BearerToken, CorrelationId};
use std::sync::Arc;

/// The verified caller of a request.
///
/// Reads the bearer token and verifies it with the state's
/// [`IdentityVerifier`]. Rejects with 401 when the token is missing or fails
/// verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<dyn IdentityVerifier>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(CorrelationId(correlation_id)) =
            CorrelationId::from_request_parts(parts, state).await;
        let token = BearerToken::from_request_parts(parts, state)
            .await
            .inspect_err(|e| tracing::debug!(%correlation_id, code = e.code(), "No usable bearer credential"))?;
        let verifier = Arc::<dyn IdentityVerifier>::from_ref(state);
        let identity = verifier
            .verify(token.as_str())
            .inspect_err(|e| tracing::debug!(%correlation_id, error = %e, "Credential rejected"))?;
        tracing::debug!(%correlation_id, subject = %identity.subject, "Caller authenticated");
        Ok(Self(identity))
    }
}
