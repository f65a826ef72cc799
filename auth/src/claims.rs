//! Token claims.

use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by a bearer token.
///
/// The subject may arrive as `sub` or, from older issuers, as `uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Legacy subject identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Verified email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Issued-at, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Claims for `subject`/`email`, issued at `issued_at` and valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LifetimeOutOfRange`] when the expiry falls outside
    /// the representable date range.
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(AuthError::LifetimeOutOfRange)?;
        Ok(Self {
            sub: Some(subject.into()),
            uid: None,
            email: Some(email.into()),
            exp: expires_at.timestamp(),
            iss: None,
            iat: Some(issued_at.timestamp()),
        })
    }

    /// Set the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// The subject, preferring `sub` over `uid`. Empty values count as absent.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.uid.as_deref().filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn uid_is_used_when_sub_is_missing() {
        let claims: Claims =
            serde_json::from_str(r#"{"uid":"legacy","email":"a@b.c","exp":1}"#).unwrap();
        assert_eq!(claims.subject(), Some("legacy"));
    }

    #[test]
    fn empty_sub_falls_back_to_uid() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"","uid":"legacy","exp":1}"#).unwrap();
        assert_eq!(claims.subject(), Some("legacy"));
    }

    #[test]
    fn lifetime_past_the_calendar_is_an_error() {
        let now: DateTime<Utc> = "2026-03-14T03:00:00Z".parse().unwrap();
        assert_eq!(
            Claims::new("s", "a@b.c", now, Duration::MAX).unwrap_err(),
            AuthError::LifetimeOutOfRange
        );
        let claims = Claims::new("s", "a@b.c", now, Duration::hours(1)).unwrap();
        assert_eq!(claims.exp, now.timestamp() + 3600);
    }

    #[test]
    fn absent_optional_claims_are_not_serialized() {
        let claims = Claims {
            sub: Some("s".to_string()),
            uid: None,
            email: None,
            exp: 10,
            iss: None,
            iat: None,
        };
        assert_eq!(serde_json::to_string(&claims).unwrap(), r#"{"sub":"s","exp":10}"#);
    }
}
