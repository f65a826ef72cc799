//! Mock implementations of injected dependencies.

use chrono::{DateTime, Utc};
use openhouse_core::DomainError;
use openhouse_core::environment::Clock;
use openhouse_core::providers::IdentityVerifier;
use openhouse_core::types::Identity;
use std::collections::HashMap;

/// Fixed clock for deterministic tests
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use openhouse_testing::mocks::FixedClock;
/// use openhouse_core::environment::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Fixed clock at the first open-house morning (2026-03-14 02:00 UTC).
///
/// # Panics
///
/// Panics if the hardcoded timestamp fails to parse, which should never
/// happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2026-03-14T02:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}

/// Identity verifier backed by a fixed token table.
///
/// # Example
///
/// ```
/// use openhouse_testing::mocks::StaticVerifier;
/// use openhouse_core::providers::IdentityVerifier;
///
/// let verifier = StaticVerifier::new().with_token("t-ada", "ada@example.com");
/// assert_eq!(verifier.verify("t-ada").unwrap().email, "ada@example.com");
/// assert!(verifier.verify("t-unknown").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticVerifier {
    /// Verifier that accepts no token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as the user with `email`.
    #[must_use]
    pub fn with_token(mut self, token: &str, email: &str) -> Self {
        self.tokens.insert(
            token.to_string(),
            Identity {
                subject: format!("uid-{email}"),
                email: email.to_string(),
            },
        );
        self
    }
}

impl IdentityVerifier for StaticVerifier {
    fn verify(&self, token: &str) -> openhouse_core::Result<Identity> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| DomainError::InvalidCredential {
                reason: "unknown token".to_string(),
            })
    }
}
