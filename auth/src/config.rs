//! Verifier configuration.
//!
//! Values are provided by the application (see the server's `Config`), not
//! hardcoded here.

use chrono::Duration;

/// HS256 verifier configuration.
#[derive(Clone)]
pub struct VerifierConfig {
    /// Shared HMAC secret.
    pub secret: String,

    /// Expected `iss` claim. When `None`, any issuer is accepted.
    pub issuer: Option<String>,

    /// Clock skew tolerated when checking `exp`.
    ///
    /// Default: 30 seconds
    pub leeway: Duration,
}

impl VerifierConfig {
    /// Create a configuration for the given secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: None,
            leeway: Duration::seconds(30),
        }
    }

    /// Require tokens to carry this issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the tolerated clock skew.
    #[must_use]
    pub const fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

// Keeps the secret out of logs.
impl std::fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("leeway", &self.leeway)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secret() {
        let config = VerifierConfig::new("super-secret").with_issuer("openhouse");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("openhouse"));
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = VerifierConfig::new("s").with_leeway(Duration::seconds(5));
        assert_eq!(config.leeway, Duration::seconds(5));
        assert!(config.issuer.is_none());
    }
}
