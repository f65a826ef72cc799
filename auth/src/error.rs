//! Error types for token verification.

use openhouse_core::DomainError;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Why a token was refused or could not be produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Verification Errors
    // ═══════════════════════════════════════════════════════════

    /// Token is not three base64url segments of valid JSON.
    #[error("Malformed token: {reason}")]
    Malformed {
        /// What was wrong with it
        reason: String,
    },

    /// Header names an algorithm other than HS256.
    #[error("Unsupported signing algorithm: {alg}")]
    UnsupportedAlgorithm {
        /// Algorithm found in the header
        alg: String,
    },

    /// Signature does not match the header and claims.
    #[error("Invalid token signature")]
    BadSignature,

    /// `exp` is in the past, beyond the configured leeway.
    #[error("Token has expired")]
    Expired,

    /// `iss` does not match the configured issuer.
    #[error("Token issued by an untrusted issuer")]
    WrongIssuer,

    /// A required claim is absent or empty.
    #[error("Token is missing the {claim} claim")]
    MissingClaim {
        /// Claim name
        claim: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════

    /// Signing secret is empty.
    #[error("Signing secret must not be empty")]
    EmptySecret,

    /// Requested lifetime puts the expiry outside the representable range.
    #[error("Token lifetime is out of range")]
    LifetimeOutOfRange,

    /// Claims could not be encoded while issuing a token.
    #[error("Failed to encode token: {0}")]
    Encoding(String),
}

impl From<AuthError> for DomainError {
    fn from(error: AuthError) -> Self {
        Self::InvalidCredential {
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openhouse_core::ErrorKind;

    #[test]
    fn every_auth_error_is_unauthorized() {
        let errors = [
            AuthError::BadSignature,
            AuthError::Expired,
            AuthError::WrongIssuer,
            AuthError::MissingClaim { claim: "email" },
        ];
        for error in errors {
            assert_eq!(DomainError::from(error).kind(), ErrorKind::Unauthorized);
        }
    }

    #[test]
    fn reason_is_carried_into_domain_error() {
        let error = DomainError::from(AuthError::Expired);
        assert_eq!(
            error,
            DomainError::InvalidCredential {
                reason: "Token has expired".to_string()
            }
        );
    }
}
