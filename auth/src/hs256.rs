//! HS256 token issuing and verification.

use crate::claims::Claims;
use crate::config::VerifierConfig;
use crate::error::{AuthError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use openhouse_core::providers::IdentityVerifier;
use openhouse_core::types::Identity;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Verifies (and issues) HMAC-SHA256 signed bearer tokens.
#[derive(Clone)]
pub struct Hs256Verifier {
    config: VerifierConfig,
    mac: HmacSha256,
}

impl Hs256Verifier {
    /// Create a verifier.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptySecret`] if the secret is empty.
    pub fn new(config: VerifierConfig) -> Result<Self> {
        if config.secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        let mac = <HmacSha256 as Mac>::new_from_slice(config.secret.as_bytes())
            .map_err(|_| AuthError::EmptySecret)?;
        Ok(Self { config, mac })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Sign `claims` into a compact token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Encoding`] if the claims cannot be serialized.
    pub fn issue(&self, claims: &Claims) -> Result<String> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let header = encode_segment(&header)?;
        let claims = encode_segment(claims)?;
        let signing_input = format!("{header}.{claims}");

        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify `token` as of `now` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] describing the first check that failed:
    /// structure, algorithm, signature, expiry, issuer, then required claims.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let (signing_input, signature) = token
            .rsplit_once('.')
            .ok_or_else(|| malformed("expected three dot-separated segments"))?;
        let (header, claims) = signing_input
            .split_once('.')
            .filter(|(_, claims)| !claims.contains('.'))
            .ok_or_else(|| malformed("expected three dot-separated segments"))?;

        let header: Header = decode_segment(header)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm { alg: header.alg });
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| malformed(&format!("signature is not base64url: {e}")))?;
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let claims: Claims = decode_segment(claims)?;

        if now.timestamp() > claims.exp.saturating_add(self.config.leeway.num_seconds()) {
            return Err(AuthError::Expired);
        }
        if let Some(expected) = &self.config.issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                return Err(AuthError::WrongIssuer);
            }
        }
        if claims.subject().is_none() {
            return Err(AuthError::MissingClaim { claim: "sub" });
        }
        if claims.email.as_deref().is_none_or(str::is_empty) {
            return Err(AuthError::MissingClaim { claim: "email" });
        }

        Ok(claims)
    }

    /// Verify `token` as of `now` and return the caller's identity.
    ///
    /// # Errors
    ///
    /// See [`Hs256Verifier::decode_at`].
    pub fn identity_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity> {
        let claims = self.decode_at(token, now)?;
        let subject = claims.subject().unwrap_or_default().to_string();
        Ok(Identity {
            subject,
            email: claims.email.unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for Hs256Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hs256Verifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IdentityVerifier for Hs256Verifier {
    fn verify(&self, token: &str) -> openhouse_core::Result<Identity> {
        self.identity_at(token, Utc::now()).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            e.into()
        })
    }
}

fn malformed(reason: &str) -> AuthError {
    AuthError::Malformed {
        reason: reason.to_string(),
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(|e| AuthError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| malformed(&format!("segment is not base64url: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| malformed(&format!("segment is not valid JSON: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn verifier() -> Hs256Verifier {
        Hs256Verifier::new(VerifierConfig::new("test-secret")).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-03-14T03:00:00Z".parse().unwrap()
    }

    fn token(claims: &Claims) -> String {
        verifier().issue(claims).unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let claims = Claims::new("uid-1", "ada@example.com", now(), Duration::hours(1)).unwrap();
        let identity = verifier().identity_at(&token(&claims), now()).unwrap();
        assert_eq!(identity.subject, "uid-1");
        assert_eq!(identity.email, "ada@example.com");
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(
            Hs256Verifier::new(VerifierConfig::new("")).unwrap_err(),
            AuthError::EmptySecret
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = Hs256Verifier::new(VerifierConfig::new("another-secret")).unwrap();
        let claims = Claims::new("uid-1", "ada@example.com", now(), Duration::hours(1)).unwrap();
        let forged = other.issue(&claims).unwrap();
        assert_eq!(
            verifier().decode_at(&forged, now()).unwrap_err(),
            AuthError::BadSignature
        );
    }

    #[test]
    fn expiry_honours_leeway() {
        let claims = Claims::new("uid-1", "ada@example.com", now(), Duration::minutes(5)).unwrap();
        let token = token(&claims);

        let within_leeway = now() + Duration::minutes(5) + Duration::seconds(20);
        assert!(verifier().decode_at(&token, within_leeway).is_ok());

        let past_leeway = now() + Duration::minutes(5) + Duration::seconds(31);
        assert_eq!(
            verifier().decode_at(&token, past_leeway).unwrap_err(),
            AuthError::Expired
        );
    }

    #[test]
    fn issuer_is_checked_when_configured() {
        let strict = Hs256Verifier::new(
            VerifierConfig::new("test-secret").with_issuer("openhouse"),
        )
        .unwrap();
        let claims = Claims::new("uid-1", "ada@example.com", now(), Duration::hours(1)).unwrap();

        let unissued = strict.issue(&claims).unwrap();
        assert_eq!(
            strict.decode_at(&unissued, now()).unwrap_err(),
            AuthError::WrongIssuer
        );

        let issued = strict.issue(&claims.with_issuer("openhouse")).unwrap();
        assert!(strict.decode_at(&issued, now()).is_ok());
    }

    #[test]
    fn missing_email_is_rejected() {
        let mut claims = Claims::new("uid-1", "", now(), Duration::hours(1)).unwrap();
        claims.email = None;
        assert_eq!(
            verifier().decode_at(&token(&claims), now()).unwrap_err(),
            AuthError::MissingClaim { claim: "email" }
        );
    }

    #[test]
    fn missing_subject_is_rejected() {
        let mut claims =
            Claims::new("", "ada@example.com", now(), Duration::hours(1)).unwrap();
        claims.sub = None;
        assert_eq!(
            verifier().decode_at(&token(&claims), now()).unwrap_err(),
            AuthError::MissingClaim { claim: "sub" }
        );
    }

    #[test]
    fn non_hs256_header_is_rejected() {
        let header = encode_segment(&Header {
            alg: "none".to_string(),
            typ: None,
        })
        .unwrap();
        let claims = Claims::new("uid-1", "ada@example.com", now(), Duration::hours(1)).unwrap();
        let body = encode_segment(&claims).unwrap();
        let token = format!("{header}.{body}.");
        assert_eq!(
            verifier().decode_at(&token, now()).unwrap_err(),
            AuthError::UnsupportedAlgorithm {
                alg: "none".to_string()
            }
        );
    }

    #[test]
    fn structural_garbage_is_malformed() {
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.**"] {
            assert!(
                matches!(
                    verifier().decode_at(token, now()),
                    Err(AuthError::Malformed { .. })
                ),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn verify_maps_to_invalid_credential() {
        let err = verifier().verify("a.b").unwrap_err();
        assert_eq!(err.kind(), openhouse_core::ErrorKind::Unauthorized);
    }

    proptest! {
        #[test]
        fn tampered_claims_never_verify(email in "[a-z]{1,12}@example\\.com") {
            let genuine = token(
                &Claims::new("uid-1", "ada@example.com", now(), Duration::hours(1)).unwrap(),
            );
            let forged_claims = encode_segment(
                &Claims::new("uid-1", email.clone(), now(), Duration::hours(1)).unwrap()
            ).unwrap();

            let mut parts: Vec<&str> = genuine.split('.').collect();
            parts[1] = &forged_claims;
            let tampered = parts.join(".");

            let result = verifier().decode_at(&tampered, now());
            if email == "ada@example.com" {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result.unwrap_err(), AuthError::BadSignature);
            }
        }
    }
}
