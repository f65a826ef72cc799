//! Verifier behaviour through the `IdentityVerifier` trait object, as the
//! server uses it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};
use openhouse_auth::{Claims, Hs256Verifier, VerifierConfig};
use openhouse_core::providers::IdentityVerifier;
use openhouse_core::{DomainError, ErrorKind};
use std::sync::Arc;

fn shared_verifier() -> (Hs256Verifier, Arc<dyn IdentityVerifier>) {
    let verifier = Hs256Verifier::new(
        VerifierConfig::new("integration-secret").with_issuer("openhouse"),
    )
    .unwrap();
    (verifier.clone(), Arc::new(verifier))
}

#[test]
fn live_token_resolves_identity() {
    let (issuer, verifier) = shared_verifier();
    let claims = Claims::new("uid-7", "grace@example.com", Utc::now(), Duration::minutes(10))
        .unwrap()
        .with_issuer("openhouse");
    let token = issuer.issue(&claims).unwrap();

    let identity = verifier.verify(&token).unwrap();
    assert_eq!(identity.subject, "uid-7");
    assert_eq!(identity.email, "grace@example.com");
}

#[test]
fn expired_token_is_unauthorized() {
    let (issuer, verifier) = shared_verifier();
    let claims = Claims::new(
        "uid-7",
        "grace@example.com",
        Utc::now() - Duration::hours(2),
        Duration::hours(1),
    )
    .unwrap()
    .with_issuer("openhouse");
    let token = issuer.issue(&claims).unwrap();

    let error = verifier.verify(&token).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Unauthorized);
    assert!(matches!(error, DomainError::InvalidCredential { reason } if reason.contains("expired")));
}

#[test]
fn legacy_uid_claim_is_accepted() {
    let (issuer, verifier) = shared_verifier();
    let mut claims = Claims::new("", "grace@example.com", Utc::now(), Duration::minutes(10))
        .unwrap()
        .with_issuer("openhouse");
    claims.sub = None;
    claims.uid = Some("firebase-uid".to_string());
    let token = issuer.issue(&claims).unwrap();

    assert_eq!(verifier.verify(&token).unwrap().subject, "firebase-uid");
}
