//! # Open House Authentication
//!
//! Bearer-token verification for the Open House service.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256 under a shared secret:
//!
//! ```text
//! base64url(header) . base64url(claims) . base64url(hmac_sha256(header.claims))
//! ```
//!
//! [`Hs256Verifier`] implements [`openhouse_core::providers::IdentityVerifier`]
//! so handlers only ever see a verified [`openhouse_core::types::Identity`].
//! It can also issue tokens, which the `issue-token` CLI subcommand and the
//! HTTP tests rely on.
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use openhouse_auth::{Claims, Hs256Verifier, VerifierConfig};
//! use openhouse_core::providers::IdentityVerifier;
//!
//! let verifier = Hs256Verifier::new(VerifierConfig::new("shared-secret")).unwrap();
//! let claims =
//!     Claims::new("uid-42", "ada@example.com", Utc::now(), Duration::hours(1)).unwrap();
//! let token = verifier.issue(&claims).unwrap();
//!
//! let identity = verifier.verify(&token).unwrap();
//! assert_eq!(identity.email, "ada@example.com");
//! ```

pub mod claims;
pub mod config;
pub mod error;
pub mod hs256;

pub use claims::Claims;
pub use config::VerifierConfig;
pub use error::{AuthError, Result};
pub use hs256::Hs256Verifier;
