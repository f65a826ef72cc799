//! HTTP plumbing for the Open House service.
//!
//! The server crate owns routes and application state; this crate holds the
//! pieces every handler shares:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         HTTP (Axum)                     │  ← correlation IDs, bearer tokens
//! │  - Request parsing                      │  ← AppError: DomainError → status
//! │  - Response serialization               │  ← health / readiness
//! ├─────────────────────────────────────────┤
//! │         Engines (openhouse-core)        │
//! │  - Booking, check-in, catalog, users    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **Correlation layer** tags the request and opens its span
//! 2. **Extract** path, query, body and bearer token
//! 3. **Call** the engine
//! 4. **Map** `DomainError` to a status code through [`AppError`]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
