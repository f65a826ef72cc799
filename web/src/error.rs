//! Error types for web handlers.
//!
//! [`AppError`] bridges [`DomainError`] and HTTP responses. Every domain
//! variant maps to exactly one status code; internal failures are logged with
//! their detail and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use openhouse_core::{DomainError, ErrorKind};
use serde::Serialize;
use std::fmt;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Application error type for web handlers.
///
/// Implements Axum's `IntoResponse`, producing a `{code, message}` JSON body.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(catalog): State<Arc<WorkshopCatalog<G>>>) -> Result<Json<WorkshopView>, AppError> {
///     let view = catalog.get(id, None).await?; // DomainError -> AppError
///     Ok(Json(view))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            source: None,
        }
    }

    /// Attach the underlying error, logged but never returned.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Status code for a domain error.
///
/// `ParticipantTypeNotAllowed` is a permission failure (403); the other
/// business-rule failures are 422.
#[must_use]
pub const fn status_for(error: &DomainError) -> StatusCode {
    if matches!(error, DomainError::ParticipantTypeNotAllowed) {
        return StatusCode::FORBIDDEN;
    }
    match error.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        let status = status_for(&error);
        if status.is_server_error() {
            let code = error.code();
            return Self::internal(INTERNAL_MESSAGE)
                .with_source(anyhow::Error::new(error).context(code));
        }
        Self::new(status, error.to_string(), error.code())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %format!("{source:#}"),
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(INTERNAL_MESSAGE).with_source(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text(), "INVALID_BODY")
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text(), "INVALID_QUERY")
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text(), "INVALID_PATH")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use openhouse_core::types::WorkshopId;

    #[test]
    fn test_error_display() {
        let err = AppError::new(StatusCode::BAD_REQUEST, "Invalid input", "INVALID_QUERY");
        assert_eq!(err.to_string(), "[INVALID_QUERY] Invalid input");
    }

    #[test]
    fn test_status_per_kind() {
        let cases = [
            (DomainError::WorkshopNotFound, StatusCode::NOT_FOUND),
            (DomainError::UserNotFound, StatusCode::NOT_FOUND),
            (DomainError::WorkshopFull, StatusCode::CONFLICT),
            (DomainError::AlreadyBooked, StatusCode::CONFLICT),
            (DomainError::TimeConflict, StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::InvalidBookingStatus, StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::ParticipantTypeNotAllowed, StatusCode::FORBIDDEN),
            (DomainError::InvalidCodeFormat, StatusCode::BAD_REQUEST),
            (
                DomainError::UnknownField {
                    field: "password".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::MissingCredential, StatusCode::UNAUTHORIZED),
            (
                DomainError::Database("connection reset".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(AppError::from(error.clone()).status(), status, "{error:?}");
        }
    }

    #[test]
    fn test_client_error_keeps_domain_code() {
        let err = AppError::from(DomainError::WorkshopFull);
        assert_eq!(err.code(), "WORKSHOP_FULL");
        assert_eq!(err.message(), "Workshop is full");
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err = AppError::from(DomainError::SeatCounterInconsistent {
            workshop_id: WorkshopId::new(7),
        });
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(err.message(), INTERNAL_MESSAGE);
        assert!(
            std::error::Error::source(&err)
                .unwrap()
                .to_string()
                .contains("SEAT_COUNTER_INCONSISTENT")
        );
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let response = AppError::from(DomainError::TimeConflict).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "TIME_CONFLICT");
        assert!(body["message"].is_string());
    }
}
