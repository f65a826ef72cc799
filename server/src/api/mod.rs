//! HTTP API handlers.
//!
//! - `users`: registration, profile, the caller's bookings
//! - `workshops`: browsing, booking, cancellation
//! - `checkin`: workshop and booth code check-in
//! - `enums`: the enum reference table

pub mod checkin;
pub mod enums;
pub mod users;
pub mod workshops;

use axum::{async_trait, extract::FromRequestParts, http::StatusCode, http::request::Parts};
use openhouse_web::AppError;
use serde::Deserialize;

/// `?fields=a,b` projection parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldsQuery {
    /// Comma-separated field names.
    pub fields: Option<String>,
}

/// Projection parameter that accepts both `?fields=a,b` and
/// `?fields=a&fields=b`, or any mix of the two.
///
/// Every `fields` value is joined with commas in query order; other keys are
/// ignored. `None` when the parameter is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionFields(pub Option<String>);

impl ProjectionFields {
    /// Parse the raw query string.
    ///
    /// # Errors
    ///
    /// Returns 400 `INVALID_QUERY` when the query is not valid
    /// `application/x-www-form-urlencoded`.
    pub fn from_query(query: Option<&str>) -> Result<Self, AppError> {
        let Some(query) = query else {
            return Ok(Self(None));
        };
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).map_err(|e| {
            AppError::new(
                StatusCode::BAD_REQUEST,
                format!("Failed to deserialize query string: {e}"),
                "INVALID_QUERY",
            )
        })?;
        let values: Vec<String> = pairs
            .into_iter()
            .filter(|(key, _)| key == "fields")
            .map(|(_, value)| value)
            .collect();
        Ok(Self((!values.is_empty()).then(|| values.join(","))))
    }

    /// The joined field list, if any.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ProjectionFields
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_query(parts.uri.query())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fields(query: Option<&str>) -> Option<String> {
        ProjectionFields::from_query(query).unwrap().0
    }

    #[test]
    fn test_comma_list() {
        assert_eq!(fields(Some("fields=id,total_seats")).as_deref(), Some("id,total_seats"));
    }

    #[test]
    fn test_repeated_parameter() {
        assert_eq!(
            fields(Some("fields=id&fields=total_seats")).as_deref(),
            Some("id,total_seats")
        );
    }

    #[test]
    fn test_mixed_forms_keep_query_order() {
        assert_eq!(
            fields(Some("fields=name%2Cid&other=1&fields=category")).as_deref(),
            Some("name,id,category")
        );
    }

    #[test]
    fn test_absent_parameter() {
        assert_eq!(fields(None), None);
        assert_eq!(fields(Some("")), None);
        assert_eq!(fields(Some("sort_by=name")), None);
    }

    #[test]
    fn test_empty_value_is_kept() {
        assert_eq!(fields(Some("fields=")).as_deref(), Some(""));
    }
}
