//! POST /check-in - Apply a scanned `W-` or `B-` code for the caller.

use crate::auth::AuthenticatedUser;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use openhouse_core::providers::Gateway;
use openhouse_web::WebResult;
use serde::Deserialize;

/// Check-in request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckInRequest {
    /// Scanned code, `W-<uuid>` or `B-<uuid>`.
    pub code: String,
}

/// Check the caller in.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/check-in \
///   -H "Authorization: Bearer $TOKEN" \
///   -H "Content-Type: application/json" \
///   -d '{"code":"W-4f2a3c1e-8b7d-4e6f-9a0b-1c2d3e4f5a6b"}'
/// ```
pub async fn check_in<G: Gateway>(
    State(state): State<AppState<G>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    body: Result<Json<CheckInRequest>, JsonRejection>,
) -> WebResult<StatusCode> {
    let Json(request) = body?;
    state
        .check_ins
        .check_in(&identity.email, &request.code)
        .await?;
    Ok(StatusCode::CREATED)
}
