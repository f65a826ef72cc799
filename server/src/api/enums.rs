//! GET /enums - The enum reference table.

use crate::server::state::AppState;
use axum::{Json, extract::State};
use openhouse_core::validation::EnumTable;

/// Serve the reference table the validator checks against.
///
/// Public endpoint.
#[allow(clippy::unused_async)]
pub async fn list_enums<G>(State(state): State<AppState<G>>) -> Json<EnumTable> {
    Json(state.enums.table().clone())
}
