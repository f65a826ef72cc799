//! Workshop endpoints:
//! - GET /workshops - Filtered, sorted listing
//! - GET /workshops/:id - One workshop, projected
//! - POST /workshops/:id/book - Book a seat
//! - DELETE /workshops/:id/book - Cancel the caller's booking

use super::ProjectionFields;
use super::users::BookingItem;
use crate::auth::AuthenticatedUser;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use openhouse_core::catalog::WorkshopQuery;
use openhouse_core::projection::WorkshopView;
use openhouse_core::providers::Gateway;
use openhouse_core::types::{Workshop, WorkshopId};
use openhouse_web::WebResult;
use serde::Serialize;

/// Response for `GET /workshops`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopsResponse {
    /// Matching workshops, in the requested order
    pub workshops: Vec<Workshop>,
}

/// List workshops.
///
/// Public endpoint.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8080/workshops?category=Club&hide_full=true&sort_by=name&order=desc"
/// ```
pub async fn list<G: Gateway>(
    State(state): State<AppState<G>>,
    query: Result<Query<WorkshopQuery>, QueryRejection>,
) -> WebResult<Json<WorkshopsResponse>> {
    let Query(query) = query?;
    let workshops = state.catalog.list(query).await?;
    Ok(Json(WorkshopsResponse { workshops }))
}

/// One workshop with the requested fields (`name` by default).
///
/// Public endpoint. `fields` may be a comma list, repeated, or both.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8080/workshops/1?fields=id&fields=total_seats"
/// ```
pub async fn get<G: Gateway>(
    State(state): State<AppState<G>>,
    id: Result<Path<WorkshopId>, PathRejection>,
    fields: ProjectionFields,
) -> WebResult<Json<WorkshopView>> {
    let Path(id) = id?;
    let view = state.catalog.get(id, fields.as_deref()).await?;
    Ok(Json(view))
}

/// Book a seat for the caller.
pub async fn book<G: Gateway>(
    State(state): State<AppState<G>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    id: Result<Path<WorkshopId>, PathRejection>,
) -> WebResult<(StatusCode, Json<BookingItem>)> {
    let Path(id) = id?;
    let booking = state.bookings.book_workshop(&identity, id).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Cancel the caller's confirmed booking.
pub async fn cancel<G: Gateway>(
    State(state): State<AppState<G>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    id: Result<Path<WorkshopId>, PathRejection>,
) -> WebResult<StatusCode> {
    let Path(id) = id?;
    state.bookings.cancel_booking(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
