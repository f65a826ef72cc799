//! User endpoints:
//! - POST /users - Register the caller
//! - GET /users/me - The caller's profile, projected
//! - GET /users/me/bookings - The caller's confirmed bookings

use super::FieldsQuery;
use crate::auth::AuthenticatedUser;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use openhouse_core::projection::UserView;
use openhouse_core::providers::Gateway;
use openhouse_core::types::{Booking, BookingId, BookingStatus, User, WorkshopId};
use openhouse_core::validation::RegistrationForm;
use openhouse_web::WebResult;
use serde::Serialize;

/// One entry of `GET /users/me/bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingItem {
    /// Booking identifier
    pub id: BookingId,
    /// Booked workshop
    pub workshop_id: WorkshopId,
    /// Lifecycle state
    pub status: BookingStatus,
    /// Creation timestamp (RFC 3339)
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingItem {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            workshop_id: booking.workshop_id,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Response for `GET /users/me/bookings`.
#[derive(Debug, Clone, Serialize)]
pub struct BookingsResponse {
    /// Confirmed bookings, oldest first
    pub bookings: Vec<BookingItem>,
}

/// Register the caller under their verified email.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/users \
///   -H "Authorization: Bearer $TOKEN" \
///   -H "Content-Type: application/json" \
///   -d '{"first_name":"Somchai","last_name":"Jaidee","gender":"male", ...}'
/// ```
pub async fn register<G: Gateway>(
    State(state): State<AppState<G>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    body: Result<Json<RegistrationForm>, JsonRejection>,
) -> WebResult<(StatusCode, Json<User>)> {
    let Json(form) = body?;
    let user = state.directory.register(&identity, form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// The caller's profile with the requested fields (`email` by default).
pub async fn profile<G: Gateway>(
    State(state): State<AppState<G>>,
    AuthenticatedUser(identity): AuthenticatedUser,
    query: Result<Query<FieldsQuery>, QueryRejection>,
) -> WebResult<Json<UserView>> {
    let Query(query) = query?;
    let view = state
        .directory
        .profile(&identity, query.fields.as_deref())
        .await?;
    Ok(Json(view))
}

/// The caller's confirmed bookings.
pub async fn my_bookings<G: Gateway>(
    State(state): State<AppState<G>>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> WebResult<Json<BookingsResponse>> {
    let bookings = state.bookings.my_bookings(&identity).await?;
    Ok(Json(BookingsResponse {
        bookings: bookings.into_iter().map(BookingItem::from).collect(),
    }))
}
