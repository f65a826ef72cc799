//! Application state for the Open House HTTP server.
//!
//! Holds the engines every handler calls, built once over a shared gateway.

use axum::extract::FromRef;
use openhouse_core::booking::{BookingEngine, BookingPolicy};
use openhouse_core::catalog::WorkshopCatalog;
use openhouse_core::checkin::CheckInEngine;
use openhouse_core::directory::UserDirectory;
use openhouse_core::environment::Clock;
use openhouse_core::providers::{Gateway, IdentityVerifier};
use openhouse_core::validation::{EnumCatalog, Validator};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request.
pub struct AppState<G> {
    /// Persistence gateway, for readiness checks
    pub gateway: Arc<G>,
    /// Bearer token verifier
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Enum reference table served at `/enums`
    pub enums: Arc<EnumCatalog>,
    /// Registration and profiles
    pub directory: Arc<UserDirectory<G>>,
    /// Workshop browsing
    pub catalog: Arc<WorkshopCatalog<G>>,
    /// Booking and cancellation
    pub bookings: Arc<BookingEngine<G>>,
    /// Code check-ins
    pub check_ins: Arc<CheckInEngine<G>>,
}

impl<G: Gateway> AppState<G> {
    /// Build every engine over one gateway.
    #[must_use]
    pub fn new(
        gateway: Arc<G>,
        verifier: Arc<dyn IdentityVerifier>,
        enums: Arc<EnumCatalog>,
        policy: BookingPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let validator = Validator::new(Arc::clone(&enums));
        Self {
            directory: Arc::new(UserDirectory::new(Arc::clone(&gateway), validator.clone())),
            catalog: Arc::new(WorkshopCatalog::new(Arc::clone(&gateway), validator)),
            bookings: Arc::new(BookingEngine::new(
                Arc::clone(&gateway),
                Arc::clone(&clock),
                policy,
            )),
            check_ins: Arc::new(CheckInEngine::new(Arc::clone(&gateway), clock)),
            gateway,
            verifier,
            enums,
        }
    }
}

// Derived Clone would require `G: Clone`.
impl<G> Clone for AppState<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            verifier: Arc::clone(&self.verifier),
            enums: Arc::clone(&self.enums),
            directory: Arc::clone(&self.directory),
            catalog: Arc::clone(&self.catalog),
            bookings: Arc::clone(&self.bookings),
            check_ins: Arc::clone(&self.check_ins),
        }
    }
}

impl<G> FromRef<AppState<G>> for Arc<G> {
    fn from_ref(state: &AppState<G>) -> Self {
        Arc::clone(&state.gateway)
    }
}

impl<G> FromRef<AppState<G>> for Arc<dyn IdentityVerifier> {
    fn from_ref(state: &AppState<G>) -> Self {
        Arc::clone(&state.verifier)
    }
}
