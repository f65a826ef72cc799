//! Business metrics for the registration service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `openhouse_bookings_total{outcome}` - Booking attempts by outcome
//! - `openhouse_cancellations_total{outcome}` - Cancellation attempts by outcome
//! - `openhouse_checkins_total{kind,outcome}` - Check-ins by code kind and outcome
//! - `openhouse_registrations_total{outcome}` - Registrations by outcome
//!
//! `outcome` is `success` or the failing error's kind (`not_found`,
//! `conflict`, `rejected`, `invalid`, `unauthorized`, `error`).

use metrics::describe_counter;

/// Booking attempts.
pub const BOOKINGS_TOTAL: &str = "openhouse_bookings_total";
/// Cancellation attempts.
pub const CANCELLATIONS_TOTAL: &str = "openhouse_cancellations_total";
/// Check-in attempts.
pub const CHECKINS_TOTAL: &str = "openhouse_checkins_total";
/// Registration attempts.
pub const REGISTRATIONS_TOTAL: &str = "openhouse_registrations_total";

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(BOOKINGS_TOTAL, "Total number of booking attempts by outcome");
    describe_counter!(
        CANCELLATIONS_TOTAL,
        "Total number of cancellation attempts by outcome"
    );
    describe_counter!(
        CHECKINS_TOTAL,
        "Total number of check-in attempts by code kind and outcome"
    );
    describe_counter!(
        REGISTRATIONS_TOTAL,
        "Total number of registration attempts by outcome"
    );

    tracing::info!("Business metrics registered");
}
