//! Booking engine: seat accounting and overlap detection.
//!
//! Seat capacity is enforced by the store, not here. The engine reads the
//! workshop and the caller's same-day schedule to reject obvious failures
//! early, then performs the insert and the guarded seat increment in one unit
//! of work. Concurrent bookers that pass the early checks are serialised by
//! the guarded `UPDATE` and the unique index on confirmed bookings.

use crate::environment::Clock;
use crate::error::{DomainError, Result};
use crate::metrics::{BOOKINGS_TOTAL, CANCELLATIONS_TOTAL};
use crate::providers::{BookingRepository, UnitOfWork, UserRepository, WorkshopRepository};
use crate::types::{Booking, Identity, ParticipantType, WorkshopId};
use std::collections::HashSet;
use std::sync::Arc;

/// Participant types barred from booking unless configured otherwise.
pub const DEFAULT_RESTRICTED_PARTICIPANT_TYPES: [ParticipantType; 2] =
    [ParticipantType::Teacher, ParticipantType::Other];

/// Who may book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPolicy {
    restricted: HashSet<ParticipantType>,
}

impl BookingPolicy {
    /// Policy barring the given participant types.
    #[must_use]
    pub fn new(restricted: impl IntoIterator<Item = ParticipantType>) -> Self {
        Self {
            restricted: restricted.into_iter().collect(),
        }
    }

    /// Whether `participant_type` may book workshops.
    #[must_use]
    pub fn allows(&self, participant_type: ParticipantType) -> bool {
        !self.restricted.contains(&participant_type)
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RESTRICTED_PARTICIPANT_TYPES)
    }
}

/// Books and cancels workshop seats.
pub struct BookingEngine<G> {
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
}

impl<G> BookingEngine<G>
where
    G: UserRepository + WorkshopRepository + BookingRepository,
{
    /// Create an engine.
    #[must_use]
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>, policy: BookingPolicy) -> Self {
        Self {
            gateway,
            clock,
            policy,
        }
    }

    /// Book a seat for the caller.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the caller has not registered
    /// - `WorkshopNotFound` if the workshop does not exist
    /// - `WorkshopFull` if no seat is left
    /// - `ParticipantTypeNotAllowed` if the caller's type is restricted
    /// - `AlreadyBooked` if the caller already holds a seat
    /// - `TimeConflict` if another confirmed booking overlaps
    #[tracing::instrument(skip(self, identity), fields(email = %identity.email))]
    pub async fn book_workshop(&self, identity: &Identity, workshop_id: WorkshopId) -> Result<Booking> {
        let result = self.try_book(identity, workshop_id).await;
        match &result {
            Ok(booking) => {
                metrics::counter!(BOOKINGS_TOTAL, "outcome" => "success").increment(1);
                tracing::info!(
                    booking_id = %booking.id,
                    user_id = %booking.user_id,
                    "Workshop booked"
                );
            }
            Err(e) => {
                metrics::counter!(BOOKINGS_TOTAL, "outcome" => e.outcome()).increment(1);
                if e.is_client_error() {
                    tracing::warn!(error = %e, "Booking rejected");
                } else {
                    tracing::error!(error = %e, "Booking failed");
                }
            }
        }
        result
    }

    async fn try_book(&self, identity: &Identity, workshop_id: WorkshopId) -> Result<Booking> {
        let participant = self.gateway.find_participant(&identity.email).await?;
        let workshop = self.gateway.find_capacity(workshop_id).await?;

        if workshop.is_full() {
            return Err(DomainError::WorkshopFull);
        }
        if !self.policy.allows(participant.participant_type) {
            return Err(DomainError::ParticipantTypeNotAllowed);
        }

        let same_day = self
            .gateway
            .confirmed_bookings_on(participant.id, workshop.event_date)
            .await?;
        if same_day.iter().any(|b| b.workshop_id == workshop_id) {
            return Err(DomainError::AlreadyBooked);
        }
        if let Some(clash) = same_day.iter().find(|b| b.slot.overlaps(&workshop.slot)) {
            tracing::debug!(conflicting_workshop = %clash.workshop_id, "Time conflict");
            return Err(DomainError::TimeConflict);
        }

        let mut tx = self.gateway.begin().await?;
        let booking = self
            .gateway
            .insert_booking(&mut tx, participant.id, workshop_id, self.clock.now())
            .await?;
        self.gateway
            .increment_registered_count(&mut tx, workshop_id)
            .await?;
        tx.commit().await?;

        Ok(booking)
    }

    /// Cancel the caller's confirmed booking of a workshop.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the caller has not registered
    /// - `BookingNotFound` if no confirmed booking exists
    /// - `SeatCounterInconsistent` if the seat counter was already zero
    #[tracing::instrument(skip(self, identity), fields(email = %identity.email))]
    pub async fn cancel_booking(&self, identity: &Identity, workshop_id: WorkshopId) -> Result<()> {
        let result = self.try_cancel(identity, workshop_id).await;
        match &result {
            Ok(()) => {
                metrics::counter!(CANCELLATIONS_TOTAL, "outcome" => "success").increment(1);
                tracing::info!("Booking cancelled");
            }
            Err(e) => {
                metrics::counter!(CANCELLATIONS_TOTAL, "outcome" => e.outcome()).increment(1);
                if e.is_client_error() {
                    tracing::warn!(error = %e, "Cancellation rejected");
                } else {
                    tracing::error!(error = %e, "Cancellation failed");
                }
            }
        }
        result
    }

    async fn try_cancel(&self, identity: &Identity, workshop_id: WorkshopId) -> Result<()> {
        let participant = self.gateway.find_participant(&identity.email).await?;

        let mut tx = self.gateway.begin().await?;
        self.gateway
            .cancel_booking(&mut tx, participant.id, workshop_id)
            .await?;
        self.gateway
            .decrement_registered_count(&mut tx, workshop_id)
            .await?;
        tx.commit().await
    }

    /// The caller's confirmed bookings, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the caller has not registered.
    #[tracing::instrument(skip(self, identity), fields(email = %identity.email))]
    pub async fn my_bookings(&self, identity: &Identity) -> Result<Vec<Booking>> {
        let participant = self.gateway.find_participant(&identity.email).await?;
        self.gateway.confirmed_bookings(participant.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = BookingPolicy::default();
        assert!(policy.allows(ParticipantType::Student));
        assert!(policy.allows(ParticipantType::Intania));
        assert!(policy.allows(ParticipantType::OtherUniversityStudent));
        assert!(!policy.allows(ParticipantType::Teacher));
        assert!(!policy.allows(ParticipantType::Other));
    }

    #[test]
    fn test_open_policy() {
        let policy = BookingPolicy::new([]);
        assert!(ParticipantType::ALL.iter().all(|t| policy.allows(*t)));
    }
}
