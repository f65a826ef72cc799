//! In-memory persistence gateway.
//!
//! [`InMemoryGateway`] implements every repository trait over a single
//! `tokio::sync::Mutex`. A unit of work holds the lock for its whole lifetime
//! together with a snapshot of the state taken at `begin`; dropping it without
//! committing restores the snapshot. Units of work are therefore serialised,
//! which is stricter than `PostgreSQL` but preserves every invariant the
//! engines rely on: guarded seat updates, one confirmed booking per
//! `(user, workshop)` and one check-in per `(user, booth)`.
//!
//! Writes inside a unit of work go through the transaction's guard. The
//! engines never call a non-transactional method while a unit of work is
//! open, so the lock is never taken twice by the same task.

use chrono::{DateTime, NaiveDate, Utc};
use openhouse_core::catalog::WorkshopFilter;
use openhouse_core::error::{DomainError, Result};
use openhouse_core::projection::{FieldSet, UserField, UserView, WorkshopField, WorkshopView};
use openhouse_core::providers::{
    BookingRepository, BoothRepository, PersistenceGateway, UnitOfWork, UserRepository,
    WorkshopRepository,
};
use openhouse_core::types::{
    BookedSlot, Booking, BookingId, BookingState, BookingStatus, Booth, BoothCheckIn,
    BoothCheckInId, BoothId, NewUser, Participant, TimeSlot, User, UserId, Workshop,
    WorkshopCapacity, WorkshopId,
};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredWorkshop {
    workshop: Workshop,
    check_in_code: Uuid,
}

#[derive(Debug, Clone, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    workshops: BTreeMap<WorkshopId, StoredWorkshop>,
    bookings: BTreeMap<BookingId, Booking>,
    booths: BTreeMap<BoothId, Booth>,
    booth_check_ins: Vec<BoothCheckIn>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email == email)
    }

    fn workshop(&self, id: WorkshopId) -> Result<&Workshop> {
        self.workshops
            .get(&id)
            .map(|w| &w.workshop)
            .ok_or(DomainError::WorkshopNotFound)
    }

    fn workshop_mut(&mut self, id: WorkshopId) -> Result<&mut Workshop> {
        self.workshops
            .get_mut(&id)
            .map(|w| &mut w.workshop)
            .ok_or(DomainError::WorkshopNotFound)
    }

    fn confirmed_booking_mut(
        &mut self,
        user_id: UserId,
        workshop_id: WorkshopId,
    ) -> Option<&mut Booking> {
        self.bookings.values_mut().find(|b| {
            b.user_id == user_id
                && b.workshop_id == workshop_id
                && b.status == BookingStatus::Confirmed
        })
    }
}

/// In-memory implementation of every repository trait.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<State>>,
    unavailable: Arc<AtomicBool>,
}

/// Unit of work over [`InMemoryGateway`].
pub struct InMemoryTx {
    guard: OwnedMutexGuard<State>,
    snapshot: Option<State>,
}

impl Drop for InMemoryTx {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

impl UnitOfWork for InMemoryTx {
    async fn commit(mut self) -> Result<()> {
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        drop(self);
        Ok(())
    }
}

impl InMemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ping`, `begin` and `create_user` fail, as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::Database("connection refused".to_string()));
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Seeding and inspection
    // ═══════════════════════════════════════════════════════════

    /// Insert a workshop and return its id and check-in code.
    ///
    /// The `id` of `workshop` is ignored; a fresh one is assigned.
    pub async fn add_workshop(&self, mut workshop: Workshop) -> (WorkshopId, Uuid) {
        let mut state = self.state.lock().await;
        let id = WorkshopId::new(state.next_id());
        let check_in_code = Uuid::new_v4();
        workshop.id = id;
        state.workshops.insert(
            id,
            StoredWorkshop {
                workshop,
                check_in_code,
            },
        );
        (id, check_in_code)
    }

    /// Insert a booth and return its check-in code.
    pub async fn add_booth(&self, name: &str) -> Uuid {
        let mut state = self.state.lock().await;
        let id = BoothId::new(state.next_id());
        let check_in_code = Uuid::new_v4();
        state.booths.insert(
            id,
            Booth {
                id,
                name: name.to_string(),
                check_in_code,
            },
        );
        check_in_code
    }

    /// Current state of a workshop.
    pub async fn workshop(&self, id: WorkshopId) -> Option<Workshop> {
        self.state
            .lock()
            .await
            .workshops
            .get(&id)
            .map(|w| w.workshop.clone())
    }

    /// Overwrite a workshop's seat counter, bypassing the guards.
    pub async fn set_registered_count(&self, id: WorkshopId, registered_count: i32) {
        if let Some(stored) = self.state.lock().await.workshops.get_mut(&id) {
            stored.workshop.registered_count = registered_count;
        }
    }

    /// Every booking, in insertion order.
    pub async fn bookings(&self) -> Vec<Booking> {
        self.state.lock().await.bookings.values().cloned().collect()
    }

    /// Every booth check-in, in insertion order.
    pub async fn booth_check_ins(&self) -> Vec<BoothCheckIn> {
        self.state.lock().await.booth_check_ins.clone()
    }
}

impl PersistenceGateway for InMemoryGateway {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<InMemoryTx> {
        self.check_available()?;
        let guard = Arc::clone(&self.state).lock_owned().await;
        let snapshot = Some(State::clone(&guard));
        Ok(InMemoryTx { guard, snapshot })
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}

impl UserRepository for InMemoryGateway {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if state.user_by_email(&user.email).is_some() {
            return Err(DomainError::UserAlreadyExists);
        }

        let now = Utc::now();
        let created = User {
            id: UserId::new(state.next_id()),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            gender: user.gender.clone(),
            phone_number: user.phone_number.clone(),
            participant_type: user.participant_type,
            transport_mode: user.transport_mode.clone(),
            is_from_bangkok: user.is_from_bangkok,
            origin_location: user.origin_location.clone(),
            attendance_dates: user.attendance_dates.clone(),
            interested_activities: user.interested_activities.clone(),
            discovery_channel: user.discovery_channel.clone(),
            extra_attributes: user.extra_attributes.clone(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, email: &str, fields: &FieldSet<UserField>) -> Result<UserView> {
        let state = self.state.lock().await;
        let user = state.user_by_email(email).ok_or(DomainError::UserNotFound)?;
        Ok(UserView::project(user, fields))
    }

    async fn find_participant(&self, email: &str) -> Result<Participant> {
        let state = self.state.lock().await;
        let user = state.user_by_email(email).ok_or(DomainError::UserNotFound)?;
        Ok(Participant {
            id: user.id,
            participant_type: user.participant_type,
        })
    }
}

impl WorkshopRepository for InMemoryGateway {
    async fn find_workshop(
        &self,
        id: WorkshopId,
        fields: &FieldSet<WorkshopField>,
    ) -> Result<WorkshopView> {
        let state = self.state.lock().await;
        Ok(WorkshopView::project(state.workshop(id)?, fields))
    }

    async fn list_workshops(&self, filter: &WorkshopFilter) -> Result<Vec<Workshop>> {
        let state = self.state.lock().await;
        let mut workshops: Vec<Workshop> = state
            .workshops
            .values()
            .map(|w| &w.workshop)
            .filter(|w| filter.matches(w))
            .cloned()
            .collect();
        workshops.sort_by(|a, b| filter.compare(a, b));
        Ok(workshops)
    }

    async fn find_capacity(&self, id: WorkshopId) -> Result<WorkshopCapacity> {
        let state = self.state.lock().await;
        let workshop = state.workshop(id)?;
        Ok(WorkshopCapacity {
            id,
            event_date: workshop.event_date,
            slot: TimeSlot::new(workshop.start_time, workshop.end_time),
            total_seats: workshop.total_seats,
            registered_count: workshop.registered_count,
        })
    }

    async fn increment_registered_count(&self, tx: &mut InMemoryTx, id: WorkshopId) -> Result<()> {
        let workshop = tx.guard.workshop_mut(id)?;
        if workshop.registered_count >= workshop.total_seats {
            return Err(DomainError::WorkshopFull);
        }
        workshop.registered_count += 1;
        Ok(())
    }

    async fn decrement_registered_count(&self, tx: &mut InMemoryTx, id: WorkshopId) -> Result<()> {
        let workshop = tx.guard.workshop_mut(id)?;
        if workshop.registered_count <= 0 {
            return Err(DomainError::SeatCounterInconsistent { workshop_id: id });
        }
        workshop.registered_count -= 1;
        Ok(())
    }
}

impl BookingRepository for InMemoryGateway {
    async fn insert_booking(
        &self,
        tx: &mut InMemoryTx,
        user_id: UserId,
        workshop_id: WorkshopId,
        created_at: DateTime<Utc>,
    ) -> Result<Booking> {
        let state = &mut *tx.guard;
        if state.confirmed_booking_mut(user_id, workshop_id).is_some() {
            return Err(DomainError::AlreadyBooked);
        }

        let booking = Booking {
            id: BookingId::new(state.next_id()),
            user_id,
            workshop_id,
            status: BookingStatus::Confirmed,
            created_at,
            checked_in_at: None,
        };
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn cancel_booking(
        &self,
        tx: &mut InMemoryTx,
        user_id: UserId,
        workshop_id: WorkshopId,
    ) -> Result<()> {
        let booking = tx
            .guard
            .confirmed_booking_mut(user_id, workshop_id)
            .ok_or(DomainError::BookingNotFound)?;
        booking.status = BookingStatus::Cancelled;
        Ok(())
    }

    async fn confirmed_bookings_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<BookedSlot>> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .values()
            .filter(|b| b.user_id == user_id && b.status == BookingStatus::Confirmed)
            .filter_map(|b| {
                let workshop = &state.workshops.get(&b.workshop_id)?.workshop;
                (workshop.event_date == date).then(|| BookedSlot {
                    booking_id: b.id,
                    workshop_id: b.workshop_id,
                    slot: TimeSlot::new(workshop.start_time, workshop.end_time),
                })
            })
            .collect())
    }

    async fn confirmed_bookings(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.user_id == user_id && b.status == BookingStatus::Confirmed)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| (b.created_at, b.id));
        Ok(bookings)
    }

    async fn booking_for_check_in(
        &self,
        email: &str,
        check_in_code: Uuid,
    ) -> Result<Option<BookingState>> {
        let state = self.state.lock().await;
        let Some(user) = state.user_by_email(email) else {
            return Ok(None);
        };
        let Some(workshop_id) = state
            .workshops
            .values()
            .find(|w| w.check_in_code == check_in_code)
            .map(|w| w.workshop.id)
        else {
            return Ok(None);
        };

        let status_rank = |status: BookingStatus| match status {
            BookingStatus::Confirmed => 0,
            BookingStatus::Attended => 1,
            BookingStatus::Cancelled | BookingStatus::Absent => 2,
        };
        Ok(state
            .bookings
            .values()
            .filter(|b| b.user_id == user.id && b.workshop_id == workshop_id)
            .min_by_key(|b| (status_rank(b.status), Reverse(b.created_at), Reverse(b.id)))
            .map(|b| BookingState {
                id: b.id,
                status: b.status,
            }))
    }

    async fn mark_attended(
        &self,
        booking_id: BookingId,
        checked_in_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.bookings.get_mut(&booking_id) {
            Some(booking) if booking.status == BookingStatus::Confirmed => {
                booking.status = BookingStatus::Attended;
                booking.checked_in_at = Some(checked_in_at);
                Ok(())
            }
            _ => Err(DomainError::InvalidBookingStatus),
        }
    }
}

impl BoothRepository for InMemoryGateway {
    async fn find_booth_by_code(&self, check_in_code: Uuid) -> Result<Booth> {
        let state = self.state.lock().await;
        state
            .booths
            .values()
            .find(|b| b.check_in_code == check_in_code)
            .cloned()
            .ok_or(DomainError::BoothNotFound)
    }

    async fn insert_booth_check_in(
        &self,
        user_id: UserId,
        booth_id: BoothId,
        checked_in_at: DateTime<Utc>,
    ) -> Result<BoothCheckIn> {
        let mut state = self.state.lock().await;
        if state
            .booth_check_ins
            .iter()
            .any(|c| c.user_id == user_id && c.booth_id == booth_id)
        {
            return Err(DomainError::AlreadyCheckedInBooth);
        }

        let check_in = BoothCheckIn {
            id: BoothCheckInId::new(state.next_id()),
            user_id,
            booth_id,
            checked_in_at,
        };
        state.booth_check_ins.push(check_in.clone());
        Ok(check_in)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixtures::{WorkshopSeed, new_user};
    use openhouse_core::types::ParticipantType;

    #[tokio::test]
    async fn dropped_unit_of_work_rolls_back() {
        let gateway = InMemoryGateway::new();
        let user = gateway
            .create_user(&new_user("ada@example.com", ParticipantType::Student))
            .await
            .unwrap();
        let (workshop, _) = gateway
            .add_workshop(WorkshopSeed::new("Robotics", "2026-03-14T03:00:00Z", "2026-03-14T04:00:00Z").into_workshop())
            .await;

        {
            let mut tx = gateway.begin().await.unwrap();
            gateway
                .insert_booking(&mut tx, user.id, workshop, Utc::now())
                .await
                .unwrap();
            gateway
                .increment_registered_count(&mut tx, workshop)
                .await
                .unwrap();
        }

        assert!(gateway.bookings().await.is_empty());
        assert_eq!(gateway.workshop(workshop).await.unwrap().registered_count, 0);
    }

    #[tokio::test]
    async fn committed_unit_of_work_is_visible() {
        let gateway = InMemoryGateway::new();
        let user = gateway
            .create_user(&new_user("ada@example.com", ParticipantType::Student))
            .await
            .unwrap();
        let (workshop, _) = gateway
            .add_workshop(WorkshopSeed::new("Robotics", "2026-03-14T03:00:00Z", "2026-03-14T04:00:00Z").into_workshop())
            .await;

        let mut tx = gateway.begin().await.unwrap();
        gateway
            .insert_booking(&mut tx, user.id, workshop, Utc::now())
            .await
            .unwrap();
        gateway
            .increment_registered_count(&mut tx, workshop)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(gateway.bookings().await.len(), 1);
        assert_eq!(gateway.workshop(workshop).await.unwrap().registered_count, 1);
    }

    #[tokio::test]
    async fn unavailable_gateway_fails_ping_and_begin() {
        let gateway = InMemoryGateway::new();
        gateway.set_unavailable(true);
        assert!(matches!(gateway.ping().await, Err(DomainError::Database(_))));
        assert!(gateway.begin().await.is_err());

        gateway.set_unavailable(false);
        assert!(gateway.ping().await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let gateway = InMemoryGateway::new();
        let user = new_user("ada@example.com", ParticipantType::Student);
        gateway.create_user(&user).await.unwrap();
        assert_eq!(
            gateway.create_user(&user).await.unwrap_err(),
            DomainError::UserAlreadyExists
        );
    }
}
