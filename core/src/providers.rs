//! Persistence and identity contracts.
//!
//! Engines are generic over these traits. `openhouse-postgres` implements
//! them over `PostgreSQL`; `openhouse-testing` implements them in memory.
//!
//! Writes that must be atomic take an explicit unit of work (`&mut Self::Tx`)
//! obtained from [`PersistenceGateway::begin`]. Dropping a unit of work
//! without calling [`UnitOfWork::commit`] rolls it back.

use crate::catalog::WorkshopFilter;
use crate::error::Result;
use crate::projection::{FieldSet, UserField, UserView, WorkshopField, WorkshopView};
use crate::types::{
    BookedSlot, Booking, BookingId, BookingState, Booth, BoothCheckIn, BoothId, Identity, NewUser,
    Participant, User, UserId, Workshop, WorkshopCapacity, WorkshopId,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::future::Future;
use uuid::Uuid;

/// An open transaction.
pub trait UnitOfWork: Send {
    /// Make every write performed through this unit of work visible.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Database` if the commit fails.
    fn commit(self) -> impl Future<Output = Result<()>> + Send;

    /// Discard every write performed through this unit of work.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Database` if the rollback fails.
    fn rollback(self) -> impl Future<Output = Result<()>> + Send;
}

/// Access to the backing store.
pub trait PersistenceGateway: Send + Sync + 'static {
    /// Transaction handle type.
    type Tx: UnitOfWork;

    /// Open a unit of work.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Database` if no connection is available.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx>> + Send;

    /// Check the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Database` if the store does not answer.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}

/// User repository.
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Email already exists → `DomainError::UserAlreadyExists`
    /// - Database query fails
    fn create_user(&self, user: &NewUser) -> impl Future<Output = Result<User>> + Send;

    /// Load the selected fields of the user registered under `email`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - User not found → `DomainError::UserNotFound`
    /// - Database query fails
    fn find_user(
        &self,
        email: &str,
        fields: &FieldSet<UserField>,
    ) -> impl Future<Output = Result<UserView>> + Send;

    /// Resolve an email to the id and participant type of its user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - User not found → `DomainError::UserNotFound`
    /// - Database query fails
    fn find_participant(&self, email: &str) -> impl Future<Output = Result<Participant>> + Send;
}

/// Workshop repository.
pub trait WorkshopRepository: PersistenceGateway {
    /// Load the selected fields of one workshop.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Workshop not found → `DomainError::WorkshopNotFound`
    /// - Database query fails
    fn find_workshop(
        &self,
        id: WorkshopId,
        fields: &FieldSet<WorkshopField>,
    ) -> impl Future<Output = Result<WorkshopView>> + Send;

    /// List workshops matching a filter, in the filter's order.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn list_workshops(
        &self,
        filter: &WorkshopFilter,
    ) -> impl Future<Output = Result<Vec<Workshop>>> + Send;

    /// Load the capacity and schedule of one workshop.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Workshop not found → `DomainError::WorkshopNotFound`
    /// - Database query fails
    fn find_capacity(&self, id: WorkshopId)
    -> impl Future<Output = Result<WorkshopCapacity>> + Send;

    /// Take one seat, only if one is free.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No seat was free → `DomainError::WorkshopFull`
    /// - Database query fails
    fn increment_registered_count(
        &self,
        tx: &mut Self::Tx,
        id: WorkshopId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Release one seat, only if the counter is positive.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Counter already zero → `DomainError::SeatCounterInconsistent`
    /// - Database query fails
    fn decrement_registered_count(
        &self,
        tx: &mut Self::Tx,
        id: WorkshopId,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Booking repository.
pub trait BookingRepository: PersistenceGateway {
    /// Insert a confirmed booking.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - A confirmed booking already exists → `DomainError::AlreadyBooked`
    /// - Database query fails
    fn insert_booking(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        workshop_id: WorkshopId,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Booking>> + Send;

    /// Move the user's confirmed booking of a workshop to `Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No confirmed booking matched → `DomainError::BookingNotFound`
    /// - Database query fails
    fn cancel_booking(
        &self,
        tx: &mut Self::Tx,
        user_id: UserId,
        workshop_id: WorkshopId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Confirmed bookings of a user on one date, with their schedules.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn confirmed_bookings_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<BookedSlot>>> + Send;

    /// Every confirmed booking of a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn confirmed_bookings(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Booking>>> + Send;

    /// Resolve a workshop check-in code to the booking of the user with
    /// `email`.
    ///
    /// When several bookings match, prefers `Confirmed`, then `Attended`, then
    /// the newest.
    ///
    /// # Errors
    ///
    /// Returns error if the database query fails.
    fn booking_for_check_in(
        &self,
        email: &str,
        check_in_code: Uuid,
    ) -> impl Future<Output = Result<Option<BookingState>>> + Send;

    /// Move a confirmed booking to `Attended`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Booking no longer confirmed → `DomainError::InvalidBookingStatus`
    /// - Database query fails
    fn mark_attended(
        &self,
        booking_id: BookingId,
        checked_in_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Booth repository.
pub trait BoothRepository: Send + Sync {
    /// Find a booth by its check-in code.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No booth has the code → `DomainError::BoothNotFound`
    /// - Database query fails
    fn find_booth_by_code(&self, check_in_code: Uuid) -> impl Future<Output = Result<Booth>> + Send;

    /// Record a booth visit.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Visit already recorded → `DomainError::AlreadyCheckedInBooth`
    /// - Database query fails
    fn insert_booth_check_in(
        &self,
        user_id: UserId,
        booth_id: BoothId,
        checked_in_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<BoothCheckIn>> + Send;
}

/// Every repository the service needs, behind one gateway.
pub trait Gateway:
    UserRepository + WorkshopRepository + BookingRepository + BoothRepository
{
}

impl<T> Gateway for T where
    T: UserRepository + WorkshopRepository + BookingRepository + BoothRepository
{
}

/// Verifies bearer credentials.
pub trait IdentityVerifier: Send + Sync {
    /// Verify a bearer token and return the caller's identity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCredential` if the token is malformed,
    /// badly signed, expired or issued by someone else.
    fn verify(&self, token: &str) -> Result<Identity>;
}
