//! Domain types shared by every crate in the workspace.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw database identifier.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Raw database identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a registered user.
    UserId
);
entity_id!(
    /// Unique identifier for a workshop.
    WorkshopId
);
entity_id!(
    /// Unique identifier for a booking.
    BookingId
);
entity_id!(
    /// Unique identifier for a booth.
    BoothId
);
entity_id!(
    /// Unique identifier for a booth check-in record.
    BoothCheckInId
);

/// Lifecycle state of a booking.
///
/// `Confirmed` is the only non-terminal state that users act on: it moves to
/// `Cancelled` when the user cancels and to `Attended` on check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Seat is held.
    Confirmed,
    /// Released by the user.
    Cancelled,
    /// Checked in at the workshop.
    Attended,
    /// Did not show up.
    Absent,
}

impl BookingStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Attended => "Attended",
            Self::Absent => "Absent",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            "Attended" => Ok(Self::Attended),
            "Absent" => Ok(Self::Absent),
            other => Err(crate::DomainError::Internal(format!(
                "unknown booking status {other:?}"
            ))),
        }
    }
}

/// Kind of visitor, which selects the shape of a user's extra attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantType {
    /// Prospective student.
    Student,
    /// Current student or alumnus of the hosting faculty.
    Intania,
    /// Student from another university.
    OtherUniversityStudent,
    /// School teacher.
    Teacher,
    /// Parent or member of the public.
    Other,
}

impl ParticipantType {
    /// Every participant type in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Student,
        Self::Intania,
        Self::OtherUniversityStudent,
        Self::Teacher,
        Self::Other,
    ];

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Intania => "intania",
            Self::OtherUniversityStudent => "other_university_student",
            Self::Teacher => "teacher",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantType {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::DomainError::InvalidEnumValue {
                field: "participant_type",
                value: s.to_string(),
            })
    }
}

/// Authenticated caller, as produced by an identity verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject of the credential (external user id).
    pub subject: String,
    /// Verified email address.
    pub email: String,
}

/// A registered visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Verified email, unique across users.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender enum value.
    pub gender: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Participant type.
    pub participant_type: ParticipantType,
    /// Transport mode enum value.
    pub transport_mode: String,
    /// Whether the visitor travels from Bangkok.
    pub is_from_bangkok: bool,
    /// Origin location enum value.
    pub origin_location: String,
    /// Dates the visitor plans to attend.
    pub attendance_dates: Vec<NaiveDate>,
    /// Free-form interests.
    pub interested_activities: Vec<String>,
    /// How the visitor heard about the event.
    pub discovery_channel: Vec<String>,
    /// Participant-type-specific attributes.
    pub extra_attributes: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated registration, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// Verified email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender enum value.
    pub gender: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Participant type.
    pub participant_type: ParticipantType,
    /// Transport mode enum value.
    pub transport_mode: String,
    /// Whether the visitor travels from Bangkok.
    pub is_from_bangkok: bool,
    /// Origin location enum value.
    pub origin_location: String,
    /// Dates the visitor plans to attend.
    pub attendance_dates: Vec<NaiveDate>,
    /// Free-form interests.
    pub interested_activities: Vec<String>,
    /// How the visitor heard about the event.
    pub discovery_channel: Vec<String>,
    /// Participant-type-specific attributes, already shape-checked.
    pub extra_attributes: serde_json::Value,
}

/// Minimal user record needed to authorize a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    /// Identifier.
    pub id: UserId,
    /// Participant type.
    pub participant_type: ParticipantType,
}

/// A scheduled workshop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workshop {
    /// Identifier.
    pub id: WorkshopId,
    /// Title.
    pub name: String,
    /// Description.
    pub description: String,
    /// Category enum value (`Department` or `Club`).
    pub category: String,
    /// Organising department or club.
    pub affiliation: String,
    /// Calendar date the workshop runs on.
    pub event_date: NaiveDate,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant.
    pub end_time: DateTime<Utc>,
    /// Room or venue.
    pub location: String,
    /// Seat capacity.
    pub total_seats: i32,
    /// Seats currently held by confirmed bookings.
    pub registered_count: i32,
}

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    /// Create a slot.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Two slots overlap when each starts before the other ends.
    ///
    /// Touching slots (one ends exactly when the other starts) do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Capacity and schedule of a workshop, as read by the booking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkshopCapacity {
    /// Identifier.
    pub id: WorkshopId,
    /// Calendar date.
    pub event_date: NaiveDate,
    /// Scheduled interval.
    pub slot: TimeSlot,
    /// Seat capacity.
    pub total_seats: i32,
    /// Seats taken.
    pub registered_count: i32,
}

impl WorkshopCapacity {
    /// Whether no seats are left.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.registered_count >= self.total_seats
    }
}

/// A seat reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Identifier.
    pub id: BookingId,
    /// Owner.
    pub user_id: UserId,
    /// Reserved workshop.
    pub workshop_id: WorkshopId,
    /// Lifecycle state.
    pub status: BookingStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Check-in timestamp, set when the booking becomes `Attended`.
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// A confirmed booking joined with its workshop's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedSlot {
    /// Booking identifier.
    pub booking_id: BookingId,
    /// Booked workshop.
    pub workshop_id: WorkshopId,
    /// The workshop's interval.
    pub slot: TimeSlot,
}

/// Booking resolved from a workshop check-in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingState {
    /// Booking identifier.
    pub id: BookingId,
    /// Current status.
    pub status: BookingStatus,
}

/// A booth visitors can check in at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booth {
    /// Identifier.
    pub id: BoothId,
    /// Display name.
    pub name: String,
    /// Code printed on the booth's QR poster.
    pub check_in_code: Uuid,
}

/// Record of a visitor checking in at a booth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoothCheckIn {
    /// Identifier.
    pub id: BoothCheckInId,
    /// Visitor.
    pub user_id: UserId,
    /// Booth.
    pub booth_id: BoothId,
    /// Check-in timestamp.
    pub checked_in_at: DateTime<Utc>,
}
