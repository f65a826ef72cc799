//! Error taxonomy for the registration domain.
//!
//! Every fallible operation in the workspace returns [`DomainError`]. Storage
//! adapters translate driver failures into the narrow variants below (unique
//! violations become conflicts), engines add business-rule failures, and the
//! HTTP layer maps each variant to a status code exhaustively.

use crate::types::WorkshopId;
use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Coarse classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The operation collides with existing state.
    Conflict,
    /// The request is well-formed but a business rule forbids it.
    BusinessRule,
    /// The request is malformed.
    Validation,
    /// The caller could not be authenticated.
    Unauthorized,
    /// Something failed on our side.
    Internal,
}

/// Comprehensive error taxonomy for the registration domain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ═══════════════════════════════════════════════════════════
    // Not Found
    // ═══════════════════════════════════════════════════════════

    /// Workshop does not exist.
    #[error("Workshop not found")]
    WorkshopNotFound,

    /// No user is registered under the given email.
    #[error("User not found")]
    UserNotFound,

    /// No confirmed booking matches the request.
    #[error("Booking not found")]
    BookingNotFound,

    /// No booth carries the given check-in code.
    #[error("Booth not found")]
    BoothNotFound,

    // ═══════════════════════════════════════════════════════════
    // Conflicts
    // ═══════════════════════════════════════════════════════════

    /// The user already holds a confirmed booking for this workshop.
    #[error("Workshop already booked")]
    AlreadyBooked,

    /// No seats left.
    #[error("Workshop is full")]
    WorkshopFull,

    /// The booking was already checked in.
    #[error("Already checked in")]
    AlreadyAttended,

    /// The user already checked in at this booth.
    #[error("Already checked in at this booth")]
    AlreadyCheckedInBooth,

    /// A user with this email is already registered.
    #[error("User already exists")]
    UserAlreadyExists,

    // ═══════════════════════════════════════════════════════════
    // Business Rules
    // ═══════════════════════════════════════════════════════════

    /// The workshop overlaps another confirmed booking on the same date.
    #[error("Workshop time conflicts with an existing booking")]
    TimeConflict,

    /// The user's participant type may not book workshops.
    #[error("Participant type is not allowed to book workshops")]
    ParticipantTypeNotAllowed,

    /// The booking is not in a state that permits the transition.
    #[error("Booking status does not allow this operation")]
    InvalidBookingStatus,

    // ═══════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════

    /// Check-in code is not `<prefix>-<uuid>` with a known prefix.
    #[error("Invalid code format")]
    InvalidCodeFormat,

    /// Check-in code is well-formed but matches no booking of the caller.
    #[error("Invalid check-in code")]
    InvalidCheckInCode,

    /// Value is not a member of the named enumeration.
    #[error("Invalid {field}: {value}")]
    InvalidEnumValue {
        /// Field carrying the value
        field: &'static str,
        /// Rejected value
        value: String,
    },

    /// Date is not formatted as `YYYY-MM-DD`.
    #[error("Invalid date: {value}")]
    InvalidDate {
        /// Rejected value
        value: String,
    },

    /// Extra attributes do not match the participant type's shape.
    #[error("Extra attributes are invalid: {reason}")]
    InvalidExtraAttributes {
        /// Decoder message
        reason: String,
    },

    /// A projection asked for a field outside the allow-list.
    #[error("Unknown field: {field}")]
    UnknownField {
        /// Rejected field name
        field: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Authentication
    // ═══════════════════════════════════════════════════════════

    /// No bearer token was supplied.
    #[error("Missing credential")]
    MissingCredential,

    /// The bearer token failed verification.
    #[error("Invalid credential: {reason}")]
    InvalidCredential {
        /// Verification failure
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Internal
    // ═══════════════════════════════════════════════════════════

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),

    /// A cancellation found the seat counter already at zero.
    #[error("Seat counter of workshop {workshop_id} is inconsistent")]
    SeatCounterInconsistent {
        /// Affected workshop
        workshop_id: WorkshopId,
    },

    /// Any other internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::WorkshopNotFound
            | Self::UserNotFound
            | Self::BookingNotFound
            | Self::BoothNotFound => ErrorKind::NotFound,
            Self::AlreadyBooked
            | Self::WorkshopFull
            | Self::AlreadyAttended
            | Self::AlreadyCheckedInBooth
            | Self::UserAlreadyExists => ErrorKind::Conflict,
            Self::TimeConflict | Self::ParticipantTypeNotAllowed | Self::InvalidBookingStatus => {
                ErrorKind::BusinessRule
            }
            Self::InvalidCodeFormat
            | Self::InvalidCheckInCode
            | Self::InvalidEnumValue { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidExtraAttributes { .. }
            | Self::UnknownField { .. } => ErrorKind::Validation,
            Self::MissingCredential | Self::InvalidCredential { .. } => ErrorKind::Unauthorized,
            Self::Database(_) | Self::SeatCounterInconsistent { .. } | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Stable machine-readable code for API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::WorkshopNotFound => "WORKSHOP_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::BookingNotFound => "BOOKING_NOT_FOUND",
            Self::BoothNotFound => "BOOTH_NOT_FOUND",
            Self::AlreadyBooked => "ALREADY_BOOKED",
            Self::WorkshopFull => "WORKSHOP_FULL",
            Self::AlreadyAttended => "ALREADY_ATTENDED",
            Self::AlreadyCheckedInBooth => "ALREADY_CHECKED_IN_BOOTH",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::TimeConflict => "TIME_CONFLICT",
            Self::ParticipantTypeNotAllowed => "PARTICIPANT_TYPE_NOT_ALLOWED",
            Self::InvalidBookingStatus => "INVALID_BOOKING_STATUS",
            Self::InvalidCodeFormat => "INVALID_CODE_FORMAT",
            Self::InvalidCheckInCode => "INVALID_CHECK_IN_CODE",
            Self::InvalidEnumValue { .. } => "INVALID_ENUM_VALUE",
            Self::InvalidDate { .. } => "INVALID_DATE",
            Self::InvalidExtraAttributes { .. } => "INVALID_EXTRA_ATTRIBUTES",
            Self::UnknownField { .. } => "UNKNOWN_FIELD",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::InvalidCredential { .. } => "INVALID_CREDENTIAL",
            Self::Database(_) => "DATABASE_ERROR",
            Self::SeatCounterInconsistent { .. } => "SEAT_COUNTER_INCONSISTENT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error was caused by the caller rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }

    /// Short label used as the `outcome` metric dimension.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::BusinessRule => "rejected",
            ErrorKind::Validation => "invalid",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Internal => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(DomainError::WorkshopNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(DomainError::WorkshopFull.kind(), ErrorKind::Conflict);
        assert_eq!(DomainError::TimeConflict.kind(), ErrorKind::BusinessRule);
        assert_eq!(DomainError::InvalidCodeFormat.kind(), ErrorKind::Validation);
        assert_eq!(DomainError::MissingCredential.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            DomainError::SeatCounterInconsistent { workshop_id: WorkshopId::new(7) }.kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(DomainError::AlreadyBooked.is_client_error());
        assert!(!DomainError::Database("connection reset".to_string()).is_client_error());
    }

    #[test]
    fn test_display() {
        let err = DomainError::InvalidEnumValue {
            field: "gender",
            value: "robot".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid gender: robot");
        assert_eq!(err.code(), "INVALID_ENUM_VALUE");
    }
}
