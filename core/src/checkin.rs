//! Check-in engine for workshop and booth codes.
//!
//! Codes have the form `<prefix>-<uuid>`. `W` codes are printed per workshop
//! and move the caller's confirmed booking to `Attended`. `B` codes are
//! printed per booth and record a visit.

use crate::environment::Clock;
use crate::error::{DomainError, Result};
use crate::metrics::CHECKINS_TOTAL;
use crate::providers::{BookingRepository, BoothRepository, UserRepository};
use crate::types::BookingStatus;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// A parsed check-in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInCode {
    /// `W-<uuid>`
    Workshop(Uuid),
    /// `B-<uuid>`
    Booth(Uuid),
}

impl CheckInCode {
    /// Metric label for the code's kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Workshop(_) => "workshop",
            Self::Booth(_) => "booth",
        }
    }
}

impl FromStr for CheckInCode {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self> {
        let (prefix, token) = raw
            .trim()
            .split_once('-')
            .ok_or(DomainError::InvalidCodeFormat)?;
        let token = Uuid::parse_str(token).map_err(|_| DomainError::InvalidCodeFormat)?;
        match prefix {
            "W" => Ok(Self::Workshop(token)),
            "B" => Ok(Self::Booth(token)),
            _ => Err(DomainError::InvalidCodeFormat),
        }
    }
}

impl fmt::Display for CheckInCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workshop(token) => write!(f, "W-{token}"),
            Self::Booth(token) => write!(f, "B-{token}"),
        }
    }
}

/// Applies check-in codes.
pub struct CheckInEngine<G> {
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
}

impl<G> CheckInEngine<G>
where
    G: UserRepository + BookingRepository + BoothRepository,
{
    /// Create an engine.
    #[must_use]
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }

    /// Check the user with `email` in using a scanned code.
    ///
    /// # Errors
    ///
    /// - `InvalidCodeFormat` for a malformed code
    /// - `InvalidCheckInCode` if a workshop code matches none of the caller's bookings
    /// - `AlreadyAttended` if the booking was already checked in
    /// - `InvalidBookingStatus` if the booking is cancelled or absent
    /// - `UserNotFound` / `BoothNotFound` / `AlreadyCheckedInBooth` for booth codes
    #[tracing::instrument(skip(self))]
    pub async fn check_in(&self, email: &str, code: &str) -> Result<()> {
        let code = match code.parse::<CheckInCode>() {
            Ok(code) => code,
            Err(e) => {
                metrics::counter!(CHECKINS_TOTAL, "kind" => "unknown", "outcome" => e.outcome())
                    .increment(1);
                tracing::warn!("Malformed check-in code");
                return Err(e);
            }
        };

        let result = match code {
            CheckInCode::Workshop(token) => self.check_in_workshop(email, token).await,
            CheckInCode::Booth(token) => self.check_in_booth(email, token).await,
        };

        let outcome = result.as_ref().map_or_else(DomainError::outcome, |_| "success");
        metrics::counter!(CHECKINS_TOTAL, "kind" => code.kind(), "outcome" => outcome)
            .increment(1);
        match &result {
            Ok(()) => tracing::info!(kind = code.kind(), "Checked in"),
            Err(e) if e.is_client_error() => {
                tracing::warn!(kind = code.kind(), error = %e, "Check-in rejected");
            }
            Err(e) => tracing::error!(kind = code.kind(), error = %e, "Check-in failed"),
        }
        result
    }

    async fn check_in_workshop(&self, email: &str, token: Uuid) -> Result<()> {
        let booking = self
            .gateway
            .booking_for_check_in(email, token)
            .await?
            .ok_or(DomainError::InvalidCheckInCode)?;

        match booking.status {
            BookingStatus::Confirmed => {}
            BookingStatus::Attended => return Err(DomainError::AlreadyAttended),
            BookingStatus::Cancelled | BookingStatus::Absent => {
                return Err(DomainError::InvalidBookingStatus);
            }
        }

        self.gateway
            .mark_attended(booking.id, self.clock.now())
            .await
    }

    async fn check_in_booth(&self, email: &str, token: Uuid) -> Result<()> {
        let participant = self.gateway.find_participant(email).await?;
        let booth = self.gateway.find_booth_by_code(token).await?;
        self.gateway
            .insert_booth_check_in(participant.id, booth.id, self.clock.now())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const TOKEN: &str = "4f2a3c1e-8b7d-4e6f-9a0b-1c2d3e4f5a6b";

    #[test]
    fn test_parse_workshop_and_booth_codes() {
        let token = Uuid::parse_str(TOKEN).unwrap();
        assert_eq!(
            format!("W-{TOKEN}").parse::<CheckInCode>().unwrap(),
            CheckInCode::Workshop(token)
        );
        assert_eq!(
            format!("B-{TOKEN}").parse::<CheckInCode>().unwrap(),
            CheckInCode::Booth(token)
        );
    }

    #[test]
    fn test_malformed_codes() {
        for raw in [
            "",
            "W",
            "W-",
            "-",
            "X-123",
            "W-not-a-uuid",
            "w-4f2a3c1e-8b7d-4e6f-9a0b-1c2d3e4f5a6b",
            "X-4f2a3c1e-8b7d-4e6f-9a0b-1c2d3e4f5a6b",
            "WB-4f2a3c1e-8b7d-4e6f-9a0b-1c2d3e4f5a6b",
            "4f2a3c1e-8b7d-4e6f-9a0b-1c2d3e4f5a6b",
        ] {
            assert_eq!(
                raw.parse::<CheckInCode>(),
                Err(DomainError::InvalidCodeFormat),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        let code = CheckInCode::Booth(Uuid::parse_str(TOKEN).unwrap());
        assert_eq!(code.to_string().parse::<CheckInCode>().unwrap(), code);
    }
}
