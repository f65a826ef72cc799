//! # Open House Testing
//!
//! Testing utilities for the Open House service.
//!
//! This crate provides:
//! - [`InMemoryGateway`]: every repository trait in memory, with real
//!   unit-of-work semantics (rollback on drop)
//! - Mock implementations of injected dependencies ([`FixedClock`],
//!   [`StaticVerifier`])
//! - Fixtures for users, registration forms and workshops
//!
//! ## Example
//!
//! ```ignore
//! use openhouse_testing::{InMemoryGateway, fixtures::{WorkshopSeed, new_user, identity}, test_clock};
//!
//! #[tokio::test]
//! async fn test_booking_takes_a_seat() {
//!     let gateway = Arc::new(InMemoryGateway::new());
//!     gateway.create_user(&new_user("ada@example.com", ParticipantType::Student)).await?;
//!     let (workshop, _) = gateway.add_workshop(WorkshopSeed::new(..).into_workshop()).await;
//!
//!     let engine = BookingEngine::new(gateway.clone(), Arc::new(test_clock()), BookingPolicy::default());
//!     engine.book_workshop(&identity("ada@example.com"), workshop).await?;
//!
//!     assert_eq!(gateway.workshop(workshop).await.unwrap().registered_count, 1);
//! }
//! ```

pub mod fixtures;
pub mod gateway;
pub mod mocks;

// Re-export commonly used items
pub use gateway::{InMemoryGateway, InMemoryTx};
pub use mocks::{FixedClock, StaticVerifier, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use openhouse_core::environment::Clock;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }
}
