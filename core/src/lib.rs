//! # Open House Core
//!
//! Domain types, engines and persistence contracts for the Open House
//! registration backend.
//!
//! ## Components
//!
//! - **User Directory** ([`directory`]): registration and projected profiles
//! - **Workshop Catalog** ([`catalog`]): projected lookup and filtered listing
//! - **Booking Engine** ([`booking`]): seat accounting and overlap detection
//! - **Check-In Engine** ([`checkin`]): `W-`/`B-` code handling
//! - **Validator** ([`validation`]): enum reference table and payload shapes
//!
//! Every component is generic over the repository traits in [`providers`],
//! so the same engine runs against `PostgreSQL` in production and against an
//! in-memory gateway in tests.
//!
//! ## Example
//!
//! ```ignore
//! use openhouse_core::booking::{BookingEngine, BookingPolicy};
//! use openhouse_core::environment::SystemClock;
//!
//! let engine = BookingEngine::new(gateway, Arc::new(SystemClock), BookingPolicy::default());
//! let booking = engine.book_workshop(&identity, WorkshopId::new(42)).await?;
//! ```

pub mod booking;
pub mod catalog;
pub mod checkin;
pub mod directory;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod projection;
pub mod providers;
pub mod types;
pub mod validation;

pub use error::{DomainError, ErrorKind, Result};
