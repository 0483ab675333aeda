//! Trip-cost and taxi-simulation engine for PMR (reduced-mobility) assistance.
//!
//! Everything here is a pure computation over caller-supplied values: the
//! invoice for a booking, haversine distances, and the step-by-step taxi ride
//! simulation. Persistence, scheduling and display belong to the host.

pub mod config;
pub mod driver;
pub mod error;
pub mod geo;
pub mod invoice;
pub mod places;
pub mod pricing;
pub mod taxi;
pub mod tracking;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::{PmrError, Result};
