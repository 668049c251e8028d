//! # pylon-breaker
//!
//! Tracks the health of downstream dependencies and decides, per call,
//! whether attempting one is worth it. Closed → Open on consecutive
//! failures, Open → HalfOpen after a cool-down, HalfOpen resolves on a
//! single trial call.

pub mod breaker;
pub mod state;

pub use breaker::{CircuitBreaker, DependencyStatus};
pub use state::{BreakerState, HealthRecord};
