//! # pylon-admission
//!
//! Who is calling, and may they call right now: credential → tier
//! resolution and per-caller sliding-window rate limiting.

pub mod limiter;
pub mod registry;

pub use limiter::{Admission, RateLimiter};
pub use registry::{KeyRecord, MaskedKey, TierRegistry};
