//! # pylon-core
//!
//! Foundation crate for the Pylon retrieval gateway.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod tier;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::GatewayConfig;
pub use errors::{GatewayError, GatewayResult};
pub use models::{QueryRequest, QueryResponse, ScoredItem, SearchMode, SearchOutcome};
pub use tier::Tier;
