use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::search::SearchMode;

/// One recorded degradation: which dependency failed, why, and which
/// cheaper mode was served instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub dependency: String,
    pub failure: String,
    pub fallback_mode: SearchMode,
    pub timestamp: DateTime<Utc>,
}
