use chrono::{DateTime, Utc};

use crate::tracker::ItemRecord;

/// Staleness score: `1 − 0.5^(staleDays / halfLife)`.
///
/// `staleDays` is the larger of time-since-access and time-since-verify,
/// so an item goes stale as soon as either signal ages. Range [0, 1):
/// zero right after verification, 0.5 after one half-life, asymptotic
/// toward 1. Strictly increasing in elapsed time.
pub fn staleness(record: &ItemRecord, now: DateTime<Utc>, half_life_days: f64) -> f64 {
    let since_access = elapsed_days(record.last_accessed, now);
    let since_verify = elapsed_days(record.last_verified, now);
    let stale_days = since_access.max(since_verify);

    1.0 - (-std::f64::consts::LN_2 * stale_days / half_life_days).exp()
}

fn elapsed_days(from: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - from).num_milliseconds().max(0) as f64 / 86_400_000.0
}
