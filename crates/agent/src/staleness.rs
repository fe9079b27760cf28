//! Cache freshness: decide whether a stored price must be refreshed before
//! answering. Pure; no I/O.

use chrono::{DateTime, Utc};
use coinclaw_config::DEFAULT_FRESHNESS_WINDOW_SECS;
use coinclaw_core::record::CoinRecord;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    window: Duration,
}

impl StalenessPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True when the record has no usable price timestamp, its price is older
    /// than the window, or the timestamp lies in the future.
    pub fn needs_refresh(&self, record: &CoinRecord, now: DateTime<Utc>) -> bool {
        let Some(observed_at) = record.observed_at() else {
            return true;
        };

        // A future timestamp cannot be trusted (clock skew, hand-edited file).
        match (now - observed_at).to_std() {
            Ok(age) => age > self.window,
            Err(_) => true,
        }
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_FRESHNESS_WINDOW_SECS))
    }
}
