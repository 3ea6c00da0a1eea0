//! Default values for the settings schema.

use crate::schema::{CacheSettings, ReportSettings};

/// Default number of months shown by progress cards.
pub const DEFAULT_PROGRESS_MONTHS: u32 = 6;

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: 50_000,
            ttl_seconds: 12 * 60 * 60,
            tti_seconds: None,
            generation: 1,
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            progress_months: DEFAULT_PROGRESS_MONTHS,
            bust_cache: false,
        }
    }
}
