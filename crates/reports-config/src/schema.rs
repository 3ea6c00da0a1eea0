//! Settings schema definitions using serde.

use reports_common::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level settings for hosts embedding the report engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shared metric cache.
    pub cache: CacheSettings,
    /// Runtime switches.
    pub features: FeatureSettings,
    /// Log output.
    pub logging: LoggingConfig,
    /// Report assembly.
    pub reports: ReportSettings,
}

/// Shared metric cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of cached region entries.
    pub max_capacity: u64,
    /// Seconds an entry lives after being written.
    pub ttl_seconds: u64,
    /// Seconds an unread entry survives; defaults to the TTL when absent.
    pub tti_seconds: Option<u64>,
    /// Cache generation. Bumping it orphans every previously written entry.
    pub generation: u32,
}

impl CacheSettings {
    /// Time-to-live as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Time-to-idle as a `Duration`, falling back to the TTL.
    pub fn tti(&self) -> Duration {
        Duration::from_secs(self.tti_seconds.unwrap_or(self.ttl_seconds))
    }
}

/// Runtime feature switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Compute follow-ups directly from the follow-up record store instead of
    /// the cached per-region counter.
    pub follow_ups_v2: bool,
}

/// Report assembly settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Months shown by progress cards, ending with the report month.
    pub progress_months: u32,
    /// Recompute every cached entry instead of reading it.
    pub bust_cache: bool,
}
