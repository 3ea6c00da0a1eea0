//! Value types returned by the engine and stored in the shared cache.

use reports_common::{Period, RegionSlug};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value of a grouping dimension, such as a user id or a gender.
pub type GroupValue = String;

/// Values per period, ascending.
pub type Series<T> = BTreeMap<Period, T>;

/// One series per region slug.
pub type SlugSeries<T> = BTreeMap<RegionSlug, Series<T>>;

/// Engine-computed breakdowns keyed by region slug.
pub type RegionResults = BTreeMap<RegionSlug, MetricResult>;

/// The value stored under one cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum MetricResult {
    /// Ungrouped counts per period.
    Counts(Series<u64>),
    /// Counts per period, then per group value.
    Grouped(Series<BTreeMap<GroupValue, u64>>),
}

impl MetricResult {
    /// Whether the result carries a group breakdown.
    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Grouped(_))
    }

    /// Periods present in the result.
    pub fn periods(&self) -> Vec<Period> {
        match self {
            Self::Counts(series) => series.keys().copied().collect(),
            Self::Grouped(series) => series.keys().copied().collect(),
        }
    }

    /// Total for `period`, summed across groups when grouped.
    pub fn total(&self, period: &Period) -> u64 {
        match self {
            Self::Counts(series) => series.get(period).copied().unwrap_or_default(),
            Self::Grouped(series) => series
                .get(period)
                .map(|groups| groups.values().sum())
                .unwrap_or_default(),
        }
    }

    /// Count for `group` in `period`; zero when either is absent or the result
    /// is ungrouped.
    pub fn group_count(&self, period: &Period, group: &str) -> u64 {
        match self {
            Self::Counts(_) => 0,
            Self::Grouped(series) => series
                .get(period)
                .and_then(|groups| groups.get(group))
                .copied()
                .unwrap_or_default(),
        }
    }
}

impl Default for MetricResult {
    fn default() -> Self {
        Self::Counts(Series::new())
    }
}
