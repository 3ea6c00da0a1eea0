//! # Reports Engine
//!
//! Aggregates health-program metrics per region and per month. Engine-computed
//! breakdowns are resolved in batches through a shared, generation-versioned
//! cache and memoized for the lifetime of a request; catalog counts and rates
//! are delegated to an injected schema.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod cache_key;
pub mod catalog;
pub mod collaborators;
pub mod follow_ups;
pub mod memo;
pub mod progress;
pub mod repository;
pub mod result;
pub mod window;

pub use cache::{CacheMetrics, MetricCache, MokaMetricCache};
pub use cache_key::{Dimension, MetricKey, MetricName};
pub use catalog::{CountName, Ltfu, RateName};
pub use collaborators::{
    Collaborators, CountQuery, Feature, FeatureFlags, FollowUpGroup, FollowUpStore, Schema,
    StaticFlags,
};
pub use follow_ups::FollowUpStrategy;
pub use memo::{Memo, MemoKey};
pub use progress::TotalRegistrationsProgress;
pub use repository::{Repository, RepositoryOptions};
pub use result::{GroupValue, MetricResult, RegionResults, Series, SlugSeries};

// Re-export the primitives callers need to build an engine
pub use reports_common::{
    FacilityId, Period, PeriodInfo, PeriodRange, PeriodType, Region, RegionKind, RegionSlug,
    ReportsError, Result,
};
