//! Interfaces the engine consumes: counters, the follow-up record store, the
//! rate schema and feature flags.

use crate::cache_key::Dimension;
use crate::catalog::{CountName, Ltfu, RateName};
use crate::result::{GroupValue, MetricResult, SlugSeries};
use chrono::NaiveDate;
use reports_common::{FacilityId, PeriodRange, PeriodType, Region, RegionSlug, Result};
use reports_config::SettingsCache;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Counts records for one region, bucketed by period and optionally grouped.
#[cfg_attr(test, mockall::automock)]
pub trait CountQuery: Send + Sync {
    fn count(
        &self,
        region: &Region,
        period_type: PeriodType,
        group_by: Option<Dimension>,
    ) -> Result<MetricResult>;
}

/// Column the follow-up store groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowUpGroup {
    User,
    Gender,
}

impl FollowUpGroup {
    pub const fn column(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Gender => "patient_gender",
        }
    }
}

impl fmt::Display for FollowUpGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Follow-up visit records, bucketed by calendar month.
///
/// Dates returned are month start dates.
#[cfg_attr(test, mockall::automock)]
pub trait FollowUpStore: Send + Sync {
    /// Distinct patients followed up per month.
    fn distinct_patients_by_month(
        &self,
        facility_ids: &[FacilityId],
    ) -> Result<BTreeMap<NaiveDate, u64>>;

    /// Follow-up counts per `(group value, month)`.
    fn counts_by_month_and_group(
        &self,
        facility_ids: &[FacilityId],
        group: FollowUpGroup,
    ) -> Result<Vec<(GroupValue, NaiveDate, u64)>>;
}

/// The opaque layer computing catalog counts and rates.
#[cfg_attr(test, mockall::automock)]
pub trait Schema: Send + Sync {
    fn count(
        &self,
        name: CountName,
        regions: &[Region],
        periods: &PeriodRange,
    ) -> Result<SlugSeries<u64>>;

    fn rate(
        &self,
        name: RateName,
        ltfu: Ltfu,
        regions: &[Region],
        periods: &PeriodRange,
    ) -> Result<SlugSeries<f64>>;

    /// Date of the first patient record per region; `None` when a region has
    /// no records.
    fn earliest_patient_recorded_at(
        &self,
        regions: &[Region],
    ) -> Result<BTreeMap<RegionSlug, Option<NaiveDate>>>;
}

/// Feature switches read by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Serve follow-ups from direct store queries instead of the shared cache.
    FollowUpsV2,
}

/// Source of feature switch state.
pub trait FeatureFlags: Send + Sync {
    fn enabled(&self, feature: Feature) -> bool;
}

impl FeatureFlags for SettingsCache {
    fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::FollowUpsV2 => self.features().follow_ups_v2,
        }
    }
}

/// Fixed feature state, for tools and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticFlags {
    pub follow_ups_v2: bool,
}

impl StaticFlags {
    pub fn follow_ups_v2(enabled: bool) -> Self {
        Self {
            follow_ups_v2: enabled,
        }
    }
}

impl FeatureFlags for StaticFlags {
    fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::FollowUpsV2 => self.follow_ups_v2,
        }
    }
}

/// Everything an engine reads from, injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub registered_patients: Arc<dyn CountQuery>,
    pub bp_measures: Arc<dyn CountQuery>,
    pub follow_ups: Arc<dyn CountQuery>,
    pub overdue_calls: Arc<dyn CountQuery>,
    pub follow_up_store: Arc<dyn FollowUpStore>,
    pub schema: Arc<dyn Schema>,
    pub flags: Arc<dyn FeatureFlags>,
}
