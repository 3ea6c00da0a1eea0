//! Two ways of computing hypertension follow-ups, chosen once per engine.

use crate::cache_key::Dimension;
use crate::collaborators::{Feature, FeatureFlags, FollowUpGroup, FollowUpStore};
use crate::result::{GroupValue, MetricResult, RegionResults, Series};
use chrono::NaiveDate;
use reports_common::{Period, PeriodType, Region, ReportsError, Result};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

/// How `hypertension_follow_ups` is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowUpStrategy {
    /// Per-region counter results routed through the shared cache.
    Cached,
    /// Bucketed queries against the follow-up store on every request.
    Direct,
}

impl FollowUpStrategy {
    /// An explicit choice wins; otherwise the feature flag decides.
    pub fn resolve(explicit_v2: Option<bool>, flags: &dyn FeatureFlags) -> Self {
        let v2 = explicit_v2.unwrap_or_else(|| flags.enabled(Feature::FollowUpsV2));
        if v2 {
            Self::Direct
        } else {
            Self::Cached
        }
    }

    pub fn is_direct(self) -> bool {
        self == Self::Direct
    }
}

impl fmt::Display for FollowUpStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

impl TryFrom<Dimension> for FollowUpGroup {
    type Error = ReportsError;

    fn try_from(dimension: Dimension) -> Result<Self> {
        match dimension {
            Dimension::User => Ok(Self::User),
            Dimension::Gender => Ok(Self::Gender),
            other => Err(ReportsError::invalid_argument_named(
                format!("follow-ups can only be grouped by user or gender, got '{other}'"),
                "group_by",
            )),
        }
    }
}

/// Follow-ups for every region straight from the store.
///
/// The grouping is validated before the store is touched.
#[instrument(skip(store, regions), fields(regions = regions.len()))]
pub fn direct_follow_ups(
    store: &dyn FollowUpStore,
    regions: &[Region],
    period_type: PeriodType,
    group_by: Option<Dimension>,
) -> Result<RegionResults> {
    let group = group_by.map(FollowUpGroup::try_from).transpose()?;

    let mut results = RegionResults::new();
    for region in regions {
        let counts = match group {
            None => {
                let by_month = store.distinct_patients_by_month(&region.facility_ids)?;
                MetricResult::Counts(
                    by_month
                        .into_iter()
                        .map(|(date, count)| (Period::of_type(period_type, date), count))
                        .collect(),
                )
            }
            Some(group) => {
                let rows = store.counts_by_month_and_group(&region.facility_ids, group)?;
                MetricResult::Grouped(by_period_then_group(rows, period_type))
            }
        };
        debug!(region = %region.slug, "Computed follow-ups from store");
        results.insert(region.slug.clone(), counts);
    }

    Ok(results)
}

/// Reshapes `(group, date, count)` rows into period, then group.
fn by_period_then_group(
    rows: Vec<(GroupValue, NaiveDate, u64)>,
    period_type: PeriodType,
) -> Series<BTreeMap<GroupValue, u64>> {
    let mut series: Series<BTreeMap<GroupValue, u64>> = Series::new();
    for (group, date, count) in rows {
        *series
            .entry(Period::of_type(period_type, date))
            .or_default()
            .entry(group)
            .or_default() += count;
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MockFollowUpStore, StaticFlags};
    use reports_common::test_utils::{facility_region, month};

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_resolve() {
        let off = StaticFlags::default();
        let on = StaticFlags::follow_ups_v2(true);
        assert_eq!(FollowUpStrategy::resolve(None, &off), FollowUpStrategy::Cached);
        assert_eq!(FollowUpStrategy::resolve(None, &on), FollowUpStrategy::Direct);
        assert_eq!(FollowUpStrategy::resolve(Some(false), &on), FollowUpStrategy::Cached);
        assert_eq!(FollowUpStrategy::resolve(Some(true), &off), FollowUpStrategy::Direct);
    }

    #[test]
    fn test_ungrouped_counts() {
        let mut store = MockFollowUpStore::new();
        store
            .expect_distinct_patients_by_month()
            .times(1)
            .returning(|_| Ok(BTreeMap::from([(date(2023, 1), 3), (date(2023, 2), 5)])));

        let region = facility_region("fac-1");
        let results =
            direct_follow_ups(&store, &[region], PeriodType::Month, None).unwrap();

        let counts = &results["fac-1"];
        assert_eq!(counts.total(&month(2023, 2)), 5);
        assert!(!counts.is_grouped());
    }

    #[test]
    fn test_grouped_counts_are_reshaped() {
        let mut store = MockFollowUpStore::new();
        store
            .expect_counts_by_month_and_group()
            .withf(|_, group| *group == FollowUpGroup::Gender)
            .returning(|_, _| {
                Ok(vec![
                    ("female".to_string(), date(2023, 1), 2),
                    ("male".to_string(), date(2023, 1), 1),
                    ("female".to_string(), date(2023, 2), 4),
                ])
            });

        let results = direct_follow_ups(
            &store,
            &[facility_region("fac-1")],
            PeriodType::Month,
            Some(Dimension::Gender),
        )
        .unwrap();

        let grouped = &results["fac-1"];
        assert_eq!(grouped.group_count(&month(2023, 1), "female"), 2);
        assert_eq!(grouped.group_count(&month(2023, 1), "male"), 1);
        assert_eq!(grouped.total(&month(2023, 2)), 4);
    }

    #[test]
    fn test_unsupported_grouping_never_touches_store() {
        let mut store = MockFollowUpStore::new();
        store.expect_distinct_patients_by_month().never();
        store.expect_counts_by_month_and_group().never();

        let err = direct_follow_ups(
            &store,
            &[facility_region("a"), facility_region("b")],
            PeriodType::Month,
            Some(Dimension::RegistrationUser),
        )
        .unwrap_err();

        assert!(err.is_caller_error());
    }

    #[test]
    fn test_store_failure_propagates() {
        let mut store = MockFollowUpStore::new();
        store
            .expect_distinct_patients_by_month()
            .returning(|_| Err(ReportsError::collaborator("follow-up store", "connection reset")));

        let err = direct_follow_ups(&store, &[facility_region("a")], PeriodType::Month, None)
            .unwrap_err();
        assert!(matches!(err, ReportsError::Collaborator { .. }));
    }
}
