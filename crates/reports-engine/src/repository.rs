//! The report engine: one instance per report request.

use crate::cache::MetricCache;
use crate::cache_key::{Dimension, MetricKey, MetricName};
use crate::catalog::{CountName, Ltfu, RateName};
use crate::collaborators::{Collaborators, CountQuery};
use crate::follow_ups::{direct_follow_ups, FollowUpStrategy};
use crate::memo::{Memo, MemoKey};
use crate::result::{RegionResults, SlugSeries};
use crate::window;
use chrono::NaiveDate;
use once_cell::unsync::OnceCell;
use reports_common::{
    Period, PeriodInfo, PeriodRange, PeriodType, Region, RegionSlug, ReportsError, Result,
};
use reports_config::ReportSettings;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Per-request engine options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryOptions {
    /// Forces the follow-up strategy; `None` defers to the feature flag.
    pub follow_ups_v2: Option<bool>,
    /// Recompute cached breakdowns and overwrite the shared cache.
    pub bust_cache: bool,
}

impl From<&ReportSettings> for RepositoryOptions {
    fn from(settings: &ReportSettings) -> Self {
        Self {
            follow_ups_v2: None,
            bust_cache: settings.bust_cache,
        }
    }
}

/// Aggregates metrics for a fixed set of regions over a fixed month range.
///
/// Breakdowns computed by the engine go through the shared cache and are
/// memoized for the engine's lifetime. Catalog counts and rates are delegated
/// to the schema and re-keyed by the engine's region slugs.
///
/// Not `Sync`: an engine serves a single request on a single thread.
pub struct Repository {
    regions: Vec<Region>,
    periods: PeriodRange,
    period_type: PeriodType,
    follow_up_strategy: FollowUpStrategy,
    bust_cache: bool,
    cache: Arc<dyn MetricCache>,
    collaborators: Collaborators,
    memo: Memo,
    earliest_periods: OnceCell<BTreeMap<RegionSlug, Option<Period>>>,
}

impl Repository {
    /// Binds an engine to `regions` and `periods`.
    ///
    /// Only month periods are supported; anything else fails before the cache
    /// or any collaborator is consulted.
    pub fn new(
        regions: impl IntoIterator<Item = Region>,
        periods: impl Into<PeriodRange>,
        collaborators: Collaborators,
        cache: Arc<dyn MetricCache>,
        options: RepositoryOptions,
    ) -> Result<Self> {
        let periods = periods.into();
        if periods.period_type() != PeriodType::Month {
            return Err(ReportsError::config(format!(
                "{} periods are not supported, reports are computed monthly",
                periods.period_type()
            )));
        }

        let mut seen = HashSet::new();
        let regions: Vec<Region> = regions
            .into_iter()
            .filter(|region| seen.insert(region.slug.clone()))
            .collect();

        let follow_up_strategy =
            FollowUpStrategy::resolve(options.follow_ups_v2, collaborators.flags.as_ref());

        debug!(
            regions = regions.len(),
            periods = %periods,
            strategy = %follow_up_strategy,
            bust_cache = options.bust_cache,
            "Report engine created"
        );

        Ok(Self {
            regions,
            period_type: periods.period_type(),
            periods,
            follow_up_strategy,
            bust_cache: options.bust_cache,
            cache,
            collaborators,
            memo: Memo::new(),
            earliest_periods: OnceCell::new(),
        })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn periods(&self) -> &PeriodRange {
        &self.periods
    }

    pub fn period_type(&self) -> PeriodType {
        self.period_type
    }

    /// How follow-ups are computed for this engine.
    pub fn follow_up_strategy(&self) -> FollowUpStrategy {
        self.follow_up_strategy
    }

    // Catalog

    /// A catalog count for every region.
    #[instrument(skip(self), fields(regions = self.regions.len()))]
    pub fn count(&self, name: CountName) -> Result<SlugSeries<u64>> {
        let series = self
            .collaborators
            .schema
            .count(name, &self.regions, &self.periods)?;
        Ok(self.keyed_by_regions(name.as_str(), series))
    }

    /// A catalog rate for every region.
    #[instrument(skip(self), fields(regions = self.regions.len()))]
    pub fn rate(&self, name: RateName, ltfu: Ltfu) -> Result<SlugSeries<f64>> {
        let series = self
            .collaborators
            .schema
            .rate(name, ltfu, &self.regions, &self.periods)?;
        Ok(self.keyed_by_regions(name.as_str(), series))
    }

    /// Same as [`Repository::adjusted_patients_without_ltfu`].
    pub fn adjusted_patients(&self) -> Result<SlugSeries<u64>> {
        self.adjusted_patients_without_ltfu()
    }

    /// Date of the first patient record for every region.
    pub fn earliest_patient_recorded_at(&self) -> Result<BTreeMap<RegionSlug, Option<NaiveDate>>> {
        let mut dates = self
            .collaborators
            .schema
            .earliest_patient_recorded_at(&self.regions)?;
        Ok(self
            .regions
            .iter()
            .map(|region| (region.slug.clone(), dates.remove(&region.slug).flatten()))
            .collect())
    }

    /// Period of the first patient record for every region. Computed once per
    /// engine.
    pub fn earliest_patient_recorded_at_period(
        &self,
    ) -> Result<BTreeMap<RegionSlug, Option<Period>>> {
        self.earliest_periods
            .get_or_try_init(|| {
                let period_type = self.period_type;
                let dates = self.earliest_patient_recorded_at()?;
                Ok::<_, ReportsError>(
                    dates
                        .into_iter()
                        .map(|(slug, date)| (slug, date.map(|d| Period::of_type(period_type, d))))
                        .collect(),
                )
            })
            .cloned()
    }

    fn keyed_by_regions<T>(&self, operation: &str, mut series: SlugSeries<T>) -> SlugSeries<T> {
        let keyed: SlugSeries<T> = self
            .regions
            .iter()
            .map(|region| {
                let values = series.remove(&region.slug).unwrap_or_else(|| {
                    debug!(operation, region = %region.slug, "No series returned for region");
                    BTreeMap::new()
                });
                (region.slug.clone(), values)
            })
            .collect();

        if !series.is_empty() {
            warn!(
                operation,
                unknown = ?series.keys().collect::<Vec<_>>(),
                "Dropping series for regions outside this report"
            );
        }

        keyed
    }

    // Breakdowns

    /// Registrations per registering user, for every region.
    #[instrument(skip(self))]
    pub fn monthly_registrations_by_user(&self) -> Result<RegionResults> {
        self.cached_breakdown(
            MetricName::MonthlyRegistrationsByUser,
            Some(Dimension::RegistrationUser),
            self.collaborators.registered_patients.as_ref(),
        )
    }

    /// Blood pressure measurements per recording user, for every region.
    #[instrument(skip(self))]
    pub fn bp_measures_by_user(&self) -> Result<RegionResults> {
        self.cached_breakdown(
            MetricName::BpMeasuresByUser,
            Some(Dimension::User),
            self.collaborators.bp_measures.as_ref(),
        )
    }

    /// Overdue patient calls per calling user, for every region.
    #[instrument(skip(self))]
    pub fn overdue_calls_by_user(&self) -> Result<RegionResults> {
        self.cached_breakdown(
            MetricName::OverdueCallsByUser,
            Some(Dimension::User),
            self.collaborators.overdue_calls.as_ref(),
        )
    }

    /// Hypertension follow-ups for every region, optionally grouped.
    ///
    /// The direct strategy only supports grouping by user or gender.
    #[instrument(skip(self), fields(strategy = %self.follow_up_strategy))]
    pub fn hypertension_follow_ups(&self, group_by: Option<Dimension>) -> Result<RegionResults> {
        let metric = MetricName::HypertensionFollowUps;
        self.memo
            .get_or_try_insert_with(MemoKey::new(metric, group_by), || {
                match self.follow_up_strategy {
                    FollowUpStrategy::Cached => self.fetch_by_region(
                        metric,
                        group_by,
                        self.collaborators.follow_ups.as_ref(),
                    ),
                    FollowUpStrategy::Direct => direct_follow_ups(
                        self.collaborators.follow_up_store.as_ref(),
                        &self.regions,
                        self.period_type,
                        group_by,
                    ),
                }
            })
    }

    /// Memoized breakdown whose memo key carries no grouping argument.
    fn cached_breakdown(
        &self,
        metric: MetricName,
        group_by: Option<Dimension>,
        query: &dyn CountQuery,
    ) -> Result<RegionResults> {
        self.memo.get_or_try_insert_with(MemoKey::new(metric, None), || {
            self.fetch_by_region(metric, group_by, query)
        })
    }

    /// One cache key per region, resolved through the shared cache.
    fn fetch_by_region(
        &self,
        metric: MetricName,
        group_by: Option<Dimension>,
        query: &dyn CountQuery,
    ) -> Result<RegionResults> {
        let keys = MetricKey::for_regions(&self.regions, metric, group_by, self.period_type);
        let resolved = self
            .cache
            .get_or_set_many(&keys, self.bust_cache, &mut |key: &MetricKey| {
                debug!(key = %key, "Computing breakdown");
                query.count(&key.region, key.period_type, key.group_by)
            })?;

        Ok(resolved
            .into_iter()
            .map(|(key, value)| (key.region.slug, value))
            .collect())
    }

    // Windows

    /// Display metadata for each period `region` has data for, clamped to
    /// this engine's range.
    ///
    /// A region the engine was not built for is rejected with
    /// [`ReportsError::InvalidArgument`] rather than answered with the full
    /// range.
    pub fn period_info(&self, region: &Region) -> Result<BTreeMap<Period, PeriodInfo>> {
        if !self.regions.iter().any(|r| r.slug == region.slug) {
            return Err(ReportsError::invalid_argument_named(
                format!("region '{}' is not part of this report", region.slug),
                "region",
            ));
        }

        let earliest = self
            .earliest_patient_recorded_at_period()?
            .get(&region.slug)
            .copied()
            .flatten();
        Ok(window::period_info(&self.periods, earliest))
    }

    // Warming

    /// Computes everything a dashboard reads so later requests hit the cache.
    ///
    /// Stops at the first failure.
    #[instrument(skip(self), fields(regions = self.regions.len()))]
    pub fn warm_cache(&self) -> Result<()> {
        for rate in RateName::ALL.iter().copied() {
            self.rate(rate, Ltfu::Without)?;
            if rate.warms_adjusted_variant() {
                self.rate(rate, Ltfu::With)?;
            }
        }

        self.hypertension_follow_ups(None)?;

        if self.regions.iter().all(Region::is_facility_region) {
            self.hypertension_follow_ups(Some(Dimension::User))?;
            self.bp_measures_by_user()?;
            self.monthly_registrations_by_user()?;
        }

        info!("Report cache warmed");
        Ok(())
    }
}

/// Generates one accessor per catalog count.
macro_rules! count_accessors {
    ($($method:ident => $name:ident),+ $(,)?) => {
        impl Repository {
            $(
                #[doc = concat!("The `", stringify!($method), "` count for every region.")]
                pub fn $method(&self) -> Result<SlugSeries<u64>> {
                    self.count(CountName::$name)
                }
            )+
        }
    };
}

/// Generates one accessor per catalog rate.
macro_rules! rate_accessors {
    ($($method:ident => $name:ident),+ $(,)?) => {
        impl Repository {
            $(
                #[doc = concat!("The `", stringify!($method), "` rate for every region.")]
                pub fn $method(&self, ltfu: Ltfu) -> Result<SlugSeries<f64>> {
                    self.rate(RateName::$name, ltfu)
                }
            )+
        }
    };
}

count_accessors! {
    adjusted_patients_with_ltfu => AdjustedPatientsWithLtfu,
    adjusted_patients_without_ltfu => AdjustedPatientsWithoutLtfu,
    assigned_patients => AssignedPatients,
    complete_monthly_registrations => CompleteMonthlyRegistrations,
    controlled => Controlled,
    cumulative_assigned_patients => CumulativeAssignedPatients,
    cumulative_registrations => CumulativeRegistrations,
    ltfu => Ltfu,
    missed_visits => MissedVisits,
    missed_visits_with_ltfu => MissedVisitsWithLtfu,
    missed_visits_without_ltfu => MissedVisitsWithoutLtfu,
    monthly_registrations => MonthlyRegistrations,
    uncontrolled => Uncontrolled,
    visited_without_bp_taken => VisitedWithoutBpTaken,
    monthly_overdue_calls => MonthlyOverdueCalls,
}

rate_accessors! {
    controlled_rates => ControlledRates,
    ltfu_rates => LtfuRates,
    missed_visits_rate => MissedVisitsRate,
    missed_visits_with_ltfu_rates => MissedVisitsWithLtfuRates,
    missed_visits_without_ltfu_rates => MissedVisitsWithoutLtfuRates,
    uncontrolled_rates => UncontrolledRates,
    visited_without_bp_taken_rates => VisitedWithoutBpTakenRates,
}
