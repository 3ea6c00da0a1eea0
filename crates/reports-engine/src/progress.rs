//! Data for the total-registrations progress card.

use crate::cache::MetricCache;
use crate::collaborators::Collaborators;
use crate::repository::{Repository, RepositoryOptions};
use crate::result::Series;
use reports_common::{Period, PeriodInfo, PeriodRange, Region, Result};
use reports_config::DEFAULT_PROGRESS_MONTHS;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Cumulative registrations for one region over the months leading up to a
/// report month.
pub struct TotalRegistrationsProgress {
    region: Region,
    report_month: Period,
    repository: Repository,
}

impl TotalRegistrationsProgress {
    /// A card covering the six months ending with `report_month`.
    pub fn new(
        region: Region,
        report_month: Period,
        collaborators: Collaborators,
        cache: Arc<dyn MetricCache>,
        options: RepositoryOptions,
    ) -> Result<Self> {
        Self::with_months(
            region,
            report_month,
            DEFAULT_PROGRESS_MONTHS,
            collaborators,
            cache,
            options,
        )
    }

    /// A card covering the `months` months ending with `report_month`.
    pub fn with_months(
        region: Region,
        report_month: Period,
        months: u32,
        collaborators: Collaborators,
        cache: Arc<dyn MetricCache>,
        options: RepositoryOptions,
    ) -> Result<Self> {
        let range = PeriodRange::ending_at(report_month, months)?;
        let repository = Repository::new([region.clone()], range, collaborators, cache, options)?;
        Ok(Self {
            region,
            report_month,
            repository,
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn report_month(&self) -> Period {
        self.report_month
    }

    /// The card's months, oldest first.
    pub fn months(&self) -> &PeriodRange {
        self.repository.periods()
    }

    /// Cumulative registrations per month.
    pub fn total_registrations(&self) -> Result<Series<u64>> {
        let mut by_region = self.repository.cumulative_registrations()?;
        Ok(by_region.remove(&self.region.slug).unwrap_or_default())
    }

    /// Metadata for each month the region has data for.
    pub fn period_info(&self) -> Result<BTreeMap<Period, PeriodInfo>> {
        self.repository.period_info(&self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MokaMetricCache;
    use crate::catalog::CountName;
    use crate::collaborators::{MockCountQuery, MockFollowUpStore, MockSchema, StaticFlags};
    use chrono::NaiveDate;
    use reports_common::test_utils::{facility_region, month};

    fn collaborators(schema: MockSchema) -> Collaborators {
        Collaborators {
            registered_patients: Arc::new(MockCountQuery::new()),
            bp_measures: Arc::new(MockCountQuery::new()),
            follow_ups: Arc::new(MockCountQuery::new()),
            overdue_calls: Arc::new(MockCountQuery::new()),
            follow_up_store: Arc::new(MockFollowUpStore::new()),
            schema: Arc::new(schema),
            flags: Arc::new(StaticFlags::default()),
        }
    }

    #[test]
    fn test_window_ends_at_report_month() {
        let mut schema = MockSchema::new();
        schema
            .expect_count()
            .withf(|name, regions, periods| {
                *name == CountName::CumulativeRegistrations
                    && regions.len() == 1
                    && periods.start() == month(2023, 1)
                    && periods.end() == month(2023, 6)
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(BTreeMap::from([(
                    "fac".into(),
                    BTreeMap::from([(month(2023, 5), 40), (month(2023, 6), 42)]),
                )]))
            });
        schema
            .expect_earliest_patient_recorded_at()
            .returning(|_| Ok(BTreeMap::from([("fac".into(), NaiveDate::from_ymd_opt(2023, 5, 2))])));

        let card = TotalRegistrationsProgress::new(
            facility_region("fac"),
            month(2023, 6),
            collaborators(schema),
            Arc::new(MokaMetricCache::default()),
            RepositoryOptions::default(),
        )
        .unwrap();

        assert_eq!(card.months().len(), 6);
        assert_eq!(card.total_registrations().unwrap()[&month(2023, 6)], 42);
        assert_eq!(
            card.period_info().unwrap().keys().copied().collect::<Vec<_>>(),
            vec![month(2023, 5), month(2023, 6)]
        );
    }

    #[test]
    fn test_zero_months_rejected() {
        let result = TotalRegistrationsProgress::with_months(
            facility_region("fac"),
            month(2023, 6),
            0,
            collaborators(MockSchema::new()),
            Arc::new(MokaMetricCache::default()),
            RepositoryOptions::default(),
        );
        assert!(result.is_err());
    }
}
