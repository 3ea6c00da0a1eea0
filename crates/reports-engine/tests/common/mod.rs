//! In-memory collaborators shared by the engine integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use reports_common::{FacilityId, PeriodRange, PeriodType, Region, RegionSlug, Result};
use reports_engine::{
    Collaborators, CountName, CountQuery, Dimension, FollowUpGroup, FollowUpStore, GroupValue,
    Ltfu, MetricResult, RateName, Schema, StaticFlags,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Counter returning `value` for January 2023, grouped under `"u1"` when a
/// grouping is requested.
#[derive(Default)]
pub struct CountingQuery {
    pub calls: AtomicUsize,
    pub value: AtomicU64,
}

impl CountingQuery {
    pub fn returning(value: u64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            value: AtomicU64::new(value),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_value(&self, value: u64) {
        self.value.store(value, Ordering::SeqCst);
    }
}

impl CountQuery for CountingQuery {
    fn count(
        &self,
        _region: &Region,
        _period_type: PeriodType,
        group_by: Option<Dimension>,
    ) -> Result<MetricResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = self.value.load(Ordering::SeqCst);
        let period = reports_common::test_utils::month(2023, 1);
        Ok(match group_by {
            None => MetricResult::Counts(BTreeMap::from([(period, value)])),
            Some(_) => MetricResult::Grouped(BTreeMap::from([(
                period,
                BTreeMap::from([("u1".to_string(), value)]),
            )])),
        })
    }
}

/// Follow-up store answering the same rows for every facility set.
#[derive(Default)]
pub struct FakeFollowUpStore {
    pub calls: AtomicUsize,
}

impl FakeFollowUpStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn first_of(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid date")
}

impl FollowUpStore for FakeFollowUpStore {
    fn distinct_patients_by_month(
        &self,
        _facility_ids: &[FacilityId],
    ) -> Result<BTreeMap<NaiveDate, u64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BTreeMap::from([(first_of(2023, 1), 5)]))
    }

    fn counts_by_month_and_group(
        &self,
        _facility_ids: &[FacilityId],
        _group: FollowUpGroup,
    ) -> Result<Vec<(GroupValue, NaiveDate, u64)>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![("u1".to_string(), first_of(2023, 1), 5)])
    }
}

/// Schema returning one value per requested region and period.
#[derive(Default)]
pub struct FakeSchema {
    pub earliest: BTreeMap<RegionSlug, Option<NaiveDate>>,
    pub rate_calls: Mutex<Vec<(RateName, Ltfu)>>,
    pub count_calls: AtomicUsize,
    pub earliest_calls: AtomicUsize,
}

impl FakeSchema {
    pub fn with_earliest(earliest: &[(&str, Option<NaiveDate>)]) -> Self {
        Self {
            earliest: earliest
                .iter()
                .map(|(slug, date)| (RegionSlug::from(*slug), *date))
                .collect(),
            ..Self::default()
        }
    }

    pub fn rate_calls(&self) -> Vec<(RateName, Ltfu)> {
        self.rate_calls.lock().expect("rate calls lock").clone()
    }
}

impl Schema for FakeSchema {
    fn count(
        &self,
        _name: CountName,
        regions: &[Region],
        periods: &PeriodRange,
    ) -> Result<reports_engine::SlugSeries<u64>> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(regions
            .iter()
            .map(|region| (region.slug.clone(), periods.iter().map(|p| (p, 1)).collect()))
            .collect())
    }

    fn rate(
        &self,
        name: RateName,
        ltfu: Ltfu,
        regions: &[Region],
        periods: &PeriodRange,
    ) -> Result<reports_engine::SlugSeries<f64>> {
        self.rate_calls
            .lock()
            .expect("rate calls lock")
            .push((name, ltfu));
        Ok(regions
            .iter()
            .map(|region| (region.slug.clone(), periods.iter().map(|p| (p, 0.5)).collect()))
            .collect())
    }

    fn earliest_patient_recorded_at(
        &self,
        _regions: &[Region],
    ) -> Result<BTreeMap<RegionSlug, Option<NaiveDate>>> {
        self.earliest_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.earliest.clone())
    }
}

/// Every fake, kept around so tests can inspect call counts.
pub struct Fakes {
    pub registered_patients: Arc<CountingQuery>,
    pub bp_measures: Arc<CountingQuery>,
    pub follow_ups: Arc<CountingQuery>,
    pub overdue_calls: Arc<CountingQuery>,
    pub follow_up_store: Arc<FakeFollowUpStore>,
    pub schema: Arc<FakeSchema>,
    pub flags: StaticFlags,
}

impl Fakes {
    pub fn new() -> Self {
        Self::with_schema(FakeSchema::default())
    }

    pub fn with_schema(schema: FakeSchema) -> Self {
        Self {
            registered_patients: Arc::new(CountingQuery::returning(1)),
            bp_measures: Arc::new(CountingQuery::returning(2)),
            follow_ups: Arc::new(CountingQuery::returning(3)),
            overdue_calls: Arc::new(CountingQuery::returning(4)),
            follow_up_store: Arc::new(FakeFollowUpStore::default()),
            schema: Arc::new(schema),
            flags: StaticFlags::default(),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            registered_patients: self.registered_patients.clone(),
            bp_measures: self.bp_measures.clone(),
            follow_ups: self.follow_ups.clone(),
            overdue_calls: self.overdue_calls.clone(),
            follow_up_store: self.follow_up_store.clone(),
            schema: self.schema.clone(),
            flags: Arc::new(self.flags),
        }
    }

    /// Calls made to any collaborator that counts records.
    pub fn counter_calls(&self) -> usize {
        self.registered_patients.calls()
            + self.bp_measures.calls()
            + self.follow_ups.calls()
            + self.overdue_calls.calls()
            + self.follow_up_store.calls()
    }
}
