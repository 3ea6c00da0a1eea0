//! Cache keys for engine-computed breakdowns.

use reports_common::{PeriodType, Region, ReportsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grouping dimension for breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// The user who recorded the event.
    User,
    /// The user who registered the patient.
    RegistrationUser,
    /// The patient's gender.
    Gender,
}

impl Dimension {
    /// Stable name used in cache keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::RegistrationUser => "registration_user_id",
            Self::Gender => "gender",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ReportsError;

    /// Accepts a bare or table-qualified column name, e.g. `user_id` or
    /// `blood_pressures.user_id`.
    fn from_str(s: &str) -> Result<Self> {
        let column = s.trim().rsplit('.').next().unwrap_or_default();
        match column {
            "user" | "user_id" => Ok(Self::User),
            "registration_user" | "registration_user_id" => Ok(Self::RegistrationUser),
            "gender" | "patient_gender" => Ok(Self::Gender),
            _ => Err(ReportsError::invalid_argument_named(
                format!("unknown grouping dimension '{s}'"),
                "group_by",
            )),
        }
    }
}

/// The engine operation that owns a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    /// Registrations grouped by registering user.
    MonthlyRegistrationsByUser,
    /// Follow-up visits.
    HypertensionFollowUps,
    /// Blood pressure measurements grouped by user.
    BpMeasuresByUser,
    /// Overdue patient calls grouped by user.
    OverdueCallsByUser,
}

impl MetricName {
    /// Stable name used in cache keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MonthlyRegistrationsByUser => "monthly_registrations_by_user",
            Self::HypertensionFollowUps => "hypertension_follow_ups",
            Self::BpMeasuresByUser => "bp_measures_by_user",
            Self::OverdueCallsByUser => "overdue_calls_by_user",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one cached breakdown for one region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    /// Region the value belongs to.
    pub region: Region,
    /// Owning operation.
    pub metric: MetricName,
    /// Grouping dimension, if any.
    pub group_by: Option<Dimension>,
    /// Bucket size of the cached series.
    pub period_type: PeriodType,
}

impl MetricKey {
    /// Creates a key.
    pub fn new(
        region: Region,
        metric: MetricName,
        group_by: Option<Dimension>,
        period_type: PeriodType,
    ) -> Self {
        Self {
            region,
            metric,
            group_by,
            period_type,
        }
    }

    /// One key per region, in region order.
    pub fn for_regions(
        regions: &[Region],
        metric: MetricName,
        group_by: Option<Dimension>,
        period_type: PeriodType,
    ) -> Vec<Self> {
        regions
            .iter()
            .map(|region| Self::new(region.clone(), metric, group_by, period_type))
            .collect()
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = self.group_by.map_or("all", Dimension::as_str);
        write!(
            f,
            "region/{}/{}/{}/{}",
            self.region.slug, self.metric, group, self.period_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reports_common::test_utils::{district_region, facility_region};
    use std::collections::HashSet;

    #[test]
    fn test_dimension_parsing() {
        assert_eq!("user_id".parse::<Dimension>().unwrap(), Dimension::User);
        assert_eq!(
            "blood_pressures.user_id".parse::<Dimension>().unwrap(),
            Dimension::User
        );
        assert_eq!(
            "registration_user_id".parse::<Dimension>().unwrap(),
            Dimension::RegistrationUser
        );
        assert_eq!(
            "patient_gender".parse::<Dimension>().unwrap(),
            Dimension::Gender
        );

        let err = "facility_id".parse::<Dimension>().unwrap_err();
        assert!(err.is_caller_error());
        // Suffix matches are not enough.
        assert!("supervisor_user_id".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_key_display() {
        let key = MetricKey::new(
            facility_region("fac-1"),
            MetricName::BpMeasuresByUser,
            Some(Dimension::User),
            PeriodType::Month,
        );
        assert_eq!(key.to_string(), "region/fac-1/bp_measures_by_user/user_id/month");

        let key = MetricKey::new(
            facility_region("fac-1"),
            MetricName::HypertensionFollowUps,
            None,
            PeriodType::Month,
        );
        assert_eq!(key.to_string(), "region/fac-1/hypertension_follow_ups/all/month");
    }

    #[test]
    fn test_keys_are_deterministic_and_distinct() {
        let regions = vec![
            facility_region("a"),
            facility_region("b"),
            district_region("c", 3),
        ];
        let first = MetricKey::for_regions(
            &regions,
            MetricName::HypertensionFollowUps,
            None,
            PeriodType::Month,
        );
        let again = MetricKey::for_regions(
            &regions,
            MetricName::HypertensionFollowUps,
            None,
            PeriodType::Month,
        );
        assert_eq!(first, again);
        assert_eq!(first.iter().collect::<HashSet<_>>().len(), regions.len());

        let grouped = MetricKey::for_regions(
            &regions,
            MetricName::HypertensionFollowUps,
            Some(Dimension::User),
            PeriodType::Month,
        );
        assert_ne!(first[0], grouped[0]);
    }
}
