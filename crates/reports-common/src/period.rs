//! Calendar buckets and contiguous ranges of them.
//!
//! A [`Period`] is identified by its type and the first day of the bucket, so
//! ordering periods of one type is ordering their start dates. A
//! [`PeriodRange`] is inclusive of both endpoints and never empty.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ReportsError, Result};

/// Size of a calendar bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// One calendar month.
    Month,
    /// One calendar quarter (Jan-Mar, Apr-Jun, ...).
    Quarter,
}

impl PeriodType {
    /// Number of calendar months covered by one bucket.
    pub const fn months(self) -> u32 {
        match self {
            Self::Month => 1,
            Self::Quarter => 3,
        }
    }

    /// Number of buckets in a calendar year.
    pub const fn per_year(self) -> i32 {
        match self {
            Self::Month => 12,
            Self::Quarter => 4,
        }
    }

    /// Stable lowercase name, used in cache keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Quarter => "quarter",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discrete time bucket.
///
/// Field order matters: the derived `Ord` compares start dates first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    start: NaiveDate,
    #[serde(rename = "type")]
    period_type: PeriodType,
}

impl Period {
    /// The month `month` (1-12) of `year`.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ReportsError::validation_field(format!("invalid month {year}-{month:02}"), "month")
        })?;
        Ok(Self {
            start,
            period_type: PeriodType::Month,
        })
    }

    /// The quarter `quarter` (1-4) of `year`.
    pub fn quarter(year: i32, quarter: u32) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(ReportsError::validation_field(
                format!("invalid quarter {year}-Q{quarter}"),
                "quarter",
            ));
        }
        let start = NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1).ok_or_else(|| {
            ReportsError::validation_field(format!("invalid quarter {year}-Q{quarter}"), "quarter")
        })?;
        Ok(Self {
            start,
            period_type: PeriodType::Quarter,
        })
    }

    /// The month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        Self {
            start: date - Duration::days(i64::from(date.day0())),
            period_type: PeriodType::Month,
        }
    }

    /// The quarter containing `date`.
    pub fn quarter_of(date: NaiveDate) -> Self {
        let month = Self::month_of(date);
        let offset = month.start.month0() % 3;
        Self {
            start: month.start - Months::new(offset),
            period_type: PeriodType::Quarter,
        }
    }

    /// The bucket of type `period_type` containing `date`.
    pub fn of_type(period_type: PeriodType, date: NaiveDate) -> Self {
        match period_type {
            PeriodType::Month => Self::month_of(date),
            PeriodType::Quarter => Self::quarter_of(date),
        }
    }

    /// Bucket size.
    pub const fn period_type(&self) -> PeriodType {
        self.period_type
    }

    /// First day of the bucket.
    pub const fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the bucket.
    pub fn end_date(&self) -> NaiveDate {
        self.next().start - Duration::days(1)
    }

    /// The period `n` buckets away; negative values move backwards.
    ///
    /// # Panics
    ///
    /// Panics when the result falls outside the dates chrono can represent.
    /// Use [`Period::checked_advance`] for offsets that are not known to be
    /// small.
    pub fn advance(&self, n: i32) -> Self {
        let months = n.unsigned_abs() * self.period_type.months();
        let start = if n >= 0 {
            self.start + Months::new(months)
        } else {
            self.start - Months::new(months)
        };
        Self {
            start,
            period_type: self.period_type,
        }
    }

    /// Like [`Period::advance`], but reports an out-of-range result as an error.
    pub fn checked_advance(&self, n: i32) -> Result<Self> {
        let start = n
            .unsigned_abs()
            .checked_mul(self.period_type.months())
            .map(Months::new)
            .and_then(|months| {
                if n >= 0 {
                    self.start.checked_add_months(months)
                } else {
                    self.start.checked_sub_months(months)
                }
            })
            .ok_or_else(|| {
                ReportsError::validation_field(
                    format!("{self} moved by {n} periods is out of range"),
                    "period",
                )
            })?;
        Ok(Self {
            start,
            period_type: self.period_type,
        })
    }

    /// The following bucket.
    pub fn next(&self) -> Self {
        self.advance(1)
    }

    /// The preceding bucket.
    pub fn previous(&self) -> Self {
        self.advance(-1)
    }

    /// Descriptive metadata used when displaying this period.
    pub fn info(&self) -> PeriodInfo {
        PeriodInfo {
            name: self.to_string(),
            start_date: self.start_date(),
            end_date: self.end_date(),
            bp_control_start_date: self.advance(-2).start_date(),
            bp_control_end_date: self.end_date(),
            bp_control_registration_date: self.advance(-3).end_date(),
            ltfu_since_date: self.advance(-self.period_type.per_year()).end_date(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period_type {
            PeriodType::Month => write!(f, "{}", self.start.format("%b-%Y")),
            PeriodType::Quarter => {
                write!(f, "Q{}-{}", self.start.month0() / 3 + 1, self.start.year())
            }
        }
    }
}

impl FromStr for Period {
    type Err = ReportsError;

    /// Parses `2023-03` as a month and `2023-Q1` as a quarter.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ReportsError::validation_field(format!("invalid period '{s}'"), "period");
        let (year, rest) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        if let Some(quarter) = rest.strip_prefix('Q').or_else(|| rest.strip_prefix('q')) {
            let quarter: u32 = quarter.parse().map_err(|_| invalid())?;
            Self::quarter(year, quarter)
        } else {
            let month: u32 = rest.parse().map_err(|_| invalid())?;
            Self::month(year, month)
        }
    }
}

/// Display metadata for one period of a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInfo {
    /// Short label, e.g. `Mar-2023`.
    pub name: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// First day of the three-bucket control window ending with this period.
    pub bp_control_start_date: NaiveDate,
    /// Last day of the control window.
    pub bp_control_end_date: NaiveDate,
    /// Patients registered after this date are excluded from control rates.
    pub bp_control_registration_date: NaiveDate,
    /// Patients not seen since this date count as lost to follow-up.
    pub ltfu_since_date: NaiveDate,
}

/// An inclusive, non-empty run of periods of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodRange {
    start: Period,
    end: Period,
}

impl PeriodRange {
    /// Builds `[start, end]`. Both endpoints must share a type and `start <= end`.
    pub fn new(start: Period, end: Period) -> Result<Self> {
        crate::ensure!(
            start.period_type == end.period_type,
            ReportsError::validation_field(
                format!(
                    "period range mixes {} and {} periods",
                    start.period_type, end.period_type
                ),
                "periods",
            )
        );
        crate::ensure!(
            start <= end,
            ReportsError::validation_field(
                format!("period range is empty: {start} is after {end}"),
                "periods",
            )
        );
        Ok(Self { start, end })
    }

    /// The `count` periods ending with `end`, inclusive.
    pub fn ending_at(end: Period, count: u32) -> Result<Self> {
        if count == 0 {
            return Err(ReportsError::validation_field(
                "period range must contain at least one period",
                "periods",
            ));
        }
        let back = i32::try_from(count - 1).map_err(|_| {
            ReportsError::validation_field(format!("period count {count} is too large"), "periods")
        })?;
        Self::new(end.checked_advance(-back)?, end)
    }

    /// First period, inclusive.
    pub const fn start(&self) -> Period {
        self.start
    }

    /// Last period, inclusive.
    pub const fn end(&self) -> Period {
        self.end
    }

    /// Type shared by every period in the range.
    pub const fn period_type(&self) -> PeriodType {
        self.start.period_type
    }

    /// Whether `period` lies within the range.
    pub fn contains(&self, period: &Period) -> bool {
        period.period_type == self.period_type() && *period >= self.start && *period <= self.end
    }

    /// Number of periods in the range.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ascending iterator over the periods in the range.
    pub fn iter(&self) -> PeriodIter {
        PeriodIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl From<Period> for PeriodRange {
    fn from(period: Period) -> Self {
        Self {
            start: period,
            end: period,
        }
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl IntoIterator for &PeriodRange {
    type Item = Period;
    type IntoIter = PeriodIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`PeriodRange::iter`].
#[derive(Debug, Clone)]
pub struct PeriodIter {
    next: Option<Period>,
    end: Period,
}

impl Iterator for PeriodIter {
    type Item = Period;

    fn next(&mut self) -> Option<Period> {
        let current = self.next?;
        self.next = if current < self.end {
            Some(current.next())
        } else {
            None
        };
        Some(current)
    }
}
