//! Per-region calculation windows clamped to the first recorded data.

use reports_common::{Period, PeriodInfo, PeriodRange};
use std::collections::BTreeMap;

/// The part of `periods` on or after `earliest`.
///
/// With no recorded data the whole range is used. `None` when the region's
/// data starts after the range ends.
pub fn calculation_range(periods: &PeriodRange, earliest: Option<Period>) -> Option<PeriodRange> {
    let start = earliest.map_or(periods.start(), |earliest| earliest.max(periods.start()));
    PeriodRange::new(start, periods.end()).ok()
}

/// Display metadata for every period in the clamped window, ascending.
pub fn period_info(periods: &PeriodRange, earliest: Option<Period>) -> BTreeMap<Period, PeriodInfo> {
    calculation_range(periods, earliest)
        .map(|range| range.iter().map(|period| (period, period.info())).collect())
        .unwrap_or_default()
}
