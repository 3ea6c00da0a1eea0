//! Test utilities and shared fixtures for the report crates.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{FacilityId, Period, PeriodRange, Region, RegionKind};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call multiple times.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Shorthand for a month period in tests.
pub fn month(year: i32, month: u32) -> Period {
    Period::month(year, month).expect("valid test month")
}

/// Shorthand for an inclusive month range in tests.
pub fn months(start: (i32, u32), end: (i32, u32)) -> PeriodRange {
    PeriodRange::new(month(start.0, start.1), month(end.0, end.1)).expect("valid test range")
}

/// A single-facility region with a fresh facility id.
pub fn facility_region(slug: &str) -> Region {
    Region::facility(slug, format!("Facility {slug}"), FacilityId::new_v4())
}

/// A district region spanning `facilities` fresh facility ids.
pub fn district_region(slug: &str, facilities: usize) -> Region {
    Region::new(slug, format!("District {slug}"), RegionKind::District)
        .with_facilities((0..facilities).map(|_| FacilityId::new_v4()).collect())
}

/// Property-based testing strategies.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use super::*;
    use proptest::prelude::*;

    /// Months between 2000 and 2039.
    pub fn month_strategy() -> impl Strategy<Value = Period> {
        (2000i32..2040, 1u32..=12).prop_map(|(y, m)| month(y, m))
    }

    /// Non-empty month ranges of up to 36 periods.
    pub fn range_strategy() -> impl Strategy<Value = PeriodRange> {
        (month_strategy(), 0i32..36).prop_map(|(start, extra)| {
            PeriodRange::new(start, start.advance(extra)).expect("ordered range")
        })
    }

    /// Lowercase region slugs.
    pub fn slug_strategy() -> impl Strategy<Value = String> {
        r"[a-z][a-z0-9-]{2,15}".prop_map(|s| s)
    }
}
