//! # Reports Common
//!
//! Shared primitives for the report aggregation workspace: calendar periods
//! and ranges, regions, the error taxonomy and logging setup.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod macros;
pub mod period;
pub mod region;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{BoxedSource, ReportsError, Result};
pub use logging::{init_default_logging, init_dev_logging, init_logging, LoggingConfig};
pub use period::{Period, PeriodInfo, PeriodIter, PeriodRange, PeriodType};
pub use region::{FacilityId, Region, RegionKind, RegionSlug};
