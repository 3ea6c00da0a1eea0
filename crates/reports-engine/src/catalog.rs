//! The fixed catalog of named counts and rates served through the schema.

use reports_common::{ReportsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a rate is adjusted for patients lost to follow-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ltfu {
    /// Lost-to-follow-up patients are excluded from the denominator.
    #[default]
    Without,
    /// Lost-to-follow-up patients are included in the denominator.
    With,
}

impl Ltfu {
    pub const fn is_included(self) -> bool {
        matches!(self, Self::With)
    }
}

/// Declares a catalog enum with its stable names and `ALL` listing.
macro_rules! catalog_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every entry, in catalog order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Stable snake_case name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ReportsError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($str => Ok(Self::$variant),)+
                    other => Err(ReportsError::invalid_argument_named(
                        format!("unknown {} '{other}'", stringify!($name)),
                        "name",
                    )),
                }
            }
        }
    };
}

catalog_enum! {
    /// Raw aggregates delegated to the schema.
    CountName {
        AdjustedPatientsWithLtfu => "adjusted_patients_with_ltfu",
        AdjustedPatientsWithoutLtfu => "adjusted_patients_without_ltfu",
        AssignedPatients => "assigned_patients",
        CompleteMonthlyRegistrations => "complete_monthly_registrations",
        Controlled => "controlled",
        CumulativeAssignedPatients => "cumulative_assigned_patients",
        CumulativeRegistrations => "cumulative_registrations",
        Ltfu => "ltfu",
        MissedVisits => "missed_visits",
        MissedVisitsWithLtfu => "missed_visits_with_ltfu",
        MissedVisitsWithoutLtfu => "missed_visits_without_ltfu",
        MonthlyRegistrations => "monthly_registrations",
        Uncontrolled => "uncontrolled",
        VisitedWithoutBpTaken => "visited_without_bp_taken",
        MonthlyOverdueCalls => "monthly_overdue_calls",
    }
}

catalog_enum! {
    /// Derived ratios delegated to the schema.
    RateName {
        ControlledRates => "controlled_rates",
        LtfuRates => "ltfu_rates",
        MissedVisitsRate => "missed_visits_rate",
        MissedVisitsWithLtfuRates => "missed_visits_with_ltfu_rates",
        MissedVisitsWithoutLtfuRates => "missed_visits_without_ltfu_rates",
        UncontrolledRates => "uncontrolled_rates",
        VisitedWithoutBpTakenRates => "visited_without_bp_taken_rates",
    }
}

impl RateName {
    /// Whether warming computes the LTFU-adjusted variant too. Rates that
    /// already account for LTFU patients have no distinct adjusted form.
    pub const fn warms_adjusted_variant(self) -> bool {
        !matches!(self, Self::LtfuRates | Self::MissedVisitsWithLtfuRates)
    }
}
