//! Transaction record and its categorical attributes.
//!
//! Categorical fields are closed enums so that a filter value outside the
//! dataset vocabulary is rejected when parsed, never silently matched
//! against nothing.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::TipdashError;

macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident, $field:literal, [$($variant:ident => $label:literal),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value, in dataset order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TipdashError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(TipdashError::invalid_argument($field, other)),
                }
            }
        }
    };
}

categorical!(
    /// Sex of the bill payer.
    Sex, "sex", [Male => "Male", Female => "Female"]
);

categorical!(
    /// Whether the party included smokers.
    Smoker, "smoker", [Yes => "Yes", No => "No"]
);

categorical!(
    /// Day of the week. Only the four days present in the dataset exist.
    Day, "day", [Thur => "Thur", Fri => "Fri", Sat => "Sat", Sun => "Sun"]
);

categorical!(
    /// Meal service.
    Time, "time", [Lunch => "Lunch", Dinner => "Dinner"]
);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub total_bill: f64,
    pub tip: f64,
    pub sex: Sex,
    pub smoker: Smoker,
    pub day: Day,
    pub time: Time,
    pub size: u32,
}

impl Record {
    /// Tip as a percentage of the bill; `None` for a zero bill.
    pub fn tip_percentage(&self) -> Option<f64> {
        if self.total_bill > 0.0 {
            Some(self.tip / self.total_bill * 100.0)
        } else {
            None
        }
    }

    /// Checks the numeric invariants: finite non-negative amounts, positive size.
    pub fn validate(&self) -> Result<(), String> {
        if !self.total_bill.is_finite() || self.total_bill < 0.0 {
            return Err(format!("total_bill must be non-negative, got {}", self.total_bill));
        }
        if !self.tip.is_finite() || self.tip < 0.0 {
            return Err(format!("tip must be non-negative, got {}", self.tip));
        }
        if self.size == 0 {
            return Err("size must be positive".to_string());
        }
        Ok(())
    }
}
