//! Filter criteria: per-field selections plus the bill amount range.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::TipdashError;
use crate::domain::record::{Day, Record, Sex, Smoker, Time};

/// Sentinel spelling meaning "no constraint on this field".
pub const ALL: &str = "All";

/// A categorical filter value: either unconstrained or one specific category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Copy + PartialEq> Selection<T> {
    pub fn matches(&self, value: T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => *wanted == value,
        }
    }

    pub fn value(&self) -> Option<T> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(*v),
        }
    }
}

impl<T> FromStr for Selection<T>
where
    T: FromStr<Err = TipdashError>,
{
    type Err = TipdashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == ALL {
            Ok(Selection::All)
        } else {
            trimmed.parse().map(Selection::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Only(v) => v.fmt(f),
        }
    }
}

/// Closed interval over `total_bill`. Inverted bounds match nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillRange {
    pub min: f64,
    pub max: f64,
}

impl BillRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
}

impl Default for BillRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// One active constraint. Criteria are independent predicates, so any
/// application order yields the same result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion {
    Day(Day),
    Gender(Sex),
    Time(Time),
    Smoker(Smoker),
    Bill(BillRange),
}

impl Criterion {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Criterion::Day(day) => record.day == *day,
            Criterion::Gender(sex) => record.sex == *sex,
            Criterion::Time(time) => record.time == *time,
            Criterion::Smoker(smoker) => record.smoker == *smoker,
            Criterion::Bill(range) => range.contains(record.total_bill),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FilterCriteria {
    pub day: Selection<Day>,
    pub gender: Selection<Sex>,
    pub time: Selection<Time>,
    pub smoker: Selection<Smoker>,
    pub bill_range: BillRange,
}

impl FilterCriteria {
    /// Builds criteria from raw user strings, rejecting values outside each
    /// field's vocabulary. `"All"` leaves a field unconstrained.
    pub fn from_strs(
        day: &str,
        gender: &str,
        time: &str,
        smoker: &str,
        bill_range: BillRange,
    ) -> Result<Self, TipdashError> {
        Ok(Self {
            day: day.parse()?,
            gender: gender
                .parse()
                .map_err(|_| TipdashError::invalid_argument("gender", gender.trim()))?,
            time: time.parse()?,
            smoker: smoker.parse()?,
            bill_range,
        })
    }

    pub fn with_bill_range(mut self, bill_range: BillRange) -> Self {
        self.bill_range = bill_range;
        self
    }

    /// The criteria that actually constrain records. The bill range is always
    /// active.
    pub fn active(&self) -> Vec<Criterion> {
        let mut active = Vec::with_capacity(5);
        if let Some(day) = self.day.value() {
            active.push(Criterion::Day(day));
        }
        if let Some(sex) = self.gender.value() {
            active.push(Criterion::Gender(sex));
        }
        if let Some(time) = self.time.value() {
            active.push(Criterion::Time(time));
        }
        if let Some(smoker) = self.smoker.value() {
            active.push(Criterion::Smoker(smoker));
        }
        active.push(Criterion::Bill(self.bill_range));
        active
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.day.matches(record.day)
            && self.gender.matches(record.sex)
            && self.time.matches(record.time)
            && self.smoker.matches(record.smoker)
            && self.bill_range.contains(record.total_bill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(total_bill: f64, day: Day, sex: Sex) -> Record {
        Record {
            total_bill,
            tip: 1.0,
            sex,
            smoker: Smoker::No,
            day,
            time: Time::Dinner,
            size: 2,
        }
    }

    #[test]
    fn selection_parses_sentinel_and_values() {
        assert_eq!("All".parse::<Selection<Day>>().unwrap(), Selection::All);
        assert_eq!(
            "Sat".parse::<Selection<Day>>().unwrap(),
            Selection::Only(Day::Sat)
        );
        assert!("Monday".parse::<Selection<Day>>().is_err());
        assert!("all".parse::<Selection<Day>>().is_err());
    }

    #[test]
    fn selection_display() {
        assert_eq!(Selection::<Time>::All.to_string(), "All");
        assert_eq!(Selection::Only(Time::Lunch).to_string(), "Lunch");
    }

    #[test]
    fn bill_range_is_inclusive() {
        let range = BillRange::new(10.0, 20.0);
        assert!(range.contains(10.0));
        assert!(range.contains(20.0));
        assert!(!range.contains(9.99));
        assert!(!range.contains(20.01));
    }

    #[test]
    fn inverted_bill_range_contains_nothing() {
        let range = BillRange::new(25.0, 15.0);
        assert!(range.is_inverted());
        assert!(!range.contains(20.0));
        assert!(!range.contains(15.0));
        assert!(!range.contains(25.0));
    }

    #[test]
    fn from_strs_rejects_unknown_category() {
        let err = FilterCriteria::from_strs("All", "Other", "All", "All", BillRange::unbounded())
            .unwrap_err();
        assert!(matches!(err, TipdashError::InvalidArgument { ref field, .. } if field == "gender"));
    }

    #[test]
    fn default_criteria_has_only_bill_range_active() {
        let criteria = FilterCriteria::default();
        assert_eq!(criteria.active(), vec![Criterion::Bill(BillRange::unbounded())]);
    }

    #[test]
    fn active_lists_each_constrained_field() {
        let criteria =
            FilterCriteria::from_strs("Sat", "Male", "All", "No", BillRange::new(0.0, 50.0))
                .unwrap();
        let active = criteria.active();
        assert_eq!(active.len(), 4);
        assert!(active.contains(&Criterion::Day(Day::Sat)));
        assert!(active.contains(&Criterion::Gender(Sex::Male)));
        assert!(active.contains(&Criterion::Smoker(Smoker::No)));
    }

    #[test]
    fn matches_agrees_with_active_criteria() {
        let criteria =
            FilterCriteria::from_strs("Sat", "Male", "All", "All", BillRange::new(10.0, 30.0))
                .unwrap();
        let records = [
            record(15.0, Day::Sat, Sex::Male),
            record(15.0, Day::Sun, Sex::Male),
            record(15.0, Day::Sat, Sex::Female),
            record(35.0, Day::Sat, Sex::Male),
        ];
        for r in &records {
            let by_list = criteria.active().iter().all(|c| c.matches(r));
            assert_eq!(criteria.matches(r), by_list);
        }
        assert!(criteria.matches(&records[0]));
        assert!(!criteria.matches(&records[3]));
    }
}
