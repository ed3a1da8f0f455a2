//! Immutable in-memory record table.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::criteria::{BillRange, FilterCriteria};
use crate::domain::record::{Day, Record, Sex, Smoker, Time};

/// Row counts per category plus the bill range, for `info` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub bill_range: Option<BillRange>,
    pub sex_counts: BTreeMap<Sex, usize>,
    pub smoker_counts: BTreeMap<Smoker, usize>,
    pub day_counts: BTreeMap<Day, usize>,
    pub time_counts: BTreeMap<Time, usize>,
}

/// The loaded dataset. Rows never change after construction; clones share
/// the same backing slice, so a store can be handed to concurrent readers
/// without locking.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[Record]>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest `total_bill`, or `None` for an empty store.
    pub fn bill_bounds(&self) -> Option<BillRange> {
        let mut iter = self.records.iter().map(|r| r.total_bill);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(BillRange::new(min, max))
    }

    /// Criteria that constrain nothing and span the full bill range.
    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria::default().with_bill_range(self.bill_bounds().unwrap_or_default())
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut summary = DatasetSummary {
            total_records: self.len(),
            bill_range: self.bill_bounds(),
            sex_counts: BTreeMap::new(),
            smoker_counts: BTreeMap::new(),
            day_counts: BTreeMap::new(),
            time_counts: BTreeMap::new(),
        };
        for r in self.records.iter() {
            *summary.sex_counts.entry(r.sex).or_insert(0) += 1;
            *summary.smoker_counts.entry(r.smoker).or_insert(0) += 1;
            *summary.day_counts.entry(r.day).or_insert(0) += 1;
            *summary.time_counts.entry(r.time).or_insert(0) += 1;
        }
        summary
    }
}
