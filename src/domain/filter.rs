//! Filter engine: narrows a record sequence to the rows matching criteria.

use crate::domain::criteria::{Criterion, FilterCriteria};
use crate::domain::record::Record;

/// Rows that survived filtering, borrowed from the source in source order.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    pub fn to_owned_records(&self) -> Vec<Record> {
        self.records.iter().map(|r| (*r).clone()).collect()
    }
}

impl<'a> FromIterator<&'a Record> for FilteredView<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'v, 'a> IntoIterator for &'v FilteredView<'a> {
    type Item = &'a Record;
    type IntoIter = std::iter::Copied<std::slice::Iter<'v, &'a Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().copied()
    }
}

/// Retains the records satisfying every active criterion, preserving input
/// order. No match is a normal outcome and yields an empty view.
pub fn apply_filters<'a, I>(records: I, criteria: &FilterCriteria) -> FilteredView<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    let view: FilteredView<'a> = records.into_iter().filter(|r| criteria.matches(r)).collect();
    log::debug!("filter {:?} kept {} records", criteria, view.len());
    view
}

/// Applies an explicit sequence of criteria one after another.
pub fn apply_criteria<'a, I>(records: I, criteria: &[Criterion]) -> FilteredView<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut current: Vec<&'a Record> = records.into_iter().collect();
    for criterion in criteria {
        current.retain(|r| criterion.matches(r));
    }
    FilteredView { records: current }
}
