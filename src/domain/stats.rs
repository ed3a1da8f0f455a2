//! Aggregation engine: summary statistics over a set of records.
//!
//! Undefined quantities (means of nothing, correlation of a degenerate
//! sample) are reported as `None` rather than NaN or a panic.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::record::{Day, Record, Sex, Smoker, Time};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryStats {
    pub avg_tip: f64,
    pub avg_bill: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub total_records: usize,
    pub avg_bill: Option<f64>,
    pub avg_tip: Option<f64>,
    pub avg_tip_percentage: Option<f64>,
    pub avg_size: Option<f64>,
    pub gender_stats: BTreeMap<Sex, CategoryStats>,
    pub day_stats: BTreeMap<Day, CategoryStats>,
    pub time_stats: BTreeMap<Time, CategoryStats>,
    pub smoker_stats: BTreeMap<Smoker, CategoryStats>,
    pub correlation: Option<f64>,
    pub max_tip: Option<f64>,
    pub min_tip: Option<f64>,
    pub max_bill: Option<f64>,
    pub min_bill: Option<f64>,
}

impl StatisticsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

pub fn compute_statistics<'a, I>(records: I) -> StatisticsSnapshot
where
    I: IntoIterator<Item = &'a Record>,
{
    let records: Vec<&Record> = records.into_iter().collect();
    let bills: Vec<f64> = records.iter().map(|r| r.total_bill).collect();
    let tips: Vec<f64> = records.iter().map(|r| r.tip).collect();
    let sizes: Vec<f64> = records.iter().map(|r| r.size as f64).collect();
    // Zero-bill rows have no defined percentage and are left out of the mean.
    let tip_pcts: Vec<f64> = records.iter().filter_map(|r| r.tip_percentage()).collect();

    StatisticsSnapshot {
        total_records: records.len(),
        avg_bill: mean(&bills),
        avg_tip: mean(&tips),
        avg_tip_percentage: mean(&tip_pcts),
        avg_size: mean(&sizes),
        gender_stats: group_stats(&records, |r| r.sex),
        day_stats: group_stats(&records, |r| r.day),
        time_stats: group_stats(&records, |r| r.time),
        smoker_stats: group_stats(&records, |r| r.smoker),
        correlation: pearson(&bills, &tips),
        max_tip: max(&tips),
        min_tip: min(&tips),
        max_bill: max(&bills),
        min_bill: min(&bills),
    }
}

/// Groups by a categorical key; only keys present in `records` appear.
pub fn group_stats<K, F>(records: &[&Record], key: F) -> BTreeMap<K, CategoryStats>
where
    K: Ord,
    F: Fn(&Record) -> K,
{
    let mut sums: BTreeMap<K, (f64, f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(key(*record)).or_insert((0.0, 0.0, 0));
        entry.0 += record.tip;
        entry.1 += record.total_bill;
        entry.2 += 1;
    }
    sums.into_iter()
        .map(|(k, (tip_sum, bill_sum, count))| {
            let n = count as f64;
            (
                k,
                CategoryStats {
                    avg_tip: round2(tip_sum / n),
                    avg_bill: round2(bill_sum / n),
                    count,
                },
            )
        })
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Pearson correlation coefficient. `None` for series of unequal length,
/// fewer than two points, or zero variance in either series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    Some(r.clamp(-1.0, 1.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}
