//! Dashboard state: the current selections, reset, and rendering of the
//! selected display over a record store.

use std::path::PathBuf;

use crate::domain::chart_data::{prepare_chart, ChartOptions, DisplayType, Panel, DEFAULT_HISTOGRAM_BINS};
use crate::domain::criteria::FilterCriteria;
use crate::domain::error::TipdashError;
use crate::domain::filter::apply_filters;
use crate::domain::record_store::RecordStore;
use crate::domain::stats::{compute_statistics, StatisticsSnapshot};
use crate::domain::table::{Column, DEFAULT_PAGE_SIZE};

/// Settings resolved from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub display: DisplayType,
    pub page_size: usize,
    pub histogram_bins: usize,
    pub columns: Vec<Column>,
}

impl DashboardConfig {
    pub fn with_data_path(data_path: PathBuf) -> Self {
        Self {
            data_path,
            display: DisplayType::default(),
            page_size: DEFAULT_PAGE_SIZE,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            columns: Column::ALL.to_vec(),
        }
    }

    pub fn chart_options(&self) -> ChartOptions {
        let mut options = ChartOptions {
            histogram_bins: self.histogram_bins,
            ..ChartOptions::default()
        };
        options.table.page_size = self.page_size;
        options.table.columns = self.columns.clone();
        options
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub criteria: FilterCriteria,
    pub display: DisplayType,
    pub columns: Vec<Column>,
}

impl DashboardState {
    /// Initial state: no constraints, full bill range, default display, all columns.
    pub fn new(store: &RecordStore) -> Self {
        Self {
            criteria: store.default_criteria(),
            display: DisplayType::default(),
            columns: Column::ALL.to_vec(),
        }
    }

    pub fn reset(&mut self, store: &RecordStore) {
        *self = Self::new(store);
    }

    /// Filters the store and shapes the result for the selected display. The
    /// state's column selection overrides whatever `options.table` carries.
    pub fn render(&self, store: &RecordStore, options: &ChartOptions) -> Result<Panel, TipdashError> {
        let view = apply_filters(store.records(), &self.criteria);
        let mut options = options.clone();
        options.table.columns = self.columns.clone();
        prepare_chart(self.display, &view, &self.criteria, &options)
    }

    pub fn statistics(&self, store: &RecordStore) -> StatisticsSnapshot {
        compute_statistics(&apply_filters(store.records(), &self.criteria))
    }
}
