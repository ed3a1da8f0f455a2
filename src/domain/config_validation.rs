//! Configuration validation.
//!
//! Validates all config fields before any data is loaded.

use crate::domain::chart_data::{DisplayType, MAX_HISTOGRAM_BINS};
use crate::domain::error::TipdashError;
use crate::domain::table::parse_columns;
use crate::ports::config_port::ConfigPort;

pub fn validate_dashboard_config(config: &dyn ConfigPort) -> Result<(), TipdashError> {
    validate_data_path(config)?;
    validate_dashboard_settings(config)
}

/// Validates the `[dashboard]` section only, for when the data path comes
/// from elsewhere.
pub fn validate_dashboard_settings(config: &dyn ConfigPort) -> Result<(), TipdashError> {
    validate_display(config)?;
    validate_page_size(config)?;
    validate_histogram_bins(config)?;
    validate_columns(config)?;
    Ok(())
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), TipdashError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TipdashError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_display(config: &dyn ConfigPort) -> Result<(), TipdashError> {
    if let Some(value) = config.get_string("dashboard", "display") {
        value
            .parse::<DisplayType>()
            .map_err(|_| TipdashError::ConfigInvalid {
                section: "dashboard".to_string(),
                key: "display".to_string(),
                reason: format!("unknown display type '{}'", value),
            })?;
    }
    Ok(())
}

fn validate_page_size(config: &dyn ConfigPort) -> Result<(), TipdashError> {
    let value = config.get_int("dashboard", "page_size", 10);
    if value < 1 {
        return Err(TipdashError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "page_size".to_string(),
            reason: "page_size must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_histogram_bins(config: &dyn ConfigPort) -> Result<(), TipdashError> {
    let value = config.get_int("dashboard", "histogram_bins", 20);
    if !(1..=MAX_HISTOGRAM_BINS as i64).contains(&value) {
        return Err(TipdashError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "histogram_bins".to_string(),
            reason: format!("histogram_bins must be between 1 and {}", MAX_HISTOGRAM_BINS),
        });
    }
    Ok(())
}

fn validate_columns(config: &dyn ConfigPort) -> Result<(), TipdashError> {
    if let Some(value) = config.get_string("dashboard", "columns") {
        parse_columns(&value).map_err(|e| TipdashError::ConfigInvalid {
            section: "dashboard".to_string(),
            key: "columns".to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}
