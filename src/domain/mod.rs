//! Core domain types and logic.

pub mod record;
pub mod record_store;
pub mod criteria;
pub mod filter;
pub mod stats;
pub mod table;
pub mod chart_data;
pub mod dashboard;
pub mod config_validation;
pub mod error;
