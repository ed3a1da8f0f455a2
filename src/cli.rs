//! CLI definition and dispatch.

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report;
use crate::domain::chart_data::{prepare_chart, DisplayType};
use crate::domain::config_validation::{validate_dashboard_config, validate_dashboard_settings};
use crate::domain::criteria::{BillRange, FilterCriteria, ALL};
use crate::domain::dashboard::DashboardConfig;
use crate::domain::error::TipdashError;
use crate::domain::filter::apply_filters;
use crate::domain::record_store::RecordStore;
use crate::domain::stats::compute_statistics;
use crate::domain::table::{build_table, parse_columns, ColumnFilter, SortKey};
use crate::ports::config_port::ConfigPort;
use crate::ports::record_port::RecordPort;

pub const DEFAULT_DATA_PATH: &str = "tips.csv";

#[derive(Parser, Debug)]
#[command(name = "tipdash", about = "Restaurant tips analytics")]
pub struct Cli {
    /// INI config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Tips CSV, overrides [data] path
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Filter selections shared by every data command.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[arg(long, default_value = ALL)]
    pub day: String,
    #[arg(long, default_value = ALL)]
    pub gender: String,
    #[arg(long, default_value = ALL)]
    pub time: String,
    #[arg(long, default_value = ALL)]
    pub smoker: String,
    /// Lower bill bound, defaults to the dataset minimum
    #[arg(long)]
    pub bill_min: Option<f64>,
    /// Upper bill bound, defaults to the dataset maximum
    #[arg(long)]
    pub bill_max: Option<f64>,
}

impl Default for FilterArgs {
    fn default() -> Self {
        Self {
            day: ALL.to_string(),
            gender: ALL.to_string(),
            time: ALL.to_string(),
            smoker: ALL.to_string(),
            bill_min: None,
            bill_max: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summary statistics for the filtered records
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Chart series for one display type
    Chart {
        /// tips-by-gender, total-bill-distribution, time-boxplot, day-pie,
        /// bill-scatter or data-table
        #[arg(short, long)]
        display: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Histogram bin count
        #[arg(long)]
        bins: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Page through the filtered records
    Table {
        #[command(flatten)]
        filters: FilterArgs,
        /// Comma-separated column list
        #[arg(long)]
        columns: Option<String>,
        /// Sort key, `-col` for descending; repeatable
        #[arg(long, allow_hyphen_values = true)]
        sort: Vec<String>,
        /// Column filter such as "tip >= 5"; repeatable
        #[arg(long = "where")]
        filter: Vec<String>,
        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Dataset size, bill range and category counts
    Info {
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate,
}

/// Initializes stderr logging. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let Cli {
        config: config_path,
        data,
        command,
        ..
    } = cli;
    let config_path = config_path.as_deref();

    let result = match command {
        Command::Validate => run_validate(config_path),
        Command::Stats { filters, json } => load_dashboard(config_path, data)
            .and_then(|(_, store)| run_stats(&store, &filters, json)),
        Command::Chart {
            display,
            filters,
            bins,
            json,
        } => load_dashboard(config_path, data).and_then(|(config, store)| {
            run_chart(&store, &config, display.as_deref(), &filters, bins, json)
        }),
        Command::Table {
            filters,
            columns,
            sort,
            filter,
            page,
            page_size,
            json,
        } => load_dashboard(config_path, data).and_then(|(config, store)| {
            let request = TableRequest {
                columns: columns.as_deref(),
                sort: &sort,
                filters: &filter,
                page,
                page_size,
            };
            run_table(&store, &config, &filters, &request, json)
        }),
        Command::Info { json } => {
            load_dashboard(config_path, data).and_then(|(_, store)| run_info(&store, json))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Resolves settings, then loads the dataset they point at.
fn load_dashboard(
    config_path: Option<&Path>,
    data_override: Option<PathBuf>,
) -> Result<(DashboardConfig, RecordStore), TipdashError> {
    let config = resolve_config(config_path, data_override)?;
    let store = CsvAdapter::new(config.data_path.clone()).load_store()?;
    Ok((config, store))
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TipdashError> {
    log::info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Reads dashboard settings from a validated config. `data_override` stands
/// in for `[data] path` when given.
pub fn build_dashboard_config(
    adapter: &dyn ConfigPort,
    data_override: Option<PathBuf>,
) -> Result<DashboardConfig, TipdashError> {
    match data_override {
        Some(_) => validate_dashboard_settings(adapter)?,
        None => validate_dashboard_config(adapter)?,
    }

    let data_path = data_override
        .or_else(|| adapter.get_path("data", "path"))
        .ok_or_else(|| TipdashError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;

    let mut config = DashboardConfig::with_data_path(data_path);
    if let Some(display) = adapter.get_string("dashboard", "display") {
        config.display = display.parse()?;
    }
    config.page_size = adapter.get_int("dashboard", "page_size", config.page_size as i64) as usize;
    config.histogram_bins =
        adapter.get_int("dashboard", "histogram_bins", config.histogram_bins as i64) as usize;
    if let Some(columns) = adapter.get_string("dashboard", "columns") {
        config.columns = parse_columns(&columns)?;
    }
    Ok(config)
}

/// Without a config file, settings are defaults and the data path is the
/// override or `tips.csv` in the working directory.
pub fn resolve_config(
    config_path: Option<&Path>,
    data_override: Option<PathBuf>,
) -> Result<DashboardConfig, TipdashError> {
    match config_path {
        Some(path) => {
            let adapter = load_config(path)?;
            build_dashboard_config(&adapter, data_override)
        }
        None => Ok(DashboardConfig::with_data_path(
            data_override.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
        )),
    }
}

/// Turns the filter flags into criteria. Omitted bill bounds fall back to
/// the dataset's own bounds.
pub fn build_criteria(args: &FilterArgs, store: &RecordStore) -> Result<FilterCriteria, TipdashError> {
    let bounds = store.bill_bounds().unwrap_or_default();
    let range = BillRange::new(
        args.bill_min.unwrap_or(bounds.min),
        args.bill_max.unwrap_or(bounds.max),
    );
    if range.min.is_nan() {
        return Err(TipdashError::invalid_argument("bill-min", "NaN"));
    }
    if range.max.is_nan() {
        return Err(TipdashError::invalid_argument("bill-max", "NaN"));
    }
    if range.is_inverted() {
        log::warn!(
            "bill range {:.2}..{:.2} is inverted, no records will match",
            range.min,
            range.max
        );
    }
    FilterCriteria::from_strs(&args.day, &args.gender, &args.time, &args.smoker, range)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), TipdashError> {
    let text = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{text}");
    Ok(())
}

fn run_stats(store: &RecordStore, filters: &FilterArgs, json: bool) -> Result<(), TipdashError> {
    let criteria = build_criteria(filters, store)?;
    let stats = compute_statistics(&apply_filters(store.records(), &criteria));
    if json {
        print_json(&stats)
    } else {
        print!("{}", text_report::format_statistics(&stats));
        Ok(())
    }
}

fn run_chart(
    store: &RecordStore,
    config: &DashboardConfig,
    display: Option<&str>,
    filters: &FilterArgs,
    bins: Option<usize>,
    json: bool,
) -> Result<(), TipdashError> {
    let display: DisplayType = match display {
        Some(d) => d.parse()?,
        None => config.display,
    };
    let criteria = build_criteria(filters, store)?;
    let mut options = config.chart_options();
    if let Some(bins) = bins {
        options.histogram_bins = bins;
    }

    let view = apply_filters(store.records(), &criteria);
    let panel = prepare_chart(display, &view, &criteria, &options)?;
    if json {
        print_json(&panel)
    } else {
        print!("{}", text_report::format_panel(&panel));
        Ok(())
    }
}

/// Raw table flags, parsed in `run_table`.
pub struct TableRequest<'a> {
    pub columns: Option<&'a str>,
    pub sort: &'a [String],
    pub filters: &'a [String],
    pub page: usize,
    pub page_size: Option<usize>,
}

fn run_table(
    store: &RecordStore,
    config: &DashboardConfig,
    filters: &FilterArgs,
    request: &TableRequest<'_>,
    json: bool,
) -> Result<(), TipdashError> {
    let criteria = build_criteria(filters, store)?;
    let mut query = config.chart_options().table;
    if let Some(columns) = request.columns {
        query.columns = parse_columns(columns)?;
    }
    query.sort = request
        .sort
        .iter()
        .map(|s| s.parse::<SortKey>())
        .collect::<Result<_, _>>()?;
    query.filters = request
        .filters
        .iter()
        .map(|s| s.parse::<ColumnFilter>())
        .collect::<Result<_, _>>()?;
    query.page = request.page;
    if let Some(size) = request.page_size {
        query.page_size = size;
    }

    let view = apply_filters(store.records(), &criteria);
    let page = build_table(&view, &query)?;
    if json {
        print_json(&page)
    } else {
        print!("{}", text_report::format_table(&page));
        Ok(())
    }
}

fn run_info(store: &RecordStore, json: bool) -> Result<(), TipdashError> {
    let summary = store.summary();
    if json {
        print_json(&summary)
    } else {
        print!("{}", text_report::format_summary(&summary));
        Ok(())
    }
}

/// `validate` needs an explicit `--config`; there is nothing to check otherwise.
pub fn run_validate(config_path: Option<&Path>) -> Result<(), TipdashError> {
    let path = config_path
        .ok_or_else(|| TipdashError::invalid_argument("config", "(none given)"))?;
    let adapter = load_config(path)?;
    validate_dashboard_config(&adapter)?;
    println!("Config validated successfully");
    Ok(())
}
