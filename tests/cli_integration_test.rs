//! CLI integration tests with config and data files on disk.
//!
//! Tests cover:
//! - Config parsing (build_dashboard_config, resolve_config)
//! - The `--data` override with and without `[data] path`
//! - Every subcommand end to end, text and JSON
//! - Exit codes for config, data and argument failures

mod common;

use clap::Parser;
use common::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tipdash::adapters::file_config_adapter::FileConfigAdapter;
use tipdash::cli::{self, Cli};
use tipdash::domain::chart_data::DisplayType;
use tipdash::domain::error::TipdashError;
use tipdash::domain::table::Column;

fn run_args(args: &[&str]) -> ExitCode {
    let mut full = vec!["tipdash"];
    full.extend_from_slice(args);
    cli::run(Cli::try_parse_from(full).unwrap())
}

fn dashboard_ini(data: &str) -> String {
    format!(
        "[data]\npath = {data}\n\n[dashboard]\ndisplay = day-pie\npage_size = 4\nhistogram_bins = 8\ncolumns = day,total_bill,tip\n"
    )
}

struct Fixture {
    csv: tempfile::NamedTempFile,
    ini: tempfile::NamedTempFile,
}

impl Fixture {
    fn new() -> Self {
        let csv = write_temp_file(TIPS_CSV, ".csv");
        let ini = write_temp_file(&dashboard_ini(&csv.path().display().to_string()), ".ini");
        Self { csv, ini }
    }

    fn config(&self) -> String {
        self.ini.path().display().to_string()
    }

    fn data(&self) -> String {
        self.csv.path().display().to_string()
    }
}

// ── Config parsing ───────────────────────────────────────────────────

#[test]
fn build_dashboard_config_reads_every_key() {
    let adapter = FileConfigAdapter::from_string(&dashboard_ini("tips.csv")).unwrap();
    let config = cli::build_dashboard_config(&adapter, None).unwrap();
    assert_eq!(config.data_path, PathBuf::from("tips.csv"));
    assert_eq!(config.display, DisplayType::DayPie);
    assert_eq!(config.page_size, 4);
    assert_eq!(config.histogram_bins, 8);
    assert_eq!(config.columns, vec![Column::Day, Column::TotalBill, Column::Tip]);
}

#[test]
fn build_dashboard_config_defaults() {
    let adapter = FileConfigAdapter::from_string("[data]\npath = t.csv\n").unwrap();
    let config = cli::build_dashboard_config(&adapter, None).unwrap();
    assert_eq!(config.display, DisplayType::TipsByGender);
    assert_eq!(config.page_size, 10);
    assert_eq!(config.histogram_bins, 20);
    assert_eq!(config.columns, Column::ALL.to_vec());
}

#[test]
fn data_override_wins_over_config_path() {
    let adapter = FileConfigAdapter::from_string(&dashboard_ini("tips.csv")).unwrap();
    let config = cli::build_dashboard_config(&adapter, Some(PathBuf::from("other.csv"))).unwrap();
    assert_eq!(config.data_path, PathBuf::from("other.csv"));
}

#[test]
fn invalid_config_is_rejected() {
    let adapter =
        FileConfigAdapter::from_string("[data]\npath = t.csv\n[dashboard]\nhistogram_bins = 0\n")
            .unwrap();
    let err = cli::build_dashboard_config(&adapter, None).unwrap_err();
    assert!(matches!(err, TipdashError::ConfigInvalid { ref key, .. } if key == "histogram_bins"));
}

#[test]
fn resolve_config_reads_file() {
    let fixture = Fixture::new();
    let config = cli::resolve_config(Some(fixture.ini.path()), None).unwrap();
    assert_eq!(config.data_path, fixture.csv.path());
    assert_eq!(config.page_size, 4);
}

// ── Commands ─────────────────────────────────────────────────────────

#[test]
fn stats_command_succeeds() {
    let fixture = Fixture::new();
    let code = run_args(&["stats", "--config", &fixture.config(), "--day", "Sat"]);
    assert_eq!(code, ExitCode::SUCCESS);
    let code = run_args(&["stats", "--data", &fixture.data(), "--json"]);
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn stats_with_no_matches_still_succeeds() {
    let fixture = Fixture::new();
    let code = run_args(&[
        "stats", "--data", &fixture.data(), "--bill-min", "40", "--bill-max", "10",
    ]);
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn chart_command_covers_every_display() {
    let fixture = Fixture::new();
    for display in DisplayType::ALL {
        let code = run_args(&[
            "chart", "--config", &fixture.config(), "--display", display.as_str(), "--json",
        ]);
        assert_eq!(code, ExitCode::SUCCESS, "display {}", display.as_str());
    }
    let code = run_args(&["chart", "--config", &fixture.config()]);
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn table_command_sorts_filters_and_pages() {
    let fixture = Fixture::new();
    let code = run_args(&[
        "table",
        "--config",
        &fixture.config(),
        "--sort",
        "-tip",
        "--sort",
        "day",
        "--where",
        "tip >= 3",
        "--page",
        "1",
    ]);
    assert_eq!(code, ExitCode::SUCCESS);
}

#[test]
fn info_and_validate_succeed() {
    let fixture = Fixture::new();
    assert_eq!(run_args(&["info", "--data", &fixture.data()]), ExitCode::SUCCESS);
    assert_eq!(
        run_args(&["info", "--data", &fixture.data(), "--json"]),
        ExitCode::SUCCESS
    );
    assert_eq!(
        run_args(&["validate", "--config", &fixture.config()]),
        ExitCode::SUCCESS
    );
}

// ── Failures ─────────────────────────────────────────────────────────

#[test]
fn unknown_day_exits_with_invalid_argument() {
    let fixture = Fixture::new();
    let code = run_args(&["stats", "--data", &fixture.data(), "--day", "Monday"]);
    assert_eq!(code, ExitCode::from(4));
}

#[test]
fn unknown_display_exits_with_invalid_argument() {
    let fixture = Fixture::new();
    let code = run_args(&["chart", "--data", &fixture.data(), "--display", "radar"]);
    assert_eq!(code, ExitCode::from(4));
}

#[test]
fn oversized_bin_count_exits_with_invalid_argument() {
    let fixture = Fixture::new();
    let too_many = usize::MAX.to_string();
    for bins in ["201", too_many.as_str()] {
        let code = run_args(&[
            "chart", "--data", &fixture.data(), "--display", "total-bill-distribution", "--bins", bins,
        ]);
        assert_eq!(code, ExitCode::from(4), "bins {bins}");
    }
}

#[test]
fn unknown_gender_exits_with_invalid_argument() {
    let fixture = Fixture::new();
    let code = run_args(&["stats", "--data", &fixture.data(), "--gender", "Other"]);
    assert_eq!(code, ExitCode::from(4));
}

#[test]
fn bad_where_clause_exits_with_invalid_argument() {
    let fixture = Fixture::new();
    let code = run_args(&["table", "--data", &fixture.data(), "--where", "day > Sat"]);
    assert_eq!(code, ExitCode::from(4));
}

#[test]
fn missing_data_file_exits_with_data_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("absent.csv");
    let code = run_args(&["stats", "--data", &missing.display().to_string()]);
    assert_eq!(code, ExitCode::from(3));
}

#[test]
fn malformed_data_exits_with_data_error() {
    let csv = write_temp_file(
        "total_bill,tip,sex,smoker,day,time,size\n16.99,1.01,Female,No,Sun,Brunch,2\n",
        ".csv",
    );
    let code = run_args(&["info", "--data", &csv.path().display().to_string()]);
    assert_eq!(code, ExitCode::from(3));
}

#[test]
fn missing_data_path_exits_with_config_error() {
    let ini = write_temp_file("[dashboard]\npage_size = 5\n", ".ini");
    let path = ini.path().display().to_string();
    assert_eq!(run_args(&["stats", "--config", &path]), ExitCode::from(2));
    assert_eq!(run_args(&["validate", "--config", &path]), ExitCode::from(2));
}

#[test]
fn missing_config_file_exits_with_config_error() {
    let code = run_args(&["validate", "--config", "/nonexistent/tipdash.ini"]);
    assert_eq!(code, ExitCode::from(2));
}
