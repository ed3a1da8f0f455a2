//! CSV file record adapter.
//!
//! Columns are located by header name, so their order in the file does not
//! matter. Extra columns (such as a pandas index) are ignored.

use crate::domain::error::TipdashError;
use crate::domain::record::Record;
use crate::ports::record_port::RecordPort;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

const REQUIRED_COLUMNS: [&str; 7] = ["total_bill", "tip", "sex", "smoker", "day", "time", "size"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl RecordPort for CsvAdapter {
    fn load_records(&self) -> Result<Vec<Record>, TipdashError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TipdashError::DataLoad {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let records = parse_records(content.as_bytes())?;
        log::info!("loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

/// Parses CSV content into records, failing on the first bad row.
pub fn parse_records<R: std::io::Read>(reader: R) -> Result<Vec<Record>, TipdashError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers().map_err(|e| TipdashError::DataLoad {
        reason: format!("CSV header error: {}", e),
    })?;
    let mut index = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in index.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| TipdashError::Schema {
                column: name.to_string(),
            })?;
    }
    let [bill_idx, tip_idx, sex_idx, smoker_idx, day_idx, time_idx, size_idx] = index;

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.map_err(|e| TipdashError::DataLoad {
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let record = Record {
            total_bill: field(&row, bill_idx, "total_bill", line)?,
            tip: field(&row, tip_idx, "tip", line)?,
            sex: field(&row, sex_idx, "sex", line)?,
            smoker: field(&row, smoker_idx, "smoker", line)?,
            day: field(&row, day_idx, "day", line)?,
            time: field(&row, time_idx, "time", line)?,
            size: field(&row, size_idx, "size", line)?,
        };
        record
            .validate()
            .map_err(|reason| TipdashError::MalformedRow { line, reason })?;
        records.push(record);
    }

    Ok(records)
}

fn field<T: FromStr>(
    row: &csv::StringRecord,
    idx: usize,
    name: &str,
    line: u64,
) -> Result<T, TipdashError> {
    let raw = row.get(idx).ok_or_else(|| TipdashError::MalformedRow {
        line,
        reason: format!("missing {} value", name),
    })?;
    raw.trim().parse().map_err(|_| TipdashError::MalformedRow {
        line,
        reason: format!("invalid {} value '{}'", name, raw),
    })
}
