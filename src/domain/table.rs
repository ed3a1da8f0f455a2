//! Data table view: column selection, per-column filters, multi-key sort and
//! pagination over a filtered record set.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::TipdashError;
use crate::domain::record::{Day, Record, Sex, Smoker, Time};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    TotalBill,
    Tip,
    Sex,
    Smoker,
    Day,
    Time,
    Size,
}

impl Column {
    /// Dataset column order.
    pub const ALL: &'static [Column] = &[
        Column::TotalBill,
        Column::Tip,
        Column::Sex,
        Column::Smoker,
        Column::Day,
        Column::Time,
        Column::Size,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::TotalBill => "total_bill",
            Column::Tip => "tip",
            Column::Sex => "sex",
            Column::Smoker => "smoker",
            Column::Day => "day",
            Column::Time => "time",
            Column::Size => "size",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::TotalBill | Column::Tip | Column::Size)
    }

    pub fn cell(&self, record: &Record) -> Cell {
        match self {
            Column::TotalBill => Cell::Number(record.total_bill),
            Column::Tip => Cell::Number(record.tip),
            Column::Size => Cell::Integer(record.size),
            Column::Sex => Cell::Text(record.sex.as_str()),
            Column::Smoker => Cell::Text(record.smoker.as_str()),
            Column::Day => Cell::Text(record.day.as_str()),
            Column::Time => Cell::Text(record.time.as_str()),
        }
    }

    /// Checks a comparison value against the column's vocabulary.
    fn check_value(&self, value: &str) -> Result<(), TipdashError> {
        match self {
            Column::TotalBill | Column::Tip | Column::Size => value
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| TipdashError::invalid_argument(self.name(), value)),
            Column::Sex => value.parse::<Sex>().map(|_| ()),
            Column::Smoker => value.parse::<Smoker>().map(|_| ()),
            Column::Day => value.parse::<Day>().map(|_| ()),
            Column::Time => value.parse::<Time>().map(|_| ()),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = TipdashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('{').trim_end_matches('}');
        Column::ALL
            .iter()
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(|| TipdashError::invalid_argument("column", s.trim()))
    }
}

/// Parses a comma-separated column list. Empty lists and duplicates are rejected.
pub fn parse_columns(input: &str) -> Result<Vec<Column>, TipdashError> {
    let mut columns = Vec::new();
    let mut seen = HashSet::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let column: Column = token.parse()?;
        if !seen.insert(column) {
            return Err(TipdashError::invalid_argument("columns", input));
        }
        columns.push(column);
    }
    if columns.is_empty() {
        return Err(TipdashError::invalid_argument("columns", input));
    }
    Ok(columns)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Integer(u32),
    Text(&'static str),
}

impl Cell {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Integer(v) => Some(*v as f64),
            Cell::Text(_) => None,
        }
    }

    fn compare(&self, other: &Cell) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{:.2}", v),
            Cell::Integer(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
}

impl FromStr for FilterOp {
    type Err = TipdashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" | "eq" => Ok(FilterOp::Eq),
            "!=" | "ne" => Ok(FilterOp::Ne),
            "<" | "lt" => Ok(FilterOp::Lt),
            "<=" | "le" => Ok(FilterOp::Le),
            ">" | "gt" => Ok(FilterOp::Gt),
            ">=" | "ge" => Ok(FilterOp::Ge),
            "contains" => Ok(FilterOp::Contains),
            other => Err(TipdashError::invalid_argument("filter operator", other)),
        }
    }
}

/// A per-column predicate such as `tip >= 5` or `day = Sat`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: Column,
    pub op: FilterOp,
    pub value: String,
}

impl ColumnFilter {
    pub fn matches(&self, record: &Record) -> bool {
        let cell = self.column.cell(record);
        let ordering = || match (cell.as_f64(), self.value.parse::<f64>()) {
            (Some(a), Ok(b)) => a.total_cmp(&b),
            _ => cell.to_string().as_str().cmp(self.value.as_str()),
        };
        match self.op {
            FilterOp::Eq => ordering() == Ordering::Equal,
            FilterOp::Ne => ordering() != Ordering::Equal,
            FilterOp::Lt => ordering() == Ordering::Less,
            FilterOp::Le => ordering() != Ordering::Greater,
            FilterOp::Gt => ordering() == Ordering::Greater,
            FilterOp::Ge => ordering() != Ordering::Less,
            FilterOp::Contains => cell.to_string().contains(&self.value),
        }
    }
}

impl FromStr for ColumnFilter {
    type Err = TipdashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, char::is_whitespace);
        let (Some(column), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(TipdashError::invalid_argument("filter", s));
        };
        let column: Column = column.parse()?;
        let op: FilterOp = op.parse()?;
        let value = value.trim().to_string();

        if op != FilterOp::Contains {
            if !column.is_numeric() && !matches!(op, FilterOp::Eq | FilterOp::Ne) {
                return Err(TipdashError::invalid_argument("filter", s));
            }
            column.check_value(&value)?;
        }

        Ok(Self { column, op, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: Column,
    pub descending: bool,
}

impl FromStr for SortKey {
    type Err = TipdashError;

    /// `tip` sorts ascending, `-tip` descending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix('-') {
            Some(rest) => Ok(SortKey {
                column: rest.parse()?,
                descending: true,
            }),
            None => Ok(SortKey {
                column: s.parse()?,
                descending: false,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub columns: Vec<Column>,
    pub sort: Vec<SortKey>,
    pub filters: Vec<ColumnFilter>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
            sort: Vec::new(),
            filters: Vec::new(),
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
    pub total_rows: usize,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
}

/// Applies column filters, then a stable multi-key sort, then slices out the
/// requested page. A page past the end is empty rather than an error.
pub fn build_table<'a, I>(records: I, query: &TableQuery) -> Result<TablePage, TipdashError>
where
    I: IntoIterator<Item = &'a Record>,
{
    if query.page_size == 0 {
        return Err(TipdashError::invalid_argument("page_size", "0"));
    }
    if query.columns.is_empty() {
        return Err(TipdashError::invalid_argument("columns", ""));
    }

    let mut rows: Vec<&Record> = records
        .into_iter()
        .filter(|r| query.filters.iter().all(|f| f.matches(r)))
        .collect();

    if !query.sort.is_empty() {
        rows.sort_by(|a, b| {
            for key in &query.sort {
                let ord = key.column.cell(a).compare(&key.column.cell(b));
                let ord = if key.descending { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }

    let total_rows = rows.len();
    let page_count = total_rows.div_ceil(query.page_size);
    let page_rows = rows
        .iter()
        .skip(query.page.saturating_mul(query.page_size))
        .take(query.page_size)
        .map(|r| query.columns.iter().map(|c| c.cell(r)).collect())
        .collect();

    Ok(TablePage {
        columns: query.columns.clone(),
        rows: page_rows,
        total_rows,
        page: query.page,
        page_size: query.page_size,
        page_count,
    })
}
