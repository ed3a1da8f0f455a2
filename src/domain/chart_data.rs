//! Chart-data preparation.
//!
//! Shapes a filtered view into the exact series each display needs. Nothing
//! here knows about rendering; consumers draw what they receive.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::criteria::{FilterCriteria, Selection};
use crate::domain::error::TipdashError;
use crate::domain::filter::FilteredView;
use crate::domain::record::{Day, Sex, Time};
use crate::domain::stats::{self, round2};
use crate::domain::table::{self, TablePage, TableQuery};

pub const DEFAULT_HISTOGRAM_BINS: usize = 20;
pub const MAX_HISTOGRAM_BINS: usize = 200;

/// Whisker reach as a multiple of the interquartile range.
const WHISKER_IQR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayType {
    #[default]
    TipsByGender,
    TotalBillDistribution,
    TimeBoxplot,
    DayPie,
    BillScatter,
    DataTable,
}

impl DisplayType {
    pub const ALL: &'static [DisplayType] = &[
        DisplayType::TipsByGender,
        DisplayType::TotalBillDistribution,
        DisplayType::TimeBoxplot,
        DisplayType::DayPie,
        DisplayType::BillScatter,
        DisplayType::DataTable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayType::TipsByGender => "tips-by-gender",
            DisplayType::TotalBillDistribution => "total-bill-distribution",
            DisplayType::TimeBoxplot => "time-boxplot",
            DisplayType::DayPie => "day-pie",
            DisplayType::BillScatter => "bill-scatter",
            DisplayType::DataTable => "data-table",
        }
    }
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayType {
    type Err = TipdashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DisplayType::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| TipdashError::invalid_argument("display", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderBar {
    pub sex: Sex,
    pub avg_tip: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<GenderBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub title: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSeries {
    pub time: Time,
    /// Set when boxes are split by sex.
    pub sex: Option<Sex>,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlot {
    pub title: String,
    pub boxes: Vec<BoxSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub day: Day,
    pub count: usize,
    /// Percentage of the view, 0..=100.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub total_bill: f64,
    pub tip: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trendline {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterGroup {
    pub time: Time,
    pub points: Vec<ScatterPoint>,
    pub trendline: Option<Trendline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPlot {
    pub title: String,
    pub groups: Vec<ScatterGroup>,
}

/// The shaped output for one display type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "display", content = "data", rename_all = "kebab-case")]
pub enum Panel {
    TipsByGender(BarChart),
    TotalBillDistribution(Histogram),
    TimeBoxplot(BoxPlot),
    DayPie(PieChart),
    BillScatter(ScatterPlot),
    DataTable(TablePage),
}

impl Panel {
    pub fn display_type(&self) -> DisplayType {
        match self {
            Panel::TipsByGender(_) => DisplayType::TipsByGender,
            Panel::TotalBillDistribution(_) => DisplayType::TotalBillDistribution,
            Panel::TimeBoxplot(_) => DisplayType::TimeBoxplot,
            Panel::DayPie(_) => DisplayType::DayPie,
            Panel::BillScatter(_) => DisplayType::BillScatter,
            Panel::DataTable(_) => DisplayType::DataTable,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub histogram_bins: usize,
    pub table: TableQuery,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            table: TableQuery::default(),
        }
    }
}

/// Dispatches a display type to its shaping function.
pub fn prepare_chart(
    display: DisplayType,
    view: &FilteredView<'_>,
    criteria: &FilterCriteria,
    options: &ChartOptions,
) -> Result<Panel, TipdashError> {
    let panel = match display {
        DisplayType::TipsByGender => Panel::TipsByGender(tips_by_gender(view, criteria.day)),
        DisplayType::TotalBillDistribution => Panel::TotalBillDistribution(
            total_bill_distribution(view, criteria.day, options.histogram_bins)?,
        ),
        DisplayType::TimeBoxplot => Panel::TimeBoxplot(time_boxplot(view, criteria.gender)),
        DisplayType::DayPie => Panel::DayPie(day_pie(view)),
        DisplayType::BillScatter => Panel::BillScatter(bill_scatter(view)),
        DisplayType::DataTable => Panel::DataTable(table::build_table(view, &options.table)?),
    };
    Ok(panel)
}

fn scope_label<T: fmt::Display>(selection: Selection<T>, all_label: &str) -> String {
    match selection {
        Selection::All => all_label.to_string(),
        Selection::Only(v) => v.to_string(),
    }
}

/// Mean tip per sex, highest first.
pub fn tips_by_gender(view: &FilteredView<'_>, day: Selection<Day>) -> BarChart {
    let groups = stats::group_stats(view.records(), |r| r.sex);
    let mut bars: Vec<GenderBar> = groups
        .into_iter()
        .map(|(sex, s)| GenderBar {
            sex,
            avg_tip: s.avg_tip,
        })
        .collect();
    bars.sort_by(|a, b| b.avg_tip.total_cmp(&a.avg_tip));

    BarChart {
        title: format!(
            "Average Tips by Gender ({})",
            scope_label(day, "All Days")
        ),
        bars,
    }
}

/// Equal-width histogram of `total_bill` over the view's own range. The last
/// bin is closed so the maximum lands inside it.
pub fn total_bill_distribution(
    view: &FilteredView<'_>,
    day: Selection<Day>,
    bins: usize,
) -> Result<Histogram, TipdashError> {
    if bins == 0 || bins > MAX_HISTOGRAM_BINS {
        return Err(TipdashError::invalid_argument("bins", bins.to_string()));
    }
    let title = format!(
        "Total Bill Distribution ({})",
        scope_label(day, "All Days")
    );
    let values: Vec<f64> = view.iter().map(|r| r.total_bill).collect();
    Ok(Histogram {
        title,
        bins: histogram(&values, bins),
    })
}

/// `bins` is clamped into `1..=MAX_HISTOGRAM_BINS`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let bins = bins.clamp(1, MAX_HISTOGRAM_BINS);
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);

    if max <= min || bins == 1 {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Tip distribution per meal time, split by sex when no sex is selected.
/// The title names the selected gender rather than always reading
/// "All Genders".
pub fn time_boxplot(view: &FilteredView<'_>, gender: Selection<Sex>) -> BoxPlot {
    let split_by_sex = matches!(gender, Selection::All);
    let mut groups: BTreeMap<(Time, Option<Sex>), Vec<f64>> = BTreeMap::new();
    for record in view.iter() {
        let sex = split_by_sex.then_some(record.sex);
        groups.entry((record.time, sex)).or_default().push(record.tip);
    }

    let boxes = groups
        .into_iter()
        .filter_map(|((time, sex), tips)| {
            box_summary(&tips).map(|summary| BoxSeries { time, sex, summary })
        })
        .collect();

    BoxPlot {
        title: format!(
            "Tip Distribution by Time ({})",
            scope_label(gender, "All Genders")
        ),
        boxes,
    }
}

/// Five-number summary with linearly interpolated quartiles and 1.5 IQR
/// whiskers. `None` for an empty sample.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR * iqr;
    let high_fence = q3 + WHISKER_IQR * iqr;

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| *v >= low_fence && *v <= high_fence)
        .collect();
    let lower_whisker = inside.first().copied().unwrap_or(q1);
    let upper_whisker = inside.last().copied().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    Some(BoxSummary {
        count: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty
/// and ascending.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Record count and share per day, in week order, present days only.
pub fn day_pie(view: &FilteredView<'_>) -> PieChart {
    let mut counts: BTreeMap<Day, usize> = BTreeMap::new();
    for record in view.iter() {
        *counts.entry(record.day).or_default() += 1;
    }
    let total = view.len() as f64;
    let slices = counts
        .into_iter()
        .map(|(day, count)| PieSlice {
            day,
            count,
            share: round2(count as f64 / total * 100.0),
        })
        .collect();

    PieChart {
        title: "Distribution by Day of Week".to_string(),
        slices,
    }
}

/// `(total_bill, tip)` pairs grouped by meal time, each with an OLS fit.
pub fn bill_scatter(view: &FilteredView<'_>) -> ScatterPlot {
    let mut groups: BTreeMap<Time, Vec<ScatterPoint>> = BTreeMap::new();
    for record in view.iter() {
        groups.entry(record.time).or_default().push(ScatterPoint {
            total_bill: record.total_bill,
            tip: record.tip,
        });
    }

    let groups = groups
        .into_iter()
        .map(|(time, points)| {
            let trendline = ols(&points);
            ScatterGroup {
                time,
                points,
                trendline,
            }
        })
        .collect();

    ScatterPlot {
        title: "Tip Amount vs Total Bill".to_string(),
        groups,
    }
}

/// Least-squares fit of tip on total bill. `None` with fewer than two points
/// or no spread in `total_bill`.
pub fn ols(points: &[ScatterPoint]) -> Option<Trendline> {
    if points.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = points.iter().map(|p| p.total_bill).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.tip).collect();
    let mean_x = stats::mean(&xs)?;
    let mean_y = stats::mean(&ys)?;

    let (sxy, sxx) = xs
        .iter()
        .zip(&ys)
        .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });
    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(Trendline {
        slope,
        intercept: mean_y - slope * mean_x,
        r_squared: stats::pearson(&xs, &ys).map(|r| r * r),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criteria::BillRange;
    use crate::domain::filter::apply_filters;
    use crate::domain::record::{Record, Smoker};
    use approx::assert_relative_eq;

    fn record(total_bill: f64, tip: f64, sex: Sex, day: Day, time: Time) -> Record {
        Record {
            total_bill,
            tip,
            sex,
            smoker: Smoker::No,
            day,
            time,
            size: 2,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record(10.0, 1.0, Sex::Male, Day::Thur, Time::Lunch),
            record(20.0, 3.0, Sex::Female, Day::Thur, Time::Lunch),
            record(30.0, 5.0, Sex::Male, Day::Sat, Time::Dinner),
            record(40.0, 7.0, Sex::Female, Day::Sun, Time::Dinner),
            record(50.0, 4.0, Sex::Female, Day::Sun, Time::Dinner),
        ]
    }

    fn all(records: &[Record]) -> FilteredView<'_> {
        apply_filters(records, &FilterCriteria::default())
    }

    #[test]
    fn display_type_parses_identifiers() {
        for display in DisplayType::ALL {
            assert_eq!(display.as_str().parse::<DisplayType>().unwrap(), *display);
        }
        assert!("pie".parse::<DisplayType>().is_err());
        assert_eq!(DisplayType::default(), DisplayType::TipsByGender);
    }

    #[test]
    fn tips_by_gender_sorted_descending() {
        let records = sample();
        let chart = tips_by_gender(&all(&records), Selection::All);
        assert_eq!(chart.title, "Average Tips by Gender (All Days)");
        assert_eq!(chart.bars.len(), 2);
        assert_eq!(chart.bars[0].sex, Sex::Female);
        assert_eq!(chart.bars[0].avg_tip, 4.67);
        assert_eq!(chart.bars[1].avg_tip, 3.0);
    }

    #[test]
    fn tips_by_gender_title_names_day() {
        let records = sample();
        let chart = tips_by_gender(&all(&records), Selection::Only(Day::Sat));
        assert_eq!(chart.title, "Average Tips by Gender (Sat)");
    }

    #[test]
    fn histogram_places_max_in_last_bin() {
        let bins = histogram(&[0.0, 5.0, 10.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 2);
        assert_eq!(bins[1].upper, 10.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert!(histogram(&[], 20).is_empty());
        let single = histogram(&[7.0, 7.0], 20);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 2);
    }

    #[test]
    fn total_bill_distribution_uses_requested_bins() {
        let records = sample();
        let hist = total_bill_distribution(&all(&records), Selection::All, 4).unwrap();
        assert_eq!(hist.bins.len(), 4);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert!(total_bill_distribution(&all(&records), Selection::All, 0).is_err());
    }

    #[test]
    fn oversized_bin_count_is_rejected() {
        let records = sample();
        let view = all(&records);
        assert!(total_bill_distribution(&view, Selection::All, MAX_HISTOGRAM_BINS).is_ok());
        let err = total_bill_distribution(&view, Selection::All, MAX_HISTOGRAM_BINS + 1).unwrap_err();
        assert!(matches!(err, TipdashError::InvalidArgument { ref field, .. } if field == "bins"));
        assert!(total_bill_distribution(&view, Selection::All, usize::MAX).is_err());
    }

    #[test]
    fn histogram_clamps_bin_count() {
        assert_eq!(histogram(&[1.0, 2.0], usize::MAX).len(), MAX_HISTOGRAM_BINS);
        let one = histogram(&[1.0, 2.0], 0);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].count, 2);
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let summary = box_summary(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(summary.q1, 1.75);
        assert_relative_eq!(summary.median, 2.5);
        assert_relative_eq!(summary.q3, 3.25);
        assert!(summary.outliers.is_empty());
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 4.0);
    }

    #[test]
    fn box_summary_flags_outliers() {
        let summary = box_summary(&[1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 40.0]).unwrap();
        assert_eq!(summary.outliers, vec![40.0]);
        assert_eq!(summary.upper_whisker, 4.0);
        assert_eq!(summary.max, 40.0);
        assert!(box_summary(&[]).is_none());
    }

    #[test]
    fn boxplot_splits_by_sex_only_when_unconstrained() {
        let records = sample();
        let split = time_boxplot(&all(&records), Selection::All);
        assert_eq!(split.boxes.len(), 4);
        assert_eq!(split.title, "Tip Distribution by Time (All Genders)");

        let mut criteria = FilterCriteria::default();
        criteria.gender = Selection::Only(Sex::Female);
        let view = apply_filters(&records, &criteria);
        let single = time_boxplot(&view, criteria.gender);
        assert_eq!(single.boxes.len(), 2);
        assert!(single.boxes.iter().all(|b| b.sex.is_none()));
        assert_eq!(single.title, "Tip Distribution by Time (Female)");
    }

    #[test]
    fn day_pie_counts_in_week_order() {
        let records = sample();
        let pie = day_pie(&all(&records));
        let days: Vec<Day> = pie.slices.iter().map(|s| s.day).collect();
        assert_eq!(days, vec![Day::Thur, Day::Sat, Day::Sun]);
        assert_eq!(pie.slices[0].count, 2);
        assert_eq!(pie.slices[0].share, 40.0);
    }

    #[test]
    fn day_pie_of_empty_view_has_no_slices() {
        let records = sample();
        let criteria = FilterCriteria::default().with_bill_range(BillRange::new(100.0, 200.0));
        let pie = day_pie(&apply_filters(&records, &criteria));
        assert!(pie.slices.is_empty());
    }

    #[test]
    fn scatter_groups_by_time_with_trendline() {
        let records = sample();
        let plot = bill_scatter(&all(&records));
        assert_eq!(plot.groups.len(), 2);
        let lunch = &plot.groups[0];
        assert_eq!(lunch.time, Time::Lunch);
        let fit = lunch.trendline.unwrap();
        assert_relative_eq!(fit.slope, 0.2);
        assert_relative_eq!(fit.intercept, -1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ols_needs_spread() {
        let points = [
            ScatterPoint { total_bill: 10.0, tip: 1.0 },
            ScatterPoint { total_bill: 10.0, tip: 2.0 },
        ];
        assert!(ols(&points).is_none());
        assert!(ols(&points[..1]).is_none());
    }

    #[test]
    fn prepare_chart_dispatches_every_display() {
        let records = sample();
        let view = all(&records);
        let criteria = FilterCriteria::default();
        let options = ChartOptions::default();
        for display in DisplayType::ALL {
            let panel = prepare_chart(*display, &view, &criteria, &options).unwrap();
            assert_eq!(panel.display_type(), *display);
        }
    }

    #[test]
    fn panel_serializes_with_display_tag() {
        let records = sample();
        let panel = Panel::DayPie(day_pie(&all(&records)));
        let json = serde_json::to_value(&panel).unwrap();
        assert_eq!(json["display"], "day-pie");
        assert_eq!(json["data"]["slices"][0]["day"], "Thur");
    }
}
