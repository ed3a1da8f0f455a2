//! Plain-text rendering of statistics, chart series and table pages for the
//! terminal.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::domain::chart_data::{BarChart, BoxPlot, Histogram, Panel, PieChart, ScatterPlot};
use crate::domain::record_store::DatasetSummary;
use crate::domain::stats::{CategoryStats, StatisticsSnapshot};
use crate::domain::table::TablePage;

const NO_DATA: &str = "n/a";

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("${:.2}", v))
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("{:.2}", v))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("{:.2}%", v))
}

fn format_category_block<K: Display>(
    title: &str,
    groups: &BTreeMap<K, CategoryStats>,
    out: &mut String,
) {
    out.push_str(&format!("\n{}:\n", title));
    for (key, stats) in groups {
        out.push_str(&format!(
            "  {:<8} {:>4} records   avg tip ${:>6.2}   avg bill ${:>6.2}\n",
            key.to_string(),
            stats.count,
            stats.avg_tip,
            stats.avg_bill
        ));
    }
}

pub fn format_statistics(stats: &StatisticsSnapshot) -> String {
    let mut out = String::new();
    if stats.is_empty() {
        out.push_str("No records match the selected filters.\n\n");
    }
    out.push_str(&format!("Total Records:      {}\n", stats.total_records));
    out.push_str(&format!("Average Bill:       {}\n", money(stats.avg_bill)));
    out.push_str(&format!("Average Tip:        {}\n", money(stats.avg_tip)));
    out.push_str(&format!("Average Tip %:      {}\n", percent(stats.avg_tip_percentage)));
    out.push_str(&format!("Average Party Size: {}\n", number(stats.avg_size)));
    out.push_str(&format!("Bill/Tip Corr.:     {}\n", number(stats.correlation)));
    out.push_str(&format!(
        "Tip Range:          {} - {}\n",
        money(stats.min_tip),
        money(stats.max_tip)
    ));
    out.push_str(&format!(
        "Bill Range:         {} - {}\n",
        money(stats.min_bill),
        money(stats.max_bill)
    ));

    if !stats.is_empty() {
        format_category_block("By Gender", &stats.gender_stats, &mut out);
        format_category_block("By Day", &stats.day_stats, &mut out);
        format_category_block("By Time", &stats.time_stats, &mut out);
        format_category_block("By Smoker", &stats.smoker_stats, &mut out);
    }
    out
}

pub fn format_summary(summary: &DatasetSummary) -> String {
    let mut out = format!("Records:    {}\n", summary.total_records);
    match summary.bill_range {
        Some(range) => out.push_str(&format!(
            "Bill range: ${:.2} - ${:.2}\n",
            range.min, range.max
        )),
        None => out.push_str(&format!("Bill range: {}\n", NO_DATA)),
    }
    format_counts("Sex", &summary.sex_counts, &mut out);
    format_counts("Smoker", &summary.smoker_counts, &mut out);
    format_counts("Day", &summary.day_counts, &mut out);
    format_counts("Time", &summary.time_counts, &mut out);
    out
}

fn format_counts<K: Display>(label: &str, counts: &BTreeMap<K, usize>, out: &mut String) {
    let parts: Vec<String> = counts.iter().map(|(k, n)| format!("{} {}", k, n)).collect();
    out.push_str(&format!("{:<11} {}\n", format!("{}:", label), parts.join(", ")));
}

pub fn format_panel(panel: &Panel) -> String {
    match panel {
        Panel::TipsByGender(chart) => format_bar_chart(chart),
        Panel::TotalBillDistribution(hist) => format_histogram(hist),
        Panel::TimeBoxplot(plot) => format_boxplot(plot),
        Panel::DayPie(pie) => format_pie(pie),
        Panel::BillScatter(plot) => format_scatter(plot),
        Panel::DataTable(page) => format_table(page),
    }
}

fn format_bar_chart(chart: &BarChart) -> String {
    let mut out = format!("{}\n", chart.title);
    if chart.bars.is_empty() {
        out.push_str("  (no data)\n");
    }
    for bar in &chart.bars {
        out.push_str(&format!("  {:<8} ${:.2}\n", bar.sex.to_string(), bar.avg_tip));
    }
    out
}

fn format_histogram(hist: &Histogram) -> String {
    let mut out = format!("{}\n", hist.title);
    if hist.bins.is_empty() {
        out.push_str("  (no data)\n");
    }
    let last = hist.bins.len().saturating_sub(1);
    for (i, bin) in hist.bins.iter().enumerate() {
        let close = if i == last { ']' } else { ')' };
        out.push_str(&format!(
            "  [{:>6.2}, {:>6.2}{}  {}\n",
            bin.lower, bin.upper, close, bin.count
        ));
    }
    out
}

fn format_boxplot(plot: &BoxPlot) -> String {
    let mut out = format!("{}\n", plot.title);
    if plot.boxes.is_empty() {
        out.push_str("  (no data)\n");
    }
    for series in &plot.boxes {
        let label = match series.sex {
            Some(sex) => format!("{} / {}", series.time, sex),
            None => series.time.to_string(),
        };
        let s = &series.summary;
        out.push_str(&format!(
            "  {:<15} n={:<4} min {:.2}  q1 {:.2}  median {:.2}  q3 {:.2}  max {:.2}",
            label, s.count, s.min, s.q1, s.median, s.q3, s.max
        ));
        if !s.outliers.is_empty() {
            let outliers: Vec<String> = s.outliers.iter().map(|v| format!("{:.2}", v)).collect();
            out.push_str(&format!("  outliers [{}]", outliers.join(", ")));
        }
        out.push('\n');
    }
    out
}

fn format_pie(pie: &PieChart) -> String {
    let mut out = format!("{}\n", pie.title);
    if pie.slices.is_empty() {
        out.push_str("  (no data)\n");
    }
    for slice in &pie.slices {
        out.push_str(&format!(
            "  {:<5} {:>4}  {:>6.2}%\n",
            slice.day.to_string(),
            slice.count,
            slice.share
        ));
    }
    out
}

fn format_scatter(plot: &ScatterPlot) -> String {
    let mut out = format!("{}\n", plot.title);
    if plot.groups.is_empty() {
        out.push_str("  (no data)\n");
    }
    for group in &plot.groups {
        out.push_str(&format!("  {} ({} points)", group.time, group.points.len()));
        match group.trendline {
            Some(fit) => out.push_str(&format!(
                "  trend: tip = {:.4} * total_bill {:+.4}  R^2 {}\n",
                fit.slope,
                fit.intercept,
                number(fit.r_squared)
            )),
            None => out.push_str("  trend: n/a\n"),
        }
    }
    out
}

pub fn format_table(page: &TablePage) -> String {
    let header: Vec<String> = page.columns.iter().map(|c| c.to_string()).collect();
    let rows: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].len())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let join = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = String::new();
    out.push_str(join(&header).trim_end());
    out.push('\n');
    for row in &rows {
        out.push_str(join(row).trim_end());
        out.push('\n');
    }
    out.push_str(&format!(
        "Page {} of {} ({} rows)\n",
        if page.page_count == 0 { 0 } else { page.page + 1 },
        page.page_count,
        page.total_rows
    ));
    out
}
