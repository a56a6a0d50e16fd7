//! Presentation of the return series: what the browser table and the terminal
//! print, with dates as `mm/dd/yyyy` and numbers rounded to two places.

use crate::returns::{Frequency, ReturnRow};
use crate::stats::{MetricValue, ReturnStats};
use chrono::NaiveDate;
use serde::Serialize;

pub const DATE_FORMAT: &str = "%m/%d/%Y";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Round to two decimals, folding `-0.00` into `0.00`.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `1234567.891` -> `1,234,567.89` (with `decimals = 2`); non-finite values are `n/a`.
pub fn thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (int, frac) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // no sign on values that round to zero
    let sign = if value < 0.0 && formatted.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        "-"
    } else {
        ""
    };

    match frac {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn format_metric(value: MetricValue) -> String {
    match value {
        MetricValue::Count(n) => thousands(n as f64, 0),
        MetricValue::Value(Some(v)) => thousands(v, 2),
        MetricValue::Value(None) => "n/a".to_string(),
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub date: String,
    pub close: String,
    pub return_pct: String,
}

impl From<&ReturnRow> for DisplayRow {
    fn from(row: &ReturnRow) -> Self {
        Self {
            date: format_date(row.date),
            close: format!("{:.2}", round2(row.close)),
            return_pct: format!("{:.2}", round2(row.return_pct)),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StatRow {
    pub metric: &'static str,
    pub value: String,
}

/// Both output tables for one ticker & frequency, ready to render.
#[derive(Serialize, Debug, Clone)]
pub struct ReturnTable {
    pub title: String,
    pub rows: Vec<DisplayRow>,
    pub stats: Vec<StatRow>,
}

impl ReturnTable {
    pub fn build(ticker: &str, frequency: Frequency, rows: &[ReturnRow]) -> Self {
        let stats = ReturnStats::from_rows(rows)
            .map(|stats| {
                stats
                    .metrics()
                    .into_iter()
                    .map(|(metric, value)| StatRow {
                        metric,
                        value: format_metric(value),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: format!("{} Returns - {ticker}", frequency.label()),
            rows: rows.iter().map(DisplayRow::from).collect(),
            stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dates_are_month_first() {
        assert_eq!(format_date(day(2010, 1, 4)), "01/04/2010");
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(-2.344), -2.34);
        assert_eq!(round2(-0.001).to_string(), "0");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(0.0, 2), "0.00");
        assert_eq!(thousands(999.999, 2), "1,000.00");
        assert_eq!(thousands(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(thousands(-4_321.5, 2), "-4,321.50");
        assert_eq!(thousands(-0.001, 2), "0.00");
        assert_eq!(thousands(5_031.0, 0), "5,031");
        assert_eq!(thousands(f64::NAN, 2), "n/a");
    }

    #[test]
    fn metrics_render_counts_and_gaps() {
        assert_eq!(format_metric(MetricValue::Count(1_250)), "1,250");
        assert_eq!(format_metric(MetricValue::Value(Some(0.056))), "0.06");
        assert_eq!(format_metric(MetricValue::Value(None)), "n/a");
    }

    #[test]
    fn builds_both_tables() {
        let rows = vec![
            ReturnRow {
                date: day(2024, 1, 5),
                close: 467.9249,
                return_pct: -1.23456,
            },
            ReturnRow {
                date: day(2024, 1, 12),
                close: 476.68,
                return_pct: 1.8715,
            },
        ];
        let table = ReturnTable::build("SPY", Frequency::Weekly, &rows);
        assert_eq!(table.title, "Weekly Returns - SPY");
        assert_eq!(
            table.rows[0],
            DisplayRow {
                date: "01/05/2024".to_string(),
                close: "467.92".to_string(),
                return_pct: "-1.23".to_string(),
            }
        );
        assert_eq!(table.stats.len(), 8);
        assert_eq!(table.stats[0].value, "2");
        assert_eq!(table.stats[5].metric, "Win Rate (%)");
        assert_eq!(table.stats[5].value, "50.00");
    }

    #[test]
    fn empty_rows_build_an_empty_table() {
        let table = ReturnTable::build("SPY", Frequency::Daily, &[]);
        assert!(table.is_empty());
        assert!(table.stats.is_empty());
    }
}
