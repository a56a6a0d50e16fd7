use crate::schema::prices::PriceCell;
use anyhow::anyhow;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sampling period of the return series.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    /// Weeks ending Friday.
    Weekly,
    /// Calendar months.
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly];

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Date that labels the period `date` falls in: the day itself, the Friday closing
    /// its week, or the last calendar day of its month.
    pub fn period_end(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => date,
            Frequency::Weekly => {
                let from_monday = date.weekday().num_days_from_monday();
                let to_friday = (4 + 7 - from_monday) % 7;
                date.checked_add_days(Days::new(to_friday.into()))
                    .unwrap_or(date)
            }
            Frequency::Monthly => date
                .with_day(1)
                .and_then(|first| first.checked_add_months(Months::new(1)))
                .and_then(|next| next.pred_opt())
                .unwrap_or(date),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "weekly" | "w" => Ok(Frequency::Weekly),
            "monthly" | "m" => Ok(Frequency::Monthly),
            other => Err(anyhow!("unknown frequency \"{other}\"; expected daily, weekly or monthly")),
        }
    }
}

/// Which close the returns are computed from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Close,
    /// Close adjusted for splits & dividends.
    #[default]
    AdjClose,
}

impl PriceField {
    pub fn pick(&self, cell: &PriceCell) -> f64 {
        match self {
            PriceField::Close => cell.close,
            PriceField::AdjClose => cell.adj_close,
        }
    }
}

/// One period of the output table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReturnRow {
    pub date: NaiveDate,
    pub close: f64,
    pub return_pct: f64,
}

/// Last close of every period that has at least one observation, labelled by
/// [`Frequency::period_end`]. `prices` must be sorted by date.
pub fn resample(prices: &[PriceCell], frequency: Frequency, field: PriceField) -> Vec<(NaiveDate, f64)> {
    let mut series: Vec<(NaiveDate, f64)> = Vec::new();
    for cell in prices {
        let label = frequency.period_end(cell.date);
        let value = field.pick(cell);
        match series.last_mut() {
            Some((last, close)) if *last == label => *close = value,
            _ => series.push((label, value)),
        }
    }
    series
}

/// Percent change between consecutive observations: `(close[t] / close[t-1] - 1) * 100`.
///
/// The first observation has no prior value and is dropped, as is any row whose
/// return isn't finite (a zero prior close).
pub fn pct_change(series: &[(NaiveDate, f64)]) -> Vec<ReturnRow> {
    series
        .windows(2)
        .filter_map(|pair| {
            let (_, prev) = pair[0];
            let (date, close) = pair[1];
            let return_pct = (close / prev - 1.0) * 100.0;
            return_pct.is_finite().then_some(ReturnRow {
                date,
                close,
                return_pct,
            })
        })
        .collect()
}

pub fn compute(prices: &[PriceCell], frequency: Frequency, field: PriceField) -> Vec<ReturnRow> {
    pct_change(&resample(prices, frequency, field))
}
