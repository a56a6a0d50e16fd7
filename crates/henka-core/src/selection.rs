use crate::display::format_date;
use crate::schema::common::convert_date_type;
use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TICKER: &str = "SPY";

/// Earliest date the form accepts.
pub fn min_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Ticker & date range chosen in step 1.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Selection {
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            start: default_start().min(today),
            end: today,
        }
    }

    /// Validate raw form input. An absent ticker and absent or blank dates take
    /// their defaults; a blank ticker is refused. Dates are clamped into
    /// `[2000-01-01, today]`.
    pub fn from_input(
        ticker: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> anyhow::Result<Self> {
        let defaults = Self::defaults(today);

        let ticker = match ticker {
            Some(t) => normalize_ticker(t)?,
            None => defaults.ticker,
        };
        let start = parse_or(start, defaults.start).context("Start date must be a valid date")?;
        let end = parse_or(end, defaults.end).context("End date must be a valid date")?;

        let start = start.clamp(min_day(), today);
        let end = end.clamp(min_day(), today);
        if start > end {
            bail!(
                "Start date ({}) is after end date ({})",
                format_date(start),
                format_date(end)
            );
        }

        Ok(Self { ticker, start, end })
    }

    /// `01/01/2010 → 10/16/2026`
    pub fn range_label(&self) -> String {
        format!("{} → {}", format_date(self.start), format_date(self.end))
    }
}

fn parse_or(value: Option<&str>, default: NaiveDate) -> anyhow::Result<NaiveDate> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => convert_date_type(v),
        None => Ok(default),
    }
}

/// Trim & uppercase; symbols like `BRK-B`, `^GSPC` or `EURUSD=X` pass, anything else is refused.
pub fn normalize_ticker(raw: &str) -> anyhow::Result<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        bail!("Ticker must not be empty");
    }
    if ticker.len() > 16 {
        bail!("Ticker \"{ticker}\" is too long");
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        bail!("Ticker \"{ticker}\" contains invalid characters");
    }
    Ok(ticker)
}
