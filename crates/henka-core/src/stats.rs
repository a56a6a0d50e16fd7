use crate::returns::ReturnRow;
use serde::Serialize;

/// Descriptive statistics over a return series, all in percent.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReturnStats {
    pub observations: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; undefined below two observations.
    pub std_dev: Option<f64>,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub flat_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Count(usize),
    Value(Option<f64>),
}

impl ReturnStats {
    pub fn from_rows(rows: &[ReturnRow]) -> Option<Self> {
        let returns: Vec<f64> = rows.iter().map(|row| row.return_pct).collect();
        Self::from_returns(&returns)
    }

    /// `None` for an empty series.
    pub fn from_returns(returns: &[f64]) -> Option<Self> {
        if returns.is_empty() {
            return None;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let min = returns.iter().copied().fold(f64::INFINITY, f64::min);
        let max = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let std_dev = (returns.len() > 1).then(|| {
            let ss: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        });

        let rate = |pred: fn(f64) -> bool| {
            returns.iter().filter(|r| pred(**r)).count() as f64 / n * 100.0
        };

        Some(Self {
            observations: returns.len(),
            mean,
            min,
            max,
            std_dev,
            win_rate: rate(|r| r > 0.0),
            loss_rate: rate(|r| r < 0.0),
            flat_rate: rate(|r| r == 0.0),
        })
    }

    /// Rows of the statistics table, in display order.
    pub fn metrics(&self) -> [(&'static str, MetricValue); 8] {
        use MetricValue::*;
        [
            ("Observations", Count(self.observations)),
            ("Mean Return (%)", Value(Some(self.mean))),
            ("Min Return (%)", Value(Some(self.min))),
            ("Max Return (%)", Value(Some(self.max))),
            ("Std Dev (%)", Value(self.std_dev)),
            ("Win Rate (%)", Value(Some(self.win_rate))),
            ("Loss Rate (%)", Value(Some(self.loss_rate))),
            ("Flat Rate (%)", Value(Some(self.flat_rate))),
        ]
    }
}
