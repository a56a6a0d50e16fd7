use super::common::{convert_timestamp, midnight_timestamp};
use crate::api::{HttpClient, PriceSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Daily prices from Yahoo Finance, per ticker
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

pub struct Yahoo {
    http_client: HttpClient,
}

impl Yahoo {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl PriceSource for Yahoo {
    async fn prices(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Prices> {
        fetch(&self.http_client, ticker, start, end).await
    }
}

// -------------------------------------------------------------------------------------------------

/// Chart endpoint for one ticker, daily interval; `period2` is exclusive.
pub fn url(ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
    let tckr = ticker.to_uppercase();
    let period1 = midnight_timestamp(start);
    let period2 = midnight_timestamp(end);
    format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{tckr}?symbol={tckr}&period1={period1}&period2={period2}&interval=1d&events=div|split|capitalGains",
    )
}

pub async fn fetch(
    client: &HttpClient,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Prices> {
    let time = std::time::Instant::now();
    let url = url(ticker, start, end);

    trace!("Fetching price data for [{ticker}] from Yahoo Finance");
    let response = client.get(&url).send().await.map_err(|e| {
        error!("[{ticker}] price fetching error: {e}\nURL: {url}");
        e
    })?;

    // unknown tickers come back as 404 with a regular chart body, so the status alone isn't fatal
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| {
        error!("[{ticker}] byte transformation error: {e}\nURL: {url}");
        e
    })?;

    let prices = parse(ticker, &bytes).map_err(|e| {
        error!("[{ticker}] deserialization error ({status}): {e}\nURL: {url}");
        e
    })?;

    debug!(
        "[{ticker}] {} prices fetched. Elapsed time: {} ms",
        prices.len(),
        time.elapsed().as_millis()
    );

    Ok(prices)
}

/// Turn a chart response body into a date-ordered series, one cell per trading day.
///
/// A body without `chart.result` (unknown ticker, provider error) is an empty series, not an error.
pub fn parse(ticker: &str, bytes: &[u8]) -> anyhow::Result<Prices> {
    let de = serde_json::from_slice::<PriceHistory>(bytes)?;

    let Some(base) = de.chart.result.and_then(|result| result.into_iter().next()) else {
        match de.chart.error {
            Some(e) => warn!("[{ticker}] provider returned no data: {} ({})", e.description, e.code),
            None => warn!("[{ticker}] contained no \"chart.result\" object"),
        }
        return Ok(vec![]);
    };

    trace!("Transforming price data for [{ticker}]");
    let quote = base.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = base
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();
    let offset = base.meta.gmtoffset;

    let mut prices = base
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, timestamp)| {
            let close = column(&quote.close, i)?;
            let date = convert_timestamp(timestamp + offset)?;
            Some(PriceCell {
                date,
                open: column(&quote.open, i).unwrap_or(close),
                high: column(&quote.high, i).unwrap_or(close),
                low: column(&quote.low, i).unwrap_or(close),
                close,
                adj_close: column(&adjclose, i).unwrap_or(close),
                volume: column(&quote.volume, i).unwrap_or(0),
            })
        })
        .collect::<Prices>();

    // on a duplicated date the later row wins; the provider appends the live session last
    prices.sort_by_key(|cell| cell.date);
    prices.reverse();
    prices.dedup_by_key(|cell| cell.date);
    prices.reverse();

    if prices.is_empty() {
        warn!("[{ticker}] chart result held no usable closes");
    }

    Ok(prices)
}

fn column<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

// Output: Price
pub type Prices = Vec<PriceCell>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceCell {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: u64,
}

// Input: Yahoo Finance
#[derive(Deserialize, Debug)]
pub struct PriceHistory {
    pub chart: PriceResponse,
}

#[derive(Deserialize, Debug)]
pub struct PriceResponse {
    pub result: Option<Vec<PriceCategories>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct PriceCategories {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
pub struct Meta {
    /// Seconds between UTC and the exchange's local time.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

#[derive(Deserialize, Debug)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}
