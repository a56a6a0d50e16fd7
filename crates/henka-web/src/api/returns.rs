use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use chrono::NaiveDate;
use henka_core::selection::{self, Selection};
use henka_core::{returns, Frequency, PriceField, ReturnRow, ReturnStats};
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::json;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Debug)]
pub struct ReturnsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub freq: Option<String>,
}

/// Periodic returns & their statistics for one ticker
///
/// ```json
/// {
///     "ticker": "SPY",
///     "frequency": "monthly",
///     "start": "2010-01-01",
///     "end": "2024-01-01",
///     "rows": [
///         { "date": "2010-02-28", "close": 85.61, "return_pct": 3.12 },
///         // ...
///     ],
///     "stats": { "observations": 166, "mean": 1.07, ... }
/// }
/// ```
#[derive(Serialize, Debug)]
struct ReturnsResponse {
    ticker: String,
    frequency: Frequency,
    start: NaiveDate,
    end: NaiveDate,
    rows: Vec<ReturnRow>,
    stats: Option<ReturnStats>,
}

#[get("/api/returns/{ticker}")]
pub async fn ticker_returns(
    path: web::Path<String>,
    query: web::Query<ReturnsQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let ticker = path.into_inner();
    let selection = match Selection::from_input(
        Some(ticker.as_str()),
        query.start.as_deref(),
        query.end.as_deref(),
        selection::today(),
    ) {
        Ok(selection) => selection,
        Err(e) => return HttpResponse::BadRequest().json(json!({ "error": e.to_string() })),
    };

    let frequency = match query.freq.as_deref().map(str::parse::<Frequency>).transpose() {
        Ok(frequency) => frequency.unwrap_or_default(),
        Err(e) => return HttpResponse::BadRequest().json(json!({ "error": e.to_string() })),
    };

    let prices = match state.load_prices(&selection).await {
        Ok(prices) => prices,
        Err(e) => {
            error!("[{}] price fetch failed: {e:#}", selection.ticker);
            return HttpResponse::BadGateway()
                .json(json!({ "error": "Price provider request failed" }));
        }
    };

    let rows = returns::compute(&prices, frequency, PriceField::default());
    let stats = ReturnStats::from_rows(&rows);

    HttpResponse::Ok().json(ReturnsResponse {
        ticker: selection.ticker,
        frequency,
        start: selection.start,
        end: selection.end,
        rows,
        stats,
    })
}
