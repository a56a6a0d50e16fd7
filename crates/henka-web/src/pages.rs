use crate::state::AppState;
use actix_web::{get, http::StatusCode, web, HttpResponse};
use chrono::NaiveDate;
use henka_core::selection::{self, min_day};
use henka_core::{returns, Frequency, PriceField, ReturnTable, Selection};
use log::warn;
use serde::{Deserialize, Serialize};
use tera::Context;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(step_one).service(review);
}

/// Raw step-1 inputs, as they travel in the query string.
#[derive(Deserialize, Debug, Default)]
pub struct InputQuery {
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ReviewQuery {
    pub ticker: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub freq: Option<String>,
    pub fetch: Option<String>,
}

impl ReviewQuery {
    fn wants_fetch(&self) -> bool {
        matches!(self.fetch.as_deref(), Some("1" | "true" | "on"))
    }
}

#[derive(Serialize)]
struct FrequencyOption {
    value: &'static str,
    label: &'static str,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Step 1: choose ticker & date range
//
////////////////////////////////////////////////////////////////////////////////////////////////////

#[get("/")]
async fn step_one(query: web::Query<InputQuery>, state: web::Data<AppState>) -> HttpResponse {
    let ctx = step_one_context(&query, selection::today());
    state.render("step1.html", &ctx, StatusCode::OK)
}

// previous inputs win over defaults so "Back" lands on the same form
fn step_one_context(input: &InputQuery, today: NaiveDate) -> Context {
    let defaults = Selection::defaults(today);
    let given = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut ctx = Context::new();
    ctx.insert(
        "ticker",
        &given(&input.ticker)
            .map(|t| t.to_uppercase())
            .unwrap_or(defaults.ticker),
    );
    ctx.insert(
        "start",
        &given(&input.start).unwrap_or_else(|| defaults.start.to_string()),
    );
    ctx.insert(
        "end",
        &given(&input.end).unwrap_or_else(|| defaults.end.to_string()),
    );
    ctx.insert("min_day", &min_day().to_string());
    ctx.insert("max_day", &today.to_string());
    ctx
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Step 2: review, fetch & display
//
////////////////////////////////////////////////////////////////////////////////////////////////////

#[get("/review")]
async fn review(query: web::Query<ReviewQuery>, state: web::Data<AppState>) -> HttpResponse {
    let today = selection::today();
    let query = query.into_inner();

    let selection = match Selection::from_input(
        query.ticker.as_deref(),
        query.start.as_deref(),
        query.end.as_deref(),
        today,
    ) {
        Ok(selection) => selection,
        Err(e) => {
            let input = InputQuery {
                ticker: query.ticker.clone(),
                start: query.start.clone(),
                end: query.end.clone(),
            };
            let mut ctx = step_one_context(&input, today);
            ctx.insert("warning", &e.to_string());
            return state.render("step1.html", &ctx, StatusCode::BAD_REQUEST);
        }
    };

    // an unknown frequency falls back to daily rather than failing the page
    let frequency = query
        .freq
        .as_deref()
        .and_then(|f| f.parse::<Frequency>().ok())
        .unwrap_or_default();

    let mut ctx = Context::new();
    ctx.insert("selection", &selection);
    ctx.insert("range", &selection.range_label());
    ctx.insert("frequency", frequency.as_str());
    ctx.insert(
        "frequencies",
        &Frequency::ALL
            .iter()
            .map(|f| FrequencyOption {
                value: f.as_str(),
                label: f.label(),
            })
            .collect::<Vec<_>>(),
    );

    if query.wants_fetch() {
        match state.load_prices(&selection).await {
            Ok(prices) if !prices.is_empty() => {
                // the frequency picker stays up whenever there is a series to resample
                ctx.insert("has_data", &true);
                let rows = returns::compute(&prices, frequency, PriceField::default());
                if rows.is_empty() {
                    ctx.insert(
                        "warning",
                        &format!(
                            "Not enough observations to compute {} returns for {}.",
                            frequency.as_str(),
                            selection.ticker
                        ),
                    );
                } else {
                    ctx.insert("table", &ReturnTable::build(&selection.ticker, frequency, &rows));
                }
            }
            Ok(_) => ctx.insert("warning", &no_data(&selection)),
            Err(e) => {
                warn!("[{}] price fetch failed: {e:#}", selection.ticker);
                ctx.insert("warning", &no_data(&selection));
            }
        }
    }

    state.render("review.html", &ctx, StatusCode::OK)
}

fn no_data(selection: &Selection) -> String {
    format!(
        "No data returned for {} in the selected range.",
        selection.ticker
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::*;
    use actix_web::{test, App};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    macro_rules! get {
        ($app:expr, $uri:expr) => {{
            let req = test::TestRequest::get().uri($uri).to_request();
            let resp = test::call_service(&$app, req).await;
            let status = resp.status();
            let body = test::read_body(resp).await;
            (status, String::from_utf8(body.to_vec()).unwrap())
        }};
    }

    #[actix_web::test]
    async fn step_one_prefills_defaults() {
        let state = web::Data::new(AppState::new(stub(vec![])).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (status, body) = get!(app, "/");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Step 1 - Choose Ticker"));
        assert!(body.contains(r#"name="ticker" value="SPY""#));
        assert!(body.contains(r#"value="2010-01-01""#));
        assert!(body.contains(r#"min="2000-01-01""#));
    }

    #[actix_web::test]
    async fn step_one_keeps_previous_inputs() {
        let state = web::Data::new(AppState::new(stub(vec![])).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (_, body) = get!(app, "/?ticker=qqq&start=2015-03-02&end=2016-03-02");
        assert!(body.contains(r#"value="QQQ""#));
        assert!(body.contains(r#"value="2015-03-02""#));
        assert!(body.contains(r#"value="2016-03-02""#));
    }

    #[actix_web::test]
    async fn review_without_fetch_shows_the_summary_only() {
        let source = stub(sample_prices());
        let state = web::Data::new(AppState::new(source.clone()).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (status, body) = get!(app, "/review?ticker=spy&start=2024-01-01&end=2024-02-01");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<code>SPY</code>"));
        assert!(body.contains("Get Data"));
        assert!(body.contains("?ticker=SPY&amp;start=2024-01-01&amp;end=2024-02-01"));
        assert!(!body.contains("<table>"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn fetch_renders_returns_and_stats() {
        let state = web::Data::new(AppState::new(stub(sample_prices())).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (status, body) =
            get!(app, "/review?ticker=SPY&start=2024-01-01&end=2024-02-01&fetch=1");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Daily Returns - SPY"));
        assert!(body.contains("<td class=\"num\">110.00</td><td class=\"num\">10.00</td>"));
        assert!(body.contains("<td class=\"num\">99.00</td><td class=\"num\">-10.00</td>"));
        assert!(body.contains("Return Statistics"));
        assert!(body.contains("<td>Win Rate (%)</td><td class=\"num\">50.00</td>"));
        assert!(body.contains(r#"value="daily" onchange="this.form.submit()" checked"#));
    }

    #[actix_web::test]
    async fn switching_frequency_reuses_the_fetch() {
        let source = stub(sample_prices());
        let state = web::Data::new(AppState::new(source.clone()).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        get!(app, "/review?ticker=SPY&start=2024-01-01&end=2024-02-01&fetch=1");
        let (_, body) = get!(
            app,
            "/review?ticker=SPY&start=2024-01-01&end=2024-02-01&fetch=1&freq=weekly"
        );

        // all three sessions sit in one week: nothing to compare against
        assert!(body.contains("Not enough observations to compute weekly returns for SPY."));
        assert!(!body.contains("<table>"));
        assert!(body.contains(r#"value="weekly" onchange="this.form.submit()" checked"#));
        assert!(body.contains(r#"value="daily" onchange="this.form.submit()">"#));

        // and back to daily from there, still without a refetch
        let (_, body) = get!(
            app,
            "/review?ticker=SPY&start=2024-01-01&end=2024-02-01&fetch=1&freq=daily"
        );
        assert!(body.contains("Daily Returns - SPY"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn frequency_picker_needs_a_series() {
        let state = web::Data::new(AppState::new(stub(vec![])).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (_, body) = get!(app, "/review?ticker=ZZZZ&fetch=1&freq=weekly");
        assert!(!body.contains(r#"type="radio""#));
    }

    #[actix_web::test]
    async fn empty_result_warns_instead_of_failing() {
        let state = web::Data::new(AppState::new(stub(vec![])).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (status, body) = get!(app, "/review?ticker=ZZZZ&fetch=1");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No data returned for ZZZZ in the selected range."));
        assert!(!body.contains("<table>"));
    }

    #[actix_web::test]
    async fn provider_failure_warns_instead_of_failing() {
        let state = web::Data::new(AppState::new(Arc::new(FailingSource)).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (status, body) = get!(app, "/review?ticker=SPY&fetch=1");
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No data returned for SPY in the selected range."));
    }

    #[actix_web::test]
    async fn blank_ticker_goes_back_to_step_one() {
        let source = stub(sample_prices());
        let state = web::Data::new(AppState::new(source.clone()).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (status, body) = get!(app, "/review?ticker=%20&fetch=1");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Step 1 - Choose Ticker"));
        assert!(body.contains("Ticker must not be empty"));
        assert!(!body.contains("Daily Returns"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn invalid_inputs_go_back_to_step_one() {
        let state = web::Data::new(AppState::new(stub(vec![])).unwrap());
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let (status, body) =
            get!(app, "/review?ticker=SPY&start=2020-02-01&end=2020-01-01");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Step 1 - Choose Ticker"));
        assert!(body.contains("is after end date"));
        assert!(body.contains(r#"value="2020-02-01""#));
    }
}
