use crate::schema::prices::Prices;
use async_trait::async_trait;
use chrono::NaiveDate;
use dotenv::var;

pub type HttpClient = reqwest::Client;

// Yahoo rejects requests without a browser-looking agent.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

/// Anything able to hand back a daily price series for a ticker, over `[start, end)`.
///
/// [`Yahoo`](crate::schema::prices::Yahoo) is the real one; the web crate swaps in stubs for its tests.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn prices(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Prices>;
}

/// Build the HTTP client used against the price provider, identified by the
/// `USER_AGENT` environment variable when it is set.
pub fn build_client() -> anyhow::Result<HttpClient> {
    let user_agent = var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
    let client = reqwest::ClientBuilder::new()
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}
