use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands::*, TraceLevel};
use dotenv::dotenv;
use henka_core::{
    build_client, returns, Frequency, PriceField, PriceSource, ReturnTable, Selection, Yahoo,
};
use tracing::{debug, error, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod ui;

fn preprocess(trace_level: Level) -> Result<()> {
    dotenv().ok();
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::WARN => Level::WARN,
        TraceLevel::ERROR => Level::ERROR,
    };

    preprocess(log_level)?;
    trace!("Command line input recorded: {cli:#?}");

    // cli framework:
    // "> henka <COMMAND>"
    match &cli.command {
        // "> henka show <TICKER> [--start] [--end] [--freq daily|weekly|monthly] [--raw-close]"
        Show {
            ticker,
            start,
            end,
            freq,
            raw_close,
        } => {
            let selection = Selection::from_input(
                Some(ticker.as_str()),
                start.as_deref(),
                end.as_deref(),
                henka_core::selection::today(),
            )?;
            let field = if *raw_close {
                PriceField::Close
            } else {
                PriceField::AdjClose
            };

            let yahoo = Yahoo::new(build_client()?);
            println!("{}", show(&yahoo, &selection, (*freq).into(), field).await);
        }
    }

    Ok(())
}

/// Everything `henka show` prints; an empty or failed fetch is a warning, never an error.
async fn show(
    source: &dyn PriceSource,
    selection: &Selection,
    frequency: Frequency,
    field: PriceField,
) -> String {
    let no_data = || {
        ui::warning(&format!(
            "No data returned for {} in the selected range.",
            selection.ticker
        ))
    };

    debug!("[{}] fetching {}", selection.ticker, selection.range_label());
    let prices = match source
        .prices(&selection.ticker, selection.start, selection.end)
        .await
    {
        Ok(prices) if !prices.is_empty() => prices,
        Ok(_) => return no_data(),
        Err(e) => {
            error!("[{}] price fetch failed: {e:#}", selection.ticker);
            return no_data();
        }
    };

    let rows = returns::compute(&prices, frequency, field);
    if rows.is_empty() {
        return ui::warning(&format!(
            "Not enough observations to compute {} returns for {}.",
            frequency.as_str(),
            selection.ticker
        ));
    }

    let table = ReturnTable::build(&selection.ticker, frequency, &rows);
    [
        ui::summary(selection),
        ui::returns_table(&table),
        ui::stats_table(&table),
    ]
    .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use henka_core::{PriceCell, Prices};

    struct Fixed(Prices);

    #[async_trait]
    impl PriceSource for Fixed {
        async fn prices(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Prices> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl PriceSource for Down {
        async fn prices(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Prices> {
            Err(anyhow!("dns error"))
        }
    }

    fn selection() -> Selection {
        Selection {
            ticker: "SPY".to_string(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    fn cell(m: u32, d: u32, close: f64) -> PriceCell {
        PriceCell {
            date: NaiveDate::from_ymd_opt(2024, m, d).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close * 0.5,
            volume: 0,
        }
    }

    #[tokio::test]
    async fn prints_monthly_tables() {
        colored::control::set_override(false);
        let source = Fixed(vec![cell(1, 30, 100.0), cell(1, 31, 104.0), cell(2, 29, 117.0)]);

        let out = show(&source, &selection(), Frequency::Monthly, PriceField::Close).await;
        assert!(out.contains("Ticker: SPY"));
        assert!(out.contains("Monthly Returns - SPY"));
        assert!(out.contains("02/29/2024        117.00         12.50"));
        assert!(out.contains("Return Statistics"));
    }

    #[tokio::test]
    async fn adjusted_close_is_reported_by_default() {
        colored::control::set_override(false);
        let source = Fixed(vec![cell(1, 2, 100.0), cell(1, 3, 110.0)]);

        let out = show(&source, &selection(), Frequency::Daily, PriceField::default()).await;
        assert!(out.contains("01/03/2024         55.00         10.00"));
    }

    #[tokio::test]
    async fn empty_and_failed_fetches_warn() {
        colored::control::set_override(false);
        let expected = "warning: No data returned for SPY in the selected range.";

        let out = show(&Fixed(vec![]), &selection(), Frequency::Daily, PriceField::Close).await;
        assert_eq!(out, expected);

        let out = show(&Down, &selection(), Frequency::Daily, PriceField::Close).await;
        assert_eq!(out, expected);
    }

    #[tokio::test]
    async fn single_period_warns_about_observations() {
        colored::control::set_override(false);
        let source = Fixed(vec![cell(1, 2, 100.0), cell(1, 3, 110.0)]);

        let out = show(&source, &selection(), Frequency::Weekly, PriceField::Close).await;
        assert_eq!(
            out,
            "warning: Not enough observations to compute weekly returns for SPY."
        );
    }
}
