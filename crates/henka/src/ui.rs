use colored::Colorize;
use henka_core::{ReturnTable, Selection};

const DATE_W: usize = 12;
const CLOSE_W: usize = 12;
const RETURN_W: usize = 14;
const METRIC_W: usize = 18;
const VALUE_W: usize = 14;

pub fn summary(selection: &Selection) -> String {
    format!(
        "{} {}\n{} {}",
        "Ticker:".bold(),
        selection.ticker,
        "Range:".bold(),
        selection.range_label()
    )
}

pub fn returns_table(table: &ReturnTable) -> String {
    let mut lines = vec![
        table.title.bold().to_string(),
        format!(
            "{:<dw$}{:>cw$}{:>rw$}",
            "Date",
            "Close",
            "Return (%)",
            dw = DATE_W,
            cw = CLOSE_W,
            rw = RETURN_W
        )
        .cyan()
        .to_string(),
    ];

    for row in &table.rows {
        let ret = format!("{:>rw$}", row.return_pct, rw = RETURN_W);
        let ret = if row.return_pct.starts_with('-') {
            ret.red()
        } else if row.return_pct == "0.00" {
            ret.normal()
        } else {
            ret.green()
        };
        lines.push(format!(
            "{:<dw$}{:>cw$}{ret}",
            row.date,
            row.close,
            dw = DATE_W,
            cw = CLOSE_W
        ));
    }

    lines.join("\n")
}

pub fn stats_table(table: &ReturnTable) -> String {
    let mut lines = vec![
        "Return Statistics".bold().to_string(),
        format!("{:<mw$}{:>vw$}", "Metric", "Value", mw = METRIC_W, vw = VALUE_W)
            .cyan()
            .to_string(),
    ];
    lines.extend(
        table
            .stats
            .iter()
            .map(|stat| {
                format!(
                    "{:<mw$}{:>vw$}",
                    stat.metric,
                    stat.value,
                    mw = METRIC_W,
                    vw = VALUE_W
                )
            }),
    );
    lines.join("\n")
}

pub fn warning(message: &str) -> String {
    format!("{} {message}", "warning:".yellow().bold())
}
