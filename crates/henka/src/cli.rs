use clap::{Parser, Subcommand, ValueEnum};
use henka_core::Frequency;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, global = true, value_enum, ignore_case = true, default_value = "warn")]
    pub trace: TraceLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch daily prices for a ticker and print its periodic returns & statistics.
    Show {
        /// Ticker symbol, e.g. SPY, QQQ, ^GSPC.
        ticker: String,

        /// First day of the range (YYYY-MM-DD); defaults to 2010-01-01.
        #[arg(long)]
        start: Option<String>,

        /// Day the range stops before (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Return frequency.
        #[arg(long, value_enum, default_value = "daily")]
        freq: FrequencyArg,

        /// Use the raw close instead of the split & dividend adjusted close.
        #[arg(long)]
        raw_close: bool,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Daily => Frequency::Daily,
            FrequencyArg::Weekly => Frequency::Weekly,
            FrequencyArg::Monthly => Frequency::Monthly,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    DEBUG,
    INFO,
    WARN,
    ERROR,
}
