//! Command-line definitions.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Fetch company fundamentals, derive metrics, and train a toy model.
#[derive(Debug, Parser)]
#[command(name = "fundlens", version, about)]
pub(crate) struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Fetch, derive, and persist data for one ticker.
    Fetch(FetchArgs),
    /// Run the pipeline across the SEC ticker universe.
    Universe(UniverseArgs),
    /// Train the direction model on stored price history.
    Train(TrainArgs),
}

/// Options shared by the fetching subcommands.
#[derive(Debug, Args)]
pub(crate) struct CommonArgs {
    /// Root directory for per-ticker output.
    #[arg(long, default_value = "stock_data")]
    pub(crate) output_root: PathBuf,

    /// Identifying User-Agent sent to the SEC (AppName/Version (email)).
    #[arg(long, default_value = "fundlens/0.1 (fundlens@example.com)")]
    pub(crate) user_agent: String,

    /// Start of the price-history window (YYYY-MM-DD); open when omitted.
    #[arg(long)]
    pub(crate) start: Option<NaiveDate>,

    /// End of the price-history window (YYYY-MM-DD); now when omitted.
    #[arg(long)]
    pub(crate) end: Option<NaiveDate>,

    /// SQLite cache database; caching is off when omitted.
    #[arg(long)]
    pub(crate) cache_db: Option<PathBuf>,

    /// Skip fetching the latest 10-K text.
    #[arg(long)]
    pub(crate) skip_filing_text: bool,
}

/// Arguments for `fundlens fetch`.
#[derive(Debug, Args)]
pub(crate) struct FetchArgs {
    /// Ticker symbol (e.g. AAPL).
    pub(crate) ticker: String,

    /// Shared fetching options.
    #[command(flatten)]
    pub(crate) common: CommonArgs,
}

/// Arguments for `fundlens universe`.
#[derive(Debug, Args)]
pub(crate) struct UniverseArgs {
    /// Maximum number of tickers to process.
    #[arg(long)]
    pub(crate) limit: Option<usize>,

    /// Shared fetching options.
    #[command(flatten)]
    pub(crate) common: CommonArgs,
}

/// Arguments for `fundlens train`.
#[derive(Debug, Args)]
pub(crate) struct TrainArgs {
    /// Ticker symbol whose stored history to train on.
    pub(crate) ticker: String,

    /// Root directory holding per-ticker output.
    #[arg(long, default_value = "stock_data")]
    pub(crate) output_root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fetch_parses_ticker_and_flags() {
        let cli = Cli::try_parse_from([
            "fundlens",
            "fetch",
            "aapl",
            "--start",
            "2020-01-01",
            "--skip-filing-text",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.ticker, "aapl");
                assert_eq!(
                    args.common.start,
                    NaiveDate::from_ymd_opt(2020, 1, 1)
                );
                assert!(args.common.skip_filing_text);
                assert!(args.common.cache_db.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn universe_accepts_limit() {
        let cli = Cli::try_parse_from(["fundlens", "universe", "--limit", "3"]).unwrap();
        match cli.command {
            Commands::Universe(args) => assert_eq!(args.limit, Some(3)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
