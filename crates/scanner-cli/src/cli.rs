//! CLI argument definitions for the market scanner.
//!
//! # Commands
//!
//! | Command | Provider | Description |
//! |---------|----------|-------------|
//! | `quote` | Yahoo (or `SCANNER_QUOTE_PROVIDER`) | Live quotes for the given symbols |
//! | `earnings` | Finnhub | Companies reporting today ±1 day, with post-move |
//! | `movers` | Finnhub | Top 5 gainers and losers of the watchlist |
//! | `conviction` | Finnhub | Analyst buy share × 52-week discount, top 10 |
//! | `all` | Finnhub | earnings, movers and conviction in that order |
//!
//! Finnhub commands require `FINNHUB_KEY`.
//!
//! # Examples
//!
//! ```bash
//! scanner quote AAPL GOOG EURUSD=X
//! FINNHUB_KEY=... scanner movers
//! SCANNER_LOG=debug scanner all
//! ```

use clap::{Args, Parser, Subcommand};

/// Market Scanner - live quotes and daily watchlist scans
#[derive(Debug, Parser)]
#[command(
    name = "scanner",
    author,
    version,
    about = "Live quotes and daily watchlist scans",
    long_about = "Scanner prints colorized console tables built from Yahoo Finance and \
Finnhub data:\n\
\n\
  • quote: live quotes for any symbols (Yahoo, no key needed)\n\
  • earnings / movers / conviction / all: watchlist scans (Finnhub free tier)\n\
\n\
Requires for scans:  export FINNHUB_KEY=your_key\n\
Logging goes to stderr; set SCANNER_LOG or RUST_LOG to change the level."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display live quotes for one or more ticker symbols.
    ///
    /// Unknown symbols get their own "symbol not found" row.
    ///
    /// # Examples
    ///
    ///   scanner quote AAPL
    ///   scanner quote AAPL GOOG EURUSD=X
    Quote(QuoteArgs),

    /// Stocks reporting earnings today ±1 day, with price move and EPS surprise.
    Earnings,

    /// Top 5 gainers and losers from the watchlist, with 52-week position.
    Movers,

    /// Analyst buy share × discount from the 52-week high (top 10).
    Conviction,

    /// Run earnings, movers and conviction.
    All,
}

/// Arguments for the `quote` command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// One or more ticker symbols (e.g., AAPL, BRK.B, EURUSD=X).
    #[arg(required = true, num_args = 1.., value_name = "SYMBOL")]
    pub symbols: Vec<String>,
}
