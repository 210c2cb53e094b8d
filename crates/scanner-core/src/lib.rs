//! # Scanner Core
//!
//! Provider adapters, analytics and report builders for the market scanner.
//!
//! ## Overview
//!
//! - **Domain models** for quotes, earnings events, analyst ratings and
//!   52-week ranges
//! - **Provider contract** ([`QuoteProvider`]) with Yahoo and Finnhub adapters
//! - **Pacing primitives** that keep Finnhub's free tier happy
//! - **Pure analytics** for change, range position, buy share and conviction
//! - **Report builders** that turn provider data into neutral [`Table`]s
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo (cookie/crumb session) and Finnhub adapters |
//! | [`analytics`] | Derived metrics, total over missing inputs |
//! | [`config`] | Environment settings and provider construction |
//! | [`data_source`] | Provider trait and request/response types |
//! | [`domain`] | Domain models |
//! | [`error`] | Validation, configuration and report errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`pacing`] | Fixed-interval and quota pacers |
//! | [`report`] | Table and cell model |
//! | [`reports`] | Quote, earnings, movers and conviction builders |
//! | [`source`] | Provider identifiers |
//! | [`watchlist`] | Built-in watchlist with ISIN/WKN reference data |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scanner_core::{movers_report, ReqwestHttpClient, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let provider = settings.report_provider(Arc::new(ReqwestHttpClient::new()?))?;
//!
//!     let report = movers_report(provider.as_ref(), &settings.watchlist).await?;
//!     for table in &report.tables {
//!         println!("{} ({} rows)", table.title, table.rows.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Per-symbol failures stay inside the report as [`QuoteOutcome::Failed`] rows
//! or skip notes. Only configuration problems and failures that leave a report
//! with nothing to show surface as errors:
//!
//! ```rust
//! use scanner_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::RateLimited => "slow down",
//!         SourceErrorKind::Unauthorized => "check FINNHUB_KEY",
//!         _ if error.is_transport() => "network problem",
//!         _ => "unexpected upstream data",
//!     }
//! }
//! # assert_eq!(describe(&SourceError::rate_limited("429")), "slow down");
//! ```
//!
//! ## Security
//!
//! - The Finnhub key is read from the environment and travels only as a query
//!   parameter; logs and error messages carry the request path only
//! - The Yahoo session lives in memory for one invocation

pub mod adapters;
pub mod analytics;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod pacing;
pub mod report;
pub mod reports;
pub mod source;
pub mod watchlist;

// Adapter implementations
pub use adapters::{
    FinnhubAdapter, YahooAdapter, YahooAuthMode, YahooSession, FINNHUB_BASE_URL,
};

// Configuration
pub use config::{Pacing, Settings};

// Data source trait and types
pub use data_source::{
    CapabilitySet, Endpoint, QuoteBatch, QuoteOutcome, QuoteProvider, QuoteRequest, SourceError,
    SourceErrorKind,
};

// Domain models
pub use domain::{
    format_iso_date, parse_iso_date, DateRange, EarningsEvent, Metric52Week, Quote,
    RecommendationSnapshot, SecurityIds, Symbol, WatchlistEntry,
};

// Error types
pub use error::{ConfigError, ReportError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Pacing
pub use pacing::{FixedIntervalPacer, Pacer, QuotaPacer, Unpaced};

// Reports
pub use report::{Cell, DeltaStyle, FetchStats, Report, Table, Tone, PLACEHOLDER};
pub use reports::{
    conviction_report, earnings_report, movers_report, quote_report, run_report, ReportKind,
};

// Source identifiers
pub use source::ProviderId;

// Watchlist
pub use watchlist::Watchlist;
