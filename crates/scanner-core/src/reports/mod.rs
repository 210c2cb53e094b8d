//! Report builders.
//!
//! Each builder walks its symbols sequentially through a [`QuoteProvider`],
//! runs the analytics and returns a neutral [`Report`]. Per-symbol failures
//! never abort a report; only a failure that leaves nothing to iterate over
//! (the earnings calendar itself, a missing capability) is an error.
//!
//! | Report | Symbols | Tables |
//! |--------|---------|--------|
//! | quote | user supplied | one row per symbol, request order |
//! | earnings | calendar, today ±1 day | one row per calendar entry |
//! | movers | watchlist | top 5 gainers, top 5 losers |
//! | conviction | watchlist | top 10 by score |

mod conviction;
mod earnings;
mod movers;
mod quote;

use std::fmt::{Display, Formatter};

use time::Date;

pub use conviction::{conviction_report, CONVICTION_HEADERS, CONVICTION_TITLE};
pub use earnings::{earnings_report, EARNINGS_HEADERS, EARNINGS_TITLE};
pub use movers::{movers_report, GAINERS_TITLE, LOSERS_TITLE, MOVERS_HEADERS};
pub use quote::{quote_report, QUOTE_HEADERS, QUOTE_TITLE};

use crate::data_source::{Endpoint, QuoteOutcome, QuoteProvider, QuoteRequest};
use crate::report::{FetchStats, Report};
use crate::watchlist::Watchlist;
use crate::{ReportError, Symbol};

/// Watchlist report families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Earnings,
    Movers,
    Conviction,
    All,
}

impl ReportKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earnings => "earnings",
            Self::Movers => "movers",
            Self::Conviction => "conviction",
            Self::All => "all",
        }
    }

    /// Concrete reports to run, in output order.
    pub fn expand(self) -> Vec<ReportKind> {
        match self {
            Self::All => vec![Self::Earnings, Self::Movers, Self::Conviction],
            single => vec![single],
        }
    }

    /// Endpoints the provider must offer.
    pub fn required_endpoints(self) -> Vec<Endpoint> {
        match self {
            Self::Earnings => vec![Endpoint::EarningsCalendar, Endpoint::Quote],
            Self::Movers => vec![Endpoint::Quote, Endpoint::Metric52Week],
            Self::Conviction => vec![
                Endpoint::Recommendation,
                Endpoint::Quote,
                Endpoint::Metric52Week,
            ],
            Self::All => {
                let mut endpoints = Vec::new();
                for kind in self.expand() {
                    for endpoint in kind.required_endpoints() {
                        if !endpoints.contains(&endpoint) {
                            endpoints.push(endpoint);
                        }
                    }
                }
                endpoints
            }
        }
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs `kind` (every member of `All`, in order) and concatenates the tables.
pub async fn run_report(
    kind: ReportKind,
    provider: &dyn QuoteProvider,
    watchlist: &Watchlist,
    today: Date,
) -> Result<Report, ReportError> {
    ensure_capabilities(provider, kind)?;

    let mut combined = Report {
        tables: Vec::new(),
        stats: FetchStats::default(),
    };
    for single in kind.expand() {
        let report = match single {
            ReportKind::Earnings => earnings_report(provider, watchlist, today).await?,
            ReportKind::Movers => movers_report(provider, watchlist).await?,
            ReportKind::Conviction => conviction_report(provider, watchlist).await?,
            ReportKind::All => continue,
        };
        combined.tables.extend(report.tables);
        combined.stats.merge(report.stats);
    }
    Ok(combined)
}

pub(crate) fn ensure_capabilities(
    provider: &dyn QuoteProvider,
    kind: ReportKind,
) -> Result<(), ReportError> {
    let capabilities = provider.capabilities();
    match kind
        .required_endpoints()
        .into_iter()
        .find(|endpoint| !capabilities.supports(*endpoint))
    {
        Some(endpoint) => Err(ReportError::MissingCapability {
            provider: provider.id(),
            endpoint,
        }),
        None => Ok(()),
    }
}

/// Single-symbol quote whose outcome is always per-symbol.
pub(crate) async fn quote_one(
    provider: &dyn QuoteProvider,
    symbol: &Symbol,
    stats: &mut FetchStats,
) -> QuoteOutcome {
    let outcome = match provider.quote(QuoteRequest::single(symbol.clone())).await {
        Ok(mut batch) => batch.take(symbol),
        Err(error) => QuoteOutcome::Failed(error),
    };
    match &outcome {
        QuoteOutcome::Failed(error) => {
            tracing::warn!(symbol = %symbol, error = %error, "quote failed");
            stats.record_failure(error);
        }
        QuoteOutcome::Found(_) | QuoteOutcome::NotFound => stats.record_success(),
    }
    outcome
}

/// Symbols left out of a watchlist report and why.
#[derive(Debug, Default)]
pub(crate) struct Skipped {
    entries: Vec<String>,
}

impl Skipped {
    pub(crate) fn not_found(&mut self, symbol: &Symbol) {
        self.entries.push(format!("{symbol} (not found)"));
    }

    pub(crate) fn failed(&mut self, symbol: &Symbol, reason: &str) {
        self.entries.push(format!("{symbol} ({reason})"));
    }

    pub(crate) fn note(&self) -> Option<String> {
        (!self.entries.is_empty()).then(|| format!("skipped: {}", self.entries.join(", ")))
    }
}
