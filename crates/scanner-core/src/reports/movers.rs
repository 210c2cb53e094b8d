use crate::analytics::range_position;
use crate::data_source::{QuoteOutcome, QuoteProvider};
use crate::report::{Cell, DeltaStyle, FetchStats, Report, Table};
use crate::reports::{quote_one, Skipped};
use crate::watchlist::Watchlist;
use crate::{Quote, ReportError, SecurityIds, Symbol};

pub const GAINERS_TITLE: &str = "top gainers";
pub const LOSERS_TITLE: &str = "top losers";
pub const MOVERS_HEADERS: [&str; 8] = [
    "SYM", "ISIN", "WKN", "PRICE", "HIGH", "LOW", "%", "52W POS",
];

const TOP_N: usize = 5;

struct Mover {
    symbol: Symbol,
    ids: SecurityIds,
    price: f64,
    change_percent: Option<f64>,
    day_high: Option<f64>,
    day_low: Option<f64>,
    position: Option<f64>,
}

impl Mover {
    fn sort_key(&self) -> f64 {
        self.change_percent.unwrap_or(0.0)
    }

    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::Symbol(self.symbol.clone()),
            Cell::text(self.ids.isin),
            Cell::text(self.ids.wkn),
            Cell::price(Some(self.price)),
            Cell::price(self.day_high),
            Cell::price(self.day_low),
            Cell::delta(self.change_percent, DeltaStyle::Percent),
            Cell::percent(self.position, 0),
        ]
    }
}

/// Top five gainers and losers of the watchlist by percent change.
///
/// Losers are listed most negative first. With fewer than ten priced symbols
/// the two tables overlap.
pub async fn movers_report(
    provider: &dyn QuoteProvider,
    watchlist: &Watchlist,
) -> Result<Report, ReportError> {
    tracing::info!(symbols = watchlist.len(), "movers: fetching quotes");

    let mut stats = FetchStats::default();
    let mut skipped = Skipped::default();
    let mut movers = Vec::with_capacity(watchlist.len());

    for entry in watchlist.entries() {
        let quote = match quote_one(provider, &entry.symbol, &mut stats).await {
            QuoteOutcome::Found(quote) if quote.price.is_some_and(|price| price != 0.0) => quote,
            QuoteOutcome::Found(_) | QuoteOutcome::NotFound => {
                skipped.not_found(&entry.symbol);
                continue;
            }
            QuoteOutcome::Failed(error) => {
                skipped.failed(&entry.symbol, error.message());
                continue;
            }
        };

        let position = week52_position(provider, &quote, &mut stats).await;
        movers.push(Mover {
            symbol: entry.symbol.clone(),
            ids: entry.ids,
            price: quote.price.unwrap_or_default(),
            change_percent: quote.change_percent,
            day_high: quote.day_high,
            day_low: quote.day_low,
            position,
        });
    }

    // Stable, so equal moves keep watchlist order.
    movers.sort_by(|a, b| b.sort_key().total_cmp(&a.sort_key()));

    let mut gainers = Table::new(GAINERS_TITLE, &MOVERS_HEADERS);
    for mover in movers.iter().take(TOP_N) {
        gainers.push_row(mover.row());
    }

    let mut losers = Table::new(LOSERS_TITLE, &MOVERS_HEADERS);
    for mover in movers.iter().rev().take(TOP_N) {
        losers.push_row(mover.row());
    }
    if let Some(note) = skipped.note() {
        losers.push_note(note);
    }

    tracing::info!(priced = movers.len(), "movers report built");
    Ok(Report {
        tables: vec![gainers, losers],
        stats,
    })
}

/// 52-week position, preferring range data already carried by the quote.
async fn week52_position(
    provider: &dyn QuoteProvider,
    quote: &Quote,
    stats: &mut FetchStats,
) -> Option<f64> {
    let (low, high) = match (quote.week52_low, quote.week52_high) {
        (Some(low), Some(high)) => (Some(low), Some(high)),
        _ => {
            let metric = provider.metric_52week(&quote.symbol).await;
            stats.record(&metric);
            match metric {
                Ok(metric) => (metric.week52_low, metric.week52_high),
                Err(error) => {
                    tracing::warn!(
                        symbol = %quote.symbol,
                        error = %error,
                        "52-week metric failed"
                    );
                    (None, None)
                }
            }
        }
    };
    range_position(quote.price, low, high)
}
