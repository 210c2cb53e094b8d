use crate::analytics::{conviction_score, discount_from_high, RatingMix};
use crate::data_source::{QuoteOutcome, QuoteProvider};
use crate::report::{Cell, FetchStats, Report, Table, Tone};
use crate::reports::{quote_one, Skipped};
use crate::watchlist::Watchlist;
use crate::{ReportError, SecurityIds, Symbol};

pub const CONVICTION_TITLE: &str = "analyst conviction  (top 10)";
pub const CONVICTION_HEADERS: [&str; 9] = [
    "SYM", "ISIN", "WKN", "PRICE", "BUY%", "HOLD%", "SELL%", "↓52W", "SCORE",
];

const TOP_N: usize = 10;

struct Candidate {
    symbol: Symbol,
    ids: SecurityIds,
    price: f64,
    mix: RatingMix,
    discount: Option<f64>,
    score: f64,
}

/// Watchlist members ranked by buy consensus times pullback from the 52-week
/// high. Symbols without ratings or without a price are left out.
pub async fn conviction_report(
    provider: &dyn QuoteProvider,
    watchlist: &Watchlist,
) -> Result<Report, ReportError> {
    tracing::info!(symbols = watchlist.len(), "conviction: fetching recommendations");

    let mut stats = FetchStats::default();
    let mut skipped = Skipped::default();
    let mut candidates = Vec::new();

    for entry in watchlist.entries() {
        let symbol = &entry.symbol;

        let recommendation = provider.recommendation(symbol).await;
        stats.record(&recommendation);
        let mix = match recommendation {
            Ok(Some(snapshot)) => match RatingMix::from_snapshot(&snapshot) {
                Some(mix) => mix,
                None => continue,
            },
            Ok(None) => continue,
            Err(error) => {
                tracing::warn!(symbol = %symbol, error = %error, "recommendation failed");
                skipped.failed(symbol, error.message());
                continue;
            }
        };

        let price = match quote_one(provider, symbol, &mut stats).await {
            QuoteOutcome::Found(quote) => match quote.price.filter(|price| *price != 0.0) {
                Some(price) => price,
                None => continue,
            },
            QuoteOutcome::NotFound => continue,
            QuoteOutcome::Failed(error) => {
                skipped.failed(symbol, error.message());
                continue;
            }
        };

        let metric = provider.metric_52week(symbol).await;
        stats.record(&metric);
        let high = match metric {
            Ok(metric) => metric.week52_high,
            Err(error) => {
                tracing::warn!(symbol = %symbol, error = %error, "52-week metric failed");
                None
            }
        };

        let discount = discount_from_high(Some(price), high);
        candidates.push(Candidate {
            symbol: symbol.clone(),
            ids: entry.ids,
            price,
            score: conviction_score(Some(mix.buy_pct), discount),
            mix,
            discount,
        });
    }

    // Stable, so ties keep watchlist order.
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut table = Table::new(CONVICTION_TITLE, &CONVICTION_HEADERS);
    for candidate in candidates.iter().take(TOP_N) {
        table.push_row(vec![
            Cell::Symbol(candidate.symbol.clone()),
            Cell::text(candidate.ids.isin),
            Cell::text(candidate.ids.wkn),
            Cell::price(Some(candidate.price)),
            Cell::percent(Some(candidate.mix.buy_pct), 0).tinted(Tone::Positive),
            Cell::percent(Some(candidate.mix.hold_pct), 0),
            Cell::percent(Some(candidate.mix.sell_pct), 0).tinted(Tone::Negative),
            Cell::percent(candidate.discount, 1),
            Cell::decimal(Some(candidate.score), 1),
        ]);
    }
    if let Some(note) = skipped.note() {
        table.push_note(note);
    }

    tracing::info!(ranked = candidates.len(), "conviction report built");
    Ok(Report::single(table, stats))
}
