use time::Date;

use crate::data_source::{QuoteOutcome, QuoteProvider};
use crate::report::{Cell, DeltaStyle, FetchStats, Report, Table};
use crate::reports::quote_one;
use crate::watchlist::Watchlist;
use crate::{format_iso_date, DateRange, ReportError, SecurityIds};

pub const EARNINGS_TITLE: &str = "earnings catalyst  (±1 day)";
pub const EARNINGS_HEADERS: [&str; 9] = [
    "SYM", "ISIN", "WKN", "DATE", "PRICE", "%", "EPS EST", "EPS ACT", "SURPRISE",
];

/// Days on either side of `today` covered by the calendar query.
const WINDOW_DAYS: i64 = 1;

/// Companies reporting within a day of `today`, each joined with a live quote
/// for the post-earnings move.
///
/// Entries keep calendar order. A failed quote only blanks that row's price.
///
/// # Errors
///
/// [`ReportError::Upstream`] when the calendar itself cannot be fetched.
pub async fn earnings_report(
    provider: &dyn QuoteProvider,
    watchlist: &Watchlist,
    today: Date,
) -> Result<Report, ReportError> {
    let range = DateRange::around(today, WINDOW_DAYS);
    let mut stats = FetchStats::default();

    let calendar = provider.earnings_calendar(range).await;
    stats.record(&calendar);
    let events = calendar.map_err(|source| ReportError::Upstream {
        report: "earnings",
        source,
    })?;
    tracing::info!(%range, events = events.len(), "earnings calendar fetched");

    let mut table = Table::new(EARNINGS_TITLE, &EARNINGS_HEADERS);
    for event in events {
        let (price, change_percent) = match quote_one(provider, &event.symbol, &mut stats).await {
            QuoteOutcome::Found(quote) => (quote.price, quote.change_percent),
            QuoteOutcome::NotFound | QuoteOutcome::Failed(_) => (None, None),
        };

        // Identifiers are only shown for rows with a live price.
        let ids = if price.is_some_and(|price| price != 0.0) {
            watchlist.ids_for(&event.symbol)
        } else {
            SecurityIds::PLACEHOLDER
        };
        let surprise = event.eps_surprise();

        table.push_row(vec![
            Cell::Symbol(event.symbol),
            Cell::text(ids.isin),
            Cell::text(ids.wkn),
            Cell::text(format_iso_date(event.date)),
            Cell::money(price),
            Cell::delta(change_percent, DeltaStyle::Percent),
            Cell::decimal(event.eps_estimate, 2),
            Cell::decimal(event.eps_actual, 2),
            Cell::delta(surprise, DeltaStyle::Signed),
        ]);
    }

    Ok(Report::single(table, stats))
}
