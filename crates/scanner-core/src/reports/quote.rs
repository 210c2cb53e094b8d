use crate::data_source::{QuoteOutcome, QuoteProvider, QuoteRequest};
use crate::report::{Cell, DeltaStyle, FetchStats, Report, Table};
use crate::{Quote, ReportError, Symbol};

pub const QUOTE_TITLE: &str = "quotes";
pub const QUOTE_HEADERS: [&str; 7] = ["SYM", "PRICE", "CCY", "CHG", "%", "STATE", "TYPE"];

/// One row per requested symbol, in request order.
///
/// # Errors
///
/// [`ReportError::NoSymbols`] for an empty list, [`ReportError::Upstream`] when
/// the provider rejects the request as a whole.
pub async fn quote_report(
    provider: &dyn QuoteProvider,
    symbols: Vec<Symbol>,
) -> Result<Report, ReportError> {
    if symbols.is_empty() {
        return Err(ReportError::NoSymbols);
    }

    let request = QuoteRequest { symbols };
    let batch = provider
        .quote(request)
        .await
        .map_err(|source| ReportError::Upstream {
            report: "quote",
            source,
        })?;

    let mut stats = FetchStats::default();
    let mut table = Table::new(QUOTE_TITLE, &QUOTE_HEADERS);
    for (symbol, outcome) in batch.entries {
        let row = match outcome {
            QuoteOutcome::Found(quote) => {
                stats.record_success();
                found_row(quote)
            }
            QuoteOutcome::NotFound => {
                stats.record_success();
                vec![
                    Cell::Symbol(symbol),
                    Cell::text("N/A"),
                    Cell::Placeholder,
                    Cell::Placeholder,
                    Cell::Placeholder,
                    Cell::Placeholder,
                    Cell::text("symbol not found"),
                ]
            }
            QuoteOutcome::Failed(error) => {
                stats.record_failure(&error);
                vec![
                    Cell::Symbol(symbol),
                    Cell::Error(String::from("error")),
                    Cell::Placeholder,
                    Cell::Placeholder,
                    Cell::Placeholder,
                    Cell::Placeholder,
                    Cell::error(&error),
                ]
            }
        };
        table.push_row(row);
    }

    tracing::info!(
        rows = table.rows.len(),
        failures = stats.transport_failures,
        "quote report built"
    );
    Ok(Report::single(table, stats))
}

fn found_row(quote: Quote) -> Vec<Cell> {
    vec![
        Cell::Symbol(quote.symbol),
        Cell::price(quote.price),
        Cell::optional_text(quote.currency.as_deref()),
        Cell::delta(quote.change, DeltaStyle::Arrow),
        Cell::delta(quote.change_percent, DeltaStyle::Percent),
        Cell::optional_text(quote.market_state.as_deref()),
        Cell::optional_text(quote.quote_type.as_deref()),
    ]
}
