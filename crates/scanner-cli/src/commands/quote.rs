use std::sync::Arc;

use scanner_core::{quote_report, HttpClient, Report, Settings, Symbol};

use crate::cli::QuoteArgs;
use crate::error::CliError;

pub async fn run(
    args: &QuoteArgs,
    settings: &Settings,
    http_client: Arc<dyn HttpClient>,
) -> Result<Report, CliError> {
    let symbols = args
        .symbols
        .iter()
        .map(|raw| Symbol::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let provider = settings.quote_provider(http_client)?;
    tracing::debug!(
        provider = %provider.id(),
        symbols = symbols.len(),
        "running quote command"
    );
    Ok(quote_report(provider.as_ref(), symbols).await?)
}
