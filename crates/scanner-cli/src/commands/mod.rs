mod quote;
mod scan;

use std::sync::Arc;

use scanner_core::{HttpClient, ProviderId, Report, ReportKind, ReqwestHttpClient, Settings};
use time::{Date, OffsetDateTime};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let settings = Settings::from_env()?;

    match &cli.command {
        Command::Quote(args) => {
            let http_client = connect(&settings, settings.quote_provider)?;
            quote::run(args, &settings, http_client).await
        }
        Command::Earnings => run_scan(ReportKind::Earnings, &settings).await,
        Command::Movers => run_scan(ReportKind::Movers, &settings).await,
        Command::Conviction => run_scan(ReportKind::Conviction, &settings).await,
        Command::All => run_scan(ReportKind::All, &settings).await,
    }
}

async fn run_scan(kind: ReportKind, settings: &Settings) -> Result<Report, CliError> {
    let http_client = connect(settings, ProviderId::Finnhub)?;
    scan::run(kind, settings, http_client, today()).await
}

/// Checks credentials for `provider` before any HTTP client is built.
fn connect(settings: &Settings, provider: ProviderId) -> Result<Arc<dyn HttpClient>, CliError> {
    settings.ensure_credentials(provider)?;
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    Ok(http_client)
}

/// Local calendar date, falling back to UTC when the offset is unknown.
fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
