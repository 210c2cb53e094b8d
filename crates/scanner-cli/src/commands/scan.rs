use std::sync::Arc;

use scanner_core::{run_report, HttpClient, Report, ReportKind, Settings};
use time::Date;

use crate::error::CliError;

pub async fn run(
    kind: ReportKind,
    settings: &Settings,
    http_client: Arc<dyn HttpClient>,
    today: Date,
) -> Result<Report, CliError> {
    let provider = settings.report_provider(http_client)?;
    tracing::info!(
        report = %kind,
        symbols = settings.watchlist.len(),
        %today,
        "running watchlist scan"
    );
    Ok(run_report(kind, provider.as_ref(), &settings.watchlist, today).await?)
}
