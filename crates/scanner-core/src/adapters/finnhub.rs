use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::data_source::{
    CapabilitySet, ProviderFuture, QuoteBatch, QuoteOutcome, QuoteProvider, QuoteRequest,
    SourceError,
};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::pacing::Pacer;
use crate::{
    format_iso_date, parse_iso_date, DateRange, EarningsEvent, Metric52Week, ProviderId, Quote,
    RecommendationSnapshot, Symbol,
};

pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub REST adapter.
///
/// Every call, including each symbol of a quote batch, waits on the shared
/// [`Pacer`] first. The API key travels as the `token` query parameter and is
/// never logged.
pub struct FinnhubAdapter {
    http_client: Arc<dyn HttpClient>,
    pacer: Arc<dyn Pacer>,
    api_key: String,
    base_url: String,
    timeout_ms: u64,
}

impl FinnhubAdapter {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        pacer: Arc<dyn Pacer>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            pacer,
            api_key: api_key.into(),
            base_url: FINNHUB_BASE_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        self.pacer.wait().await;

        let mut request = HttpRequest::get(format!("{}/{path}", self.base_url))
            .with_timeout_ms(self.timeout_ms);
        for (name, value) in query {
            request = request.with_query(*name, value.clone());
        }
        request = request.with_query("token", self.api_key.clone());

        tracing::debug!(url = request.redacted_url(), "finnhub request");

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("finnhub transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(SourceError::from_status(ProviderId::Finnhub, response.status));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            SourceError::parse(format!("failed to parse finnhub {path} response: {e}"))
        })
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Option<Quote>, SourceError> {
        let payload: FinnhubQuote = self
            .get_json("quote", &[("symbol", symbol.as_str().to_owned())])
            .await?;
        Ok(payload.into_quote(symbol.clone()))
    }
}

impl QuoteProvider for FinnhubAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Finnhub
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> ProviderFuture<'a, QuoteBatch> {
        Box::pin(async move {
            if req.symbols.is_empty() {
                return Err(SourceError::invalid_request(
                    "finnhub quote request requires at least one symbol",
                ));
            }

            let mut entries = Vec::with_capacity(req.symbols.len());
            for symbol in req.symbols {
                let outcome = match self.fetch_quote(&symbol).await {
                    Ok(Some(quote)) => QuoteOutcome::Found(quote),
                    Ok(None) => QuoteOutcome::NotFound,
                    Err(error) => {
                        tracing::warn!(symbol = %symbol, error = %error, "finnhub quote failed");
                        QuoteOutcome::Failed(error)
                    }
                };
                entries.push((symbol, outcome));
            }

            Ok(QuoteBatch { entries })
        })
    }

    fn earnings_calendar<'a>(
        &'a self,
        range: DateRange,
    ) -> ProviderFuture<'a, Vec<EarningsEvent>> {
        Box::pin(async move {
            let payload: FinnhubCalendar = self
                .get_json(
                    "calendar/earnings",
                    &[
                        ("from", format_iso_date(range.from)),
                        ("to", format_iso_date(range.to)),
                    ],
                )
                .await?;

            let events = payload
                .earnings_calendar
                .into_iter()
                .filter_map(FinnhubEarning::into_event)
                .collect::<Vec<_>>();
            tracing::debug!(%range, events = events.len(), "finnhub earnings calendar");
            Ok(events)
        })
    }

    fn recommendation<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> ProviderFuture<'a, Option<RecommendationSnapshot>> {
        Box::pin(async move {
            let periods: Vec<FinnhubRecommendation> = self
                .get_json("stock/recommendation", &[("symbol", symbol.as_str().to_owned())])
                .await?;

            // Newest period first.
            Ok(periods
                .into_iter()
                .next()
                .map(|latest| latest.into_snapshot(symbol.clone())))
        })
    }

    fn metric_52week<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Metric52Week> {
        Box::pin(async move {
            let payload: FinnhubMetricResponse = self
                .get_json(
                    "stock/metric",
                    &[
                        ("symbol", symbol.as_str().to_owned()),
                        ("metric", "all".to_owned()),
                    ],
                )
                .await?;

            Ok(Metric52Week {
                symbol: symbol.clone(),
                week52_high: payload.metric.week52_high,
                week52_low: payload.metric.week52_low,
            })
        })
    }
}

#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    c: Option<f64>,
    d: Option<f64>,
    dp: Option<f64>,
    h: Option<f64>,
    l: Option<f64>,
    pc: Option<f64>,
}

impl FinnhubQuote {
    /// Finnhub answers unknown symbols with an all-zero quote.
    fn into_quote(self, symbol: Symbol) -> Option<Quote> {
        let price = self.c.filter(|price| *price != 0.0)?;
        Some(
            Quote {
                price: Some(price),
                previous_close: self.pc,
                change: self.d,
                change_percent: self.dp,
                day_high: self.h,
                day_low: self.l,
                ..Quote::new(symbol)
            }
            .fill_derived_change(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct FinnhubCalendar {
    #[serde(rename = "earningsCalendar", default)]
    earnings_calendar: Vec<FinnhubEarning>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinnhubEarning {
    symbol: String,
    date: String,
    eps_estimate: Option<f64>,
    eps_actual: Option<f64>,
    revenue_estimate: Option<f64>,
    revenue_actual: Option<f64>,
    hour: Option<String>,
    quarter: Option<u8>,
    year: Option<i32>,
}

impl FinnhubEarning {
    fn into_event(self) -> Option<EarningsEvent> {
        let symbol = Symbol::parse(&self.symbol)
            .map_err(|error| {
                tracing::debug!(symbol = %self.symbol, %error, "skipping calendar entry");
            })
            .ok()?;
        let date = parse_iso_date(&self.date)
            .map_err(|error| {
                tracing::debug!(symbol = %symbol, %error, "skipping calendar entry");
            })
            .ok()?;

        Some(EarningsEvent {
            eps_estimate: self.eps_estimate,
            eps_actual: self.eps_actual,
            revenue_estimate: self.revenue_estimate,
            revenue_actual: self.revenue_actual,
            hour: self.hour.filter(|hour| !hour.is_empty()),
            quarter: self.quarter,
            year: self.year,
            ..EarningsEvent::new(symbol, date)
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinnhubRecommendation {
    period: Option<String>,
    #[serde(default)]
    strong_buy: u32,
    #[serde(default)]
    buy: u32,
    #[serde(default)]
    hold: u32,
    #[serde(default)]
    sell: u32,
    #[serde(default)]
    strong_sell: u32,
}

impl FinnhubRecommendation {
    fn into_snapshot(self, symbol: Symbol) -> RecommendationSnapshot {
        RecommendationSnapshot {
            period: self.period,
            ..RecommendationSnapshot::new(
                symbol,
                self.strong_buy,
                self.buy,
                self.hold,
                self.sell,
                self.strong_sell,
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct FinnhubMetricResponse {
    #[serde(default)]
    metric: FinnhubMetric,
}

#[derive(Debug, Default, Deserialize)]
struct FinnhubMetric {
    #[serde(rename = "52WeekHigh")]
    week52_high: Option<f64>,
    #[serde(rename = "52WeekLow")]
    week52_low: Option<f64>,
}
