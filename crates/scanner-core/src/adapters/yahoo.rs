use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::data_source::{
    CapabilitySet, ProviderFuture, QuoteBatch, QuoteOutcome, QuoteProvider, QuoteRequest,
    SourceError,
};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{Metric52Week, ProviderId, Quote, Symbol};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const REFERER: &str = "https://finance.yahoo.com/";
const MAX_CRUMB_LEN: usize = 100;

/// How the Yahoo quote endpoint is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YahooAuthMode {
    /// Seed a session cookie, fetch a crumb, send both with every quote call.
    #[default]
    CookieCrumb,
    /// Plain request without session or crumb.
    Anonymous,
}

// ============================================================================
// Yahoo Session - cookie/crumb handshake
// ============================================================================

/// Authenticated Yahoo session.
///
/// Yahoo's unofficial API requires:
/// 1. Session cookie from fc.yahoo.com (kept in the HTTP client's cookie jar)
/// 2. Crumb token from query1 (or query2) `/v1/test/getcrumb`
///
/// A session lives as long as the adapter that acquired it and is never
/// written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YahooSession {
    crumb: String,
}

impl YahooSession {
    /// Runs both handshake phases.
    pub async fn acquire(
        http_client: &dyn HttpClient,
        timeout_ms: u64,
    ) -> Result<Self, SourceError> {
        // Phase 1: the response status does not matter, only the Set-Cookie.
        let cookie_request = HttpRequest::get(COOKIE_URL)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);
        http_client.execute(cookie_request).await.map_err(|e| {
            SourceError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
        })?;

        // Phase 2: crumb, trying the mirror host when the first one misbehaves.
        let mut last_error =
            SourceError::unavailable("failed to fetch Yahoo crumb from all endpoints");
        for endpoint in CRUMB_URLS {
            let crumb_request = HttpRequest::get(endpoint)
                .with_header("referer", REFERER)
                .with_timeout_ms(timeout_ms);

            let response = match http_client.execute(crumb_request).await {
                Ok(response) => response,
                Err(error) => {
                    last_error = SourceError::unavailable(format!(
                        "failed to fetch Yahoo crumb: {}",
                        error.message()
                    ));
                    continue;
                }
            };

            let body = response.body.trim();
            if body.to_ascii_lowercase().contains("too many requests") || response.status == 429 {
                return Err(SourceError::rate_limited(
                    "Yahoo rate limited while fetching crumb",
                ));
            }
            if !response.is_success() {
                last_error = SourceError::from_status(ProviderId::Yahoo, response.status);
                continue;
            }
            if let Some(crumb) = validate_crumb(body) {
                tracing::debug!(endpoint, "acquired Yahoo session crumb");
                return Ok(Self {
                    crumb: crumb.to_owned(),
                });
            }
        }

        Err(last_error)
    }

    pub fn crumb(&self) -> &str {
        &self.crumb
    }
}

fn validate_crumb(body: &str) -> Option<&str> {
    if body.is_empty() || body.len() > MAX_CRUMB_LEN {
        return None;
    }
    if body.contains("<html") || body.contains("<!DOCTYPE") {
        return None;
    }
    if body.chars().any(char::is_whitespace) {
        return None;
    }
    Some(body)
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance quote adapter. All symbols go out in a single batched call.
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth_mode: YahooAuthMode,
    session: OnceCell<YahooSession>,
    timeout_ms: u64,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, auth_mode: YahooAuthMode) -> Self {
        Self {
            http_client,
            auth_mode,
            session: OnceCell::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns the session of this adapter, acquiring it on first use.
    async fn session(&self) -> Result<&YahooSession, SourceError> {
        self.session
            .get_or_try_init(|| YahooSession::acquire(self.http_client.as_ref(), self.timeout_ms))
            .await
    }

    async fn fetch_quotes(&self, symbols: &[Symbol]) -> Result<Vec<Quote>, SourceError> {
        let symbols_param = symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut request = HttpRequest::get(QUOTE_URL)
            .with_query("symbols", symbols_param)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);

        if self.auth_mode == YahooAuthMode::CookieCrumb {
            let session = self.session().await?;
            request = request.with_query("crumb", session.crumb());
        }

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(SourceError::from_status(ProviderId::Yahoo, response.status));
        }

        parse_quote_response(&response.body)
    }
}

impl QuoteProvider for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(true, false, false, true)
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> ProviderFuture<'a, QuoteBatch> {
        Box::pin(async move {
            if req.symbols.is_empty() {
                return Err(SourceError::invalid_request(
                    "yahoo quote request requires at least one symbol",
                ));
            }

            let entries = match self.fetch_quotes(&req.symbols).await {
                Ok(quotes) => {
                    let by_symbol = quotes
                        .into_iter()
                        .map(|quote| (quote.symbol.clone(), quote))
                        .collect::<HashMap<_, _>>();
                    req.symbols
                        .into_iter()
                        .map(|symbol| {
                            // A symbol may be requested more than once.
                            let outcome = match by_symbol.get(&symbol) {
                                Some(quote) => QuoteOutcome::Found(quote.clone()),
                                None => QuoteOutcome::NotFound,
                            };
                            (symbol, outcome)
                        })
                        .collect()
                }
                Err(error) => {
                    tracing::warn!(
                        symbols = req.symbols.len(),
                        error = %error,
                        "yahoo quote batch failed"
                    );
                    req.symbols
                        .into_iter()
                        .map(|symbol| (symbol, QuoteOutcome::Failed(error.clone())))
                        .collect()
                }
            };

            Ok(QuoteBatch { entries })
        })
    }

    fn metric_52week<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Metric52Week> {
        Box::pin(async move {
            let mut batch = self.quote(QuoteRequest::single(symbol.clone())).await?;
            match batch.take(symbol) {
                QuoteOutcome::Found(quote) => Ok(quote.week52()),
                QuoteOutcome::NotFound => Err(SourceError::not_found(format!(
                    "yahoo has no quote for {symbol}"
                ))),
                QuoteOutcome::Failed(error) => Err(error),
            }
        })
    }
}

fn parse_quote_response(body: &str) -> Result<Vec<Quote>, SourceError> {
    let yahoo_response: YahooQuoteResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::parse(format!("failed to parse yahoo response: {e}")))?;

    if let Some(error) = yahoo_response.quote_response.error.filter(|e| !e.is_null()) {
        return Err(SourceError::unavailable(format!("yahoo API error: {error}")));
    }

    let quotes = yahoo_response
        .quote_response
        .result
        .into_iter()
        .filter_map(|data| {
            let symbol = match Symbol::parse(&data.symbol) {
                Ok(symbol) => symbol,
                Err(error) => {
                    tracing::debug!(
                        symbol = %data.symbol,
                        %error,
                        "skipping unparseable yahoo symbol"
                    );
                    return None;
                }
            };
            Some(data.into_quote(symbol))
        })
        .collect();

    Ok(quotes)
}

// Yahoo Finance API response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteResponseData {
    #[serde(default)]
    result: Vec<YahooQuoteData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteData {
    symbol: String,
    regular_market_price: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    currency: Option<String>,
    market_state: Option<String>,
    quote_type: Option<String>,
}

impl YahooQuoteData {
    fn into_quote(self, symbol: Symbol) -> Quote {
        Quote {
            price: self.regular_market_price,
            previous_close: self.regular_market_previous_close,
            change: self.regular_market_change,
            change_percent: self.regular_market_change_percent,
            day_high: self.regular_market_day_high,
            day_low: self.regular_market_day_low,
            week52_high: self.fifty_two_week_high,
            week52_low: self.fifty_two_week_low,
            currency: self.currency,
            market_state: self.market_state,
            quote_type: self.quote_type,
            ..Quote::new(symbol)
        }
        .fill_derived_change()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{Endpoint, SourceErrorKind};
    use crate::http_client::{HttpError, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Replays responses keyed by URL (without query) and records requests.
    #[derive(Default)]
    struct RecordingHttpClient {
        routes: HashMap<String, Result<HttpResponse, HttpError>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn route(mut self, url: &str, response: Result<HttpResponse, HttpError>) -> Self {
            self.routes.insert(url.to_owned(), response);
            self
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self
                .routes
                .get(&request.url)
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "")));
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            Box::pin(async move { response })
        }
    }

    const QUOTE_BODY: &str = r#"{"quoteResponse":{"result":[
        {"symbol":"AAPL","regularMarketPrice":190.5,"regularMarketPreviousClose":188.0,
         "regularMarketChange":2.5,"regularMarketChangePercent":1.33,"currency":"USD",
         "marketState":"REGULAR","quoteType":"EQUITY","fiftyTwoWeekHigh":199.6,"fiftyTwoWeekLow":164.1},
        {"symbol":"EURUSD=X","regularMarketPrice":1.08,"regularMarketPreviousClose":1.1,
         "currency":"USD","marketState":"REGULAR","quoteType":"CURRENCY"}
    ],"error":null}}"#;

    fn sym(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    fn handshake_client() -> RecordingHttpClient {
        RecordingHttpClient::default()
            .route(COOKIE_URL, Ok(HttpResponse::with_status(404, "")))
            .route(CRUMB_URLS[0], Ok(HttpResponse::ok_json("abcCRUMB123")))
            .route(QUOTE_URL, Ok(HttpResponse::ok_json(QUOTE_BODY)))
    }

    #[tokio::test]
    async fn quote_runs_handshake_then_sends_crumb() {
        let client = Arc::new(handshake_client());
        let adapter = YahooAdapter::new(client.clone(), YahooAuthMode::CookieCrumb);
        let request = QuoteRequest::new(vec![sym("aapl"), sym("EURUSD=X"), sym("ZZZZ")])
            .expect("valid request");

        let batch = adapter.quote(request).await.expect("batch");

        assert_eq!(
            client.recorded_urls(),
            vec![COOKIE_URL, CRUMB_URLS[0], QUOTE_URL]
        );
        let quote_call = client.recorded_requests().pop().expect("quote call");
        assert_eq!(quote_call.query_value("crumb"), Some("abcCRUMB123"));
        assert_eq!(quote_call.query_value("symbols"), Some("AAPL,EURUSD=X,ZZZZ"));

        let aapl = batch.get(&sym("AAPL")).and_then(QuoteOutcome::quote).expect("AAPL");
        assert_eq!(aapl.price, Some(190.5));
        assert_eq!(aapl.change, Some(2.5));
        assert_eq!(aapl.market_state.as_deref(), Some("REGULAR"));

        let fx = batch.get(&sym("EURUSD=X")).and_then(QuoteOutcome::quote).expect("fx");
        let change = fx.change.expect("derived change");
        assert!((change - (1.08 - 1.1)).abs() < 1e-12);

        assert_eq!(batch.get(&sym("ZZZZ")), Some(&QuoteOutcome::NotFound));
    }

    #[tokio::test]
    async fn repeated_symbol_is_answered_for_every_occurrence() {
        let client = Arc::new(handshake_client());
        let adapter = YahooAdapter::new(client, YahooAuthMode::Anonymous);
        let request =
            QuoteRequest::new(vec![sym("AAPL"), sym("aapl")]).expect("valid request");

        let batch = adapter.quote(request).await.expect("batch");

        assert_eq!(batch.entries.len(), 2);
        for (symbol, outcome) in &batch.entries {
            assert_eq!(symbol.as_str(), "AAPL");
            assert_eq!(outcome.quote().and_then(|quote| quote.price), Some(190.5));
        }
    }

    #[test]
    fn crumb_length_limit_is_inclusive() {
        let at_limit = "a".repeat(MAX_CRUMB_LEN);
        assert_eq!(validate_crumb(&at_limit), Some(at_limit.as_str()));
        assert_eq!(validate_crumb(&"a".repeat(MAX_CRUMB_LEN + 1)), None);
        assert_eq!(validate_crumb(""), None);
        assert_eq!(validate_crumb("<html>"), None);
    }

    #[tokio::test]
    async fn session_is_reused_across_calls() {
        let client = Arc::new(handshake_client());
        let adapter = YahooAdapter::new(client.clone(), YahooAuthMode::CookieCrumb);

        for raw in ["AAPL", "MSFT"] {
            adapter
                .quote(QuoteRequest::single(sym(raw)))
                .await
                .expect("batch");
        }

        let crumb_calls = client
            .recorded_urls()
            .into_iter()
            .filter(|url| url.contains("getcrumb"))
            .count();
        assert_eq!(crumb_calls, 1);
    }

    #[tokio::test]
    async fn crumb_falls_back_to_second_host_when_first_returns_html() {
        let client = Arc::new(
            RecordingHttpClient::default()
                .route(CRUMB_URLS[0], Ok(HttpResponse::ok_json("<html>consent</html>")))
                .route(CRUMB_URLS[1], Ok(HttpResponse::ok_json("second-crumb")))
                .route(QUOTE_URL, Ok(HttpResponse::ok_json(QUOTE_BODY))),
        );

        let session = YahooSession::acquire(client.as_ref(), 1_000)
            .await
            .expect("session");
        assert_eq!(session.crumb(), "second-crumb");
    }

    #[tokio::test]
    async fn crumb_rate_limit_is_reported() {
        let client = RecordingHttpClient::default()
            .route(CRUMB_URLS[0], Ok(HttpResponse::with_status(429, "Too Many Requests")));

        let error = YahooSession::acquire(&client, 1_000).await.expect_err("rate limited");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn anonymous_mode_skips_handshake() {
        let client = Arc::new(handshake_client());
        let adapter = YahooAdapter::new(client.clone(), YahooAuthMode::Anonymous);

        adapter
            .quote(QuoteRequest::single(sym("AAPL")))
            .await
            .expect("batch");

        assert_eq!(client.recorded_urls(), vec![QUOTE_URL]);
        assert_eq!(client.recorded_requests()[0].query_value("crumb"), None);
    }

    #[tokio::test]
    async fn transport_failure_marks_every_symbol_failed() {
        let client = Arc::new(
            RecordingHttpClient::default()
                .route(QUOTE_URL, Err(HttpError::new("request timeout"))),
        );
        let adapter = YahooAdapter::new(client, YahooAuthMode::Anonymous);
        let request = QuoteRequest::new(vec![sym("AAPL"), sym("MSFT")]).expect("valid request");

        let batch = adapter.quote(request).await.expect("batch never fails as a whole");

        assert_eq!(batch.entries.len(), 2);
        for (_, outcome) in &batch.entries {
            match outcome {
                QuoteOutcome::Failed(error) => {
                    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
                    assert!(error.is_transport());
                }
                other => panic!("expected failure, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn metric_comes_from_quote_fields() {
        let client = Arc::new(handshake_client());
        let adapter = YahooAdapter::new(client, YahooAuthMode::CookieCrumb);

        let metric = adapter.metric_52week(&sym("AAPL")).await.expect("metric");
        assert_eq!(metric.week52_high, Some(199.6));
        assert_eq!(metric.week52_low, Some(164.1));

        let missing = adapter
            .metric_52week(&sym("ZZZZ"))
            .await
            .expect_err("unknown symbol");
        assert_eq!(missing.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn unsupported_endpoints_are_rejected() {
        let adapter = YahooAdapter::new(
            Arc::new(RecordingHttpClient::default()),
            YahooAuthMode::Anonymous,
        );
        assert!(!adapter.capabilities().supports(Endpoint::Recommendation));

        let error = adapter
            .recommendation(&sym("AAPL"))
            .await
            .expect_err("unsupported");
        assert_eq!(error.kind(), SourceErrorKind::UnsupportedEndpoint);
    }
}
