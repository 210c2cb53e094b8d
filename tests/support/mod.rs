//! Shared fixtures for the behavior tests: a scripted HTTP transport and
//! small payload builders for Yahoo and Finnhub.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scanner_core::{
    FinnhubAdapter, HttpClient, HttpError, HttpRequest, HttpResponse, Pacing, Settings, Symbol,
    Watchlist, FINNHUB_BASE_URL,
};

pub const YAHOO_COOKIE: &str = "https://fc.yahoo.com";
pub const YAHOO_CRUMB_1: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
pub const YAHOO_CRUMB_2: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";
pub const YAHOO_QUOTE: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

/// HTTP transport answering from a prefix-matched route table.
///
/// Routes are checked in insertion order, so register specific prefixes
/// before general ones. Unrouted requests fail as transport errors.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: impl Into<String>, response: HttpResponse) -> Self {
        self.routes.push((prefix.into(), Ok(response)));
        self
    }

    pub fn json(self, prefix: impl Into<String>, body: &str) -> Self {
        self.respond(prefix, HttpResponse::ok_json(body))
    }

    pub fn fail(mut self, prefix: impl Into<String>, message: &str) -> Self {
        self.routes
            .push((prefix.into(), Err(HttpError::new(message.to_owned()))));
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(HttpRequest::full_url)
            .collect()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.urls()
            .iter()
            .filter(|url| url.starts_with(prefix))
            .count()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let url = request.full_url();
            self.requests
                .lock()
                .expect("requests lock")
                .push(request);
            self.routes
                .iter()
                .find(|(prefix, _)| url.starts_with(prefix.as_str()))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Err(HttpError::new(format!("connection refused: {url}"))))
        })
    }
}

pub fn sym(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

pub fn watchlist(raws: &[&str]) -> Watchlist {
    Watchlist::with_symbols(raws.iter().map(|raw| sym(raw)))
}

pub fn finnhub_url(path: &str) -> String {
    format!("{FINNHUB_BASE_URL}/{path}")
}

/// Settings as loaded from an environment holding only `pairs`.
pub fn settings_from(pairs: &[(&str, &str)]) -> Settings {
    try_settings_from(pairs).expect("valid settings")
}

pub fn try_settings_from(
    pairs: &[(&str, &str)],
) -> Result<Settings, scanner_core::ConfigError> {
    let pairs = pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect::<Vec<_>>();
    Settings::from_lookup(move |name| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    })
}

/// Finnhub adapter with pacing switched off.
pub fn finnhub(http: Arc<ScriptedHttpClient>) -> FinnhubAdapter {
    FinnhubAdapter::new(http, Pacing::FixedInterval(Duration::ZERO).build(), "test-key")
}

pub fn finnhub_quote(price: f64, change_percent: f64) -> String {
    format!(
        r#"{{"c":{price},"d":0.0,"dp":{change_percent},"h":{high},"l":{low},"o":{price},"pc":{price}}}"#,
        high = price + 1.0,
        low = price - 1.0,
    )
}

pub fn finnhub_metric(low: f64, high: f64) -> String {
    format!(r#"{{"metric":{{"52WeekHigh":{high},"52WeekLow":{low}}}}}"#)
}

pub fn finnhub_rating(strong_buy: u32, buy: u32, hold: u32, sell: u32, strong_sell: u32) -> String {
    format!(
        r#"[{{"period":"2024-05-01","strongBuy":{strong_buy},"buy":{buy},"hold":{hold},"sell":{sell},"strongSell":{strong_sell}}},
            {{"period":"2024-04-01","strongBuy":0,"buy":0,"hold":9,"sell":0,"strongSell":0}}]"#
    )
}

pub fn yahoo_quotes(rows: &[(&str, f64, f64)]) -> String {
    let rows = rows
        .iter()
        .map(|(symbol, price, change_percent)| {
            format!(
                r#"{{"symbol":"{symbol}","regularMarketPrice":{price},"regularMarketChangePercent":{change_percent},"currency":"USD","marketState":"REGULAR","quoteType":"EQUITY"}}"#
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"quoteResponse":{{"result":[{rows}],"error":null}}}}"#)
}
