//! Contract tests for the provider adapters
//!
//! These tests drive the real Yahoo and Finnhub adapters over a scripted
//! transport and check what every provider promises: one outcome per
//! requested symbol in request order, honest capability sets, and error kinds
//! that tell transport trouble apart from bad data.

mod support;

use scanner_core::{
    DateRange, Endpoint, HttpResponse, ProviderId, QuoteOutcome, QuoteProvider, QuoteRequest,
    SourceErrorKind, YahooAdapter, YahooAuthMode,
};
use support::{
    finnhub, finnhub_metric, finnhub_quote, finnhub_rating, finnhub_url, sym, yahoo_quotes,
    ScriptedHttpClient, YAHOO_COOKIE, YAHOO_CRUMB_1, YAHOO_CRUMB_2, YAHOO_QUOTE,
};
use time::macros::date;

// =============================================================================
// Capabilities
// =============================================================================

#[test]
fn yahoo_advertises_quotes_and_ranges_only() {
    let adapter = YahooAdapter::new(ScriptedHttpClient::new().into_arc(), YahooAuthMode::default());
    let capabilities = adapter.capabilities();

    assert_eq!(adapter.id(), ProviderId::Yahoo);
    assert!(capabilities.supports(Endpoint::Quote));
    assert!(capabilities.supports(Endpoint::Metric52Week));
    assert!(!capabilities.supports(Endpoint::EarningsCalendar));
    assert!(!capabilities.supports(Endpoint::Recommendation));
}

#[test]
fn finnhub_advertises_every_endpoint() {
    let adapter = finnhub(ScriptedHttpClient::new().into_arc());

    assert_eq!(adapter.id(), ProviderId::Finnhub);
    for endpoint in [
        Endpoint::Quote,
        Endpoint::EarningsCalendar,
        Endpoint::Recommendation,
        Endpoint::Metric52Week,
    ] {
        assert!(adapter.capabilities().supports(endpoint), "{endpoint}");
    }
}

#[tokio::test]
async fn unsupported_endpoint_is_refused_without_a_request() {
    let http = ScriptedHttpClient::new().into_arc();
    let adapter = YahooAdapter::new(http.clone(), YahooAuthMode::Anonymous);

    let error = adapter
        .recommendation(&sym("AAPL"))
        .await
        .expect_err("yahoo has no recommendations");

    assert_eq!(error.kind(), SourceErrorKind::UnsupportedEndpoint);
    assert!(http.requests().is_empty());
}

// =============================================================================
// Yahoo: session handshake and batched quotes
// =============================================================================

#[tokio::test]
async fn when_yahoo_is_asked_twice_the_handshake_runs_once() {
    // Given: a transport that hands out a cookie, a crumb and quotes
    let http = ScriptedHttpClient::new()
        .respond(YAHOO_COOKIE, HttpResponse::with_status(404, ""))
        .json(YAHOO_CRUMB_1, "abcCrumb9")
        .json(YAHOO_QUOTE, &yahoo_quotes(&[("AAPL", 190.5, 0.8)]))
        .into_arc();
    let adapter = YahooAdapter::new(http.clone(), YahooAuthMode::CookieCrumb);

    // When: two quote calls go through the same adapter
    for _ in 0..2 {
        adapter
            .quote(QuoteRequest::single(sym("AAPL")))
            .await
            .expect("batch");
    }

    // Then: cookie and crumb were fetched once, and both quote calls carry the crumb
    assert_eq!(http.count_prefix(YAHOO_COOKIE), 1);
    assert_eq!(http.count_prefix(YAHOO_CRUMB_1), 1);
    let quote_calls = http
        .requests()
        .into_iter()
        .filter(|request| request.url == YAHOO_QUOTE)
        .collect::<Vec<_>>();
    assert_eq!(quote_calls.len(), 2);
    assert!(quote_calls
        .iter()
        .all(|request| request.query_value("crumb") == Some("abcCrumb9")));
}

#[tokio::test]
async fn when_the_first_crumb_host_serves_html_the_mirror_is_used() {
    let http = ScriptedHttpClient::new()
        .json(YAHOO_COOKIE, "")
        .json(YAHOO_CRUMB_1, "<html><body>consent</body></html>")
        .json(YAHOO_CRUMB_2, "mirrorCrumb")
        .json(YAHOO_QUOTE, &yahoo_quotes(&[("AAPL", 190.5, 0.8)]))
        .into_arc();
    let adapter = YahooAdapter::new(http.clone(), YahooAuthMode::CookieCrumb);

    adapter
        .quote(QuoteRequest::single(sym("AAPL")))
        .await
        .expect("batch");

    let quote_call = http
        .requests()
        .into_iter()
        .find(|request| request.url == YAHOO_QUOTE)
        .expect("quote call");
    assert_eq!(quote_call.query_value("crumb"), Some("mirrorCrumb"));
}

#[tokio::test]
async fn yahoo_batch_keeps_request_order_and_flags_unknown_symbols() {
    // Yahoo returns rows in its own order and silently drops unknown symbols.
    let http = ScriptedHttpClient::new()
        .json(
            YAHOO_QUOTE,
            &yahoo_quotes(&[("GOOG", 170.0, -0.4), ("AAPL", 190.5, 0.8)]),
        )
        .into_arc();
    let adapter = YahooAdapter::new(http.clone(), YahooAuthMode::Anonymous);

    let request = QuoteRequest::new(vec![sym("AAPL"), sym("NOPE"), sym("GOOG")]).expect("request");
    let batch = adapter.quote(request).await.expect("batch");

    let order = batch
        .entries
        .iter()
        .map(|(symbol, _)| symbol.as_str())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["AAPL", "NOPE", "GOOG"]);
    assert_eq!(batch.get(&sym("NOPE")), Some(&QuoteOutcome::NotFound));
    assert_eq!(
        batch
            .get(&sym("GOOG"))
            .and_then(QuoteOutcome::quote)
            .and_then(|quote| quote.price),
        Some(170.0)
    );
    assert_eq!(http.requests().len(), 1);
    assert_eq!(
        http.requests()[0].query_value("symbols"),
        Some("AAPL,NOPE,GOOG")
    );
}

#[tokio::test]
async fn repeated_symbols_get_an_answer_from_every_provider() {
    // Given: the same ticker typed twice in different cases
    let http = ScriptedHttpClient::new()
        .json(YAHOO_QUOTE, &yahoo_quotes(&[("AAPL", 190.5, 0.8)]))
        .json(finnhub_url("quote?symbol=AAPL"), &finnhub_quote(190.5, 0.8))
        .into_arc();
    let yahoo = YahooAdapter::new(http.clone(), YahooAuthMode::Anonymous);
    let finnhub_adapter = finnhub(http);

    for provider in [&yahoo as &dyn QuoteProvider, &finnhub_adapter] {
        // When
        let request = QuoteRequest::new(vec![sym("AAPL"), sym("aapl")]).expect("request");
        let batch = provider.quote(request).await.expect("batch");

        // Then: both entries carry the quote
        assert_eq!(batch.entries.len(), 2, "{}", provider.id());
        assert!(
            batch
                .entries
                .iter()
                .all(|(_, outcome)| matches!(outcome, QuoteOutcome::Found(_))),
            "{}",
            provider.id()
        );
    }
}

#[tokio::test]
async fn unusual_ticker_reaches_yahoo_and_comes_back_not_found() {
    let http = ScriptedHttpClient::new()
        .json(YAHOO_QUOTE, &yahoo_quotes(&[("AAPL", 190.5, 0.8)]))
        .into_arc();
    let adapter = YahooAdapter::new(http.clone(), YahooAuthMode::Anonymous);

    let request = QuoteRequest::new(vec![sym("AAPL"), sym("BF/B")]).expect("request");
    let batch = adapter.quote(request).await.expect("batch");

    assert_eq!(batch.get(&sym("BF/B")), Some(&QuoteOutcome::NotFound));
    assert_eq!(
        http.requests()[0].query_value("symbols"),
        Some("AAPL,BF/B")
    );
}

#[tokio::test]
async fn yahoo_transport_failure_fails_every_symbol() {
    let http = ScriptedHttpClient::new()
        .fail(YAHOO_QUOTE, "request timeout")
        .into_arc();
    let adapter = YahooAdapter::new(http, YahooAuthMode::Anonymous);

    let request = QuoteRequest::new(vec![sym("AAPL"), sym("MSFT")]).expect("request");
    let batch = adapter.quote(request).await.expect("batch");

    assert_eq!(batch.entries.len(), 2);
    for (_, outcome) in &batch.entries {
        match outcome {
            QuoteOutcome::Failed(error) => assert!(error.is_transport()),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

// =============================================================================
// Finnhub: per-symbol calls with the API key
// =============================================================================

#[tokio::test]
async fn finnhub_quotes_each_symbol_and_treats_zero_price_as_unknown() {
    let http = ScriptedHttpClient::new()
        .json(finnhub_url("quote?symbol=AAPL"), &finnhub_quote(190.0, 1.2))
        .json(finnhub_url("quote?symbol=ZZZZ"), &finnhub_quote(0.0, 0.0))
        .into_arc();
    let adapter = finnhub(http.clone());

    let request = QuoteRequest::new(vec![sym("AAPL"), sym("ZZZZ")]).expect("request");
    let batch = adapter.quote(request).await.expect("batch");

    assert!(matches!(
        batch.get(&sym("AAPL")),
        Some(QuoteOutcome::Found(quote)) if quote.change_percent == Some(1.2)
    ));
    assert_eq!(batch.get(&sym("ZZZZ")), Some(&QuoteOutcome::NotFound));
    assert_eq!(http.requests().len(), 2);
    assert!(http
        .requests()
        .iter()
        .all(|request| request.query_value("token") == Some("test-key")));
}

#[tokio::test]
async fn finnhub_calendar_covers_the_requested_window() {
    let body = r#"{"earningsCalendar":[
        {"symbol":"NVDA","date":"2024-05-02","epsEstimate":5.6,"epsActual":6.1,"hour":"amc"},
        {"symbol":"bad symbol","date":"2024-05-02"},
        {"symbol":"AMD","date":"not-a-date"}
    ]}"#;
    let http = ScriptedHttpClient::new()
        .json(finnhub_url("calendar/earnings"), body)
        .into_arc();
    let adapter = finnhub(http.clone());

    let range = DateRange::new(date!(2024 - 05 - 01), date!(2024 - 05 - 03)).expect("range");
    let events = adapter.earnings_calendar(range).await.expect("calendar");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].symbol, sym("NVDA"));
    assert_eq!(events[0].hour.as_deref(), Some("amc"));
    let request = &http.requests()[0];
    assert_eq!(request.query_value("from"), Some("2024-05-01"));
    assert_eq!(request.query_value("to"), Some("2024-05-03"));
}

#[tokio::test]
async fn finnhub_recommendation_uses_the_latest_period() {
    let http = ScriptedHttpClient::new()
        .json(
            finnhub_url("stock/recommendation?symbol=NVDA"),
            &finnhub_rating(10, 20, 5, 1, 0),
        )
        .json(finnhub_url("stock/recommendation?symbol=NEW"), "[]")
        .into_arc();
    let adapter = finnhub(http);

    let snapshot = adapter
        .recommendation(&sym("NVDA"))
        .await
        .expect("call")
        .expect("snapshot");
    assert_eq!(snapshot.period.as_deref(), Some("2024-05-01"));
    assert_eq!(snapshot.strong_buy, 10);
    assert_eq!(snapshot.hold, 5);

    assert_eq!(adapter.recommendation(&sym("NEW")).await.expect("call"), None);
}

#[tokio::test]
async fn finnhub_metric_reads_the_52_week_range() {
    let http = ScriptedHttpClient::new()
        .json(finnhub_url("stock/metric?symbol=AMD"), &finnhub_metric(90.0, 227.3))
        .json(finnhub_url("stock/metric?symbol=NEW"), "{}")
        .into_arc();
    let adapter = finnhub(http);

    let metric = adapter.metric_52week(&sym("AMD")).await.expect("metric");
    assert_eq!(metric.week52_low, Some(90.0));
    assert_eq!(metric.week52_high, Some(227.3));

    let empty = adapter.metric_52week(&sym("NEW")).await.expect("metric");
    assert_eq!(empty.week52_high, None);
}

#[tokio::test]
async fn finnhub_status_codes_map_to_error_kinds() {
    let http = ScriptedHttpClient::new()
        .respond(
            finnhub_url("stock/recommendation?symbol=AAPL"),
            HttpResponse::with_status(429, "{}"),
        )
        .respond(
            finnhub_url("stock/recommendation?symbol=MSFT"),
            HttpResponse::with_status(401, "{}"),
        )
        .json(finnhub_url("stock/recommendation?symbol=GOOG"), "<html>")
        .into_arc();
    let adapter = finnhub(http);

    let mut kinds = Vec::new();
    for raw in ["AAPL", "MSFT", "GOOG"] {
        let error = adapter
            .recommendation(&sym(raw))
            .await
            .expect_err("error");
        kinds.push(error.kind());
    }

    assert_eq!(
        kinds,
        vec![
            SourceErrorKind::RateLimited,
            SourceErrorKind::Unauthorized,
            SourceErrorKind::Parse,
        ]
    );
}
