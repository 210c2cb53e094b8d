//! Provider contract and request/response types.
//!
//! Every upstream API is wrapped in a [`QuoteProvider`]. Reports only talk to
//! this trait, so Yahoo and Finnhub are interchangeable wherever their
//! [`CapabilitySet`]s overlap.
//!
//! | Endpoint | Call | Response |
//! |----------|------|----------|
//! | Quote | [`QuoteProvider::quote`] | [`QuoteBatch`] |
//! | Earnings calendar | [`QuoteProvider::earnings_calendar`] | `Vec<EarningsEvent>` |
//! | Recommendation | [`QuoteProvider::recommendation`] | `Option<RecommendationSnapshot>` |
//! | 52-week metric | [`QuoteProvider::metric_52week`] | [`Metric52Week`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{
    DateRange, EarningsEvent, Metric52Week, ProviderId, Quote, RecommendationSnapshot, Symbol,
};

/// Boxed future returned by provider calls.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Data endpoint type used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Quote,
    EarningsCalendar,
    Recommendation,
    Metric52Week,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::EarningsCalendar => "earnings_calendar",
            Self::Recommendation => "recommendation",
            Self::Metric52Week => "metric_52week",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported endpoint matrix for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    pub quote: bool,
    pub earnings_calendar: bool,
    pub recommendation: bool,
    pub metric_52week: bool,
}

impl CapabilitySet {
    pub const fn new(
        quote: bool,
        earnings_calendar: bool,
        recommendation: bool,
        metric_52week: bool,
    ) -> Self {
        Self {
            quote,
            earnings_calendar,
            recommendation,
            metric_52week,
        }
    }

    pub const fn full() -> Self {
        Self::new(true, true, true, true)
    }

    pub const fn supports(self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Quote => self.quote,
            Endpoint::EarningsCalendar => self.earnings_calendar,
            Endpoint::Recommendation => self.recommendation,
            Endpoint::Metric52Week => self.metric_52week,
        }
    }

    pub fn supported_endpoints(self) -> Vec<Endpoint> {
        [
            Endpoint::Quote,
            Endpoint::EarningsCalendar,
            Endpoint::Recommendation,
            Endpoint::Metric52Week,
        ]
        .into_iter()
        .filter(|endpoint| self.supports(*endpoint))
        .collect()
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Timeout, DNS failure, refused connection or a non-2xx status.
    Unavailable,
    RateLimited,
    Unauthorized,
    NotFound,
    InvalidRequest,
    UnsupportedEndpoint,
    /// Upstream answered, but not with the JSON shape we expect.
    Parse,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    fn with_kind(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Unavailable, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::RateLimited, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::NotFound, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::InvalidRequest, message)
    }

    pub fn unsupported_endpoint(provider: ProviderId, endpoint: Endpoint) -> Self {
        Self::with_kind(
            SourceErrorKind::UnsupportedEndpoint,
            format!("endpoint '{endpoint}' is not supported by {provider}"),
        )
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::with_kind(SourceErrorKind::Parse, message)
    }

    /// Maps a non-2xx status to the matching error kind.
    pub fn from_status(provider: ProviderId, status: u16) -> Self {
        match status {
            401 | 403 => Self::unauthorized(format!(
                "{provider} rejected credentials (status {status})"
            )),
            404 => Self::not_found(format!("{provider} returned status 404")),
            429 => Self::rate_limited(format!("{provider} rate limit exceeded (status 429)")),
            _ => Self::unavailable(format!("{provider} returned status {status}")),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the failure came from the network or the upstream service
    /// rather than from our own request or parsing.
    pub const fn is_transport(&self) -> bool {
        matches!(
            self.kind,
            SourceErrorKind::Unavailable
                | SourceErrorKind::RateLimited
                | SourceErrorKind::Unauthorized
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unauthorized => "source.unauthorized",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::UnsupportedEndpoint => "source.unsupported_endpoint",
            SourceErrorKind::Parse => "source.parse",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for quote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub symbols: Vec<Symbol>,
}

impl QuoteRequest {
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, SourceError> {
        if symbols.is_empty() {
            return Err(SourceError::invalid_request(
                "quote request must include at least one symbol",
            ));
        }
        Ok(Self { symbols })
    }

    pub fn single(symbol: Symbol) -> Self {
        Self {
            symbols: vec![symbol],
        }
    }
}

/// Per-symbol result of a quote call.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Found(Quote),
    NotFound,
    Failed(SourceError),
}

impl QuoteOutcome {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Self::Found(quote) => Some(quote),
            Self::NotFound | Self::Failed(_) => None,
        }
    }
}

/// Quote outcomes in request order; one entry per requested symbol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuoteBatch {
    pub entries: Vec<(Symbol, QuoteOutcome)>,
}

impl QuoteBatch {
    pub fn get(&self, symbol: &Symbol) -> Option<&QuoteOutcome> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == symbol)
            .map(|(_, outcome)| outcome)
    }

    /// Removes and returns the outcome for `symbol`, or `NotFound` when the
    /// provider never answered for it.
    pub fn take(&mut self, symbol: &Symbol) -> QuoteOutcome {
        match self.entries.iter().position(|(candidate, _)| candidate == symbol) {
            Some(index) => self.entries.remove(index).1,
            None => QuoteOutcome::NotFound,
        }
    }
}

/// Provider adapter contract.
///
/// Only [`quote`](QuoteProvider::quote) is mandatory; the remaining endpoints
/// default to [`SourceErrorKind::UnsupportedEndpoint`] and must be reflected in
/// [`capabilities`](QuoteProvider::capabilities) when overridden.
///
/// Implementations never fail a whole batch because of one symbol: per-symbol
/// failures are reported through [`QuoteOutcome::Failed`].
pub trait QuoteProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn capabilities(&self) -> CapabilitySet;

    /// Fetches quotes for every requested symbol.
    fn quote<'a>(&'a self, req: QuoteRequest) -> ProviderFuture<'a, QuoteBatch>;

    /// Earnings events scheduled inside `range`.
    ///
    /// # Errors
    ///
    /// Transport failures, parse failures, or an unsupported endpoint.
    fn earnings_calendar<'a>(
        &'a self,
        range: DateRange,
    ) -> ProviderFuture<'a, Vec<EarningsEvent>> {
        let _ = range;
        let provider = self.id();
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(
                provider,
                Endpoint::EarningsCalendar,
            ))
        })
    }

    /// Most recent analyst rating snapshot; `None` when the provider has no
    /// coverage for the symbol.
    fn recommendation<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> ProviderFuture<'a, Option<RecommendationSnapshot>> {
        let _ = symbol;
        let provider = self.id();
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(
                provider,
                Endpoint::Recommendation,
            ))
        })
    }

    fn metric_52week<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Metric52Week> {
        let _ = symbol;
        let provider = self.id();
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(
                provider,
                Endpoint::Metric52Week,
            ))
        })
    }
}
