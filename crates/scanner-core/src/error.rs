use thiserror::Error;

/// Validation errors for user-supplied or upstream values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid provider '{value}', expected one of yahoo, finnhub")]
    InvalidProvider { value: String },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range start {from} is after end {to}")]
    InvertedDateRange { from: String, to: String },
}

/// Configuration problems detected before any network call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Finnhub API key not set.\n  \
         1. Get a free key at https://finnhub.io/register\n  \
         2. export FINNHUB_KEY=your_key"
    )]
    MissingApiKey,

    #[error("environment variable {name} has invalid value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failures that stop a report from producing any table at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("provider '{provider}' does not support the {endpoint} endpoint")]
    MissingCapability {
        provider: crate::ProviderId,
        endpoint: crate::Endpoint,
    },

    #[error("{report} report failed: {source}")]
    Upstream {
        report: &'static str,
        #[source]
        source: crate::SourceError,
    },

    #[error("quote report requires at least one symbol")]
    NoSymbols,
}
