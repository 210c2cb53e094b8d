//! Runtime settings read from the environment, and provider construction.

use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{FinnhubAdapter, YahooAdapter, YahooAuthMode};
use crate::data_source::QuoteProvider;
use crate::http_client::{HttpClient, DEFAULT_TIMEOUT_MS};
use crate::pacing::{FixedIntervalPacer, Pacer, QuotaPacer, Unpaced, DEFAULT_CALL_INTERVAL};
use crate::watchlist::Watchlist;
use crate::{ConfigError, ProviderId};

pub const ENV_FINNHUB_KEY: &str = "FINNHUB_KEY";
pub const ENV_SCANNER_FINNHUB_KEY: &str = "SCANNER_FINNHUB_KEY";
pub const ENV_QUOTE_PROVIDER: &str = "SCANNER_QUOTE_PROVIDER";
pub const ENV_YAHOO_AUTH: &str = "SCANNER_YAHOO_AUTH";
pub const ENV_PACING_MS: &str = "SCANNER_PACING_MS";
pub const ENV_RATE_PER_MINUTE: &str = "SCANNER_RATE_PER_MINUTE";
pub const ENV_TIMEOUT_MS: &str = "SCANNER_TIMEOUT_MS";
pub const ENV_WATCHLIST: &str = "SCANNER_WATCHLIST";

/// How Finnhub calls are spaced out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Fixed gap between call starts; a zero gap disables pacing.
    FixedInterval(Duration),
    /// Rolling per-minute quota.
    PerMinute(NonZeroU32),
}

impl Pacing {
    pub fn build(self) -> Arc<dyn Pacer> {
        match self {
            Self::FixedInterval(interval) if interval.is_zero() => Arc::new(Unpaced),
            Self::FixedInterval(interval) => Arc::new(FixedIntervalPacer::new(interval)),
            Self::PerMinute(per_minute) => Arc::new(QuotaPacer::per_minute(per_minute)),
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::FixedInterval(DEFAULT_CALL_INTERVAL)
    }
}

/// Scanner settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub finnhub_key: Option<String>,
    pub quote_provider: ProviderId,
    pub yahoo_auth: YahooAuthMode,
    pub pacing: Pacing,
    pub timeout_ms: u64,
    pub watchlist: Arc<Watchlist>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            finnhub_key: None,
            quote_provider: ProviderId::Yahoo,
            yahoo_auth: YahooAuthMode::CookieCrumb,
            pacing: Pacing::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            watchlist: Arc::new(Watchlist::builtin()),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// A missing API key is not an error here; it only becomes one when a
    /// Finnhub-backed provider is requested.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let mut settings = Self::default();

        settings.finnhub_key = get(ENV_SCANNER_FINNHUB_KEY).or_else(|| get(ENV_FINNHUB_KEY));

        if let Some(value) = get(ENV_QUOTE_PROVIDER) {
            settings.quote_provider = ProviderId::from_str(&value)?;
        }

        if let Some(value) = get(ENV_YAHOO_AUTH) {
            settings.yahoo_auth = match value.to_ascii_lowercase().as_str() {
                "crumb" => YahooAuthMode::CookieCrumb,
                "anonymous" => YahooAuthMode::Anonymous,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_YAHOO_AUTH,
                        value,
                        reason: String::from("expected 'crumb' or 'anonymous'"),
                    })
                }
            };
        }

        if let Some(value) = get(ENV_PACING_MS) {
            let millis = parse_number::<u64>(ENV_PACING_MS, &value)?;
            settings.pacing = Pacing::FixedInterval(Duration::from_millis(millis));
        }

        if let Some(value) = get(ENV_RATE_PER_MINUTE) {
            let per_minute = parse_number::<u32>(ENV_RATE_PER_MINUTE, &value)?;
            let per_minute = NonZeroU32::new(per_minute).ok_or(ConfigError::InvalidValue {
                name: ENV_RATE_PER_MINUTE,
                value,
                reason: String::from("must be greater than zero"),
            })?;
            settings.pacing = Pacing::PerMinute(per_minute);
        }

        if let Some(value) = get(ENV_TIMEOUT_MS) {
            let timeout_ms = parse_number::<u64>(ENV_TIMEOUT_MS, &value)?;
            if timeout_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    name: ENV_TIMEOUT_MS,
                    value,
                    reason: String::from("must be greater than zero"),
                });
            }
            settings.timeout_ms = timeout_ms;
        }

        if let Some(value) = get(ENV_WATCHLIST) {
            settings.watchlist = Arc::new(Watchlist::parse_list(&value)?);
        }

        Ok(settings)
    }

    /// The Finnhub API key, or the remediation error when it is not set.
    pub fn require_finnhub_key(&self) -> Result<&str, ConfigError> {
        self.finnhub_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    /// Checks that `provider` can be built, without building it.
    pub fn ensure_credentials(&self, provider: ProviderId) -> Result<(), ConfigError> {
        if provider.requires_api_key() {
            self.require_finnhub_key()?;
        }
        Ok(())
    }

    pub fn finnhub(
        &self,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<FinnhubAdapter, ConfigError> {
        let api_key = self.require_finnhub_key()?;
        Ok(
            FinnhubAdapter::new(http_client, self.pacing.build(), api_key)
                .with_timeout_ms(self.timeout_ms),
        )
    }

    pub fn yahoo(&self, http_client: Arc<dyn HttpClient>) -> YahooAdapter {
        YahooAdapter::new(http_client, self.yahoo_auth).with_timeout_ms(self.timeout_ms)
    }

    /// Provider for the `quote` command.
    pub fn quote_provider(
        &self,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Arc<dyn QuoteProvider>, ConfigError> {
        let provider: Arc<dyn QuoteProvider> = match self.quote_provider {
            ProviderId::Yahoo => Arc::new(self.yahoo(http_client)),
            ProviderId::Finnhub => Arc::new(self.finnhub(http_client)?),
        };
        Ok(provider)
    }

    /// Provider for the watchlist reports, which need every endpoint.
    pub fn report_provider(
        &self,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Arc<dyn QuoteProvider>, ConfigError> {
        let provider: Arc<dyn QuoteProvider> = Arc::new(self.finnhub(http_client)?);
        Ok(provider)
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_owned(),
        reason: String::from("expected a non-negative integer"),
    })
}
