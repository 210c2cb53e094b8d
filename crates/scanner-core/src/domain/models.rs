use time::Date;

use crate::analytics;
use crate::Symbol;

/// Normalized quote snapshot. Every numeric field is optional because the
/// upstream APIs routinely omit them (pre-market, delisted, forex).
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,
    pub currency: Option<String>,
    pub market_state: Option<String>,
    pub quote_type: Option<String>,
}

impl Quote {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            price: None,
            previous_close: None,
            change: None,
            change_percent: None,
            day_high: None,
            day_low: None,
            week52_high: None,
            week52_low: None,
            currency: None,
            market_state: None,
            quote_type: None,
        }
    }

    /// Fills `change` and `change_percent` from price and previous close when
    /// the provider did not report them. Upstream values are never replaced.
    pub fn fill_derived_change(mut self) -> Self {
        let (change, percent) = analytics::change_and_percent(self.price, self.previous_close);
        if self.change.is_none() {
            self.change = change;
        }
        if self.change_percent.is_none() {
            self.change_percent = percent;
        }
        self
    }

    pub fn week52(&self) -> Metric52Week {
        Metric52Week {
            symbol: self.symbol.clone(),
            week52_high: self.week52_high,
            week52_low: self.week52_low,
        }
    }
}

/// One entry of the earnings calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct EarningsEvent {
    pub symbol: Symbol,
    pub date: Date,
    pub eps_estimate: Option<f64>,
    pub eps_actual: Option<f64>,
    pub revenue_estimate: Option<f64>,
    pub revenue_actual: Option<f64>,
    /// `bmo` (before open), `amc` (after close) or `dmh` (during hours).
    pub hour: Option<String>,
    pub quarter: Option<u8>,
    pub year: Option<i32>,
}

impl EarningsEvent {
    pub fn new(symbol: Symbol, date: Date) -> Self {
        Self {
            symbol,
            date,
            eps_estimate: None,
            eps_actual: None,
            revenue_estimate: None,
            revenue_actual: None,
            hour: None,
            quarter: None,
            year: None,
        }
    }

    pub fn eps_surprise(&self) -> Option<f64> {
        analytics::earnings_surprise(self.eps_actual, self.eps_estimate)
    }
}

/// Analyst rating counts for the most recent reporting period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationSnapshot {
    pub symbol: Symbol,
    pub period: Option<String>,
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl RecommendationSnapshot {
    pub fn new(
        symbol: Symbol,
        strong_buy: u32,
        buy: u32,
        hold: u32,
        sell: u32,
        strong_sell: u32,
    ) -> Self {
        Self {
            symbol,
            period: None,
            strong_buy,
            buy,
            hold,
            sell,
            strong_sell,
        }
    }

    pub fn total(&self) -> u32 {
        self.strong_buy + self.buy + self.hold + self.sell + self.strong_sell
    }
}

/// 52-week trading range.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric52Week {
    pub symbol: Symbol,
    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,
}

/// ISIN/WKN identifier pair for a listed security.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityIds {
    pub isin: &'static str,
    pub wkn: &'static str,
}

impl SecurityIds {
    pub const PLACEHOLDER: Self = Self {
        isin: "—",
        wkn: "—",
    };

    pub const fn new(isin: &'static str, wkn: &'static str) -> Self {
        Self { isin, wkn }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::PLACEHOLDER
    }
}

/// Static reference data for one watchlist member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub symbol: Symbol,
    pub ids: SecurityIds,
}
