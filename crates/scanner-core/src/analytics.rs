//! Derived metrics computed from already-fetched data.
//!
//! Every function is pure and total: a missing input or a zero denominator
//! yields `None` instead of a panic or an infinite value.

use crate::RecommendationSnapshot;

/// Absolute and percentage change against the previous close.
pub fn change_and_percent(
    price: Option<f64>,
    previous_close: Option<f64>,
) -> (Option<f64>, Option<f64>) {
    match (price, previous_close) {
        (Some(price), Some(previous_close)) if previous_close != 0.0 => {
            let change = price - previous_close;
            (finite(change), finite(change / previous_close * 100.0))
        }
        _ => (None, None),
    }
}

/// Position of `price` inside the 52-week range, 0 at the low and 100 at the high.
pub fn range_position(price: Option<f64>, low52: Option<f64>, high52: Option<f64>) -> Option<f64> {
    let (price, low, high) = (price?, low52?, high52?);
    if high == low {
        return None;
    }
    finite((price - low) / (high - low) * 100.0)
}

/// Share of strong-buy and buy ratings among all five buckets.
pub fn buy_percentage(
    strong_buy: u32,
    buy: u32,
    hold: u32,
    sell: u32,
    strong_sell: u32,
) -> Option<f64> {
    share(
        u64::from(strong_buy) + u64::from(buy),
        total(strong_buy, buy, hold, sell, strong_sell),
    )
}

pub fn hold_percentage(snapshot: &RecommendationSnapshot) -> Option<f64> {
    share(u64::from(snapshot.hold), snapshot_total(snapshot))
}

/// Share of sell and strong-sell ratings.
pub fn sell_percentage(snapshot: &RecommendationSnapshot) -> Option<f64> {
    share(
        u64::from(snapshot.sell) + u64::from(snapshot.strong_sell),
        snapshot_total(snapshot),
    )
}

/// Distance of `price` below the 52-week high, as a percentage of the high.
pub fn discount_from_high(price: Option<f64>, high52: Option<f64>) -> Option<f64> {
    let (price, high) = (price?, high52?);
    if high == 0.0 {
        return None;
    }
    finite((high - price) / high * 100.0)
}

/// Sort key of the conviction report. A missing input counts as zero.
pub fn conviction_score(buy_pct: Option<f64>, discount_pct: Option<f64>) -> f64 {
    let score = buy_pct.unwrap_or(0.0) * discount_pct.unwrap_or(0.0) / 100.0;
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

pub fn earnings_surprise(eps_actual: Option<f64>, eps_estimate: Option<f64>) -> Option<f64> {
    finite(eps_actual? - eps_estimate?)
}

/// Buy/hold/sell split of one recommendation snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingMix {
    pub buy_pct: f64,
    pub hold_pct: f64,
    pub sell_pct: f64,
}

impl RatingMix {
    /// `None` when the snapshot has no ratings at all.
    pub fn from_snapshot(snapshot: &RecommendationSnapshot) -> Option<Self> {
        Some(Self {
            buy_pct: buy_percentage(
                snapshot.strong_buy,
                snapshot.buy,
                snapshot.hold,
                snapshot.sell,
                snapshot.strong_sell,
            )?,
            hold_pct: hold_percentage(snapshot)?,
            sell_pct: sell_percentage(snapshot)?,
        })
    }
}

fn total(strong_buy: u32, buy: u32, hold: u32, sell: u32, strong_sell: u32) -> u64 {
    [strong_buy, buy, hold, sell, strong_sell]
        .into_iter()
        .map(u64::from)
        .sum()
}

fn snapshot_total(snapshot: &RecommendationSnapshot) -> u64 {
    total(
        snapshot.strong_buy,
        snapshot.buy,
        snapshot.hold,
        snapshot.sell,
        snapshot.strong_sell,
    )
}

fn share(part: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(part as f64 / total as f64 * 100.0)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
