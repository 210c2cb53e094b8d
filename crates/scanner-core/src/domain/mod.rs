//! # Domain Models
//!
//! Transient records built from a single provider response and dropped once
//! the report has been printed.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Normalized ticker |
//! | [`Quote`] | Last price, previous close, day range, labels |
//! | [`EarningsEvent`] | Earnings calendar entry |
//! | [`RecommendationSnapshot`] | Latest analyst rating counts |
//! | [`Metric52Week`] | 52-week high/low |
//! | [`WatchlistEntry`] | Symbol with its ISIN/WKN pair |
//! | [`DateRange`] | Inclusive calendar window |

mod date_range;
mod models;
mod symbol;

pub use date_range::{format_iso_date, parse_iso_date, DateRange};
pub use models::{
    EarningsEvent, Metric52Week, Quote, RecommendationSnapshot, SecurityIds, WatchlistEntry,
};
pub use symbol::Symbol;
