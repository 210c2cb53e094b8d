//! Provider adapters.
//!
//! | Provider | Quote | Earnings calendar | Recommendation | 52-week |
//! |----------|-------|-------------------|----------------|---------|
//! | Yahoo | batched, cookie/crumb session | - | - | from quote |
//! | Finnhub | one paced call per symbol | yes | yes | yes |

mod finnhub;
mod yahoo;

pub use finnhub::{FinnhubAdapter, FINNHUB_BASE_URL};
pub use yahoo::{YahooAdapter, YahooAuthMode, YahooSession};
