//! Call pacing for rate-limited providers.
//!
//! Adapters await [`Pacer::wait`] before every upstream call and know nothing
//! else about throttling, so a fixed gap can be swapped for a quota limiter
//! (or for nothing) without touching fetch or report code.

use std::future::Future;
use std::num::NonZeroU32;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Free-tier friendly gap between two Finnhub calls.
pub const DEFAULT_CALL_INTERVAL: Duration = Duration::from_millis(500);

pub type PaceFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Gate awaited before each upstream call.
pub trait Pacer: Send + Sync {
    fn wait<'a>(&'a self) -> PaceFuture<'a>;
}

/// No pacing at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unpaced;

impl Pacer for Unpaced {
    fn wait<'a>(&'a self) -> PaceFuture<'a> {
        Box::pin(async {})
    }
}

/// Keeps at least `interval` between the starts of consecutive calls.
///
/// This is a spacing guarantee only: it does not track a quota window, so a
/// provider with a per-minute cap below `60s / interval` can still be exceeded.
#[derive(Debug)]
pub struct FixedIntervalPacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl FixedIntervalPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }
}

impl Default for FixedIntervalPacer {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_INTERVAL)
    }
}

impl Pacer for FixedIntervalPacer {
    fn wait<'a>(&'a self) -> PaceFuture<'a> {
        Box::pin(async move {
            // Holding the lock across the sleep serializes concurrent callers.
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            if let Some(slot) = *next_slot {
                if slot > now {
                    let delay_ms = (slot - now).as_millis() as u64;
                    tracing::trace!(delay_ms, "pacing upstream call");
                    tokio::time::sleep_until(slot).await;
                }
            }
            *next_slot = Some(Instant::now() + self.interval);
        })
    }
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Quota-tracking pacer backed by `governor`: at most `per_minute` calls in
/// any rolling minute, with no burst beyond one call.
#[derive(Clone)]
pub struct QuotaPacer {
    limiter: Arc<DirectRateLimiter>,
    per_minute: NonZeroU32,
}

impl QuotaPacer {
    pub fn per_minute(per_minute: NonZeroU32) -> Self {
        let quota = Quota::per_minute(per_minute).allow_burst(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            per_minute,
        }
    }

    pub fn calls_per_minute(&self) -> u32 {
        self.per_minute.get()
    }
}

impl Pacer for QuotaPacer {
    fn wait<'a>(&'a self) -> PaceFuture<'a> {
        Box::pin(async move {
            self.limiter.until_ready().await;
        })
    }
}
