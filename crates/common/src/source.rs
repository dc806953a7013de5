use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::TtlCache;
use crate::errors::FeedError;
use crate::Sample;

/// Anything that can produce the next sample for a dashboard tick.
///
/// `depth` is the current buffer length; the simulated feed uses it for
/// its drift term, real sources may ignore it.
pub trait SampleSource {
    fn next_sample(&mut self, depth: usize) -> Result<Sample, FeedError>;
}

pub const BASE_PRICE: f64 = 100.0;
pub const DRIFT_PER_SAMPLE: f64 = 0.1;

/// Simulated live price feed:
/// `value = base + uniform(-1, 1) + drift * depth`, wall-clock timestamp.
pub struct SimulatedPriceSource {
    base: f64,
    drift: f64,
    rng: StdRng,
}

impl SimulatedPriceSource {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Deterministic source for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            base: BASE_PRICE,
            drift: DRIFT_PER_SAMPLE,
            rng,
        }
    }
}

impl Default for SimulatedPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for SimulatedPriceSource {
    fn next_sample(&mut self, depth: usize) -> Result<Sample, FeedError> {
        let noise = self.rng.random_range(-1.0..=1.0);
        let value = self.base + noise + self.drift * depth as f64;
        Ok(Sample::new(Local::now(), value))
    }
}

/// Independent profit/loss scalar regenerated for every frame; not part
/// of the series buffer.
pub struct PnlFeed {
    rng: StdRng,
}

impl PnlFeed {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn next_pnl(&mut self) -> i64 {
        self.rng.random_range(-1000..=1000)
    }
}

impl Default for PnlFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor for one market-data fetch; doubles as the cache key since
/// the fetched series is derived purely from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchKey {
    pub symbol: String,
    pub period: String,
    pub interval: String,
}

/// External market-data collaborator: returns a time-indexed series of
/// closing values for a fetch descriptor. May hit the network and fail.
pub trait MarketDataSource {
    fn fetch_closes(&self, key: &FetchKey) -> Result<Vec<Sample>, FeedError>;
}

/// Default TTL for memoized market-data fetches.
pub const FETCH_TTL: Duration = Duration::from_secs(60);

/// TTL-gated wrapper around a [`MarketDataSource`]: the same Idle/Due
/// cadence machine applied to a value instead of a render trigger.
///
/// Fetch failures propagate unmodified and leave no cache entry; the
/// source is responsible for its own retry/backoff if it wants any.
pub struct CachedMarketData<M> {
    inner: M,
    cache: TtlCache<FetchKey, Vec<Sample>>,
    ttl: Duration,
}

impl<M: MarketDataSource> CachedMarketData<M> {
    pub fn new(inner: M, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(),
            ttl,
        }
    }

    pub fn closes(&self, key: &FetchKey) -> Result<Vec<Sample>, FeedError> {
        self.closes_at(key, Instant::now())
    }

    pub fn closes_at(&self, key: &FetchKey, now: Instant) -> Result<Vec<Sample>, FeedError> {
        self.cache
            .get_or_compute_at(key, self.ttl, now, || self.inner.fetch_closes(key))
    }
}

/// Stand-in for the network-backed market source in demos and tests.
/// Produces a smooth deterministic close series and counts real fetches
/// so cache behavior is observable.
pub struct SimulatedMarketData {
    points: usize,
    fetches: AtomicUsize,
}

impl SimulatedMarketData {
    pub fn new(points: usize) -> Self {
        Self {
            points,
            fetches: AtomicUsize::new(0),
        }
    }

    /// How many times the underlying fetch actually ran.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl MarketDataSource for SimulatedMarketData {
    fn fetch_closes(&self, key: &FetchKey) -> Result<Vec<Sample>, FeedError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        debug!(symbol = %key.symbol, points = self.points, "fetching simulated closes");
        let end = Local::now();
        let closes = (0..self.points)
            .map(|i| {
                let at = end - chrono::Duration::seconds((self.points - i) as i64);
                Sample::new(at, BASE_PRICE + (i as f64 * 0.1).sin() * 5.0)
            })
            .collect();
        Ok(closes)
    }
}
