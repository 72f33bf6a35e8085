use crate::core::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_TTL_SECONDS: u64 = 600;
pub const DEFAULT_MAX_SIZE: usize = 1000;
/// Upper bound on the TTL, one hundred years.
pub const MAX_TTL_SECONDS: f64 = 100.0 * 365.0 * 24.0 * 3600.0;

/// A cached rate for a single currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCacheEntry {
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Raw cache settings as they appear in configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RateCacheConfig {
    pub ttl_seconds: Option<f64>,
    pub max_size: Option<f64>,
}

impl RateCacheConfig {
    /// TTL, falling back to the default for missing, non-finite or non-positive
    /// input and capped at [`MAX_TTL_SECONDS`]. Never shorter than a microsecond.
    pub fn ttl(&self) -> Duration {
        let seconds = match self.ttl_seconds {
            Some(s) if s.is_finite() && s > 0.0 => s.min(MAX_TTL_SECONDS),
            _ => DEFAULT_TTL_SECONDS as f64,
        };
        Duration::microseconds(((seconds * 1_000_000.0).round() as i64).max(1))
    }

    pub fn max_size(&self) -> usize {
        match self.max_size {
            Some(n) if n.is_finite() && n >= 1.0 => n.floor() as usize,
            _ => DEFAULT_MAX_SIZE,
        }
    }
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, RateCacheEntry>,
    // insertion order, oldest first
    order: VecDeque<String>,
}

impl Entries {
    fn remove(&mut self, key: &str) {
        if self.map.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }
}

/// TTL and size bounded rate cache keyed by pair key.
///
/// Eviction past `max_size` drops the oldest *inserted* keys, not the least
/// recently read ones.
#[derive(Clone)]
pub struct RateCache {
    inner: Arc<Mutex<Entries>>,
    ttl: Duration,
    max_size: usize,
    clock: Arc<dyn Clock>,
}

impl RateCache {
    pub fn new(config: &RateCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Entries::default())),
            ttl: config.ttl(),
            max_size: config.max_size(),
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub async fn get(&self, pair_key: &str) -> Option<RateCacheEntry> {
        let now = self.clock.now();
        let mut entries = self.inner.lock().await;
        match entries.map.get(pair_key).cloned() {
            Some(entry) if entry.expires_at > now => {
                debug!(pair = %pair_key, "Cache HIT");
                Some(entry)
            }
            Some(_) => {
                debug!(pair = %pair_key, "Cache entry expired");
                entries.remove(pair_key);
                None
            }
            None => {
                debug!(pair = %pair_key, "Cache MISS");
                None
            }
        }
    }

    /// Stores a rate. `fetched_at` is an RFC 3339 timestamp; unparseable values mean "now".
    pub async fn set(&self, pair_key: &str, rate: f64, fetched_at: &str) -> RateCacheEntry {
        let now = self.clock.now();
        let fetched_at = DateTime::parse_from_rfc3339(fetched_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| {
                debug!(pair = %pair_key, fetched_at, "Unparseable fetch time, using now");
                now
            });
        let entry = RateCacheEntry {
            rate,
            fetched_at,
            expires_at: fetched_at
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let mut entries = self.inner.lock().await;
        entries.remove(pair_key);
        entries.map.insert(pair_key.to_string(), entry.clone());
        entries.order.push_back(pair_key.to_string());
        debug!(pair = %pair_key, rate, "Cache PUT");

        let before = entries.map.len();
        entries.map.retain(|_, e| e.expires_at > now);
        if entries.map.len() != before {
            let Entries { map, order } = &mut *entries;
            order.retain(|k| map.contains_key(k));
            debug!(swept = before - map.len(), "Swept expired cache entries");
        }

        while entries.map.len() > self.max_size {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
            debug!(pair = %oldest, "Evicted cache entry");
        }

        entry
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut entries = self.inner.lock().await;
        entries.map.clear();
        entries.order.clear();
        debug!("Cache CLEAR");
    }
}
