use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use divelog_core::clock::Clock;

use crate::error::{ServiceError, ServiceResult};
use crate::geo::{GeoResolver, GeocodeResult, usable_query};

struct CacheEntry<T> {
    stored_at: DateTime<Utc>,
    value: T,
}

/// Bounded map whose entries expire after a fixed TTL. When full, the oldest
/// entry is evicted.
struct ExpiringMap<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: TimeDelta,
    capacity: usize,
}

impl<T: Clone> ExpiringMap<T> {
    fn new(ttl: TimeDelta, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity,
        }
    }

    fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let fresh = self
            .entries
            .get(key)
            .map(|entry| now - entry.stored_at < self.ttl)?;

        if fresh {
            self.entries.get(key).map(|entry| entry.value.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    fn insert(&mut self, key: String, value: T, now: DateTime<Utc>) {
        if self.capacity == 0 {
            return;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                value,
            },
        );
    }
}

/// Wraps a resolver with an expiring cache of successful answers. Errors are
/// never cached.
pub struct CachedGeoResolver {
    inner: Arc<dyn GeoResolver>,
    clock: Arc<dyn Clock>,
    forward: Mutex<ExpiringMap<Vec<GeocodeResult>>>,
    reverse: Mutex<ExpiringMap<Option<GeocodeResult>>>,
}

impl CachedGeoResolver {
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` if `ttl` does not fit a
    /// `TimeDelta`.
    pub fn new(
        inner: Arc<dyn GeoResolver>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        capacity: usize,
    ) -> ServiceResult<Self> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|e| ServiceError::InvalidConfiguration(format!("geocoder cache ttl: {e}")))?;

        Ok(Self {
            inner,
            clock,
            forward: Mutex::new(ExpiringMap::new(ttl, capacity)),
            reverse: Mutex::new(ExpiringMap::new(ttl, capacity)),
        })
    }
}

fn reverse_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.6},{longitude:.6}")
}

#[async_trait]
impl GeoResolver for CachedGeoResolver {
    async fn forward(&self, query: &str) -> ServiceResult<Vec<GeocodeResult>> {
        let Some(trimmed) = usable_query(query) else {
            return Ok(Vec::new());
        };
        let key = trimmed.to_lowercase();

        let cached = self
            .forward
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key, self.clock.now());
        if let Some(results) = cached {
            tracing::trace!(query = trimmed, "Geocode cache hit");
            return Ok(results);
        }

        let results = self.inner.forward(trimmed).await?;
        self.forward
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, results.clone(), self.clock.now());
        Ok(results)
    }

    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> ServiceResult<Option<GeocodeResult>> {
        let key = reverse_key(latitude, longitude);

        let cached = self
            .reverse
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key, self.clock.now());
        if let Some(result) = cached {
            tracing::trace!(latitude, longitude, "Reverse geocode cache hit");
            return Ok(result);
        }

        let result = self.inner.reverse(latitude, longitude).await?;
        self.reverse
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, result.clone(), self.clock.now());
        Ok(result)
    }
}
