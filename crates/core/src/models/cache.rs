use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::series::TimePoint;

/// Cache key: what was fitted, on which content, and how far ahead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForecastKey {
    /// SHA-256 (hex) over the history's timestamps, values and cadence
    pub content_hash: String,
    pub x_field: String,
    pub y_field: String,
    pub category: Option<String>,
    /// Horizon the model was fitted for (the engine's ceiling)
    pub horizon: usize,
    /// Provider chain that produced the result
    pub model: String,
}

/// One cached fit, as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: ForecastKey,
    pub points: Vec<TimePoint>,
}

/// Content-addressed store of fitted forecasts.
///
/// Grow-only: an entry, once present, is never replaced or evicted, so
/// concurrent readers always see a stable result. Two sessions racing on
/// the same key compute identical outputs and the first insert wins.
#[derive(Debug, Default)]
pub struct ForecastCache {
    entries: RwLock<HashMap<ForecastKey, Arc<[TimePoint]>>>,
}

impl ForecastCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ForecastKey) -> Option<Arc<[TimePoint]>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store a result unless the key is already present.
    /// Returns the stored value, which is the existing one on a lost race.
    pub fn insert(&self, key: ForecastKey, points: Vec<TimePoint>) -> Arc<[TimePoint]> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key).or_insert_with(|| points.into()).clone()
    }

    pub fn contains(&self, key: &ForecastKey) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of cached fits.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy every entry out, sorted by key for a deterministic snapshot.
    pub fn snapshot(&self) -> Vec<CacheEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<CacheEntry> = entries
            .iter()
            .map(|(key, points)| CacheEntry {
                key: key.clone(),
                points: points.to_vec(),
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    /// Merge snapshot entries; keys already present keep their value.
    /// Returns how many entries were new.
    pub fn restore(&self, snapshot: Vec<CacheEntry>) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut added = 0;
        for entry in snapshot {
            if !entries.contains_key(&entry.key) {
                entries.insert(entry.key, entry.points.into());
                added += 1;
            }
        }
        added
    }
}
