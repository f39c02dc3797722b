use crate::errors::CoreError;
use crate::models::cache::{CacheEntry, ForecastCache};

use super::format;

/// Persists forecast cache snapshots so a restarted session skips refitting.
pub struct CacheStore;

impl CacheStore {
    /// Serialize every cache entry to raw bytes.
    ///
    /// Flow: ForecastCache → snapshot (sorted by key) → bincode → FCST format bytes
    pub fn save_to_bytes(cache: &ForecastCache) -> Result<Vec<u8>, CoreError> {
        let entries = cache.snapshot();
        let payload = bincode::serialize(&entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize cache: {e}")))?;

        tracing::debug!(entries = entries.len(), bytes = payload.len(), "Saved forecast cache");
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Merge a snapshot into `cache`. Keys already present are kept.
    /// Returns the number of entries added.
    pub fn load_from_bytes(data: &[u8], cache: &ForecastCache) -> Result<usize, CoreError> {
        let entries = Self::read_entries(data)?;
        let added = cache.restore(entries);
        tracing::debug!(added, total = cache.len(), "Restored forecast cache");
        Ok(added)
    }

    /// Decode a snapshot without touching any cache.
    pub fn read_entries(data: &[u8]) -> Result<Vec<CacheEntry>, CoreError> {
        let (_header, payload) = format::read_file(data)?;
        bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize cache: {e}")))
    }

    /// Save a snapshot to a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(cache: &ForecastCache, path: &str) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(cache)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Merge a snapshot file from disk into `cache` (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, cache: &ForecastCache) -> Result<usize, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, cache)
    }
}
