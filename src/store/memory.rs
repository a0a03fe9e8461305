use crate::core::cache::RateCache;
use crate::core::error::CacheError;
use crate::core::rates::RateTable;
use std::sync::RwLock;
use tracing::debug;

/// In-process rate cache, used when no data directory is available.
#[derive(Default)]
pub struct MemoryCache {
    inner: RwLock<Option<RateTable>>,
}

impl MemoryCache {
    /// Creates an empty MemoryCache
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a MemoryCache already holding `table`
    pub fn with_table(table: RateTable) -> Self {
        Self {
            inner: RwLock::new(Some(table)),
        }
    }
}

impl RateCache for MemoryCache {
    fn load(&self) -> Result<Option<RateTable>, CacheError> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        debug!(present = guard.is_some(), "Memory cache GET");
        Ok(guard.clone())
    }

    fn save(&self, table: &RateTable) -> Result<(), CacheError> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        debug!("Memory cache PUT");
        *guard = Some(table.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::fixtures::sample;

    #[test]
    fn test_memory_cache_get_put() {
        let cache = MemoryCache::new();

        // Initially, cache is empty
        assert!(cache.load().unwrap().is_none());

        cache.save(&sample()).unwrap();
        assert_eq!(cache.load().unwrap(), Some(sample()));
    }

    #[test]
    fn test_memory_cache_overwrites() {
        let cache = MemoryCache::with_table(sample());
        let mut newer = sample();
        newer.fetched_at_unix += 60;

        cache.save(&newer).unwrap();
        assert_eq!(cache.load().unwrap(), Some(newer));
    }
}
