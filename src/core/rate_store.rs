//! Cached access to the current rate table.
//!
//! [`RateStore`] decides whether the persisted table is still fresh enough to
//! serve, and otherwise performs exactly one fetch and persists the result.
//! All inputs (clock, staleness window, source URL) are passed in explicitly.

use crate::core::cache::RateCache;
use crate::core::error::{CacheError, FetchCause, FetchError, RateError};
use crate::core::rates::{RateFetcher, RateTable};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Cache,
    Network,
}

/// A rate table handed to the caller, with where it came from.
#[derive(Debug)]
pub struct CurrentRates {
    pub table: RateTable,
    pub origin: RateOrigin,
    /// Set when a freshly fetched table could not be persisted.
    pub cache_warning: Option<CacheError>,
}

pub struct RateStore<F, C> {
    fetcher: F,
    cache: C,
    source_url: Option<String>,
}

impl<F: RateFetcher, C: RateCache> RateStore<F, C> {
    /// Creates a store. A blank `source_url` counts as unconfigured.
    pub fn new(fetcher: F, cache: C, source_url: Option<String>) -> Self {
        let mut store = Self {
            fetcher,
            cache,
            source_url: None,
        };
        store.set_source_url(source_url);
        store
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn set_source_url(&mut self, source_url: Option<String>) {
        self.source_url = source_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
    }

    /// Loads the persisted table if it belongs to `source_url`. Read failures,
    /// invalid snapshots and timestamps outside the calendar range are logged
    /// and treated as absent.
    fn load_cached(&self, source_url: &str) -> Option<RateTable> {
        let table = match self.cache.load() {
            Ok(Some(table)) => table,
            Ok(None) => {
                debug!("Cache MISS: no stored rate table");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable rate cache");
                return None;
            }
        };
        if table.source_url != source_url {
            debug!(
                cached = %table.source_url,
                configured = %source_url,
                "Cache MISS: source URL changed"
            );
            return None;
        }
        if let Err(reason) = table.validate() {
            warn!(%reason, "Ignoring invalid cached rate table");
            return None;
        }
        if DateTime::from_timestamp(table.fetched_at_unix, 0).is_none() {
            warn!(
                fetched_at = table.fetched_at_unix,
                "Ignoring cached rate table with out-of-range timestamp"
            );
            return None;
        }
        Some(table)
    }

    /// Returns the stored table when it is at most `staleness_window` old,
    /// otherwise fetches, persists and returns a new one.
    ///
    /// A failed fetch is returned as an error even when a stale table exists.
    #[instrument(name = "GetCurrentRates", skip(self))]
    pub async fn get_current_rates(
        &self,
        now: DateTime<Utc>,
        staleness_window: Duration,
    ) -> Result<CurrentRates, RateError> {
        let source_url = self.source_url.as_deref().ok_or(RateError::ConfigMissing)?;

        let cached = self.load_cached(source_url);
        if let Some(table) = &cached {
            let age = table.age_secs(now.timestamp());
            let window = i64::try_from(staleness_window.as_secs()).unwrap_or(i64::MAX);
            if age <= window {
                debug!(age, "Cache HIT for rate table");
                return Ok(CurrentRates {
                    table: table.clone(),
                    origin: RateOrigin::Cache,
                    cache_warning: None,
                });
            }
            debug!(age, "Cache MISS: rate table is stale");
        }

        self.fetch_and_store(source_url, now, cached.as_ref()).await
    }

    /// Fetches unconditionally, bypassing the staleness check.
    #[instrument(name = "RefreshRates", skip(self))]
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<CurrentRates, RateError> {
        let source_url = self.source_url.as_deref().ok_or(RateError::ConfigMissing)?;
        let previous = self.load_cached(source_url);
        self.fetch_and_store(source_url, now, previous.as_ref()).await
    }

    async fn fetch_and_store(
        &self,
        source_url: &str,
        now: DateTime<Utc>,
        previous: Option<&RateTable>,
    ) -> Result<CurrentRates, RateError> {
        debug!("Fetching rates from {}", source_url);
        let mut table = self.fetcher.fetch(source_url).await?;
        table
            .validate()
            .map_err(|reason| FetchError::new(source_url, FetchCause::InvalidTable(reason)))?;

        // Snapshots for the same source never move backwards in time.
        let floor = previous.map_or(i64::MIN, |p| p.fetched_at_unix);
        table.fetched_at_unix = now.timestamp().max(floor);
        table.source_url = source_url.to_string();

        let cache_warning = match self.cache.save(&table) {
            Ok(()) => {
                debug!("Cache PUT for rate table");
                None
            }
            Err(e) => {
                warn!(error = %e, "Fetched rates could not be cached");
                Some(e)
            }
        };

        Ok(CurrentRates {
            table,
            origin: RateOrigin::Network,
            cache_warning,
        })
    }
}
