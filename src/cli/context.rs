//! Application state shared by every command.
//!
//! [`AppContext`] owns the configuration, the rate store, the rate table
//! currently on display and the session's conversion history.

use crate::core::config::AppConfig;
use crate::core::convert::{convert, parse_amount};
use crate::core::{
    CacheError, ConversionError, ConversionHistory, ConversionHistoryEntry, CurrentRates,
    RateCache, RateError, RateOrigin, RateStore, RateTable,
};
use crate::providers::exchange_rate_api::HttpRateFetcher;
use crate::store::{JsonFileCache, MemoryCache};
use anyhow::{Result, anyhow};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub type AppRateStore = RateStore<HttpRateFetcher, Box<dyn RateCache>>;

/// Outcome of a successful rate lookup.
#[derive(Debug)]
pub struct RatesUpdate {
    pub origin: RateOrigin,
    pub cache_warning: Option<CacheError>,
}

pub struct AppContext {
    config: AppConfig,
    config_path: PathBuf,
    store: AppRateStore,
    rates: Option<RateTable>,
    history: ConversionHistory,
}

impl AppContext {
    /// Loads (or initializes) the config at `config_path`, falling back to the
    /// default location.
    pub fn new(config_path: Option<&str>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => PathBuf::from(path),
            None => AppConfig::default_config_path()?,
        };
        let config = AppConfig::load_or_init(&config_path)?;
        debug!("Loaded config: {config:#?}");
        Self::from_config(config, config_path)
    }

    pub fn from_config(config: AppConfig, config_path: PathBuf) -> Result<Self> {
        let cache: Box<dyn RateCache> = match config.default_data_path() {
            Ok(dir) => Box::new(JsonFileCache::in_dir(&dir)),
            Err(e) => {
                warn!(error = %e, "No data directory, rates will not be persisted");
                Box::new(MemoryCache::new())
            }
        };
        let fetcher = HttpRateFetcher::new(config.fetch_timeout())?;
        let store = RateStore::new(fetcher, cache, config.api_url().map(str::to_string));

        Ok(Self {
            config,
            config_path,
            store,
            rates: None,
            history: ConversionHistory::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The rate table currently on display, if any.
    pub fn rates(&self) -> Option<&RateTable> {
        self.rates.as_ref()
    }

    pub fn history(&self) -> &ConversionHistory {
        &self.history
    }

    fn accept(&mut self, current: CurrentRates) -> RatesUpdate {
        self.rates = Some(current.table);
        RatesUpdate {
            origin: current.origin,
            cache_warning: current.cache_warning,
        }
    }

    /// Loads rates through the cache, fetching when the cached table is stale.
    pub async fn load_rates(&mut self) -> Result<RatesUpdate, RateError> {
        let current = self
            .store
            .get_current_rates(Utc::now(), self.config.staleness_window())
            .await?;
        Ok(self.accept(current))
    }

    /// Fetches fresh rates regardless of the cache.
    pub async fn refresh_rates(&mut self) -> Result<RatesUpdate, RateError> {
        let current = self.store.refresh(Utc::now()).await?;
        Ok(self.accept(current))
    }

    /// Reloads rates if the table on display is older than the staleness
    /// window. On failure the previously displayed table stays in place.
    pub async fn ensure_fresh(&mut self) -> Result<Option<RatesUpdate>, RateError> {
        let window = i64::try_from(self.config.staleness_window_secs).unwrap_or(i64::MAX);
        let now = Utc::now().timestamp();
        let fresh = self
            .rates
            .as_ref()
            .is_some_and(|table| table.age_secs(now) <= window);
        if fresh {
            return Ok(None);
        }
        self.load_rates().await.map(Some)
    }

    /// Stores a new source URL in the config file. The displayed table is
    /// dropped since it belongs to the previous source.
    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(anyhow!("API URL must not be empty"));
        }
        self.config.set_api_url(url);
        self.config.save_to_path(&self.config_path)?;
        self.store
            .set_source_url(self.config.api_url().map(str::to_string));
        self.rates = None;
        Ok(())
    }

    /// Converts using the displayed table and records the result in history.
    pub fn convert(
        &mut self,
        from: &str,
        to: &str,
        amount: &str,
    ) -> Result<ConversionHistoryEntry> {
        let table = self
            .rates
            .as_ref()
            .ok_or_else(|| anyhow!("No exchange rates loaded"))?;
        let converted = convert(table, from, to, amount)?;
        let entry = ConversionHistoryEntry {
            from: from.to_string(),
            amount: parse_amount(amount)?,
            to: to.to_string(),
            converted,
        };
        self.history.push(entry.clone());
        Ok(entry)
    }

    /// Shifts the displayed table's timestamp `secs` into the past.
    #[cfg(test)]
    pub(crate) fn backdate_rates(&mut self, secs: i64) {
        if let Some(table) = self.rates.as_mut() {
            table.fetched_at_unix -= secs;
        }
    }
}

/// True when `err` wraps a [`ConversionError`].
pub fn is_conversion_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ConversionError>().is_some()
}
