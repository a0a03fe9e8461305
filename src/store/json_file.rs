use crate::core::cache::RateCache;
use crate::core::error::CacheError;
use crate::core::rates::RateTable;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CACHE_FILE_NAME: &str = "exchange_rates.json";

/// Persists the rate table as a single JSON document on disk.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so readers never observe a partially written table.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache file named [`CACHE_FILE_NAME`] inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CACHE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| CACHE_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_err(&self, source: std::io::Error) -> CacheError {
        CacheError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl RateCache for JsonFileCache {
    fn load(&self) -> Result<Option<RateTable>, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No rate cache file");
                return Ok(None);
            }
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let table = serde_json::from_str(&content).map_err(|source| CacheError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "Loaded rate cache");
        Ok(Some(table))
    }

    fn save(&self, table: &RateTable) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        let json = serde_json::to_vec_pretty(table)
            .map_err(|e| self.write_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| self.write_err(e))?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(self.write_err(e));
        }
        debug!(path = %self.path.display(), "Wrote rate cache");
        Ok(())
    }
}
