use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

pub const DEFAULT_STALENESS_WINDOW_SECS: u64 = 600;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

fn default_staleness_window_secs() -> u64 {
    DEFAULT_STALENESS_WINDOW_SECS
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Endpoint returning the latest rates. Unset until the user configures it.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_staleness_window_secs")]
    pub staleness_window_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default)]
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_url: None,
            staleness_window_secs: DEFAULT_STALENESS_WINDOW_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// The configured source URL, ignoring blank values.
    pub fn api_url(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    pub fn set_api_url(&mut self, url: &str) {
        let url = url.trim();
        self.api_url = (!url.is_empty()).then(|| url.to_string());
    }

    pub fn staleness_window(&self) -> Duration {
        Duration::from_secs(self.staleness_window_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Loads the config at `path`, writing a default one first if it does not exist.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, creating default", path.display());
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }
        Self::load_from_path(path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file to {}", path.display()))?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api_url: "https://v6.exchangerate-api.com/v6/KEY/latest/USD"
staleness_window_secs: 3600
fetch_timeout_secs: 5
data_path: "/tmp/fxconv"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.api_url(),
            Some("https://v6.exchangerate-api.com/v6/KEY/latest/USD")
        );
        assert_eq!(config.staleness_window(), Duration::from_secs(3600));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/fxconv")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("api_url: null").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.api_url().is_none());
        assert_eq!(
            config.staleness_window(),
            Duration::from_secs(DEFAULT_STALENESS_WINDOW_SECS)
        );
    }

    #[test]
    fn test_blank_api_url_is_unset() {
        let config: AppConfig = serde_yaml::from_str("api_url: '  '").unwrap();
        assert!(config.api_url().is_none());

        let mut config = AppConfig::default();
        config.set_api_url("  http://x.test/latest  ");
        assert_eq!(config.api_url(), Some("http://x.test/latest"));
        config.set_api_url("");
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_load_or_init_creates_default_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("config.yaml");

        let config = AppConfig::load_or_init(&path)?;

        assert!(path.exists());
        assert_eq!(config, AppConfig::default());
        assert_eq!(AppConfig::load_from_path(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_save_and_reload_api_url() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");

        let mut config = AppConfig::load_or_init(&path)?;
        config.set_api_url("http://rates.test/latest/EUR");
        config.save_to_path(&path)?;

        let reloaded = AppConfig::load_or_init(&path)?;
        assert_eq!(reloaded.api_url(), Some("http://rates.test/latest/EUR"));
        Ok(())
    }

    #[test]
    fn test_invalid_yaml_is_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "staleness_window_secs: [oops")?;

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        Ok(())
    }
}
