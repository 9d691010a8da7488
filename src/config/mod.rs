// Configuration management for Paadal
// Loads settings from config.toml, writing defaults out the first time

use crate::aggregate::ChartLimits;
use crate::filter::YearRange;
use crate::session::SessionOptions;
use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub charts: ChartLimits,
    pub playlist: PlaylistConfig,
    pub archaeology: ArchaeologyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub start_shuffled: bool,
    /// Fixed seed for reproducible shuffles; unset draws from OS entropy
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchaeologyConfig {
    pub year_range_start: u16,
    pub year_range_end: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
    /// `EnvFilter` directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/songs.json"),
            charts: ChartLimits::default(),
            playlist: PlaylistConfig::default(),
            archaeology: ArchaeologyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ArchaeologyConfig {
    fn default() -> Self {
        Self {
            year_range_start: 1960,
            year_range_end: 2024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            filter: "info,paadal=debug".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Read `path`, or write defaults there when it does not exist yet
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            info!("Wrote default config to {}", path.display());
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("paadal");

        Ok(config_dir.join("config.toml"))
    }

    pub fn archaeology_window(&self) -> YearRange {
        YearRange::new(self.archaeology.year_range_start, self.archaeology.year_range_end)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            limits: self.charts,
            shuffle_seed: self.playlist.shuffle_seed,
            start_shuffled: self.playlist.start_shuffled,
            archaeology_window: self.archaeology_window(),
        }
    }
}
