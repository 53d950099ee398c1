//! Application configuration.
//!
//! Loaded from `<config_dir>/lebirun/config.json`, then overridden by
//! `LEBIRUN_*` environment variables (e.g. `LEBIRUN_ROOT_PASSWORD`).

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{identity::DEFAULT_ROOT_PASSWORD, pager::DEFAULT_VISIBLE_LINES, storage::FsStorage};

const APP_DIR: &str = "lebirun";
const CONFIG_FILE: &str = "config.json";
const ENV_PREFIX: &str = "LEBIRUN";

/// Tunables for one run of the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the storage collaborator is rooted at; the user's data
    /// directory when unset.
    pub data_dir: Option<PathBuf>,
    /// Record written by `data save` in the game.
    pub game_data_file: String,
    /// Shown after `<user>@` in the shell prompt.
    pub host_name: String,
    /// Version string in banners and `infofetch`.
    pub version: String,
    /// Printed by `website`.
    pub website: String,
    /// Password for the root identity.
    pub root_password: String,
    /// Rows the manual pager shows at once.
    pub pager_visible_lines: usize,
    /// How long `grub` keeps its splash up.
    pub grub_splash_ms: u64,
    /// Pause after `Logging off...`.
    pub logout_pause_ms: u64,
    /// Upper bound of the random delay after a normal boot.
    pub boot_delay_max_ms: u64,
    /// Upper bound of the random delay after a GUI boot.
    pub gui_boot_delay_max_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            game_data_file: "game1data.txt".to_string(),
            host_name: "lebirun".to_string(),
            version: "0.1.0 Beta 2".to_string(),
            website: "lebirun.000.pe".to_string(),
            root_password: DEFAULT_ROOT_PASSWORD.to_string(),
            pager_visible_lines: DEFAULT_VISIBLE_LINES,
            grub_splash_ms: 3500,
            logout_pause_ms: 250,
            boot_delay_max_ms: 670,
            gui_boot_delay_max_ms: 2300,
        }
    }
}

impl AppConfig {
    /// Load from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from `path` plus environment overrides. A missing file means
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Json).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .context("invalid configuration")?;
        Ok(config)
    }

    /// Directory the storage collaborator should use.
    pub fn data_root(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(FsStorage::default_root)
    }

    /// `grub` splash duration.
    pub fn grub_splash(&self) -> Duration {
        Duration::from_millis(self.grub_splash_ms)
    }

    /// Pause after logging off.
    pub fn logout_pause(&self) -> Duration {
        Duration::from_millis(self.logout_pause_ms)
    }
}

/// `<config_dir>/lebirun/config.json`.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

/// Write a default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(&config_path())
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(&AppConfig::default())?;
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(&dir.path().join("absent.json"))?;
        assert_eq!(config.game_data_file, "game1data.txt");
        assert_eq!(config.pager_visible_lines, DEFAULT_VISIBLE_LINES);
        Ok(())
    }

    #[test]
    fn partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "host_name": "box", "grub_splash_ms": 10 }"#)?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.host_name, "box");
        assert_eq!(config.grub_splash(), Duration::from_millis(10));
        assert_eq!(config.root_password, DEFAULT_ROOT_PASSWORD);
        Ok(())
    }

    #[test]
    fn default_file_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("lebirun").join("config.json");
        write_default_config(&path)?;
        assert_eq!(AppConfig::load_from(&path)?, AppConfig::default());

        fs::write(&path, r#"{ "version": "9" }"#)?;
        write_default_config(&path)?;
        assert_eq!(AppConfig::load_from(&path)?.version, "9");
        Ok(())
    }

    #[test]
    fn data_root_prefers_configured_dir() {
        let config = AppConfig {
            data_dir: Some(PathBuf::from("/tmp/lebirun-data")),
            ..AppConfig::default()
        };
        assert_eq!(config.data_root(), PathBuf::from("/tmp/lebirun-data"));
    }
}
