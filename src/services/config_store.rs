// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::detection::Sensitivity;

pub const CONFIG_VERSION: &str = "1";
const KEEP_BACKUPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub detection: DetectionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            detection: DetectionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default = "default_true")]
    pub auto_highlight: bool,
    #[serde(default = "default_true")]
    pub show_tooltips: bool,
    #[serde(default = "default_true")]
    pub collect_stats: bool,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::default(),
            auto_highlight: true,
            show_tooltips: true,
            collect_stats: true,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_version() -> String { CONFIG_VERSION.to_string() }
fn default_true() -> bool { true }
fn default_cache_capacity() -> usize { 256 }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("slopdetect"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file; a missing file yields defaults
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Update the stored sensitivity, keeping every other setting
    pub fn set_sensitivity(&self, sensitivity: Sensitivity) -> Result<AppConfig, String> {
        let mut config = self.load()?;
        config.detection.sensitivity = sensitivity;
        self.save(&config)?;
        Ok(config)
    }

    /// Restore defaults, backing up the current file first
    pub fn reset(&self) -> Result<AppConfig, String> {
        let config = AppConfig::default();
        self.save(&config)?;
        Ok(config)
    }

    fn backup_dir(&self) -> PathBuf {
        self.config_dir.join("backups")
    }

    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%.3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        self.cleanup_old_backups(&backup_dir, KEEP_BACKUPS)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; the timestamped name breaks mtime ties
        entries.sort_by_key(|e| {
            let modified = e
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            (modified, e.file_name())
        });

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }
}
