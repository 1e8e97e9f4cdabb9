use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ledger file to open; falls back to the default data path when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_file: Option<PathBuf>,

    /// Show closed accounts in the main table (dimmed) instead of hiding them
    #[serde(default = "default_show_closed")]
    pub show_closed: bool,

    /// Desktop notifications for CLI verbs
    #[serde(default = "default_notifications")]
    pub notifications: bool,

    /// Seconds between checks for external edits to the ledger file
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_show_closed() -> bool {
    true
}

fn default_refresh_secs() -> u64 {
    2
}

fn default_notifications() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger_file: None,
            show_closed: true,
            notifications: true,
            refresh_secs: 2,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("motocho");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Clean up the config before saving
        let mut clean_config = self.clone();

        // An empty path would shadow the default ledger location
        if clean_config
            .ledger_file
            .as_ref()
            .map(|p| p.as_os_str().is_empty())
            .unwrap_or(false)
        {
            clean_config.ledger_file = None;
        }

        // A zero interval would hammer the filesystem every tick
        clean_config.refresh_secs = clean_config.refresh_secs.max(1);

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            ledger_file: Some(PathBuf::from("/tmp/books/ledger.json")),
            show_closed: false,
            notifications: true,
            refresh_secs: 5,
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.ledger_file, deserialized.ledger_file);
        assert_eq!(config.show_closed, deserialized.show_closed);
        assert_eq!(config.refresh_secs, deserialized.refresh_secs);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.ledger_file.is_none());
        assert!(config.show_closed);
        assert_eq!(config.refresh_secs, 2);
    }
}
