//! Configuration management
//!
//! Settings live in `settings.json` inside the dvvy directory:
//! ```json
//! {
//!   "app": { "demoMode": false, "currencySymbol": "₹", ... }
//! }
//! ```
//! Keys the CLI does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Symbol used when none is configured
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency_symbol: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// dvvy configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    /// Display-only; every amount is in the same currency
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => Some(true),
        Some("false" | "0" | "no" | "FALSE" | "NO") => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load config from the dvvy directory
    ///
    /// Environment overrides (for CI/testing):
    /// - `DVVY_DEMO_MODE` forces demo mode on or off
    /// - `DVVY_CURRENCY_SYMBOL` replaces the configured symbol
    pub fn load(dvvy_dir: &Path) -> Result<Self> {
        let raw = Self::read_settings(dvvy_dir)?;

        let demo_mode = parse_flag(std::env::var("DVVY_DEMO_MODE").ok().as_deref())
            .unwrap_or(raw.app.demo_mode);

        let currency_symbol = std::env::var("DVVY_CURRENCY_SYMBOL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or(raw.app.currency_symbol)
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

        Ok(Self {
            demo_mode,
            currency_symbol,
        })
    }

    /// Save config to the dvvy directory, preserving settings we don't manage
    pub fn save(&self, dvvy_dir: &Path) -> Result<()> {
        let mut settings = Self::read_settings(dvvy_dir)?;

        settings.app.demo_mode = self.demo_mode;
        settings.app.currency_symbol = Some(self.currency_symbol.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(dvvy_dir.join("settings.json"), content)?;
        Ok(())
    }

    /// Database file for the current mode
    pub fn db_filename(&self) -> &'static str {
        if self.demo_mode {
            "demo.duckdb"
        } else {
            "dvvy.duckdb"
        }
    }

    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }

    // A corrupt settings file falls back to defaults rather than blocking every command
    fn read_settings(dvvy_dir: &Path) -> Result<SettingsFile> {
        let settings_path = dvvy_dir.join("settings.json");
        if !settings_path.exists() {
            return Ok(SettingsFile::default());
        }
        let content = std::fs::read_to_string(&settings_path)?;
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.currency_symbol, DEFAULT_CURRENCY_SYMBOL);
        assert_eq!(config.db_filename(), "dvvy.duckdb");
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"app": {"theme": "dark"}, "desktop": {"window": [800, 600]}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.currency_symbol = "$".to_string();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("settings.json")).unwrap())
                .unwrap();
        assert_eq!(saved["app"]["theme"], "dark");
        assert_eq!(saved["app"]["currencySymbol"], "$");
        assert_eq!(saved["desktop"]["window"][0], 800);
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.demo_mode || std::env::var("DVVY_DEMO_MODE").is_ok());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(Some("yes")), Some(true));
        assert_eq!(parse_flag(Some("0")), Some(false));
        assert_eq!(parse_flag(Some("maybe")), None);
        assert_eq!(parse_flag(None), None);
    }
}
