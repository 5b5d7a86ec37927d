use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use anyhow::{Context, Result};
use std::fs;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
    #[serde(default)]
    pub widgets: WidgetsConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default)]
    pub index: Option<PathBuf>,
    #[serde(default)]
    pub packages_dir: Option<PathBuf>,
    #[serde(default = "default_item_label")]
    pub item_label: String,
    #[serde(default)]
    pub show_details: bool,
}

fn default_item_label() -> String { "package".to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            index: None,
            packages_dir: None,
            item_label: default_item_label(),
            show_details: false,
        }
    }
}

/// Quiet periods, in milliseconds, before each debounced task fires.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    #[serde(default = "default_query_ms")]
    pub query_ms: u64,
    #[serde(default = "default_category_ms")]
    pub category_ms: u64,
    #[serde(default = "default_category_search_ms")]
    pub category_search_ms: u64,
}

fn default_query_ms() -> u64 { 300 }
fn default_category_ms() -> u64 { 150 }
fn default_category_search_ms() -> u64 { 200 }

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            query_ms: default_query_ms(),
            category_ms: default_category_ms(),
            category_search_ms: default_category_search_ms(),
        }
    }
}

impl DebounceConfig {
    pub fn query(&self) -> Duration {
        Duration::from_millis(self.query_ms)
    }

    pub fn category(&self) -> Duration {
        Duration::from_millis(self.category_ms)
    }

    pub fn category_search(&self) -> Duration {
        Duration::from_millis(self.category_search_ms)
    }
}

/// `false` leaves the widget unmounted.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WidgetsConfig {
    #[serde(default = "default_true")]
    pub category_list: bool,
    #[serde(default = "default_true")]
    pub summary: bool,
    #[serde(default = "default_true")]
    pub no_results: bool,
    #[serde(default = "default_true")]
    pub clear_search: bool,
    #[serde(default = "default_true")]
    pub clear_filter: bool,
}

fn default_true() -> bool { true }

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            category_list: true,
            summary: true,
            no_results: true,
            clear_search: true,
            clear_filter: true,
        }
    }
}

pub fn config_path() -> PathBuf {
    match ProjectDirs::from("org", "catalog-filter", "catalog-filter") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!("No config at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.debounce, DebounceConfig::default());
        assert_eq!(config.debounce.query(), Duration::from_millis(300));
        assert_eq!(config.debounce.category(), Duration::from_millis(150));
        assert_eq!(config.debounce.category_search(), Duration::from_millis(200));
        assert_eq!(config.general.item_label, "package");
        assert!(config.widgets.summary);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            index = "dist/index.json"
            item_label = "plugin"

            [debounce]
            query_ms = 50

            [widgets]
            summary = false
            "#,
        )
        .unwrap();
        assert_eq!(config.general.index, Some(PathBuf::from("dist/index.json")));
        assert_eq!(config.general.item_label, "plugin");
        assert_eq!(config.debounce.query_ms, 50);
        assert_eq!(config.debounce.category_ms, 150);
        assert!(!config.widgets.summary);
        assert!(config.widgets.category_list);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert!(config.general.index.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[debounce]\nquery_ms = \"soon\"\n").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
