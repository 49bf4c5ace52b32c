//! Application configuration.
//!
//! Settings are layered: built-in defaults, then the optional
//! `config.toml` under the user's config directory, then `GAMELOG_*`
//! environment variables (nested keys use `__`, e.g.
//! `GAMELOG_SEARCH__INCLUDE_NOTES=true`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::query::{
    HardwarePriority, QueryEngine, QueryState, SearchScope, SortKey, DEFAULT_HARDWARE_PRIORITY,
};

/// Directory under `~/.config` holding `config.toml`.
pub const CONFIG_DIR: &str = "gamelog";
/// File name of the user configuration.
pub const CONFIG_FILE: &str = "config.toml";
/// Dataset used when nothing else is configured.
pub const DEFAULT_DATASET_PATH: &str = "data/games.json";

const ENV_PREFIX: &str = "GAMELOG";

const DEFAULT_CONFIG: &str = r#"# Game log configuration.

# JSON dataset loaded at startup, relative to the working directory.
dataset_path = "data/games.json"

# Platform codes in selector order. Unlisted platforms follow alphabetically.
hardware_priority = [
  "SFC", "GB", "GBA", "GC", "DS", "3DS",
  "PS", "PS2", "PS3", "PS4", "PS5", "PSP",
  "Switch", "PC", "Steam", "Mobile",
]

# One of releaseDate_asc, releaseDate_desc, title_asc, title_desc,
# playtime_asc, playtime_desc.
default_sort = "releaseDate_asc"

# The keyword is always searched; these widen the match.
[search]
include_achievement = false
include_notes = false
include_hardware = false
"#;

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location of the JSON dataset.
    pub dataset_path: PathBuf,
    /// Platform codes in selector order.
    pub hardware_priority: Vec<String>,
    /// Sort key applied when a session starts.
    pub default_sort: String,
    /// Extra fields matched by the search text.
    #[serde(default)]
    pub search: SearchScope,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            hardware_priority: DEFAULT_HARDWARE_PRIORITY
                .iter()
                .map(|code| code.to_string())
                .collect(),
            default_sort: SortKey::default().as_key().to_string(),
            search: SearchScope::default(),
        }
    }
}

impl AppConfig {
    /// Location of the user configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Load settings from the standard location and environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load settings from `path` (optional) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default(
                "dataset_path",
                defaults.dataset_path.to_string_lossy().to_string(),
            )?
            .set_default("hardware_priority", defaults.hardware_priority)?
            .set_default("default_sort", defaults.default_sort)?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("hardware_priority")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse configuration {}", path.display()))?;
        info!(
            dataset = %config.dataset_path.display(),
            sort = %config.default_sort,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Query engine built from these settings.
    pub fn engine(&self) -> QueryEngine {
        QueryEngine::new(
            HardwarePriority::new(self.hardware_priority.iter().cloned()),
            self.search,
        )
    }

    /// Query state a new session starts with.
    pub fn initial_query(&self) -> QueryState {
        QueryState {
            sort: SortKey::from_key(&self.default_sort),
            ..QueryState::default()
        }
    }
}

/// Write the commented default configuration if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(AppConfig::config_path())
}

/// Write the commented default configuration to `path` if it is missing.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_matches_built_in_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);
        ensure_default_config_at(&path)?;
        assert!(path.is_file());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn existing_file_is_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "default_sort = \"title_desc\"\n")?;
        ensure_default_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "default_sort = \"title_desc\"\n");
        Ok(())
    }

    #[test]
    fn file_overrides_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
dataset_path = "/srv/games.json"
hardware_priority = ["Switch", "PS5"]
default_sort = "playtime_desc"

[search]
include_notes = true
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.dataset_path, PathBuf::from("/srv/games.json"));
        assert_eq!(config.hardware_priority, vec!["Switch", "PS5"]);
        assert!(config.search.include_notes);
        assert!(!config.search.include_achievement);
        assert_eq!(config.initial_query().sort, SortKey::PlaytimeDesc);
        assert_eq!(config.engine().priority().codes(), ["Switch", "PS5"]);
        Ok(())
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(config.engine().scope(), SearchScope::keyword_only());
        assert_eq!(config.initial_query(), QueryState::default());
        Ok(())
    }

    #[test]
    fn unknown_default_sort_degrades_to_store_order() {
        let config = AppConfig {
            default_sort: "rating_desc".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.initial_query().sort, SortKey::StoreOrder);
    }
}
