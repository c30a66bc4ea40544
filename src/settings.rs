use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};

use crate::synctex::DEFAULT_SYNCTEX_COMMAND;
use crate::viewer::ViewColumn;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "cloverleaf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Program used for forward/reverse sync
    #[serde(default = "default_synctex_command")]
    pub synctex_command: String,

    #[serde(default)]
    pub auto_compile: bool,

    #[serde(default = "default_auto_compile_delay_ms")]
    pub auto_compile_delay_ms: u64,

    #[serde(default = "default_preview_column")]
    pub preview_column: ViewColumn,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_synctex_command() -> String {
    DEFAULT_SYNCTEX_COMMAND.to_string()
}

fn default_auto_compile_delay_ms() -> u64 {
    1000
}

fn default_preview_column() -> ViewColumn {
    ViewColumn::Beside
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            synctex_command: default_synctex_command(),
            auto_compile: false,
            auto_compile_delay_ms: default_auto_compile_delay_ms(),
            preview_column: default_preview_column(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, migrating older versions
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        read_settings(path).map(|(settings, _)| settings)
    }

    pub fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut content = String::from(SETTINGS_HEADER);
        content.push_str(&serde_yaml::to_string(self)?);
        fs::write(path, content)?;
        Ok(())
    }
}

/// Parsed settings and whether a migration changed them
fn read_settings(path: &Path) -> anyhow::Result<(Settings, bool)> {
    let content = fs::read_to_string(path)?;
    let mut settings: Settings = serde_yaml::from_str(&content)?;
    let migrated = settings.version < CURRENT_VERSION;
    if migrated {
        migrate_settings(&mut settings);
    }
    Ok((settings, migrated))
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load the global settings from the user config directory, writing defaults
/// on first run
pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };
    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        save_settings_to_file(&current(), &path);
    }
}

/// Load the global settings from an explicit file
pub fn load_settings_from_path(path: &Path) {
    match read_settings(path) {
        Ok((settings, migrated)) => {
            debug!("Loaded settings from {path:?}");
            if migrated {
                save_settings_to_file(&settings, path);
            }
            if let Ok(mut global) = SETTINGS.write() {
                *global = settings;
            }
        }
        Err(e) => error!("Failed to load settings file {path:?}: {e}"),
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );
    settings.version = CURRENT_VERSION;
}

fn save_settings_to_file(settings: &Settings, path: &Path) {
    match settings.save_to_path(path) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

const SETTINGS_HEADER: &str = "# cloverleaf settings\n\
# synctex_command: program used for forward/reverse sync\n\
# auto_compile / auto_compile_delay_ms: compile this long after the last save\n\
# preview_column: active | beside | one | two | three\n";

// Public API for accessing/modifying settings

/// Snapshot of the global settings
pub fn current() -> Settings {
    SETTINGS.read().map(|s| s.clone()).unwrap_or_default()
}

pub fn get_synctex_command() -> String {
    SETTINGS
        .read()
        .map(|s| s.synctex_command.clone())
        .unwrap_or_else(|_| default_synctex_command())
}
