use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{BAUD_RATES, DEFAULT_BAUD_RATE, SETTINGS_DIR_NAME};
use crate::error::{ConfigToolError, ToolResult};

/// Tool preferences. The device configuration itself lives on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct PersistentSettings {
    #[serde(default = "default_port")]
    pub port_path: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_true")]
    pub auto_scroll_console: bool,

    // Destination and path fields
    #[serde(default)]
    pub show_advanced: bool,
}

fn default_port() -> String {
    if cfg!(windows) {
        "COM1".to_string()
    } else {
        "/dev/ttyUSB0".to_string()
    }
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_true() -> bool {
    true
}

impl Default for PersistentSettings {
    fn default() -> Self {
        Self {
            port_path: default_port(),
            baud_rate: DEFAULT_BAUD_RATE,
            auto_scroll_console: true,
            show_advanced: false,
        }
    }
}

impl PersistentSettings {
    /// `<config dir>/tinyaprs_config/settings.json`
    fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join(SETTINGS_DIR_NAME).join("settings.json")
    }

    /// Load settings from disk, or use defaults if the file is missing or broken
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    if !BAUD_RATES.contains(&settings.baud_rate) {
                        log::warn!("Unsupported baud rate {}, using {DEFAULT_BAUD_RATE}", settings.baud_rate);
                        settings.baud_rate = DEFAULT_BAUD_RATE;
                    }
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings file: {e}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> ToolResult<()> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> ToolResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| ConfigToolError::Settings(format!("failed to create {}: {e}", dir.display())))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigToolError::Settings(format!("failed to serialize settings: {e}")))?;
        fs::write(path, json)
            .map_err(|e| ConfigToolError::Settings(format!("failed to write settings file: {e}")))
    }
}

/// System that saves settings when their value changes. The UI takes
/// `&mut` every frame, so change detection alone fires on every frame.
pub fn auto_save_system(settings: Res<PersistentSettings>, mut last_saved: Local<Option<PersistentSettings>>) {
    if settings.is_changed()
        && take_unsaved(&mut last_saved, &settings)
        && let Err(e) = settings.save()
    {
        log::error!("Failed to auto-save settings: {e}");
    }
}

/// Records `current` as saved and returns whether it differs from the last
/// recorded value. The first value seen came from disk and is not saved.
fn take_unsaved(last_saved: &mut Option<PersistentSettings>, current: &PersistentSettings) -> bool {
    if last_saved.as_ref() == Some(current) {
        return false;
    }
    let first = last_saved.is_none();
    *last_saved = Some(current.clone());
    !first
}
