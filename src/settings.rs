use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::engine::locator::DEFAULT_LOCATE_WINDOW;
use crate::engine::status::MissingPartPolicy;
use crate::error::EngineError;
use crate::store::{read_json, write_json};

const SETTINGS_VERSION: u32 = 1;

fn default_locate_window() -> usize {
    DEFAULT_LOCATE_WINDOW
}

/// Engine tuning stored next to the show data as `settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct EngineSettings {
    pub version: u32,
    /// Keyframes the locator scans around its previous answer before binary searching.
    #[serde(default = "default_locate_window")]
    pub locate_window: usize,
    /// Fade behavior for parts the next control frame leaves out.
    #[serde(default)]
    pub missing_part: MissingPartPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            locate_window: DEFAULT_LOCATE_WINDOW,
            missing_part: MissingPartPolicy::default(),
        }
    }
}

/// Load settings from the data directory. A missing file yields the defaults.
pub fn load_settings(data_dir: &Path) -> Result<EngineSettings, EngineError> {
    let path = crate::paths::settings_path(data_dir);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(EngineSettings::default());
    }
    let settings: EngineSettings = read_json(&path)?;
    if settings.version > SETTINGS_VERSION {
        return Err(EngineError::InvalidSettings {
            message: format!(
                "settings version {} is newer than supported version {SETTINGS_VERSION}",
                settings.version
            ),
        });
    }
    Ok(settings)
}

/// Save settings to the data directory.
pub fn save_settings(data_dir: &Path, settings: &EngineSettings) -> Result<(), EngineError> {
    std::fs::create_dir_all(data_dir)?;
    write_json(&crate::paths::settings_path(data_dir), settings)?;
    Ok(())
}

/// JSON schema of `settings.json`, for editors that validate the file.
pub fn settings_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(EngineSettings)).unwrap_or_default()
}
