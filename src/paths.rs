//! Leaf filenames of a show data directory and the functions that build their paths.
//!
//! Every module that touches the filesystem goes through here; no other module
//! hard-codes these strings.

use std::path::{Path, PathBuf};

// ── Leaf filenames ───────────────────────────────────────────────

pub const SETTINGS_FILE: &str = "settings.json";
pub const CONTROL_FRAMES_FILE: &str = "control_frames.json";
pub const POSITION_FRAMES_FILE: &str = "position_frames.json";
pub const LED_FRAMES_FILE: &str = "led_frames.json";
pub const COLORS_FILE: &str = "colors.json";
pub const DANCERS_FILE: &str = "dancers.json";

// ── Data-dir functions ───────────────────────────────────────────

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE)
}

pub fn control_frames_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONTROL_FRAMES_FILE)
}

pub fn position_frames_path(data_dir: &Path) -> PathBuf {
    data_dir.join(POSITION_FRAMES_FILE)
}

pub fn led_frames_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LED_FRAMES_FILE)
}

pub fn colors_path(data_dir: &Path) -> PathBuf {
    data_dir.join(COLORS_FILE)
}

pub fn dancers_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DANCERS_FILE)
}
