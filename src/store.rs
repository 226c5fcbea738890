use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EngineError;
use crate::model::{ColorPalette, ControlFrame, LedFrames, PartCatalog, PositionFrame, ShowSnapshot};
use crate::paths;

// ── Error type ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Missing data file: {0}")]
    Missing(PathBuf),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io { .. } | StoreError::Missing(_) => EngineError::IoError {
                message: e.to_string(),
            },
            StoreError::Json { .. } => EngineError::JsonError {
                message: e.to_string(),
            },
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Per-file mutex map to serialize concurrent writes to the same path.
static FILE_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Atomically write bytes to a file: write a `.tmp` sibling, fsync, then rename over
/// the target. Writers to the same path are serialized.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let lock = FILE_LOCKS
        .lock()
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone();
    let _guard = lock.lock();

    let mut tmp_name = OsString::from(path.file_name().unwrap_or_default());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(&tmp_name);

    let mut file = fs::File::create(&tmp_path).map_err(io_error(&tmp_path))?;
    file.write_all(data).map_err(io_error(&tmp_path))?;
    file.sync_all().map_err(io_error(&tmp_path))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(io_error(path))
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, json.as_bytes())
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        return Err(StoreError::Missing(path.to_path_buf()));
    }
    let data = fs::read_to_string(path).map_err(io_error(path))?;
    serde_json::from_str(&data).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

// ── Source trait ────────────────────────────────────────────────────

/// Where keyframes, LED data, colors and the dancer catalog come from.
///
/// Implementations only fetch; validation happens once in [`ShowSource::load_snapshot`].
pub trait ShowSource {
    /// Control frames in ascending `start` order.
    fn load_control_frames(&self) -> Result<Vec<ControlFrame>, StoreError>;
    /// Position frames in ascending `start` order.
    fn load_position_frames(&self) -> Result<Vec<PositionFrame>, StoreError>;
    fn load_led_frames(&self) -> Result<LedFrames, StoreError>;
    fn load_color_palette(&self) -> Result<ColorPalette, StoreError>;
    fn load_part_catalog(&self) -> Result<PartCatalog, StoreError>;

    /// Fetch all five collections and validate them as one snapshot.
    fn load_snapshot(&self) -> Result<ShowSnapshot, EngineError> {
        ShowSnapshot::new(
            self.load_control_frames()?,
            self.load_position_frames()?,
            self.load_led_frames()?,
            self.load_color_palette()?,
            self.load_part_catalog()?,
        )
    }
}

/// A show stored as one JSON file per collection in a data directory.
/// `led_frames.json` is optional; the other files are required.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ShowSource for JsonDirSource {
    fn load_control_frames(&self) -> Result<Vec<ControlFrame>, StoreError> {
        read_json(&paths::control_frames_path(&self.dir))
    }

    fn load_position_frames(&self) -> Result<Vec<PositionFrame>, StoreError> {
        read_json(&paths::position_frames_path(&self.dir))
    }

    fn load_led_frames(&self) -> Result<LedFrames, StoreError> {
        match read_json(&paths::led_frames_path(&self.dir)) {
            Err(StoreError::Missing(path)) => {
                tracing::debug!(path = %path.display(), "no LED data, every LED part stays idle");
                Ok(LedFrames::new())
            }
            other => other,
        }
    }

    fn load_color_palette(&self) -> Result<ColorPalette, StoreError> {
        read_json(&paths::colors_path(&self.dir))
    }

    fn load_part_catalog(&self) -> Result<PartCatalog, StoreError> {
        read_json(&paths::dancers_path(&self.dir))
    }
}

// ── Save ────────────────────────────────────────────────────────────

/// Write every collection of `snapshot` into `dir` in the layout [`JsonDirSource`] reads.
pub fn save_snapshot(snapshot: &ShowSnapshot, dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;

    let controls: Vec<&ControlFrame> = snapshot.controls.iter().collect();
    write_json(&paths::control_frames_path(dir), &controls)?;

    let positions: Vec<&PositionFrame> = snapshot.positions.iter().collect();
    write_json(&paths::position_frames_path(dir), &positions)?;

    write_json(&paths::led_frames_path(dir), &snapshot.led_frames)?;
    write_json(&paths::colors_path(dir), &snapshot.palette)?;
    write_json(&paths::dancers_path(dir), &snapshot.catalog)?;

    tracing::info!(dir = %dir.display(), "show data written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::{DancerName, PartName, PartValue};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lightdance_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = temp_dir("store_roundtrip");
        let show = crate::demo::create_demo_show().unwrap();
        save_snapshot(&show, &dir).expect("save failed");

        let loaded = JsonDirSource::new(&dir).load_snapshot().expect("load failed");
        assert_eq!(loaded.controls.len(), show.controls.len());
        assert_eq!(loaded.positions.starts(), show.positions.starts());
        assert_eq!(loaded.palette.len(), show.palette.len());
        assert_eq!(
            loaded.catalog.dancers().collect::<Vec<_>>(),
            show.catalog.dancers().collect::<Vec<_>>()
        );
        let first = loaded.controls.get(0).unwrap();
        assert_eq!(first.id, show.controls.get(0).unwrap().id);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reads_hand_written_files() {
        let dir = temp_dir("store_hand_written");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(paths::DANCERS_FILE),
            r#"{ "dancers": { "d0": ["hat"] }, "part_types": { "hat": "FIBER" } }"#,
        )
        .unwrap();
        fs::write(dir.join(paths::COLORS_FILE), r#"{ "1": [255, 0, 0] }"#).unwrap();
        fs::write(
            dir.join(paths::CONTROL_FRAMES_FILE),
            r#"[{ "id": "c0", "start": 0, "fade": true, "status": { "d0": { "hat": { "color": 1, "alpha": 10 } } } }]"#,
        )
        .unwrap();
        fs::write(
            dir.join(paths::POSITION_FRAMES_FILE),
            r#"[{ "id": "p0", "start": 0, "pos": { "d0": { "x": 1.5, "y": -2 } } }]"#,
        )
        .unwrap();

        let show = JsonDirSource::new(&dir).load_snapshot().unwrap();
        let frame = show.controls.get(0).unwrap();
        assert!(frame.fade);
        assert_eq!(
            frame.value(&DancerName::from("d0"), &PartName::from("hat")),
            Some(&PartValue::Fiber {
                color: crate::model::ColorId(1),
                alpha: 10.0
            })
        );
        assert_eq!(show.positions.get(0).unwrap().pos[&DancerName::from("d0")].z, 0.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_required_file_is_reported() {
        let dir = temp_dir("store_missing");
        fs::create_dir_all(&dir).unwrap();
        let err = JsonDirSource::new(&dir).load_snapshot().unwrap_err();
        assert!(matches!(err, EngineError::IoError { .. }));
        assert!(err.to_string().contains("Missing data file"), "got: {err}");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_json_maps_to_json_error() {
        let dir = temp_dir("store_malformed");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(paths::DANCERS_FILE), "{ not json").unwrap();
        let err: EngineError = JsonDirSource::new(&dir).load_part_catalog().unwrap_err().into();
        assert!(matches!(err, EngineError::JsonError { .. }));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn atomic_write_replaces_content_and_leaves_no_temp_file() {
        let dir = temp_dir("store_atomic");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("data.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.join("data.json.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
