use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::catalog::{DancerName, PartName, PartType};
use super::color::ColorId;

/// Opaque id of a keyframe as handed out by the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct FrameId(pub String);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FrameId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Target value for one part in a control frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum PartValue {
    /// Palette color plus intensity.
    Fiber { color: ColorId, alpha: f64 },
    /// Named LED effect plus intensity. The effect steps come from the LED frame data.
    Led { src: String, alpha: f64 },
}

impl PartValue {
    pub fn alpha(&self) -> f64 {
        match self {
            PartValue::Fiber { alpha, .. } | PartValue::Led { alpha, .. } => *alpha,
        }
    }

    /// The part type this value is valid for.
    pub fn part_type(&self) -> PartType {
        match self {
            PartValue::Fiber { .. } => PartType::Fiber,
            PartValue::Led { .. } => PartType::Led,
        }
    }
}

pub type DancerStatus = BTreeMap<PartName, PartValue>;

/// A color/intensity keyframe. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlFrame {
    pub id: FrameId,
    /// Absolute time in seconds.
    pub start: f64,
    /// Interpolate toward the next frame (true) or hold until it (false).
    pub fade: bool,
    pub status: BTreeMap<DancerName, DancerStatus>,
}

impl ControlFrame {
    pub fn value(&self, dancer: &DancerName, part: &PartName) -> Option<&PartValue> {
        self.status.get(dancer).and_then(|parts| parts.get(part))
    }
}

/// Stage position of one dancer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Per-coordinate linear blend. `t` is expected in [0, 1].
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }
}

/// A stage-position keyframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionFrame {
    pub id: FrameId,
    pub start: f64,
    pub pos: BTreeMap<DancerName, Position>,
}

/// Anything placed on a timeline at an absolute start time.
pub trait Keyframe {
    fn id(&self) -> &FrameId;
    fn start(&self) -> f64;
}

impl Keyframe for ControlFrame {
    fn id(&self) -> &FrameId {
        &self.id
    }

    fn start(&self) -> f64 {
        self.start
    }
}

impl Keyframe for PositionFrame {
    fn id(&self) -> &FrameId {
        &self.id
    }

    fn start(&self) -> f64 {
        self.start
    }
}
