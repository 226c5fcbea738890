use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::catalog::PartName;
use super::color::Rgb;
use super::frame::FrameId;
use crate::error::EngineError;

/// One step of an LED effect: the pixel colors shown from `start` (seconds after
/// the owning control frame begins) until the next step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedStep {
    pub start: f64,
    pub colors: Vec<Rgb>,
    /// Blend toward the next step's colors instead of snapping.
    #[serde(default)]
    pub fade: bool,
}

/// A named multi-step LED pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedEffect {
    pub name: String,
    pub steps: Vec<LedStep>,
}

impl LedEffect {
    /// Step offsets must be finite and strictly ascending; the first starts at or after 0.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut prev: Option<f64> = None;
        for step in &self.steps {
            if !step.start.is_finite() || step.start < 0.0 {
                return Err(EngineError::invalid_snapshot(format!(
                    "LED effect {} has step at invalid offset {}",
                    self.name, step.start
                )));
            }
            if prev.is_some_and(|p| step.start <= p) {
                return Err(EngineError::invalid_snapshot(format!(
                    "LED effect {} steps are not strictly ascending",
                    self.name
                )));
            }
            prev = Some(step.start);
        }
        Ok(())
    }
}

/// LED effect assignments per control frame: frame id → part → effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedFrames(BTreeMap<FrameId, BTreeMap<PartName, Arc<LedEffect>>>);

impl LedFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, frame: &str, part: &str, effect: LedEffect) -> Self {
        self.insert(FrameId::from(frame), PartName::from(part), effect);
        self
    }

    pub fn insert(&mut self, frame: FrameId, part: PartName, effect: LedEffect) {
        self.0.entry(frame).or_default().insert(part, Arc::new(effect));
    }

    /// The effect `frame` assigns to `part`, if any.
    pub fn effect(&self, frame: &FrameId, part: &PartName) -> Option<&Arc<LedEffect>> {
        self.0.get(frame).and_then(|parts| parts.get(part))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FrameId, &BTreeMap<PartName, Arc<LedEffect>>)> {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn step(start: f64) -> LedStep {
        LedStep {
            start,
            colors: vec![Rgb::WHITE],
            fade: false,
        }
    }

    #[test]
    fn validate_rejects_unsorted_steps() {
        let ok = LedEffect {
            name: "bling".into(),
            steps: vec![step(0.0), step(0.5), step(1.0)],
        };
        assert!(ok.validate().is_ok());

        let bad = LedEffect {
            name: "bling".into(),
            steps: vec![step(0.0), step(1.0), step(1.0)],
        };
        assert!(matches!(bad.validate(), Err(EngineError::InvalidSnapshot { .. })));
    }

    #[test]
    fn lookup_by_frame_and_part() {
        let frames = LedFrames::new().with(
            "c3",
            "LED_chest",
            LedEffect {
                name: "wave".into(),
                steps: vec![step(0.0)],
            },
        );
        assert!(frames.effect(&"c3".into(), &"LED_chest".into()).is_some());
        assert!(frames.effect(&"c2".into(), &"LED_chest".into()).is_none());
    }

    #[test]
    fn deserializes_nested_map() {
        let json = r#"{ "c1": { "LED_chest": { "name": "w", "steps": [ { "start": 0, "colors": [[1,2,3]] } ] } } }"#;
        let frames: LedFrames = serde_json::from_str(json).unwrap();
        let effect = frames.effect(&"c1".into(), &"LED_chest".into()).unwrap();
        assert_eq!(effect.steps[0].colors[0], Rgb(1, 2, 3));
        assert!(!effect.steps[0].fade);
    }
}
