use super::catalog::{PartCatalog, PartType};
use super::color::ColorPalette;
use super::frame::{ControlFrame, PositionFrame};
use super::keyframes::KeyframeIndex;
use super::led::LedFrames;
use crate::error::EngineError;

/// Everything the engine reads, loaded once and validated as a unit.
///
/// A snapshot is immutable: when the author edits keyframes the host loads a new
/// snapshot and hands it to `TimelineController::reload`.
#[derive(Debug, Clone)]
pub struct ShowSnapshot {
    pub controls: KeyframeIndex<ControlFrame>,
    pub positions: KeyframeIndex<PositionFrame>,
    pub led_frames: LedFrames,
    pub palette: ColorPalette,
    pub catalog: PartCatalog,
}

impl ShowSnapshot {
    /// Build and validate a snapshot from already-sorted collections.
    pub fn new(
        controls: Vec<ControlFrame>,
        positions: Vec<PositionFrame>,
        led_frames: LedFrames,
        palette: ColorPalette,
        catalog: PartCatalog,
    ) -> Result<Self, EngineError> {
        catalog.validate()?;
        let controls = KeyframeIndex::new("control", controls)?;
        let positions = KeyframeIndex::new("position", positions)?;

        for frame in controls.iter() {
            for (dancer, parts) in &frame.status {
                for (part, value) in parts {
                    let part_type = catalog.check_part(dancer, part)?;
                    if part_type != value.part_type() {
                        return Err(EngineError::invalid_snapshot(format!(
                            "control frame {} gives {dancer}/{part} a {:?} value but the part is {part_type:?}",
                            frame.id,
                            value.part_type()
                        )));
                    }
                    if !value.alpha().is_finite() {
                        return Err(EngineError::invalid_snapshot(format!(
                            "control frame {} has non-finite alpha for {dancer}/{part}",
                            frame.id
                        )));
                    }
                }
            }
        }

        for frame in positions.iter() {
            for dancer in frame.pos.keys() {
                if !catalog.contains_dancer(dancer) {
                    return Err(EngineError::UnknownDancer {
                        name: dancer.0.clone(),
                    });
                }
            }
            // Interpolation walks A's dancers and reads B for each, so every frame places everyone.
            if let Some(dancer) = catalog.dancers().find(|d| !frame.pos.contains_key(*d)) {
                return Err(EngineError::invalid_snapshot(format!(
                    "position frame {} does not place dancer {dancer}",
                    frame.id
                )));
            }
        }

        for (frame_id, parts) in led_frames.iter() {
            if controls.ordinal(frame_id).is_none() {
                return Err(EngineError::invalid_snapshot(format!(
                    "LED data references unknown control frame {frame_id}"
                )));
            }
            for (part, effect) in parts {
                if catalog.part_type(part) != Some(PartType::Led) {
                    return Err(EngineError::invalid_snapshot(format!(
                        "LED data for frame {frame_id} targets non-LED part {part}"
                    )));
                }
                effect.validate()?;
            }
        }

        Ok(Self {
            controls,
            positions,
            led_frames,
            palette,
            catalog,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::color::ColorId;
    use crate::model::frame::{PartValue, Position};
    use crate::model::led::{LedEffect, LedStep};

    fn catalog() -> PartCatalog {
        PartCatalog::new()
            .with_part("hat", PartType::Fiber)
            .with_part("LED_chest", PartType::Led)
            .with_dancer("d0", &["hat", "LED_chest"])
    }

    fn control(id: &str, start: f64, part: &str, value: PartValue) -> ControlFrame {
        ControlFrame {
            id: id.into(),
            start,
            fade: false,
            status: BTreeMap::from([("d0".into(), BTreeMap::from([(part.into(), value)]))]),
        }
    }

    fn position(id: &str, dancer: &str) -> PositionFrame {
        PositionFrame {
            id: id.into(),
            start: 0.0,
            pos: BTreeMap::from([(dancer.into(), Position::default())]),
        }
    }

    fn fiber() -> PartValue {
        PartValue::Fiber {
            color: ColorId(1),
            alpha: 10.0,
        }
    }

    #[test]
    fn accepts_consistent_data() {
        let snapshot = ShowSnapshot::new(
            vec![control("c0", 0.0, "hat", fiber())],
            vec![position("p0", "d0")],
            LedFrames::new(),
            ColorPalette::new(),
            catalog(),
        );
        assert!(snapshot.is_ok());
    }

    #[test]
    fn rejects_unknown_dancer_in_position_frame() {
        let err = ShowSnapshot::new(
            vec![control("c0", 0.0, "hat", fiber())],
            vec![position("p0", "ghost")],
            LedFrames::new(),
            ColorPalette::new(),
            catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::UnknownDancer { .. }));
    }

    #[test]
    fn rejects_position_frame_missing_a_dancer() {
        let err = ShowSnapshot::new(
            vec![control("c0", 0.0, "hat", fiber())],
            vec![position("p0", "d0")],
            LedFrames::new(),
            ColorPalette::new(),
            catalog().with_dancer("d1", &["hat"]),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSnapshot { .. }));
        assert!(err.to_string().contains("d1"), "{err}");
    }

    #[test]
    fn rejects_value_kind_mismatch() {
        let led_on_fiber = PartValue::Led {
            src: "bling".into(),
            alpha: 1.0,
        };
        let err = ShowSnapshot::new(
            vec![control("c0", 0.0, "hat", led_on_fiber)],
            vec![position("p0", "d0")],
            LedFrames::new(),
            ColorPalette::new(),
            catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSnapshot { .. }));
    }

    #[test]
    fn rejects_led_data_for_unknown_frame() {
        let effect = LedEffect {
            name: "bling".into(),
            steps: vec![LedStep {
                start: 0.0,
                colors: vec![],
                fade: false,
            }],
        };
        let err = ShowSnapshot::new(
            vec![control("c0", 0.0, "hat", fiber())],
            vec![position("p0", "d0")],
            LedFrames::new().with("c9", "LED_chest", effect),
            ColorPalette::new(),
            catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidSnapshot { .. }));
    }
}
