use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

use crate::engine::{EngineState, FiberStatus, LedEffectMap, ResolvedPos, ResolvedStatus};
use crate::error::EngineError;
use crate::model::{DancerName, PartName, PartType, PartValue, ShowSnapshot};

/// One control frame of a dancer's fiber export.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct FiberFrame {
    pub start: f64,
    pub fade: bool,
    /// FIBER part → `[r, g, b, alpha]`.
    pub status: BTreeMap<PartName, FiberStatus>,
}

/// Every control frame in order, reduced to one dancer's FIBER parts with colors
/// resolved through the palette. Frames that leave the dancer out export an empty status.
pub fn dancer_fiber_data(snapshot: &ShowSnapshot, dancer: &DancerName) -> Result<Vec<FiberFrame>, EngineError> {
    let fiber_parts: Vec<&PartName> = snapshot
        .catalog
        .parts(dancer)?
        .iter()
        .filter(|part| snapshot.catalog.part_type(part) == Some(PartType::Fiber))
        .collect();

    let frames = snapshot
        .controls
        .iter()
        .map(|frame| {
            let status = fiber_parts
                .iter()
                .filter_map(|&part| match frame.value(dancer, part)? {
                    PartValue::Fiber { color, alpha } => {
                        let rgb = snapshot.palette.resolve(*color);
                        Some((part.clone(), FiberStatus(rgb.r(), rgb.g(), rgb.b(), *alpha)))
                    }
                    PartValue::Led { .. } => None,
                })
                .collect();
            FiberFrame {
                start: frame.start,
                fade: frame.fade,
                status,
            }
        })
        .collect();
    Ok(frames)
}

/// Read-only view of everything the engine resolved at the current time.
#[derive(Debug, Serialize)]
pub struct ResolvedFrame<'a> {
    pub time: f64,
    pub control_index: usize,
    pub pos_index: usize,
    pub fade: bool,
    pub status: &'a ResolvedStatus,
    pub pos: &'a ResolvedPos,
    pub led_effect: &'a LedEffectMap,
}

pub fn resolved_frame(state: &EngineState) -> ResolvedFrame<'_> {
    ResolvedFrame {
        time: state.current_time(),
        control_index: state.current_control_index(),
        pos_index: state.current_pos_index(),
        fade: state.current_fade(),
        status: state.current_status(),
        pos: state.current_pos(),
        led_effect: state.current_led_effect(),
    }
}
