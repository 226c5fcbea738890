use serde::Serialize;

use super::led::{LedEffectMap, LedPlayback};
use super::position::ResolvedPos;
use super::status::ResolvedStatus;
use crate::error::EngineError;
use crate::model::{DancerName, PartName};

/// Mutable per-session resolution state.
///
/// Owned by whoever drives the editor (one writer at a time) and passed by `&mut` into
/// every `TimelineController` operation. Fields are only written by the controller; the
/// accessors below are the read contract for renderers and exporters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineState {
    pub(crate) current_time: f64,
    pub(crate) current_control_index: usize,
    pub(crate) current_pos_index: usize,
    pub(crate) current_status: ResolvedStatus,
    pub(crate) current_pos: ResolvedPos,
    pub(crate) current_fade: bool,
    pub(crate) current_led_effect: LedEffectMap,
    /// Snapshot generation the LED map was built for; `None` until initialized.
    #[serde(skip)]
    pub(crate) led_generation: Option<u64>,
    /// Control index the LED map was last derived at; `None` right after initialization.
    #[serde(skip)]
    pub(crate) led_index: Option<usize>,
}

impl EngineState {
    /// A fresh, uninitialized state. Run `init_current_led_effect` before the first query.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn current_control_index(&self) -> usize {
        self.current_control_index
    }

    pub fn current_pos_index(&self) -> usize {
        self.current_pos_index
    }

    pub fn current_status(&self) -> &ResolvedStatus {
        &self.current_status
    }

    pub fn current_pos(&self) -> &ResolvedPos {
        &self.current_pos
    }

    pub fn current_fade(&self) -> bool {
        self.current_fade
    }

    pub fn current_led_effect(&self) -> &LedEffectMap {
        &self.current_led_effect
    }

    pub fn is_led_initialized(&self) -> bool {
        self.led_generation.is_some()
    }

    /// Playback of one LED part, provided the LED map was built for snapshot `generation`.
    /// Hosts go through `TimelineController::led_playback`, which supplies the generation.
    pub(crate) fn led_playback_at(
        &self,
        generation: u64,
        dancer: &DancerName,
        part: &PartName,
    ) -> Result<&LedPlayback, EngineError> {
        let uninitialized = || EngineError::UninitializedState {
            what: format!("{dancer}/{part}"),
        };
        if self.led_generation != Some(generation) {
            return Err(uninitialized());
        }
        self.current_led_effect
            .get(dancer)
            .and_then(|parts| parts.get(part))
            .ok_or_else(uninitialized)
    }
}
