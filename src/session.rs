use parking_lot::Mutex;

use crate::engine::{EngineState, StatusEdit, TimelineController};
use crate::error::EngineError;
use crate::store::ShowSource;

// ── Editor session ─────────────────────────────────────────────────

/// A controller and the one `EngineState` it drives, shared between callers that may
/// run concurrently (editor panels, export jobs).
///
/// The engine itself never locks. Every mutating call here holds both locks for its
/// whole duration, always taking the controller before the state, so calls against
/// the session are serialized.
pub struct EditorSession {
    controller: Mutex<TimelineController>,
    state: Mutex<EngineState>,
}

impl EditorSession {
    /// Wrap `controller` and resolve the show at time 0.
    pub fn new(controller: TimelineController) -> Result<Self, EngineError> {
        let mut state = EngineState::new();
        controller.init_current_led_effect(&mut state);
        controller.set_current_time(&mut state, 0.0)?;
        Ok(Self {
            controller: Mutex::new(controller),
            state: Mutex::new(state),
        })
    }

    /// Read-only access to the controller. Locks the mutex for the duration of `f`.
    pub fn with_controller<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&TimelineController) -> R,
    {
        let guard = self.controller.lock();
        f(&guard)
    }

    /// Read-only access to the resolved state. Locks the mutex for the duration of `f`.
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EngineState) -> R,
    {
        let guard = self.state.lock();
        f(&guard)
    }

    /// Run one controller operation against the state with both locks held.
    fn with_both<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&TimelineController, &mut EngineState) -> R,
    {
        let controller = self.controller.lock();
        let mut state = self.state.lock();
        f(&controller, &mut state)
    }

    pub fn set_current_time(&self, time: f64) -> Result<(), EngineError> {
        self.with_both(|c, s| c.set_current_time(s, time))
    }

    pub fn set_current_control_index(&self, index: i64) -> Result<(), EngineError> {
        self.with_both(|c, s| c.set_current_control_index(s, index))
    }

    pub fn set_current_pos_index(&self, index: i64) -> Result<(), EngineError> {
        self.with_both(|c, s| c.set_current_pos_index(s, index))
    }

    pub fn edit_current_status(&self, edits: &[StatusEdit]) -> Result<(), EngineError> {
        self.with_both(|c, s| c.edit_current_status(s, edits))
    }

    /// Reload show data, re-initialize LED playback and re-resolve at the current time.
    /// If loading fails nothing changes.
    pub fn reload(&self, source: &dyn ShowSource) -> Result<(), EngineError> {
        let mut controller = self.controller.lock();
        let mut state = self.state.lock();
        controller.reload(source)?;
        let time = state.current_time();
        controller.init_current_led_effect(&mut state);
        controller.set_current_time(&mut state, time)
    }
}
