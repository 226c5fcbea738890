use super::edit::{apply_edits, StatusEdit};
use super::led::{self, LedPlayback};
use super::locator::locate;
use super::position::resolve_pos;
use super::state::EngineState;
use super::status::resolve_status;
use crate::error::EngineError;
use crate::model::{DancerName, PartName, PartType, ShowSnapshot};
use crate::settings::EngineSettings;
use crate::store::ShowSource;

/// Entry points of the timeline engine.
///
/// The controller owns the loaded [`ShowSnapshot`] (the cache of everything the store
/// handed out) and is otherwise stateless: every operation takes the session's
/// [`EngineState`] explicitly. Operations either fully update the state or, on error,
/// leave it untouched.
#[derive(Debug, Clone)]
pub struct TimelineController {
    snapshot: ShowSnapshot,
    settings: EngineSettings,
    /// Bumped on every reload so states built against older data can be detected.
    generation: u64,
}

impl TimelineController {
    pub fn new(snapshot: ShowSnapshot, settings: EngineSettings) -> Self {
        tracing::info!(
            control_frames = snapshot.controls.len(),
            position_frames = snapshot.positions.len(),
            dancers = snapshot.catalog.dancer_count(),
            colors = snapshot.palette.len(),
            "timeline snapshot loaded"
        );
        Self {
            snapshot,
            settings,
            generation: 1,
        }
    }

    /// Load a snapshot from the store and build a controller around it.
    pub fn load(source: &dyn ShowSource, settings: EngineSettings) -> Result<Self, EngineError> {
        Ok(Self::new(source.load_snapshot()?, settings))
    }

    /// Replace the cached snapshot after the store signalled new data. On error the
    /// previous snapshot stays in place.
    ///
    /// States initialized against the old snapshot must run
    /// [`init_current_led_effect`](Self::init_current_led_effect) again before the next query.
    pub fn reload(&mut self, source: &dyn ShowSource) -> Result<(), EngineError> {
        let snapshot = source.load_snapshot()?;
        self.replace_snapshot(snapshot);
        Ok(())
    }

    pub fn replace_snapshot(&mut self, snapshot: ShowSnapshot) {
        self.snapshot = snapshot;
        self.generation += 1;
        tracing::info!(generation = self.generation, "timeline snapshot reloaded");
    }

    pub fn snapshot(&self) -> &ShowSnapshot {
        &self.snapshot
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reset LED playback to idle for every LED part of every dancer. Idempotent.
    pub fn init_current_led_effect(&self, state: &mut EngineState) {
        let mut effects = led::LedEffectMap::new();
        for (dancer, part) in self.snapshot.catalog.parts_of_type(PartType::Led) {
            effects
                .entry(dancer.clone())
                .or_default()
                .insert(part.clone(), LedPlayback::idle());
        }
        state.current_led_effect = effects;
        state.led_generation = Some(self.generation);
        state.led_index = None;
    }

    /// Resolve the whole show at `time` (negative times clamp to 0).
    pub fn set_current_time(&self, state: &mut EngineState, time: f64) -> Result<(), EngineError> {
        if !time.is_finite() {
            return Err(EngineError::invalid_input("time", time));
        }
        if state.led_generation != Some(self.generation) {
            return Err(EngineError::UninitializedState {
                what: "current LED effect".to_string(),
            });
        }
        let time = time.max(0.0);
        let window = self.settings.locate_window;
        let snapshot = &self.snapshot;

        let control_index = locate(
            snapshot.controls.starts(),
            state.current_control_index,
            time,
            window,
        );
        let (frame, next_frame) = snapshot.controls.pair(control_index);
        let status = resolve_status(
            time,
            frame,
            next_frame,
            &snapshot.palette,
            self.settings.missing_part,
        );
        let leds = led::advance(
            &state.current_led_effect,
            state.led_index,
            control_index,
            frame,
            &snapshot.led_frames,
            time,
        );

        let pos_index = locate(
            snapshot.positions.starts(),
            state.current_pos_index,
            time,
            window,
        );
        let (pos_frame, next_pos_frame) = snapshot.positions.pair(pos_index);
        let pos = resolve_pos(time, pos_frame, next_pos_frame);

        state.current_time = time;
        state.current_control_index = control_index;
        state.current_pos_index = pos_index;
        state.current_status = status;
        state.current_pos = pos;
        state.current_fade = frame.fade;
        if let Some(leds) = leds {
            state.current_led_effect = leds;
        }
        state.led_index = Some(control_index);
        Ok(())
    }

    /// Playback of one LED part. Fails with `UninitializedState` if `state` was never
    /// initialized, was initialized for an older snapshot, or has no such LED part.
    pub fn led_playback<'s>(
        &self,
        state: &'s EngineState,
        dancer: &DancerName,
        part: &PartName,
    ) -> Result<&'s LedPlayback, EngineError> {
        state.led_playback_at(self.generation, dancer, part)
    }

    /// Jump to the start of control frame `index` (clamped into range).
    pub fn set_current_control_index(&self, state: &mut EngineState, index: i64) -> Result<(), EngineError> {
        let (frame, _) = self.snapshot.controls.pair(self.snapshot.controls.clamp_index(index));
        self.set_current_time(state, frame.start)
    }

    /// Jump to the start of position frame `index` (clamped into range).
    pub fn set_current_pos_index(&self, state: &mut EngineState, index: i64) -> Result<(), EngineError> {
        let (frame, _) = self.snapshot.positions.pair(self.snapshot.positions.clamp_index(index));
        self.set_current_time(state, frame.start)
    }

    /// Apply an edit batch from the editor panels to the displayed status.
    /// Keyframes are not touched; persisting edits is the store's job.
    pub fn edit_current_status(&self, state: &mut EngineState, edits: &[StatusEdit]) -> Result<(), EngineError> {
        let status = apply_edits(
            &state.current_status,
            &self.snapshot.catalog,
            &self.snapshot.palette,
            edits,
        )?;
        state.current_status = status;
        Ok(())
    }
}
