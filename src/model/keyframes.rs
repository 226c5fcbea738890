use std::collections::HashMap;

use super::frame::{FrameId, Keyframe};
use crate::error::EngineError;

/// An ordered, immutable run of keyframes.
///
/// Frames are kept in the order the store hands them out, which must already be
/// ascending by `start` with unique starts; the index validates this rather than
/// re-sorting. The start times are cached in a flat slice for the frame locator.
#[derive(Debug, Clone)]
pub struct KeyframeIndex<F> {
    frames: Vec<F>,
    starts: Vec<f64>,
    by_id: HashMap<FrameId, usize>,
}

impl<F: Keyframe> KeyframeIndex<F> {
    /// Build an index. `what` names the timeline in error messages.
    pub fn new(what: &str, frames: Vec<F>) -> Result<Self, EngineError> {
        if frames.is_empty() {
            return Err(EngineError::invalid_snapshot(format!("{what} timeline is empty")));
        }

        let mut starts = Vec::with_capacity(frames.len());
        let mut by_id = HashMap::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            let start = frame.start();
            if !start.is_finite() || start < 0.0 {
                return Err(EngineError::invalid_snapshot(format!(
                    "{what} frame {} has invalid start {start}",
                    frame.id()
                )));
            }
            if starts.last().is_some_and(|&prev| start <= prev) {
                return Err(EngineError::invalid_snapshot(format!(
                    "{what} frame {} at {start} is not after the previous frame",
                    frame.id()
                )));
            }
            if by_id.insert(frame.id().clone(), i).is_some() {
                return Err(EngineError::invalid_snapshot(format!(
                    "duplicate {what} frame id {}",
                    frame.id()
                )));
            }
            starts.push(start);
        }

        Ok(Self {
            frames,
            starts,
            by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false: construction rejects empty timelines.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Ascending start times, one per frame.
    pub fn starts(&self) -> &[f64] {
        &self.starts
    }

    pub fn get(&self, index: usize) -> Option<&F> {
        self.frames.get(index)
    }

    pub fn by_id(&self, id: &FrameId) -> Option<&F> {
        self.by_id.get(id).and_then(|&i| self.frames.get(i))
    }

    pub fn ordinal(&self, id: &FrameId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// The frame at `index` and its successor, if any. `index` is clamped into range.
    pub fn pair(&self, index: usize) -> (&F, Option<&F>) {
        let index = index.min(self.last_index());
        // Non-empty by construction, so the clamped index is always present.
        #[allow(clippy::indexing_slicing)]
        let current = &self.frames[index];
        (current, self.frames.get(index + 1))
    }

    /// Clamp a signed ordinal into `[0, len - 1]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn clamp_index(&self, index: i64) -> usize {
        if index <= 0 {
            0
        } else {
            (index as u64).min(self.last_index() as u64) as usize
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &F> {
        self.frames.iter()
    }
}
