use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use ts_rs::TS;

use super::status::fraction;
use crate::model::{ControlFrame, DancerName, LedEffect, LedFrames, LedStep, PartName, PartValue, Rgb};

/// Playback of one LED part: the queued effect and the step the cursor points at.
///
/// Idle parts have no effect queued. The cursor only moves when the control timeline
/// crosses a keyframe boundary; see [`advance`].
///
/// Serialized as `{ "queue": [step, ...], "cursor": n }`, with an empty queue while idle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct LedPlayback {
    #[serde(rename = "queue", serialize_with = "serialize_queue")]
    #[ts(as = "Vec<LedStep>")]
    effect: Option<Arc<LedEffect>>,
    cursor: usize,
}

#[allow(clippy::ref_option)]
fn serialize_queue<S: Serializer>(effect: &Option<Arc<LedEffect>>, serializer: S) -> Result<S::Ok, S::Error> {
    let steps: &[LedStep] = effect.as_deref().map_or(&[], |e| e.steps.as_slice());
    steps.serialize(serializer)
}

/// dancer → LED part → playback.
pub type LedEffectMap = BTreeMap<DancerName, BTreeMap<PartName, LedPlayback>>;

impl LedPlayback {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Queue `effect` with the cursor on the step active `elapsed` seconds into the frame.
    pub fn start(effect: Arc<LedEffect>, elapsed: f64) -> Self {
        let cursor = step_index(&effect.steps, elapsed);
        Self {
            effect: Some(effect),
            cursor,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.queue().is_empty()
    }

    pub fn effect(&self) -> Option<&LedEffect> {
        self.effect.as_deref()
    }

    /// The queued steps; empty while idle.
    pub fn queue(&self) -> &[LedStep] {
        self.effect
            .as_deref()
            .map(|e| e.steps.as_slice())
            .unwrap_or(&[])
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Step that would be showing `elapsed` seconds after the owning frame started.
    /// Read-only: the stored cursor is not touched.
    pub fn step_at(&self, elapsed: f64) -> Option<usize> {
        let steps = self.queue();
        (!steps.is_empty()).then(|| step_index(steps, elapsed))
    }

    /// Pixel colors `elapsed` seconds into the frame, blending into the next step
    /// when the active step fades.
    pub fn colors_at(&self, elapsed: f64) -> Vec<Rgb> {
        let steps = self.queue();
        let Some(index) = self.step_at(elapsed) else {
            return Vec::new();
        };
        let (Some(step), next) = (steps.get(index), steps.get(index + 1)) else {
            return Vec::new();
        };
        match next {
            Some(next) if step.fade => {
                let t = fraction(elapsed, step.start, next.start);
                step.colors
                    .iter()
                    .enumerate()
                    .map(|(i, &c)| c.lerp(next.colors.get(i).copied().unwrap_or(c), t))
                    .collect()
            }
            _ => step.colors.clone(),
        }
    }
}

/// Index of the last step starting at or before `elapsed`, 0 if none has started yet.
fn step_index(steps: &[LedStep], elapsed: f64) -> usize {
    steps.partition_point(|s| s.start <= elapsed).saturating_sub(1)
}

/// Playback `frame` implies for one part at `time`: the frame's effect for the part when
/// the frame both gives the dancer an LED value for it and has LED data for it, idle otherwise.
pub fn advance_part(
    dancer: &DancerName,
    part: &PartName,
    frame: &ControlFrame,
    led_frames: &LedFrames,
    time: f64,
) -> LedPlayback {
    let assigned = matches!(frame.value(dancer, part), Some(PartValue::Led { .. }));
    match led_frames.effect(&frame.id, part) {
        Some(effect) if assigned => LedPlayback::start(Arc::clone(effect), time - frame.start),
        _ => LedPlayback::idle(),
    }
}

/// Re-derive LED playback after the control timeline moved from `old_index` to `new_index`.
/// `old_index` is `None` when playback has not been derived since initialization.
///
/// Returns `None` when the index did not change: effect playback is keyframe-quantized,
/// so time moving inside one interval leaves every cursor where it is. On a change, each
/// part is rebuilt from `frame` (the frame at `new_index`) alone, so a scrub that skips
/// several frames lands on the same state as stepping through them.
pub fn advance(
    effects: &LedEffectMap,
    old_index: Option<usize>,
    new_index: usize,
    frame: &ControlFrame,
    led_frames: &LedFrames,
    time: f64,
) -> Option<LedEffectMap> {
    if old_index == Some(new_index) {
        return None;
    }
    tracing::debug!(?old_index, new_index, frame = %frame.id, "control keyframe boundary crossed");

    let next = effects
        .iter()
        .map(|(dancer, parts)| {
            let parts = parts
                .keys()
                .map(|part| {
                    let playback = advance_part(dancer, part, frame, led_frames, time);
                    if let Some(effect) = playback.effect() {
                        tracing::debug!(
                            dancer = %dancer,
                            part = %part,
                            effect = %effect.name,
                            cursor = playback.cursor(),
                            "LED effect queued"
                        );
                    }
                    (part.clone(), playback)
                })
                .collect();
            (dancer.clone(), parts)
        })
        .collect();
    Some(next)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn effect(name: &str, starts: &[f64]) -> LedEffect {
        LedEffect {
            name: name.into(),
            steps: starts
                .iter()
                .map(|&start| LedStep {
                    start,
                    colors: vec![Rgb::WHITE],
                    fade: false,
                })
                .collect(),
        }
    }

    fn frame(id: &str, start: f64, led: bool) -> ControlFrame {
        let mut parts = BTreeMap::new();
        if led {
            parts.insert(
                PartName::from("L"),
                PartValue::Led {
                    src: "fx".into(),
                    alpha: 10.0,
                },
            );
        }
        ControlFrame {
            id: id.into(),
            start,
            fade: false,
            status: BTreeMap::from([(DancerName::from("d0"), parts)]),
        }
    }

    fn initial() -> LedEffectMap {
        BTreeMap::from([(
            DancerName::from("d0"),
            BTreeMap::from([(PartName::from("L"), LedPlayback::idle())]),
        )])
    }

    fn playback<'a>(map: &'a LedEffectMap) -> &'a LedPlayback {
        &map[&DancerName::from("d0")][&PartName::from("L")]
    }

    #[test]
    fn no_transition_without_index_change() {
        let f = frame("c3", 6.0, true);
        let leds = LedFrames::new().with("c3", "L", effect("fx", &[0.0, 0.5, 1.0]));
        assert!(advance(&initial(), Some(3), 3, &f, &leds, 6.7).is_none());
    }

    #[test]
    fn transition_queues_the_new_frames_effect() {
        let f = frame("c3", 6.0, true);
        let leds = LedFrames::new().with("c3", "L", effect("fx", &[0.0, 0.5, 1.0]));
        let next = advance(&initial(), Some(2), 3, &f, &leds, 6.0).unwrap();
        let p = playback(&next);
        assert_eq!(p.queue().len(), 3);
        assert_eq!(p.cursor(), 0);
        assert_eq!(p.effect().unwrap().name, "fx");
    }

    #[test]
    fn cursor_starts_at_the_step_active_on_landing() {
        let f = frame("c3", 6.0, true);
        let leds = LedFrames::new().with("c3", "L", effect("fx", &[0.0, 0.5, 1.0]));
        let next = advance(&initial(), Some(0), 3, &f, &leds, 6.7).unwrap();
        assert_eq!(playback(&next).cursor(), 1);
    }

    #[test]
    fn frame_without_assignment_goes_idle() {
        let leds = LedFrames::new().with("c3", "L", effect("fx", &[0.0, 0.5]));
        let playing = advance(&initial(), Some(2), 3, &frame("c3", 6.0, true), &leds, 6.0).unwrap();
        assert!(!playback(&playing).is_idle());

        let idle = advance(&playing, Some(3), 4, &frame("c4", 8.0, false), &leds, 8.0).unwrap();
        assert!(playback(&idle).is_idle());
        assert_eq!(playback(&idle).cursor(), 0);

        // LED value present but no LED data for the frame.
        let idle = advance(&playing, Some(3), 5, &frame("c5", 9.0, true), &leds, 9.0).unwrap();
        assert!(playback(&idle).is_idle());
    }

    #[test]
    fn first_derivation_after_init_always_runs() {
        let f = frame("c0", 0.0, true);
        let leds = LedFrames::new().with("c0", "L", effect("fx", &[0.0, 1.0]));
        let next = advance(&initial(), None, 0, &f, &leds, 0.0).unwrap();
        assert_eq!(playback(&next).queue().len(), 2);
    }

    #[test]
    fn step_at_is_read_only() {
        let p = LedPlayback::start(Arc::new(effect("fx", &[0.0, 0.5, 1.0])), 0.0);
        assert_eq!(p.step_at(0.75), Some(1));
        assert_eq!(p.step_at(5.0), Some(2));
        assert_eq!(p.cursor(), 0);
        assert_eq!(LedPlayback::idle().step_at(1.0), None);
    }

    #[test]
    fn serializes_as_step_queue_and_cursor() {
        let p = LedPlayback::start(Arc::new(effect("fx", &[0.0, 0.5, 1.0])), 0.6);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["cursor"], 1);
        assert_eq!(json["queue"].as_array().unwrap().len(), 3);
        assert_eq!(json["queue"][1]["start"], 0.5);
        assert!(json.get("effect").is_none());

        let idle = serde_json::to_value(LedPlayback::idle()).unwrap();
        assert_eq!(idle, serde_json::json!({ "queue": [], "cursor": 0 }));
    }

    #[test]
    fn colors_blend_across_fading_step() {
        let fx = LedEffect {
            name: "pulse".into(),
            steps: vec![
                LedStep {
                    start: 0.0,
                    colors: vec![Rgb::BLACK, Rgb(100, 0, 0)],
                    fade: true,
                },
                LedStep {
                    start: 1.0,
                    colors: vec![Rgb(200, 0, 0), Rgb(0, 0, 0)],
                    fade: false,
                },
            ],
        };
        let p = LedPlayback::start(Arc::new(fx), 0.0);
        assert_eq!(p.colors_at(0.5), vec![Rgb(100, 0, 0), Rgb(50, 0, 0)]);
        assert_eq!(p.colors_at(1.5), vec![Rgb(200, 0, 0), Rgb(0, 0, 0)]);
    }
}
