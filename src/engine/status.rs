use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::model::{ColorPalette, ControlFrame, DancerName, PartName, PartValue};

/// Resolved fiber output, serialized as `[r, g, b, alpha]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FiberStatus(pub u8, pub u8, pub u8, pub f64);

impl FiberStatus {
    pub fn alpha(&self) -> f64 {
        self.3
    }
}

/// Resolved LED output: the effect name and its intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedStatus {
    pub src: String,
    pub alpha: f64,
}

/// Resolved output for one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum PartStatus {
    Fiber(FiberStatus),
    Led(LedStatus),
}

impl PartStatus {
    pub fn alpha(&self) -> f64 {
        match self {
            PartStatus::Fiber(f) => f.alpha(),
            PartStatus::Led(l) => l.alpha,
        }
    }
}

/// dancer → part → resolved output. This is the shape renderers and exporters consume.
pub type ResolvedStatus = BTreeMap<DancerName, BTreeMap<PartName, PartStatus>>;

/// What a fade does with a part that the next frame does not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MissingPartPolicy {
    /// Keep the earlier frame's value for the whole interval.
    #[default]
    Hold,
    /// Fade the earlier frame's alpha down to 0 at the next frame's start.
    FadeOut,
}

/// Interpolation fraction of `time` between two keyframe starts, clamped to [0, 1].
pub fn fraction(time: f64, start_a: f64, start_b: f64) -> f64 {
    let span = start_b - start_a;
    if span <= 0.0 {
        return 1.0;
    }
    ((time - start_a) / span).clamp(0.0, 1.0)
}

/// Resolve one part value through the palette with an explicit alpha.
pub fn resolve_value(value: &PartValue, alpha: f64, palette: &ColorPalette) -> PartStatus {
    match value {
        PartValue::Fiber { color, .. } => {
            let rgb = palette.resolve(*color);
            PartStatus::Fiber(FiberStatus(rgb.r(), rgb.g(), rgb.b(), alpha))
        }
        PartValue::Led { src, .. } => PartStatus::Led(LedStatus {
            src: src.clone(),
            alpha,
        }),
    }
}

/// Resolve the per-part output at `time` for the interval starting at `a`.
///
/// Without a next frame, or when `a` does not fade, `a` is held verbatim. Otherwise
/// only alpha interpolates; color and LED source stay at `a`'s values.
pub fn resolve_status(
    time: f64,
    a: &ControlFrame,
    b: Option<&ControlFrame>,
    palette: &ColorPalette,
    missing: MissingPartPolicy,
) -> ResolvedStatus {
    let fade_to = b.filter(|_| a.fade);
    let t = fade_to.map_or(0.0, |b| fraction(time, a.start, b.start));

    a.status
        .iter()
        .map(|(dancer, parts)| {
            let resolved = parts
                .iter()
                .map(|(part, value)| {
                    let from = value.alpha();
                    let alpha = match fade_to.map(|b| b.value(dancer, part)) {
                        None => from,
                        Some(Some(next)) => from + (next.alpha() - from) * t,
                        Some(None) => match missing {
                            MissingPartPolicy::Hold => from,
                            MissingPartPolicy::FadeOut => from * (1.0 - t),
                        },
                    };
                    (part.clone(), resolve_value(value, alpha, palette))
                })
                .collect();
            (dancer.clone(), resolved)
        })
        .collect()
}
