use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::model::{
    ColorId, ColorPalette, ControlFrame, DancerName, FrameId, LedEffect, LedFrames, LedStep, PartCatalog,
    PartName, PartType, PartValue, Position, PositionFrame, Rgb, ShowSnapshot,
};

const DANCERS: [&str; 3] = ["dancer_1", "dancer_2", "dancer_3"];
const FIBER_PARTS: [&str; 2] = ["hat", "shirt"];
const LED_PART: &str = "LED_chest";
const LED_PIXELS: usize = 8;

/// Palette ids used by the demo. Id 9 has no palette entry.
const RED: ColorId = ColorId(1);
const GREEN: ColorId = ColorId(2);
const BLUE: ColorId = ColorId(3);
const AMBER: ColorId = ColorId(4);
const MISSING: ColorId = ColorId(9);

fn palette() -> ColorPalette {
    ColorPalette::new()
        .with(RED, Rgb(255, 0, 0))
        .with(GREEN, Rgb(0, 255, 0))
        .with(BLUE, Rgb(0, 0, 255))
        .with(AMBER, Rgb(255, 191, 0))
}

fn catalog() -> PartCatalog {
    let mut parts: Vec<&str> = FIBER_PARTS.to_vec();
    parts.push(LED_PART);
    let catalog = PartCatalog::new()
        .with_part("hat", PartType::Fiber)
        .with_part("shirt", PartType::Fiber)
        .with_part(LED_PART, PartType::Led);
    DANCERS
        .iter()
        .fold(catalog, |catalog, dancer| catalog.with_dancer(dancer, &parts))
}

/// A chase running one lit pixel down the strip, one step per 0.25 s.
#[allow(clippy::cast_precision_loss)]
fn chase(color: Rgb) -> LedEffect {
    LedEffect {
        name: "chase".into(),
        steps: (0..LED_PIXELS)
            .map(|lit| LedStep {
                start: lit as f64 * 0.25,
                colors: (0..LED_PIXELS)
                    .map(|i| if i == lit { color } else { Rgb::BLACK })
                    .collect(),
                fade: false,
            })
            .collect(),
    }
}

/// A two-step breathing pulse that fades between dim and full.
fn pulse(color: Rgb) -> LedEffect {
    LedEffect {
        name: "pulse".into(),
        steps: vec![
            LedStep {
                start: 0.0,
                colors: vec![color.lerp(Rgb::BLACK, 0.8); LED_PIXELS],
                fade: true,
            },
            LedStep {
                start: 1.0,
                colors: vec![color; LED_PIXELS],
                fade: false,
            },
        ],
    }
}

/// Creates a 30 second demo show: three dancers with two fiber parts and an LED strip each,
/// a control frame every 2 s (odd frames fade), and a rotating formation on the position track.
#[allow(clippy::cast_precision_loss)]
pub fn create_demo_show() -> Result<ShowSnapshot, EngineError> {
    let colors = [RED, GREEN, BLUE, AMBER, MISSING];
    let mut led_frames = LedFrames::new();

    let controls = (0..15usize)
        .zip(colors.into_iter().cycle())
        .map(|(i, color)| {
            let id = FrameId(format!("control_{i}"));
            let effect = match i % 3 {
                1 => Some(chase(Rgb::WHITE)),
                2 => Some(pulse(Rgb(255, 0, 255))),
                _ => None,
            };
            let led_src = effect.map(|effect| {
                let src = effect.name.clone();
                led_frames.insert(id.clone(), PartName::from(LED_PART), effect);
                src
            });

            let status = DANCERS
                .iter()
                .enumerate()
                .map(|(d, dancer)| {
                    let alpha = ((i + d) % 4) as f64 * 5.0;
                    let mut parts: BTreeMap<PartName, PartValue> = FIBER_PARTS
                        .iter()
                        .map(|part| (PartName::from(*part), PartValue::Fiber { color, alpha }))
                        .collect();
                    if let Some(src) = &led_src {
                        parts.insert(
                            PartName::from(LED_PART),
                            PartValue::Led {
                                src: src.clone(),
                                alpha: 10.0,
                            },
                        );
                    }
                    (DancerName::from(*dancer), parts)
                })
                .collect();

            ControlFrame {
                id,
                start: i as f64 * 2.0,
                fade: i % 2 == 1,
                status,
            }
        })
        .collect();

    let positions = (0..10usize)
        .map(|i| {
            let turn = i as f64 * std::f64::consts::FRAC_PI_4;
            let pos = DANCERS
                .iter()
                .enumerate()
                .map(|(d, dancer)| {
                    let angle = turn + d as f64 * std::f64::consts::TAU / DANCERS.len() as f64;
                    (
                        DancerName::from(*dancer),
                        Position::new(3.0 * angle.cos(), 3.0 * angle.sin(), 0.0),
                    )
                })
                .collect();
            PositionFrame {
                id: FrameId(format!("position_{i}")),
                start: i as f64 * 3.0,
                pos,
            }
        })
        .collect();

    ShowSnapshot::new(controls, positions, led_frames, palette(), catalog())
}
