use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Newtype for palette identity. Prevents mixing up color ids with other integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct ColorId(pub u32);

/// RGB color with 8-bit channels. Intensity lives on the part value, not here.
/// Serializes as a `[r, g, b]` triple, the shape the palette store hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn r(self) -> u8 {
        self.0
    }

    pub fn g(self) -> u8 {
        self.1
    }

    pub fn b(self) -> u8 {
        self.2
    }

    /// Linear interpolation between two colors. t is clamped to [0, 1].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Color table keyed by id. Loaded once per session and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorPalette(BTreeMap<ColorId, Rgb>);

impl ColorPalette {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, id: ColorId, rgb: Rgb) -> Self {
        self.0.insert(id, rgb);
        self
    }

    pub fn get(&self, id: ColorId) -> Option<Rgb> {
        self.0.get(&id).copied()
    }

    /// Look up a color, falling back to black for ids the palette does not know.
    pub fn resolve(&self, id: ColorId) -> Rgb {
        self.get(id).unwrap_or_else(|| {
            tracing::warn!(color = id.0, "color id missing from palette, using black");
            Rgb::BLACK
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lerp_at_boundaries() {
        let a = Rgb(10, 20, 30);
        let b = Rgb(200, 100, 50);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 7.0), b);
    }

    #[test]
    fn lerp_midpoint_rounds() {
        let mid = Rgb::BLACK.lerp(Rgb::WHITE, 0.5);
        assert_eq!(mid, Rgb(128, 128, 128));
    }

    #[test]
    fn missing_color_resolves_to_black() {
        let palette = ColorPalette::new().with(ColorId(1), Rgb(255, 0, 0));
        assert_eq!(palette.resolve(ColorId(1)), Rgb(255, 0, 0));
        assert_eq!(palette.resolve(ColorId(42)), Rgb::BLACK);
    }

    #[test]
    fn palette_loads_from_string_keyed_json() {
        let palette: ColorPalette =
            serde_json::from_str(r#"{ "1": [255, 0, 0], "7": [0, 0, 255] }"#).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get(ColorId(7)), Some(Rgb(0, 0, 255)));
    }
}
