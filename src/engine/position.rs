use std::collections::BTreeMap;

use super::status::fraction;
use crate::model::{DancerName, Position, PositionFrame};

/// dancer → resolved stage position.
pub type ResolvedPos = BTreeMap<DancerName, Position>;

/// Resolve every dancer's position at `time` for the interval starting at `a`.
///
/// Position frames always interpolate toward the next frame. A validated `ShowSnapshot`
/// places every dancer in every frame; for hand-built frames a dancer placed by only one
/// of the two frames holds that frame's position.
pub fn resolve_pos(time: f64, a: &PositionFrame, b: Option<&PositionFrame>) -> ResolvedPos {
    let Some(b) = b else {
        return a.pos.clone();
    };
    let t = fraction(time, a.start, b.start);
    let mut resolved: ResolvedPos = a
        .pos
        .iter()
        .map(|(dancer, &from)| {
            let to = b.pos.get(dancer).copied().unwrap_or(from);
            (dancer.clone(), from.lerp(to, t))
        })
        .collect();
    for (dancer, &to) in &b.pos {
        resolved.entry(dancer.clone()).or_insert(to);
    }
    resolved
}
