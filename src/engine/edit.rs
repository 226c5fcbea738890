use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::status::{FiberStatus, LedStatus, PartStatus, ResolvedStatus};
use crate::error::EngineError;
use crate::model::{ColorId, ColorPalette, DancerName, PartCatalog, PartName, PartType};

/// A change to one part of the displayed status. Unset fields keep their value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum PartEdit {
    Fiber {
        #[serde(default)]
        color: Option<ColorId>,
        #[serde(default)]
        alpha: Option<f64>,
    },
    Led {
        #[serde(default)]
        src: Option<String>,
        #[serde(default)]
        alpha: Option<f64>,
    },
}

impl PartEdit {
    fn part_type(&self) -> PartType {
        match self {
            PartEdit::Fiber { .. } => PartType::Fiber,
            PartEdit::Led { .. } => PartType::Led,
        }
    }

    fn alpha(&self) -> Option<f64> {
        match self {
            PartEdit::Fiber { alpha, .. } | PartEdit::Led { alpha, .. } => *alpha,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            PartEdit::Fiber { color, alpha } => color.is_none() && alpha.is_none(),
            PartEdit::Led { src, alpha } => src.is_none() && alpha.is_none(),
        }
    }
}

/// One entry of an edit batch, as sent by the editor panels for every selected dancer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusEdit {
    pub dancer: DancerName,
    pub part: PartName,
    pub edit: PartEdit,
}

fn invalid_edit(dancer: &DancerName, part: &PartName, reason: &str) -> EngineError {
    EngineError::InvalidInput {
        what: format!("status edit for {dancer}/{part}"),
        value: reason.to_string(),
    }
}

/// Apply `edits` to a copy of `status`. Any invalid entry rejects the whole batch.
/// Entries with nothing set are skipped.
pub fn apply_edits(
    status: &ResolvedStatus,
    catalog: &PartCatalog,
    palette: &ColorPalette,
    edits: &[StatusEdit],
) -> Result<ResolvedStatus, EngineError> {
    let mut next = status.clone();
    for StatusEdit { dancer, part, edit } in edits {
        let part_type = catalog.check_part(dancer, part)?;
        if part_type != edit.part_type() {
            return Err(invalid_edit(dancer, part, "edit kind does not match part type"));
        }
        if edit.alpha().is_some_and(|a| !a.is_finite()) {
            return Err(invalid_edit(dancer, part, "alpha is not finite"));
        }
        if edit.is_empty() {
            continue;
        }

        let current = next.get(dancer).and_then(|parts| parts.get(part));
        let updated = match (edit, current) {
            (PartEdit::Fiber { color, alpha }, Some(PartStatus::Fiber(cur))) => {
                let rgb = color.map(|c| palette.resolve(c));
                PartStatus::Fiber(FiberStatus(
                    rgb.map_or(cur.0, |c| c.r()),
                    rgb.map_or(cur.1, |c| c.g()),
                    rgb.map_or(cur.2, |c| c.b()),
                    alpha.unwrap_or(cur.3),
                ))
            }
            (PartEdit::Fiber { color: Some(color), alpha: Some(alpha) }, None) => {
                let rgb = palette.resolve(*color);
                PartStatus::Fiber(FiberStatus(rgb.r(), rgb.g(), rgb.b(), *alpha))
            }
            (PartEdit::Led { src, alpha }, Some(PartStatus::Led(cur))) => PartStatus::Led(LedStatus {
                src: src.clone().unwrap_or_else(|| cur.src.clone()),
                alpha: alpha.unwrap_or(cur.alpha),
            }),
            (PartEdit::Led { src: Some(src), alpha: Some(alpha) }, None) => {
                PartStatus::Led(LedStatus {
                    src: src.clone(),
                    alpha: *alpha,
                })
            }
            (_, None) => {
                return Err(invalid_edit(
                    dancer,
                    part,
                    "part has no current value; both fields are required",
                ))
            }
            (_, Some(_)) => {
                return Err(invalid_edit(dancer, part, "current value has a different kind"))
            }
        };
        next.entry(dancer.clone())
            .or_default()
            .insert(part.clone(), updated);
    }
    Ok(next)
}
