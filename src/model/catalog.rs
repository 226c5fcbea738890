use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::EngineError;

/// Newtype for dancer identity. Only names listed in the [`PartCatalog`] are accepted
/// by the engine; anything else is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct DancerName(pub String);

/// Newtype for part identity (e.g. `"hat"`, `"LED_chest"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct PartName(pub String);

impl fmt::Display for DancerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DancerName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for PartName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What kind of hardware a part drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PartType {
    /// Optical fiber lit by a single color + intensity.
    Fiber,
    /// Addressable LED strip playing multi-step effects.
    Led,
    /// Stage position marker; driven by position frames only.
    Moving,
}

/// Which parts every dancer has and what type each part is.
/// Dancer order is preserved from the source so listings are stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartCatalog {
    dancers: IndexMap<DancerName, Vec<PartName>>,
    part_types: IndexMap<PartName, PartType>,
}

impl PartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a part type. Builder-style, used by loaders and tests.
    pub fn with_part(mut self, part: &str, part_type: PartType) -> Self {
        self.part_types.insert(PartName::from(part), part_type);
        self
    }

    /// Register a dancer with its parts. Builder-style, used by loaders and tests.
    pub fn with_dancer(mut self, dancer: &str, parts: &[&str]) -> Self {
        self.dancers.insert(
            DancerName::from(dancer),
            parts.iter().map(|p| PartName::from(*p)).collect(),
        );
        self
    }

    /// Every dancer must only list parts that have a registered type.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (dancer, parts) in &self.dancers {
            for part in parts {
                if !self.part_types.contains_key(part) {
                    return Err(EngineError::invalid_snapshot(format!(
                        "part {part} of dancer {dancer} has no part type"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn dancers(&self) -> impl Iterator<Item = &DancerName> {
        self.dancers.keys()
    }

    pub fn dancer_count(&self) -> usize {
        self.dancers.len()
    }

    pub fn contains_dancer(&self, dancer: &DancerName) -> bool {
        self.dancers.contains_key(dancer)
    }

    pub fn parts(&self, dancer: &DancerName) -> Result<&[PartName], EngineError> {
        self.dancers
            .get(dancer)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::UnknownDancer {
                name: dancer.0.clone(),
            })
    }

    pub fn part_type(&self, part: &PartName) -> Option<PartType> {
        self.part_types.get(part).copied()
    }

    /// Resolve the type of `part` on `dancer`, rejecting names the catalog does not know.
    pub fn check_part(&self, dancer: &DancerName, part: &PartName) -> Result<PartType, EngineError> {
        let parts = self.parts(dancer)?;
        if !parts.contains(part) {
            return Err(EngineError::UnknownPart {
                dancer: dancer.0.clone(),
                part: part.0.clone(),
            });
        }
        self.part_type(part).ok_or_else(|| EngineError::UnknownPart {
            dancer: dancer.0.clone(),
            part: part.0.clone(),
        })
    }

    /// Every `(dancer, part)` pair whose part is of the given type, in catalog order.
    pub fn parts_of_type(&self, part_type: PartType) -> impl Iterator<Item = (&DancerName, &PartName)> {
        self.dancers.iter().flat_map(move |(dancer, parts)| {
            parts
                .iter()
                .filter(move |p| self.part_type(p) == Some(part_type))
                .map(move |p| (dancer, p))
        })
    }
}
