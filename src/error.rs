use serde::Serialize;
use ts_rs::TS;

/// Structured error type for the timeline engine. Serializes as `{ code, detail }`
/// so the editor can match on error codes instead of parsing messages.
#[derive(Debug, Clone, PartialEq, Serialize, TS, thiserror::Error)]
#[serde(tag = "code", content = "detail")]
#[ts(export)]
pub enum EngineError {
    /// A time or index argument was not a finite number. The call was a no-op.
    #[error("Invalid {what}: {value}")]
    InvalidInput { what: String, value: String },
    /// LED playback was queried before `init_current_led_effect` ran for this snapshot.
    #[error("LED effect state not initialized for {what}")]
    UninitializedState { what: String },
    #[error("Unknown dancer: {name}")]
    UnknownDancer { name: String },
    #[error("Unknown part {part} on dancer {dancer}")]
    UnknownPart { dancer: String, part: String },
    /// Loaded keyframe data violates an ordering or shape invariant.
    #[error("Invalid snapshot: {message}")]
    InvalidSnapshot { message: String },
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },
    #[error("I/O error: {message}")]
    IoError { message: String },
    #[error("JSON error: {message}")]
    JsonError { message: String },
}

impl EngineError {
    pub(crate) fn invalid_input(what: &str, value: f64) -> Self {
        EngineError::InvalidInput {
            what: what.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid_snapshot(message: impl Into<String>) -> Self {
        EngineError::InvalidSnapshot {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::IoError {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::JsonError {
            message: e.to_string(),
        }
    }
}

/// Allow converting EngineError to String for hosts that only carry messages.
impl From<EngineError> for String {
    fn from(e: EngineError) -> String {
        e.to_string()
    }
}
