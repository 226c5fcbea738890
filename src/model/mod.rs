pub mod catalog;
pub mod color;
pub mod frame;
pub mod keyframes;
pub mod led;
pub mod snapshot;

// Re-export commonly used types at the model level.
pub use catalog::{DancerName, PartCatalog, PartName, PartType};
pub use color::{ColorId, ColorPalette, Rgb};
pub use frame::{ControlFrame, FrameId, Keyframe, PartValue, Position, PositionFrame};
pub use keyframes::KeyframeIndex;
pub use led::{LedEffect, LedFrames, LedStep};
pub use snapshot::ShowSnapshot;
