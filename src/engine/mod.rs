pub mod controller;
pub mod edit;
pub mod led;
pub mod locator;
pub mod position;
pub mod state;
pub mod status;

// Re-export the engine's public surface.
pub use controller::TimelineController;
pub use edit::{PartEdit, StatusEdit};
pub use led::{LedEffectMap, LedPlayback};
pub use position::ResolvedPos;
pub use state::EngineState;
pub use status::{FiberStatus, LedStatus, MissingPartPolicy, PartStatus, ResolvedStatus};
