//! Virtual point light (instant radiosity) simulation.
//!
//! Every frame, light paths are traced from the scene's point light, a virtual
//! light is spawned at each hit, and the lights are handed to a
//! [`render::RenderBackend`] which accumulates one lighting pass per light.

pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod lights;
pub mod render;
pub mod sampling;
pub mod scene;
pub mod settings;
pub mod tracer;
pub mod vpl;


pub use error::{SceneError, SimulationError};
pub use frame::{Frame, FrameOrchestrator, FrameStats};
pub use input::InputState;
pub use render::RenderBackend;
pub use settings::SimulationSettings;
