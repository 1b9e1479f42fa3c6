//! Renderer-agnostic scene core: fly camera, frame simulation, uniform staging.
//!
//! # Invariants
//! - The camera up vector is never parallel to its look vector.
//! - Pan and tilt input is staged and applied exactly once per update.
//! - Uniform writes to slots a shader does not declare are ignored.

mod camera;
mod renderer;
mod scene;
pub mod uniforms;

pub use camera::{Camera, Projection, TranslationMode};
pub use renderer::{DebugTextRenderer, Scene};
pub use scene::{ConfigError, FrameMatrices, PendingRotation, SceneConfig, SceneState};
pub use uniforms::{UniformBlock, UniformKind, UniformLayout, UniformSlot, UniformValue};

pub fn crate_info() -> &'static str {
    "voxelview-render v0.1.0"
}
