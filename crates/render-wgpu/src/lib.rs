//! wgpu render backend for the voxel viewer.
//!
//! Draws a full-screen quad whose fragment stage ray-casts the scene through
//! the inverse model-view-projection matrix. Two pipeline variants exist: a
//! buffer-less sky/ground pass for downlevel adapters and a textured voxel
//! brick ray-marcher for WebGPU-compliant ones.
//!
//! # Invariants
//! - The adapter capability check runs before any GPU resource is created.
//! - A [`VoxelScene`] owns at most one [`GpuResourceBundle`], created once.
//! - Uniform bytes reach the GPU only when something changed since the last upload.

mod capability;
mod config;
mod error;
mod gpu;
mod scene;
pub mod shaders;
mod textures;

pub use capability::CapabilityLevel;
pub use config::{PipelineConfig, PipelinePreset, ShaderProgramSpec, TextureSpec, WrapMode};
pub use error::SceneError;
pub use gpu::{
    GpuContext, GpuResourceBundle, QuadVertex, CLEAR_COLOR, DEPTH_FORMAT, QUAD_VERTICES,
};
pub use scene::VoxelScene;
pub use shaders::{EmbeddedShaders, ShaderProvider};
pub use textures::{TextureData, TextureSource, BRICK_SIZE};

pub fn crate_info() -> &'static str {
    "voxelview-render-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("wgpu"));
    }
}
