use crate::capability::CapabilityLevel;
use crate::shaders::{self, SKY_UNIFORMS, VOXEL_UNIFORMS};
use crate::textures::TextureSource;
use serde::{Deserialize, Serialize};
use voxelview_render::UniformSlot;

/// Texture coordinate wrapping applied on all axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

impl WrapMode {
    pub fn address_mode(self) -> wgpu::AddressMode {
        match self {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// A texture + sampler pair bound to a named shader slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSpec {
    /// Name of the texture variable in the fragment stage.
    pub name: &'static str,
    pub source: TextureSource,
    pub wrap: WrapMode,
}

impl TextureSpec {
    /// (texture, sampler) bindings of the `index`-th texture in group 0.
    /// Binding 0 is the uniform buffer.
    pub fn bindings(index: usize) -> (u32, u32) {
        let texture = 1 + 2 * index as u32;
        (texture, texture + 1)
    }
}

/// Shader stages by logical name plus the uniforms the program declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderProgramSpec {
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub uniforms: &'static [UniformSlot],
}

/// Named pipeline variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePreset {
    /// Procedural sky and ground from a buffer-less quad.
    Minimal,
    /// Ray-marched voxel brick with textures and a vertex buffer.
    #[default]
    Voxel,
}

/// Everything that differs between pipeline variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub label: &'static str,
    pub required_capability: CapabilityLevel,
    pub program: ShaderProgramSpec,
    pub textures: Vec<TextureSpec>,
    /// Feed quad corners from a vertex buffer instead of the vertex index.
    pub use_vertex_array: bool,
}

impl PipelineConfig {
    pub fn minimal() -> Self {
        Self {
            label: "minimal",
            required_capability: CapabilityLevel::Downlevel,
            program: ShaderProgramSpec {
                vertex: shaders::QUAD_INDEX_VERTEX,
                fragment: shaders::SKY_FRAGMENT,
                uniforms: SKY_UNIFORMS,
            },
            textures: Vec::new(),
            use_vertex_array: false,
        }
    }

    pub fn voxel() -> Self {
        Self {
            label: "voxel",
            required_capability: CapabilityLevel::WebGpu,
            program: ShaderProgramSpec {
                vertex: shaders::QUAD_VERTEX,
                fragment: shaders::VOXEL_FRAGMENT,
                uniforms: VOXEL_UNIFORMS,
            },
            textures: vec![
                TextureSpec {
                    name: "brick",
                    source: TextureSource::Brick,
                    wrap: WrapMode::ClampToEdge,
                },
                TextureSpec {
                    name: "jitter",
                    source: TextureSource::Jitter,
                    wrap: WrapMode::Repeat,
                },
            ],
            use_vertex_array: true,
        }
    }

    pub fn from_preset(preset: PipelinePreset) -> Self {
        match preset {
            PipelinePreset::Minimal => Self::minimal(),
            PipelinePreset::Voxel => Self::voxel(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::voxel()
    }
}
