use crate::error::SceneError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum backend feature tier a pipeline needs before any resource is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityLevel {
    /// Shader model 4 or better; enough for a buffer-less full-screen pass.
    Downlevel,
    /// Fully WebGPU compliant downlevel capabilities.
    WebGpu,
}

impl CapabilityLevel {
    pub fn is_met_by(self, caps: &wgpu::DownlevelCapabilities) -> bool {
        match self {
            CapabilityLevel::Downlevel => !matches!(caps.shader_model, wgpu::ShaderModel::Sm2),
            CapabilityLevel::WebGpu => caps.is_webgpu_compliant(),
        }
    }

    /// Fail with [`SceneError::MissingCapability`] unless `caps` meets this level.
    pub fn check(self, caps: &wgpu::DownlevelCapabilities) -> Result<(), SceneError> {
        if self.is_met_by(caps) {
            tracing::debug!(
                level = %self,
                shader_model = ?caps.shader_model,
                "capability check passed"
            );
            return Ok(());
        }
        Err(SceneError::MissingCapability {
            required: self,
            found: describe(caps),
        })
    }

    /// Highest level `caps` satisfies.
    pub fn detect(caps: &wgpu::DownlevelCapabilities) -> Option<Self> {
        [CapabilityLevel::WebGpu, CapabilityLevel::Downlevel]
            .into_iter()
            .find(|level| level.is_met_by(caps))
    }
}

impl fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityLevel::Downlevel => f.write_str("downlevel (shader model 4)"),
            CapabilityLevel::WebGpu => f.write_str("WebGPU"),
        }
    }
}

fn describe(caps: &wgpu::DownlevelCapabilities) -> String {
    let missing = wgpu::DownlevelFlags::compliant().difference(caps.flags);
    format!("shader model {:?}, missing flags {:?}", caps.shader_model, missing)
}
