use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use voxelview_common::ViewportSize;
use voxelview_input::InputConfig;
use voxelview_render::SceneConfig;
use voxelview_render_wgpu::PipelinePreset;

/// Window placement and frame cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub size: ViewportSize,
    /// Interval between simulation ticks in milliseconds.
    pub tick_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "voxelview".into(),
            size: ViewportSize::default(),
            tick_ms: 16,
        }
    }
}

impl WindowConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Everything the desktop viewer reads from its YAML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub input: InputConfig,
    pub pipeline: PipelinePreset,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: ViewerConfig = serde_yaml::from_str(text)?;
        config.scene.validate()?;
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn with_overrides(
        mut self,
        pipeline: Option<PipelinePreset>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Self {
        if let Some(pipeline) = pipeline {
            self.pipeline = pipeline;
        }
        if let Some(width) = width {
            self.window.size.width = width;
        }
        if let Some(height) = height {
            self.window.size.height = height;
        }
        self
    }
}
