use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera velocity in meters per second, expressed along the camera's local axes.
///
/// Each axis is written independently by control events; the last write wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    /// Positive moves towards the camera's right.
    pub side: f32,
    /// Positive moves along the camera's up vector.
    pub vertical: f32,
    /// Positive moves along the look direction.
    pub forward: f32,
}

impl Velocity {
    pub const ZERO: Self = Self {
        side: 0.0,
        vertical: 0.0,
        forward: 0.0,
    };

    /// Local-axis vector `(side, vertical, forward)`.
    pub fn as_local(&self) -> Vec3 {
        Vec3::new(self.side, self.vertical, self.forward)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Size of the drawable surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A size with a zero dimension cannot produce an aspect ratio.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> Option<f32> {
        (!self.is_degenerate()).then(|| self.width as f32 / self.height as f32)
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1366, 768)
    }
}
