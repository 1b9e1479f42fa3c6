use anyhow::{bail, Result};
use glam::Vec3;
use serde::Serialize;
use voxelview_common::Velocity;
use voxelview_input::Action;
use voxelview_render::SceneState;

/// A constant-input camera flight, stepped at a fixed rate.
#[derive(Debug, Clone, Copy)]
pub struct Flight {
    pub seconds: f32,
    pub fps: u32,
    pub forward: f32,
    pub side: f32,
    pub vertical: f32,
    /// Degrees staged before every update.
    pub pan: f32,
    pub tilt: f32,
    pub fixed_view: bool,
}

impl Flight {
    fn controls(&self) -> [Action; 4] {
        [
            Action::SetForwardSpeed(self.forward),
            Action::SetSideSpeed(self.side),
            Action::SetVerticalSpeed(self.vertical),
            Action::SetViewCenterFixed(self.fixed_view),
        ]
    }

    pub fn run(&self, state: &mut SceneState) -> Result<()> {
        if self.fps == 0 {
            bail!("fps must be positive");
        }
        if !(self.seconds.is_finite() && self.seconds >= 0.0) {
            bail!("seconds must be a finite, non-negative number, got {}", self.seconds);
        }

        for action in self.controls() {
            apply(state, action);
        }
        let frames = (self.seconds * self.fps as f32).round() as u32;
        tracing::debug!(frames, fps = self.fps, "simulating flight");
        for frame in 1..=frames {
            apply(state, Action::Pan(self.pan));
            apply(state, Action::Tilt(self.tilt));
            state.update(frame as f32 / self.fps as f32);
        }
        Ok(())
    }
}

/// Route a control action to the scene. `Quit` has no meaning headless.
pub fn apply(state: &mut SceneState, action: Action) {
    match action {
        Action::SetSideSpeed(v) => state.set_side_speed(v),
        Action::SetVerticalSpeed(v) => state.set_vertical_speed(v),
        Action::SetForwardSpeed(v) => state.set_forward_speed(v),
        Action::SetViewCenterFixed(fixed) => state.set_view_center_fixed(fixed),
        Action::Pan(angle) => state.pan(angle),
        Action::Tilt(angle) => state.tilt(angle),
        Action::Quit => {}
    }
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub frames: u64,
    pub time: f32,
    pub position: Vec3,
    pub view_center: Vec3,
    pub up_vector: Vec3,
    pub pitch_degrees: f32,
    pub velocity: Velocity,
    pub view_center_fixed: bool,
}

impl SimulationReport {
    pub fn from_state(state: &SceneState) -> Self {
        let camera = state.camera();
        Self {
            frames: state.frames(),
            time: state.last_time(),
            position: camera.position(),
            view_center: camera.view_center(),
            up_vector: camera.up_vector(),
            pitch_degrees: camera.pitch_degrees(),
            velocity: state.velocity(),
            view_center_fixed: state.is_view_center_fixed(),
        }
    }
}
