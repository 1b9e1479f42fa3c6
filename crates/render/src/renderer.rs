use crate::scene::SceneState;

/// Frame-driven scene interface. All backends implement this trait.
///
/// The driver calls [`Scene::initialise`] once, then [`Scene::update`] followed by
/// [`Scene::render`] every frame, and [`Scene::resize`] whenever the surface
/// changes size. Every call happens on the thread that owns the graphics context.
pub trait Scene {
    /// Backend handles needed to create resources and record draws.
    type Context;
    /// Where a frame is drawn to.
    type Target: ?Sized;
    type Error: std::error::Error;

    /// Create every resource the render step needs.
    fn initialise(&mut self, ctx: &Self::Context) -> Result<(), Self::Error>;

    /// Advance the simulation to `t` seconds since the clock baseline.
    fn update(&mut self, t: f32);

    /// Draw the current state into `target`.
    fn render(&mut self, ctx: &Self::Context, target: &Self::Target) -> Result<(), Self::Error>;

    /// React to a new surface size in physical pixels.
    fn resize(&mut self, width: u32, height: u32);
}

/// Debug text renderer.
///
/// Produces a human-readable description of the scene state. Used by the CLI
/// for headless runs and by tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, scene: &SceneState) -> String {
        let camera = scene.camera();
        let p = camera.position();
        let c = camera.view_center();
        let u = camera.up_vector();
        let v = scene.velocity();
        let projection = camera.projection();
        let size = scene.viewport_size();

        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (frames={}, t={:.3}s) ===\n",
            scene.frames(),
            scene.last_time()
        ));
        out.push_str(&format!(
            "Camera: pos=({:.2}, {:.2}, {:.2}) center=({:.2}, {:.2}, {:.2}) up=({:.2}, {:.2}, {:.2})\n",
            p.x, p.y, p.z, c.x, c.y, c.z, u.x, u.y, u.z
        ));
        out.push_str(&format!("Pitch: {:.1} deg\n", camera.pitch_degrees()));
        out.push_str(&format!(
            "Velocity: side={:.1} vertical={:.1} forward={:.1} m/s{}\n",
            v.side,
            v.vertical,
            v.forward,
            if scene.is_view_center_fixed() {
                " (view center fixed)"
            } else {
                ""
            }
        ));
        out.push_str(&format!(
            "Viewport: {}x{} fov={:.0} aspect={:.3}\n",
            size.width, size.height, projection.fov_y_degrees, projection.aspect
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_renderer_initial_scene() {
        let scene = SceneState::default();
        let output = DebugTextRenderer::new().render(&scene);

        assert!(output.contains("frames=0"));
        assert!(output.contains("pos=(0.00, 10.00, 0.00)"));
        assert!(output.contains("center=(1.00, 10.00, 1.00)"));
        assert!(output.contains("fov=25"));
    }

    #[test]
    fn debug_renderer_after_flight() {
        let mut scene = SceneState::default();
        scene.set_view_center_fixed(true);
        scene.set_vertical_speed(4.0);
        scene.update(1.0);
        scene.resize(1000, 500);
        let output = DebugTextRenderer::new().render(&scene);

        assert!(output.contains("frames=1"));
        assert!(output.contains("vertical=4.0"));
        assert!(output.contains("(view center fixed)"));
        assert!(output.contains("1000x500"));
        assert!(output.contains("aspect=2.000"));
    }
}
