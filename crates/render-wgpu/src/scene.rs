use crate::config::PipelineConfig;
use crate::error::SceneError;
use crate::gpu::{GpuContext, GpuResourceBundle};
use crate::shaders::{EmbeddedShaders, ShaderProvider};
use std::time::Instant;
use voxelview_render::{Scene, SceneConfig, SceneState};

/// GPU-backed voxel scene: a [`SceneState`] plus the resources to draw it.
pub struct VoxelScene {
    state: SceneState,
    pipeline: PipelineConfig,
    shaders: Box<dyn ShaderProvider>,
    resources: Option<GpuResourceBundle>,
    clock_start: Option<Instant>,
}

impl VoxelScene {
    pub fn new(config: SceneConfig, pipeline: PipelineConfig) -> Self {
        Self::with_shader_provider(config, pipeline, Box::new(EmbeddedShaders))
    }

    pub fn with_shader_provider(
        config: SceneConfig,
        pipeline: PipelineConfig,
        shaders: Box<dyn ShaderProvider>,
    ) -> Self {
        Self {
            state: SceneState::new(config),
            pipeline,
            shaders,
            resources: None,
            clock_start: None,
        }
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    pub fn is_initialised(&self) -> bool {
        self.resources.is_some()
    }

    /// Seconds since [`Scene::initialise`] succeeded; zero before that.
    pub fn elapsed_seconds(&self) -> f32 {
        self.clock_start
            .map(|start| start.elapsed().as_secs_f32())
            .unwrap_or(0.0)
    }

    pub fn set_side_speed(&mut self, vx: f32) {
        self.state.set_side_speed(vx);
    }

    pub fn set_vertical_speed(&mut self, vy: f32) {
        self.state.set_vertical_speed(vy);
    }

    pub fn set_forward_speed(&mut self, vz: f32) {
        self.state.set_forward_speed(vz);
    }

    pub fn set_view_center_fixed(&mut self, fixed: bool) {
        self.state.set_view_center_fixed(fixed);
    }

    pub fn pan(&mut self, angle: f32) {
        self.state.pan(angle);
    }

    pub fn tilt(&mut self, angle: f32) {
        self.state.tilt(angle);
    }

    /// Fail with [`SceneError::AlreadyInitialised`] once resources exist.
    fn ensure_uninitialised(&self) -> Result<(), SceneError> {
        reject_reinitialise(self.is_initialised())
    }

    /// Stage this frame's matrices and hand back the resources to draw with.
    /// Before initialisation nothing is touched and
    /// [`SceneError::NotInitialised`] is returned.
    fn prepare_frame(&mut self) -> Result<&mut GpuResourceBundle, SceneError> {
        let resources = self.resources.as_mut().ok_or(SceneError::NotInitialised)?;
        for (name, value) in self.state.frame_matrices().uniforms() {
            resources.set_uniform(name, value);
        }
        Ok(resources)
    }

    fn stage_viewport_uniforms(&mut self) {
        let Some(resources) = &mut self.resources else {
            return;
        };
        for (name, value) in self.state.viewport_uniforms() {
            resources.set_uniform(name, value);
        }
    }
}

impl Scene for VoxelScene {
    type Context = GpuContext;
    type Target = wgpu::Texture;
    type Error = SceneError;

    fn initialise(&mut self, ctx: &GpuContext) -> Result<(), SceneError> {
        self.ensure_uninitialised()?;
        self.pipeline
            .required_capability
            .check(&ctx.downlevel_capabilities())?;

        let resources = GpuResourceBundle::create(ctx, &self.pipeline, self.shaders.as_ref())?;
        let label = resources.label();
        self.resources = Some(resources);
        self.stage_viewport_uniforms();
        self.clock_start = Some(Instant::now());

        tracing::info!(
            pipeline = label,
            capability = %self.pipeline.required_capability,
            "scene initialised"
        );
        Ok(())
    }

    fn update(&mut self, t: f32) {
        self.state.update(t);
    }

    fn render(&mut self, ctx: &GpuContext, target: &wgpu::Texture) -> Result<(), SceneError> {
        self.prepare_frame()?.render_frame(ctx, target);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.state.resize(width, height) {
            self.stage_viewport_uniforms();
        }
    }
}

fn reject_reinitialise(initialised: bool) -> Result<(), SceneError> {
    if initialised {
        return Err(SceneError::AlreadyInitialised);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::borrow::Cow;

    struct NoShaders;

    impl ShaderProvider for NoShaders {
        fn stage_source(&self, _name: &str) -> Option<Cow<'static, str>> {
            None
        }
    }

    fn scene() -> VoxelScene {
        VoxelScene::new(SceneConfig::default(), PipelineConfig::voxel())
    }

    #[test]
    fn starts_uninitialised() {
        let scene = scene();
        assert!(!scene.is_initialised());
        assert_eq!(scene.elapsed_seconds(), 0.0);
        assert_eq!(scene.pipeline().label, "voxel");
    }

    #[test]
    fn controls_reach_state() {
        let mut scene = scene();
        scene.set_forward_speed(2.0);
        scene.set_side_speed(-1.0);
        scene.set_vertical_speed(0.5);
        scene.set_view_center_fixed(true);
        scene.pan(3.0);
        scene.tilt(-2.0);

        let v = scene.state().velocity();
        assert_eq!((v.side, v.vertical, v.forward), (-1.0, 0.5, 2.0));
        assert!(scene.state().is_view_center_fixed());
        assert_eq!(scene.state().pending_rotation().pan_degrees, 3.0);
        assert_eq!(scene.state().pending_rotation().tilt_degrees, -2.0);
    }

    #[test]
    fn update_moves_camera_without_gpu() {
        let mut scene = scene();
        let start = scene.state().camera().position();
        scene.set_forward_speed(4.0);
        scene.update(1.0);
        let moved = scene.state().camera().position() - start;
        // 4 m/s for one second at half a unit per meter.
        assert!((moved.length() - 2.0).abs() < 1e-4);
        assert_eq!(moved.y, 0.0);
    }

    #[test]
    fn resize_before_initialise_updates_projection() {
        let mut scene = scene();
        scene.resize(800, 400);
        assert_eq!(scene.state().camera().projection().aspect, 2.0);
        scene.resize(0, 400);
        assert_eq!(scene.state().viewport_size().width, 800);
    }

    #[test]
    fn render_before_initialise_is_rejected() {
        let mut scene = scene();
        scene.pan(12.0);
        scene.set_forward_speed(3.0);
        let before = scene.state().clone();

        assert!(matches!(scene.prepare_frame(), Err(SceneError::NotInitialised)));
        assert!(!scene.is_initialised());
        assert_eq!(scene.state().frames(), before.frames());
        assert_eq!(scene.state().pending_rotation(), before.pending_rotation());
        assert_eq!(scene.state().velocity(), before.velocity());
        assert_eq!(scene.state().camera().position(), before.camera().position());
    }

    #[test]
    fn second_initialise_is_rejected() {
        assert!(scene().ensure_uninitialised().is_ok());
        assert!(matches!(
            reject_reinitialise(true),
            Err(SceneError::AlreadyInitialised)
        ));
    }

    #[test]
    fn custom_provider_is_kept() {
        let scene = VoxelScene::with_shader_provider(
            SceneConfig {
                position: Vec3::ZERO,
                view_center: Vec3::Z,
                ..SceneConfig::default()
            },
            PipelineConfig::minimal(),
            Box::new(NoShaders),
        );
        assert!(scene.shaders.stage_source("sky.frag").is_none());
        assert_eq!(scene.state().camera().view_center(), Vec3::Z);
    }
}
