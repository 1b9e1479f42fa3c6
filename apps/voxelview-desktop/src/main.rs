mod config;
mod hud;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::ViewerConfig;
use hud::FpsCounter;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use voxelview_input::{Action, KeyBindings, MouseDrag};
use voxelview_render::Scene;
use voxelview_render_wgpu::{
    CapabilityLevel, GpuContext, PipelineConfig, PipelinePreset, VoxelScene,
};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

#[derive(Clone, Copy, ValueEnum)]
enum PipelineArg {
    Minimal,
    Voxel,
}

impl From<PipelineArg> for PipelinePreset {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::Minimal => PipelinePreset::Minimal,
            PipelineArg::Voxel => PipelinePreset::Voxel,
        }
    }
}

#[derive(Parser)]
#[command(name = "voxelview-desktop", about = "Fly through a ray-marched voxel scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pipeline variant, overrides the config file
    #[arg(long, value_enum)]
    pipeline: Option<PipelineArg>,

    /// Initial window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Initial window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

/// Surface plus device, alive between `resumed` and exit.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    context: GpuContext,
}

struct ViewerApp {
    config: ViewerConfig,
    scene: VoxelScene,
    bindings: KeyBindings,
    drag: MouseDrag,
    cursor: (f64, f64),
    gpu: Option<Gpu>,
    minimized: bool,
    next_tick: Instant,
    fps: FpsCounter,
    fatal: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(config: ViewerConfig) -> Self {
        let scene = VoxelScene::new(config.scene, PipelineConfig::from_preset(config.pipeline));
        let now = Instant::now();
        Self {
            bindings: KeyBindings::new(config.input),
            drag: MouseDrag::new(config.input),
            scene,
            config,
            cursor: (0.0, 0.0),
            gpu: None,
            minimized: false,
            next_tick: now,
            fps: FpsCounter::new(now),
            fatal: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let size = self.config.window.size;
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(size.width, size.height));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no GPU adapter can present to this window")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let context = GpuContext::open(adapter, surface_format)?;
        let info = context.adapter.get_info();
        let capability = CapabilityLevel::detect(&context.downlevel_capabilities());
        tracing::info!(
            capability = ?capability,
            "GPU initialised with {} backend ({})",
            info.backend.to_str(),
            info.name
        );

        let inner = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: inner.width.max(1),
            height: inner.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&context.device, &surface_config);

        self.scene.resize(inner.width, inner.height);
        self.scene.initialise(&context)?;

        self.next_tick = Instant::now();
        self.gpu = Some(Gpu {
            window,
            surface,
            surface_config,
            context,
        });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, action: Action) {
        match action {
            Action::SetSideSpeed(v) => self.scene.set_side_speed(v),
            Action::SetVerticalSpeed(v) => self.scene.set_vertical_speed(v),
            Action::SetForwardSpeed(v) => self.scene.set_forward_speed(v),
            Action::SetViewCenterFixed(fixed) => self.scene.set_view_center_fixed(fixed),
            Action::Pan(angle) => self.scene.pan(angle),
            Action::Tilt(angle) => self.scene.tilt(angle),
            Action::Quit => {
                tracing::info!("quit requested");
                event_loop.exit();
            }
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.minimized = size.width == 0 || size.height == 0;
        if let Some(gpu) = &mut self.gpu {
            if !self.minimized {
                gpu.surface_config.width = size.width;
                gpu.surface_config.height = size.height;
                gpu.surface.configure(&gpu.context.device, &gpu.surface_config);
            }
        }
        self.scene.resize(size.width, size.height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.minimized {
            return;
        }
        let Some(gpu) = &self.gpu else {
            return;
        };

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.context.device, &gpu.surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        if let Err(e) = self.scene.render(&gpu.context, &frame.texture) {
            if e.is_fatal() {
                self.fail(event_loop, e.into());
            } else {
                tracing::error!("render skipped: {e}");
            }
            return;
        }
        frame.present();

        if let Some(fps) = self.fps.frame(Instant::now()) {
            gpu.window
                .set_title(&hud::title(&self.config.window.title, fps, self.scene.state()));
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.fatal.is_some() {
            return;
        }
        if let Err(err) = self.init_gpu(event_loop) {
            self.fail(event_loop, err.context("viewer initialisation failed"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resize(size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let Some(key) = hud::map_key(code) else {
                    return;
                };
                if let Some(action) = self.bindings.map(key, state == ElementState::Pressed) {
                    self.apply(event_loop, action);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                if let Some(actions) = self.drag.motion(position.x, position.y) {
                    for action in actions {
                        self.apply(event_loop, action);
                    }
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => self.drag.press(self.cursor.0, self.cursor.1),
                ElementState::Released => self.drag.release(),
            },
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let now = Instant::now();
        let tick = self.config.window.tick_interval();
        if now >= self.next_tick {
            self.scene.update(self.scene.elapsed_seconds());
            gpu.window.request_redraw();
            self.next_tick += tick;
            if self.next_tick < now {
                self.next_tick = now + tick;
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    }
    .with_overrides(cli.pipeline.map(Into::into), cli.width, cli.height);
    config.scene.validate()?;

    tracing::info!(pipeline = ?config.pipeline, "voxelview-desktop starting");

    let event_loop = EventLoop::new()?;
    let mut app = ViewerApp::new(config);
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.fatal.take() {
        return Err(err);
    }
    Ok(())
}
