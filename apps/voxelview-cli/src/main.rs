mod simulate;

use clap::{Parser, Subcommand};
use serde::Serialize;
use simulate::{Flight, SimulationReport};
use tracing_subscriber::EnvFilter;
use voxelview_input::InputConfig;
use voxelview_render::{DebugTextRenderer, SceneConfig, SceneState};
use voxelview_render_wgpu::{PipelineConfig, PipelinePreset};

#[derive(Parser)]
#[command(name = "voxelview-cli", about = "Headless tools for the voxel viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and pipeline presets
    Info,
    /// Fly the camera without a GPU and print the final scene state
    Simulate {
        /// Simulated duration in seconds
        #[arg(short, long, default_value = "1.0")]
        seconds: f32,
        /// Updates per simulated second
        #[arg(long, default_value = "60")]
        fps: u32,
        /// Forward speed in m/s
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        forward: f32,
        /// Side speed in m/s
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        side: f32,
        /// Vertical speed in m/s
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        vertical: f32,
        /// Pan staged before every update, in degrees
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        pan: f32,
        /// Tilt staged before every update, in degrees
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        tilt: f32,
        /// Keep the view center in place while moving
        #[arg(long)]
        fixed_view: bool,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the default viewer configuration as YAML
    Config,
}

/// Default settings in the same shape as the desktop viewer's YAML file.
#[derive(Serialize)]
struct DefaultConfig {
    scene: SceneConfig,
    input: InputConfig,
    pipeline: PipelinePreset,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("voxelview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", voxelview_render::crate_info());
            println!("render-wgpu: {}", voxelview_render_wgpu::crate_info());
            println!("input: {}", voxelview_input::crate_info());
            for preset in [PipelinePreset::Minimal, PipelinePreset::Voxel] {
                let pipeline = PipelineConfig::from_preset(preset);
                println!(
                    "pipeline {}: requires {}, {} texture(s), vertex buffer: {}",
                    pipeline.label,
                    pipeline.required_capability,
                    pipeline.textures.len(),
                    pipeline.use_vertex_array
                );
            }
        }
        Commands::Simulate {
            seconds,
            fps,
            forward,
            side,
            vertical,
            pan,
            tilt,
            fixed_view,
            json,
        } => {
            let flight = Flight {
                seconds,
                fps,
                forward,
                side,
                vertical,
                pan,
                tilt,
                fixed_view,
            };
            let mut state = SceneState::new(SceneConfig::default());
            flight.run(&mut state)?;

            if json {
                let report = SimulationReport::from_state(&state);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", DebugTextRenderer::new().render(&state));
            }
        }
        Commands::Config => {
            let config = DefaultConfig {
                scene: SceneConfig::default(),
                input: InputConfig::default(),
                pipeline: PipelinePreset::default(),
            };
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}
