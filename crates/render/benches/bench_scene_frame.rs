use std::hint::black_box;
use std::time::Instant;

use voxelview_render::uniforms::names;
use voxelview_render::{SceneState, UniformBlock, UniformKind, UniformLayout, UniformSlot};

const FRAME_UNIFORMS: &[UniformSlot] = &[
    UniformSlot::new(names::MODEL_MATRIX, UniformKind::Mat4),
    UniformSlot::new(names::MODEL_VIEW_MATRIX, UniformKind::Mat4),
    UniformSlot::new(names::WORLD_NORMAL_MATRIX, UniformKind::Mat3),
    UniformSlot::new(names::NORMAL_MATRIX, UniformKind::Mat3),
    UniformSlot::new(names::MVP, UniformKind::Mat4),
    UniformSlot::new(names::INVERSE_MVP, UniformKind::Mat4),
    UniformSlot::new(names::VIEWPORT_MATRIX, UniformKind::Mat4),
    UniformSlot::new(names::VIEWPORT_SIZE, UniformKind::Vec2),
];

fn bench_update(iterations: usize, steer: bool) {
    let mut state = SceneState::default();
    state.set_forward_speed(44.7);
    state.set_side_speed(3.0);

    let start = Instant::now();
    for i in 0..iterations {
        if steer {
            state.pan(black_box(0.5));
            state.tilt(black_box(if i % 2 == 0 { 0.25 } else { -0.25 }));
        }
        state.update(black_box(i as f32 / 60.0));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  update (steer={steer}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_stage_uniforms(iterations: usize) {
    let mut state = SceneState::default();
    state.set_forward_speed(10.0);
    let mut block = UniformBlock::new(UniformLayout::new(FRAME_UNIFORMS));

    let start = Instant::now();
    for i in 0..iterations {
        state.update(i as f32 / 60.0);
        for (name, value) in state.frame_matrices().uniforms() {
            block.set(name, value);
        }
        let _ = black_box(block.take_dirty());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  update + stage ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_resize(iterations: usize) {
    let mut state = SceneState::default();

    let start = Instant::now();
    for i in 0..iterations {
        let w = 640 + (i % 1280) as u32;
        let _ = black_box(state.resize(black_box(w), black_box(720)));
        for (name, value) in state.viewport_uniforms() {
            black_box((name, value));
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  resize ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Scene Frame Benchmarks ===\n");

    println!("Simulation step:");
    bench_update(100_000, false);
    bench_update(100_000, true);

    println!("\nUniform staging:");
    bench_stage_uniforms(10_000);
    bench_stage_uniforms(100_000);

    println!("\nResize:");
    bench_resize(100_000);

    println!("\n=== Done ===");
}
