use std::borrow::Cow;
use voxelview_render::uniforms::names;
use voxelview_render::{UniformKind, UniformSlot};

/// Vertex stage reading quad corners from a vertex buffer.
pub const QUAD_VERTEX: &str = "quad.vert";
/// Vertex stage generating quad corners from the vertex index.
pub const QUAD_INDEX_VERTEX: &str = "quad_index.vert";
/// Fragment stage ray-marching the voxel brick.
pub const VOXEL_FRAGMENT: &str = "voxel.frag";
/// Fragment stage ray-casting a sky and a ground grid.
pub const SKY_FRAGMENT: &str = "sky.frag";

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Supplies WGSL source for shader stages by logical name.
pub trait ShaderProvider {
    fn stage_source(&self, name: &str) -> Option<Cow<'static, str>>;
}

/// Stages compiled into the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedShaders;

impl ShaderProvider for EmbeddedShaders {
    fn stage_source(&self, name: &str) -> Option<Cow<'static, str>> {
        let source = match name {
            QUAD_VERTEX => QUAD_VERTEX_SHADER,
            QUAD_INDEX_VERTEX => QUAD_INDEX_VERTEX_SHADER,
            VOXEL_FRAGMENT => VOXEL_FRAGMENT_SHADER,
            SKY_FRAGMENT => SKY_FRAGMENT_SHADER,
            _ => return None,
        };
        Some(Cow::Borrowed(source))
    }
}

/// Members of `Uniforms` in `voxel.frag`, in declaration order.
pub const VOXEL_UNIFORMS: &[UniformSlot] = &[
    UniformSlot::new(names::MODEL_MATRIX, UniformKind::Mat4),
    UniformSlot::new(names::MODEL_VIEW_MATRIX, UniformKind::Mat4),
    UniformSlot::new(names::WORLD_NORMAL_MATRIX, UniformKind::Mat3),
    UniformSlot::new(names::NORMAL_MATRIX, UniformKind::Mat3),
    UniformSlot::new(names::MVP, UniformKind::Mat4),
    UniformSlot::new(names::INVERSE_MVP, UniformKind::Mat4),
    UniformSlot::new(names::VIEWPORT_MATRIX, UniformKind::Mat4),
    UniformSlot::new(names::VIEWPORT_SIZE, UniformKind::Vec2),
];

/// Members of `Uniforms` in `sky.frag`, in declaration order.
pub const SKY_UNIFORMS: &[UniformSlot] = &[
    UniformSlot::new(names::MVP, UniformKind::Mat4),
    UniformSlot::new(names::INVERSE_MVP, UniformKind::Mat4),
    UniformSlot::new(names::VIEWPORT_SIZE, UniformKind::Vec2),
];

const QUAD_VERTEX_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(position, 0.0, 1.0);
    out.ndc = position;
    return out;
}
"#;

const QUAD_INDEX_VERTEX_SHADER: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
    );
    let position = corners[index];

    var out: VertexOutput;
    out.clip_position = vec4<f32>(position, 0.0, 1.0);
    out.ndc = position;
    return out;
}
"#;

const VOXEL_FRAGMENT_SHADER: &str = r#"
struct Uniforms {
    modelMatrix: mat4x4<f32>,
    modelViewMatrix: mat4x4<f32>,
    worldNormalMatrix: mat3x3<f32>,
    normalMatrix: mat3x3<f32>,
    mvp: mat4x4<f32>,
    inverseMvp: mat4x4<f32>,
    viewportMatrix: mat4x4<f32>,
    viewportSize: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
@group(0) @binding(1)
var brick: texture_3d<f32>;
@group(0) @binding(2)
var brick_sampler: sampler;
@group(0) @binding(3)
var jitter: texture_2d<f32>;
@group(0) @binding(4)
var jitter_sampler: sampler;

const BRICK_MIN = vec3<f32>(24.0, 2.0, 24.0);
const BRICK_EXTENT = 16.0;
const STEPS = 96;
const SKY = vec3<f32>(0.65, 0.77, 1.0);

struct FragmentInput {
    @builtin(position) frag_coord: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

fn unproject(ndc: vec2<f32>, depth: f32) -> vec3<f32> {
    let p = uniforms.inverseMvp * vec4<f32>(ndc, depth, 1.0);
    return p.xyz / p.w;
}

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let origin = unproject(in.ndc, 0.0);
    let dir = normalize(unproject(in.ndc, 1.0) - origin);

    let box_max = BRICK_MIN + vec3<f32>(BRICK_EXTENT);
    let inv = 1.0 / dir;
    let t0 = (BRICK_MIN - origin) * inv;
    let t1 = (box_max - origin) * inv;
    let t_near = max(max(min(t0.x, t1.x), min(t0.y, t1.y)), min(t0.z, t1.z));
    let t_far = min(min(max(t0.x, t1.x), max(t0.y, t1.y)), max(t0.z, t1.z));
    let start = max(t_near, 0.0);
    if (t_far <= start) {
        discard;
    }

    let step_len = (t_far - start) / f32(STEPS);
    let offset = textureSampleLevel(jitter, jitter_sampler, in.frag_coord.xy / 4.0, 0.0).r;

    var color = vec3<f32>(0.0);
    var alpha = 0.0;
    for (var i = 0; i < STEPS; i = i + 1) {
        let p = origin + dir * (start + (f32(i) + offset) * step_len);
        let uvw = (p - BRICK_MIN) / BRICK_EXTENT;
        let density = textureSampleLevel(brick, brick_sampler, uvw, 0.0).r;
        let a = 1.0 - exp(-density * step_len * 0.6);
        let shade = mix(vec3<f32>(0.9, 0.45, 0.2), vec3<f32>(1.0, 0.95, 0.8), uvw.y);
        color = color + (1.0 - alpha) * a * shade;
        alpha = alpha + (1.0 - alpha) * a;
        if (alpha > 0.99) {
            break;
        }
    }

    return vec4<f32>(color + (1.0 - alpha) * SKY, 1.0);
}
"#;

const SKY_FRAGMENT_SHADER: &str = r#"
struct Uniforms {
    mvp: mat4x4<f32>,
    inverseMvp: mat4x4<f32>,
    viewportSize: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

const SKY = vec3<f32>(0.65, 0.77, 1.0);
const ZENITH = vec3<f32>(0.3, 0.5, 0.9);

struct FragmentInput {
    @builtin(position) frag_coord: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

fn unproject(ndc: vec2<f32>, depth: f32) -> vec3<f32> {
    let p = uniforms.inverseMvp * vec4<f32>(ndc, depth, 1.0);
    return p.xyz / p.w;
}

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let origin = unproject(in.ndc, 0.0);
    let dir = normalize(unproject(in.ndc, 1.0) - origin);

    if (dir.y >= 0.0 || origin.y <= 0.0) {
        return vec4<f32>(mix(SKY, ZENITH, clamp(dir.y, 0.0, 1.0)), 1.0);
    }

    // Ground plane at y = 0 with a 10-unit grid fading into the horizon.
    let t = -origin.y / dir.y;
    let hit = origin + dir * t;
    let cell = abs(fract(hit.xz / 10.0) - vec2<f32>(0.5));
    let line = step(0.48, max(cell.x, cell.y));
    let ground = mix(vec3<f32>(0.36, 0.42, 0.3), vec3<f32>(0.2, 0.22, 0.2), line);
    let fog = 1.0 - exp(-t * 0.002);
    return vec4<f32>(mix(ground, SKY, fog), 1.0);
}
"#;
