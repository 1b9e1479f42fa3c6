//! Named uniform slots and the CPU-side block staged for upload.
//!
//! A shader program declares its uniforms as an ordered list of named slots.
//! Offsets follow the WGSL uniform address space rules, so the staged bytes can
//! be copied verbatim into a uniform buffer bound to a `struct` with the same
//! members in the same order.

use glam::{Mat3, Mat4, Vec2, Vec4};

/// Well-known uniform names written by the scene each frame.
pub mod names {
    pub const MODEL_MATRIX: &str = "modelMatrix";
    pub const MODEL_VIEW_MATRIX: &str = "modelViewMatrix";
    pub const WORLD_NORMAL_MATRIX: &str = "worldNormalMatrix";
    pub const NORMAL_MATRIX: &str = "normalMatrix";
    pub const MVP: &str = "mvp";
    pub const INVERSE_MVP: &str = "inverseMvp";
    pub const VIEWPORT_MATRIX: &str = "viewportMatrix";
    pub const VIEWPORT_SIZE: &str = "viewportSize";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    F32,
    Vec2,
    Vec4,
    Mat3,
    Mat4,
}

impl UniformKind {
    /// (alignment, size) in bytes.
    fn layout(self) -> (usize, usize) {
        match self {
            UniformKind::F32 => (4, 4),
            UniformKind::Vec2 => (8, 8),
            UniformKind::Vec4 => (16, 16),
            // Three vec3 columns, each padded to 16 bytes.
            UniformKind::Mat3 => (16, 48),
            UniformKind::Mat4 => (16, 64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    F32(f32),
    Vec2(Vec2),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::F32(_) => UniformKind::F32,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat3(_) => UniformKind::Mat3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn write(&self, dst: &mut [u8]) {
        match self {
            UniformValue::F32(v) => dst.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec4(v) => dst.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Mat3(m) => {
                let cols: [[f32; 4]; 3] = [
                    m.x_axis.extend(0.0).to_array(),
                    m.y_axis.extend(0.0).to_array(),
                    m.z_axis.extend(0.0).to_array(),
                ];
                dst.copy_from_slice(bytemuck::cast_slice(&cols));
            }
            UniformValue::Mat4(m) => {
                dst.copy_from_slice(bytemuck::cast_slice(&m.to_cols_array()))
            }
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat3> for UniformValue {
    fn from(m: Mat3) -> Self {
        UniformValue::Mat3(m)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Mat4(m)
    }
}

/// One uniform declared by a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: &'static str,
    pub kind: UniformKind,
}

impl UniformSlot {
    pub const fn new(name: &'static str, kind: UniformKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlacedSlot {
    slot: UniformSlot,
    offset: usize,
}

/// Byte layout of a uniform struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformLayout {
    slots: Vec<PlacedSlot>,
    size: usize,
}

impl UniformLayout {
    pub fn new(slots: &[UniformSlot]) -> Self {
        let mut offset: usize = 0;
        let mut placed = Vec::with_capacity(slots.len());
        for slot in slots {
            let (align, size) = slot.kind.layout();
            offset = offset.next_multiple_of(align);
            placed.push(PlacedSlot {
                slot: *slot,
                offset,
            });
            offset += size;
        }
        Self {
            slots: placed,
            // Uniform structs are 16-byte aligned.
            size: offset.next_multiple_of(16).max(16),
        }
    }

    /// Total size in bytes, padded for use as a uniform buffer.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.find(name).map(|p| p.offset)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn find(&self, name: &str) -> Option<&PlacedSlot> {
        self.slots.iter().find(|p| p.slot.name == name)
    }
}

/// CPU copy of a uniform struct, written by name and uploaded as a whole.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.size()];
        Self {
            layout,
            bytes,
            dirty: true,
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Write `value` into the slot called `name`.
    ///
    /// Returns `false` and leaves the block untouched when the program declares
    /// no such slot or the slot has a different type.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        let value = value.into();
        let Some(placed) = self.layout.find(name) else {
            tracing::trace!(uniform = name, "uniform not declared by shader, ignored");
            return false;
        };
        if placed.slot.kind != value.kind() {
            tracing::trace!(
                uniform = name,
                expected = ?placed.slot.kind,
                got = ?value.kind(),
                "uniform type mismatch, ignored"
            );
            return false;
        }
        let (_, size) = placed.slot.kind.layout();
        let offset = placed.offset;
        value.write(&mut self.bytes[offset..offset + size]);
        self.dirty = true;
        true
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hand out the bytes for upload and clear the dirty flag.
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(&self.bytes)
    }
}
