//! Vertex format shared by the mesh builder and the GPU pipelines.
//!
//! Every primitive the [`MeshBuilder`](crate::MeshBuilder) emits ends up as a
//! [`Vertex3d`] in a [`VertexBatch`](crate::VertexBatch). The vertex carries an
//! explicit [`ShadeMode`] so the shader never has to guess from texture
//! coordinates whether a vertex is lit, unlit or already projected.
//!
//! # Vertex Layout
//!
//! The [`Vertex3d`] struct uses the following GPU layout (52 bytes per vertex):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | uv        | Float32x2 | 12     | 1               |
//! | color     | Float32x4 | 20     | 2               |
//! | normal    | Float32x3 | 36     | 3               |
//! | flags     | Uint32    | 48     | 4               |
//!
//! This layout is exposed via [`Vertex3d::LAYOUT`] for pipeline creation.

use crate::color::Color;

/// Texture coordinate written for vertices that carry no texture.
///
/// It lies outside `[0, 1]` so a sampler never mistakes it for a real UV.
pub const NO_TEXTURE: [f32; 2] = [-1.0, -1.0];

/// How the shader treats a vertex.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShadeMode {
    /// World-space vertex, transformed by view-projection and shaded by the lights.
    #[default]
    Lit = 0,
    /// World-space vertex, transformed by view-projection, flat vertex color.
    Unlit = 1,
    /// Position is already in normalized device coordinates; passed through untouched.
    Projected = 2,
}

impl ShadeMode {
    /// The value stored in [`Vertex3d::flags`].
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decodes a flags value, falling back to [`ShadeMode::Lit`] for unknown bits.
    pub const fn from_bits(bits: u32) -> Self {
        match bits {
            1 => ShadeMode::Unlit,
            2 => ShadeMode::Projected,
            _ => ShadeMode::Lit,
        }
    }
}

/// A vertex with position, texture coordinate, color, normal and shading flags.
///
/// It uses `#[repr(C)]` for a predictable memory layout and derives
/// [`bytemuck::Pod`] so whole batches can be cast to bytes for upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// World-space position, or NDC position for [`ShadeMode::Projected`].
    pub position: [f32; 3],
    /// Texture coordinate, [`NO_TEXTURE`] when untextured.
    pub uv: [f32; 2],
    /// Linear RGBA color.
    pub color: [f32; 4],
    /// World-space surface normal, unit length. Zero on thick-line vertices, which are never lit.
    pub normal: [f32; 3],
    /// A [`ShadeMode`] encoded with [`ShadeMode::bits`].
    pub flags: u32,
}

impl Vertex3d {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
            // color
            wgpu::VertexAttribute {
                offset: 20,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 36,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x3,
            },
            // flags
            wgpu::VertexAttribute {
                offset: 48,
                shader_location: 4,
                format: wgpu::VertexFormat::Uint32,
            },
        ],
    };

    /// Creates an untextured vertex.
    pub fn new(position: [f32; 3], normal: [f32; 3], color: Color, shade: ShadeMode) -> Self {
        Self {
            position,
            uv: NO_TEXTURE,
            color: color.to_array(),
            normal,
            flags: shade.bits(),
        }
    }

    /// The shading mode decoded from [`Vertex3d::flags`].
    pub fn shade_mode(&self) -> ShadeMode {
        ShadeMode::from_bits(self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct_size() {
        assert_eq!(std::mem::size_of::<Vertex3d>(), 52);
        assert_eq!(Vertex3d::LAYOUT.array_stride, 52);
    }

    #[test]
    fn shade_mode_round_trips_through_flags() {
        for mode in [ShadeMode::Lit, ShadeMode::Unlit, ShadeMode::Projected] {
            let v = Vertex3d::new([0.0; 3], [0.0, 0.0, 1.0], Color::WHITE, mode);
            assert_eq!(v.shade_mode(), mode);
            assert_eq!(v.uv, NO_TEXTURE);
        }
    }
}
