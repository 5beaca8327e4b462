// src/geometry.rs
//! Mesh data on the CPU side: interleaved vertex lists plus optional u32
//! indices. Generators build the data once; the dirty flag exists so a
//! mutated geometry gets re-uploaded on the next frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::render_state::{EntityId, RenderState};

/// Interleaved vertex layout shared by every pipeline:
/// position, normal, texture coordinate. 8 floats / 32 bytes per vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;
}

pub struct Geometry {
    state: RenderState,
    vertices: Vec<Vertex>,
    indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn new(vertices: Vec<Vertex>, indices: Option<Vec<u32>>) -> Self {
        Self {
            state: RenderState::new(),
            vertices,
            indices,
        }
    }

    /// Single triangle in the XY plane, facing +Z. No index buffer.
    pub fn triangle() -> Self {
        let vertices = vec![
            Vertex {
                position: [0.0, 0.5, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coord: [0.5, 1.0],
            },
            Vertex {
                position: [-0.5, -0.5, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coord: [0.0, 0.0],
            },
            Vertex {
                position: [0.5, -0.5, 0.0],
                normal: [0.0, 0.0, 1.0],
                tex_coord: [1.0, 0.0],
            },
        ];
        Self::new(vertices, None)
    }

    /// Flat rectangle in the XZ plane, facing +Y, centered at the origin.
    pub fn plane(width: f32, depth: f32) -> Self {
        let (hw, hd) = (width * 0.5, depth * 0.5);
        let normal = [0.0, 1.0, 0.0];
        let vertices = vec![
            Vertex {
                position: [-hw, 0.0, -hd],
                normal,
                tex_coord: [0.0, 1.0],
            },
            Vertex {
                position: [-hw, 0.0, hd],
                normal,
                tex_coord: [0.0, 0.0],
            },
            Vertex {
                position: [hw, 0.0, hd],
                normal,
                tex_coord: [1.0, 0.0],
            },
            Vertex {
                position: [hw, 0.0, -hd],
                normal,
                tex_coord: [1.0, 1.0],
            },
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        Self::new(vertices, Some(indices))
    }

    /// Axis-aligned box centered at the origin: 24 vertices (4 per face,
    /// per-face normals) and 36 indices.
    pub fn cube(width: f32, height: f32, depth: f32) -> Self {
        let (hw, hh, hd) = (width * 0.5, height * 0.5, depth * 0.5);

        // (normal, four corners in CCW order seen from outside)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            (
                [0.0, 0.0, 1.0], // +Z
                [
                    [-hw, -hh, hd],
                    [hw, -hh, hd],
                    [hw, hh, hd],
                    [-hw, hh, hd],
                ],
            ),
            (
                [0.0, 0.0, -1.0], // -Z
                [
                    [hw, -hh, -hd],
                    [-hw, -hh, -hd],
                    [-hw, hh, -hd],
                    [hw, hh, -hd],
                ],
            ),
            (
                [1.0, 0.0, 0.0], // +X
                [
                    [hw, -hh, hd],
                    [hw, -hh, -hd],
                    [hw, hh, -hd],
                    [hw, hh, hd],
                ],
            ),
            (
                [-1.0, 0.0, 0.0], // -X
                [
                    [-hw, -hh, -hd],
                    [-hw, -hh, hd],
                    [-hw, hh, hd],
                    [-hw, hh, -hd],
                ],
            ),
            (
                [0.0, 1.0, 0.0], // +Y
                [
                    [-hw, hh, hd],
                    [hw, hh, hd],
                    [hw, hh, -hd],
                    [-hw, hh, -hd],
                ],
            ),
            (
                [0.0, -1.0, 0.0], // -Y
                [
                    [-hw, -hh, -hd],
                    [hw, -hh, -hd],
                    [hw, -hh, hd],
                    [-hw, -hh, hd],
                ],
            ),
        ];

        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (face, (normal, corners)) in faces.iter().enumerate() {
            let base = (face * 4) as u32;
            for (corner, position) in corners.iter().enumerate() {
                vertices.push(Vertex {
                    position: *position,
                    normal: *normal,
                    tex_coord: uvs[corner],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, Some(indices))
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// Replace the vertex/index data wholesale and flag for re-upload.
    pub fn set_data(&mut self, vertices: Vec<Vertex>, indices: Option<Vec<u32>>) {
        self.vertices = vertices;
        self.indices = indices;
        self.state.mark_dirty();
    }

    /// Raw interleaved bytes, ready for the vertex buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.as_ref().map_or(0, |i| i.len() as u32)
    }

    /// Half extents of the axis-aligned bounding box, used when a box
    /// collider is built around this geometry.
    pub fn half_extents(&self) -> Vec3 {
        let mut max = Vec3::ZERO;
        for vertex in &self.vertices {
            max = max.max(Vec3::from(vertex.position).abs());
        }
        max
    }

    pub fn id(&self) -> EntityId {
        self.state.id()
    }

    pub fn needs_update(&self) -> bool {
        self.state.needs_update()
    }

    pub fn clear_dirty(&mut self) {
        self.state.clear_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_no_indices() {
        let geometry = Geometry::triangle();
        assert_eq!(geometry.vertex_count(), 3);
        assert!(geometry.indices().is_none());
        assert!(geometry.needs_update());
    }

    #[test]
    fn cube_counts() {
        let cube = Geometry::cube(1.0, 1.0, 1.0);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
        assert_eq!(cube.half_extents(), Vec3::splat(0.5));
    }

    #[test]
    fn vertex_bytes_match_fixed_stride() {
        let cube = Geometry::cube(2.0, 1.0, 1.0);
        assert_eq!(Vertex::STRIDE, 32);
        assert_eq!(
            cube.vertex_bytes().len(),
            cube.vertex_count() as usize * Vertex::STRIDE as usize
        );
    }

    #[test]
    fn set_data_marks_dirty() {
        let mut geometry = Geometry::triangle();
        geometry.clear_dirty();

        let vertices = geometry.vertices().to_vec();
        geometry.set_data(vertices, None);
        assert!(geometry.needs_update());
    }
}
