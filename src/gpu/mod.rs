// src/gpu/mod.rs
//! Backend seam for GPU resources.
//!
//! The resource manager's cache logic is backend-agnostic; everything that
//! actually touches the graphics API goes through [`RenderBackend`]. One
//! variant is selected at startup and stays fixed for the process lifetime
//! ([`WgpuBackend`] in production, a recording mock in tests).

use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::material::MaterialType;
use crate::uniform_block::UniformBlockRole;

pub mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

pub use wgpu_backend::WgpuBackend;

/// Backend handle to a compiled-and-linked shader program.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ShaderProgramId(pub(crate) u32);

/// Backend handle to a vertex or index buffer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct BufferId(pub(crate) u32);

/// Backend handle to a uniform buffer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct UniformBufferId(pub(crate) u32);

/// Backend handles plus draw counts for one geometry. The index buffer is
/// optional; without one, draws are non-indexed over `vertex_count`.
#[derive(Copy, Clone, Debug)]
pub struct VertexObject {
    pub vertex_buffer: BufferId,
    pub index_buffer: Option<BufferId>,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl VertexObject {
    /// Number of elements one draw call covers.
    pub fn draw_count(&self) -> u32 {
        if self.index_buffer.is_some() {
            self.index_count
        } else {
            self.vertex_count
        }
    }
}

/// The primitive operations a graphics backend implements.
///
/// `create_*` allocates handles and makes no assumption about final size or
/// content; `update_*` is responsible for sizing and uploading. Callers are
/// expected to pair every create with at least one update before the
/// resource is drawn.
pub trait RenderBackend {
    /// Compile and link the program for a material type. Failure is a fatal
    /// configuration error carrying the backend's diagnostic log.
    fn create_shader_program(&mut self, material_type: MaterialType) -> Result<ShaderProgramId>;

    fn create_vertex_object(&mut self, geometry: &Geometry) -> VertexObject;

    /// Re-upload vertex/index bytes and refresh the draw counts.
    fn update_vertex_object(&mut self, vertex_object: &mut VertexObject, geometry: &Geometry);

    fn create_uniform_buffer(&mut self) -> UniformBufferId;

    /// Upload payload bytes, sizing the buffer exactly to the payload.
    fn update_uniform_buffer(&mut self, buffer: UniformBufferId, bytes: &[u8]);

    fn delete_shader_program(&mut self, program: ShaderProgramId);

    fn delete_vertex_object(&mut self, vertex_object: &VertexObject);

    fn delete_uniform_buffer(&mut self, buffer: UniformBufferId);

    /// Bind each (role, buffer) pair to the program's matching uniform block
    /// and issue one indexed or non-indexed draw over the vertex object's
    /// full count. Iteration order over the map must not affect the result;
    /// a role whose block name the program does not declare is a fatal
    /// configuration error.
    fn draw_triangles(
        &mut self,
        program: ShaderProgramId,
        vertex_object: &VertexObject,
        block_buffers: &HashMap<UniformBlockRole, UniformBufferId>,
    ) -> Result<()>;
}
