// src/gpu/recording.rs
//! Test-only backend that records every primitive call instead of touching
//! a GPU, so cache and render-loop invariants can be asserted headless.

use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::material::MaterialType;
use crate::uniform_block::UniformBlockRole;

use super::{BufferId, RenderBackend, ShaderProgramId, UniformBufferId, VertexObject};

#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub program: ShaderProgramId,
    pub draw_count: u32,
    pub indexed: bool,
    pub blocks: Vec<(UniformBlockRole, UniformBufferId)>,
}

#[derive(Default)]
pub struct RecordingBackend {
    next_id: u32,

    pub program_creates: Vec<MaterialType>,
    pub vertex_object_creates: u32,
    pub vertex_object_updates: u32,
    pub uniform_buffer_creates: u32,
    pub uniform_buffer_updates: Vec<(UniformBufferId, Vec<u8>)>,

    pub program_deletes: Vec<ShaderProgramId>,
    pub vertex_object_deletes: u32,
    pub uniform_buffer_deletes: Vec<UniformBufferId>,

    pub draws: Vec<DrawRecord>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl RenderBackend for RecordingBackend {
    fn create_shader_program(&mut self, material_type: MaterialType) -> Result<ShaderProgramId> {
        self.program_creates.push(material_type);
        Ok(ShaderProgramId(self.next_id()))
    }

    fn create_vertex_object(&mut self, geometry: &Geometry) -> VertexObject {
        self.vertex_object_creates += 1;
        let vertex_buffer = BufferId(self.next_id());
        let index_buffer = geometry.indices().map(|_| BufferId(self.next_id()));
        VertexObject {
            vertex_buffer,
            index_buffer,
            vertex_count: 0,
            index_count: 0,
        }
    }

    fn update_vertex_object(&mut self, vertex_object: &mut VertexObject, geometry: &Geometry) {
        self.vertex_object_updates += 1;
        vertex_object.vertex_count = geometry.vertex_count();
        vertex_object.index_count = geometry.index_count();
    }

    fn create_uniform_buffer(&mut self) -> UniformBufferId {
        self.uniform_buffer_creates += 1;
        UniformBufferId(self.next_id())
    }

    fn update_uniform_buffer(&mut self, buffer: UniformBufferId, bytes: &[u8]) {
        self.uniform_buffer_updates.push((buffer, bytes.to_vec()));
    }

    fn delete_shader_program(&mut self, program: ShaderProgramId) {
        self.program_deletes.push(program);
    }

    fn delete_vertex_object(&mut self, _vertex_object: &VertexObject) {
        self.vertex_object_deletes += 1;
    }

    fn delete_uniform_buffer(&mut self, buffer: UniformBufferId) {
        self.uniform_buffer_deletes.push(buffer);
    }

    fn draw_triangles(
        &mut self,
        program: ShaderProgramId,
        vertex_object: &VertexObject,
        block_buffers: &HashMap<UniformBlockRole, UniformBufferId>,
    ) -> Result<()> {
        self.draws.push(DrawRecord {
            program,
            draw_count: vertex_object.draw_count(),
            indexed: vertex_object.index_buffer.is_some(),
            blocks: block_buffers.iter().map(|(r, b)| (*r, *b)).collect(),
        });
        Ok(())
    }
}
