// src/resource_manager.rs
//! GPU resource lifecycle manager.
//!
//! Owns every CPU-object → GPU-handle cache and guarantees each object maps
//! to at most one live backend resource: the first upsert for a key runs
//! the backend's create primitive (handle allocation, happens once), every
//! upsert runs the update primitive (byte upload, happens per dirty frame).
//! The manager never checks dirtiness itself; the render loop gates upsert
//! calls behind each entity's `needs_update` flag.

use std::collections::HashMap;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::gpu::{RenderBackend, ShaderProgramId, UniformBufferId, VertexObject};
use crate::material::MaterialType;
use crate::render_state::EntityId;

pub struct GpuResourceManager<B: RenderBackend> {
    backend: B,
    shader_programs: HashMap<MaterialType, ShaderProgramId>,
    vertex_objects: HashMap<EntityId, VertexObject>,
    uniform_buffers: HashMap<EntityId, UniformBufferId>,
}

impl<B: RenderBackend> GpuResourceManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            shader_programs: HashMap::new(),
            vertex_objects: HashMap::new(),
            uniform_buffers: HashMap::new(),
        }
    }

    /// The compiled program for a material type, building it on first
    /// request. All material instances of one type share the same program.
    /// A compile or link failure is fatal and carries the backend log.
    pub fn shader_program(&mut self, material_type: MaterialType) -> Result<ShaderProgramId> {
        if let Some(&program) = self.shader_programs.get(&material_type) {
            return Ok(program);
        }
        let program = self.backend.create_shader_program(material_type)?;
        log::debug!("compiled shader program for {material_type:?}");
        self.shader_programs.insert(material_type, program);
        Ok(program)
    }

    /// Create the vertex object for this geometry if none exists, then push
    /// the current vertex/index bytes. Safe to call every frame; callers
    /// avoid the wasted re-upload by gating on `needs_update`.
    pub fn upsert_vertex_object(&mut self, geometry: &Geometry) {
        let vertex_object = self
            .vertex_objects
            .entry(geometry.id())
            .or_insert_with(|| self.backend.create_vertex_object(geometry));
        self.backend.update_vertex_object(vertex_object, geometry);
    }

    /// Create the uniform buffer for this entity if none exists, then upload
    /// its current payload bytes, sized exactly to the payload.
    pub fn upsert_uniform_buffer(&mut self, entity: EntityId, bytes: &[u8]) {
        let buffer = *self
            .uniform_buffers
            .entry(entity)
            .or_insert_with(|| self.backend.create_uniform_buffer());
        self.backend.update_uniform_buffer(buffer, bytes);
    }

    /// Cached handles for a geometry. Panics if no upsert has happened for
    /// it: querying an unpopulated cache slot is a programmer error, not a
    /// runtime condition.
    pub fn vertex_object(&self, geometry: &Geometry) -> VertexObject {
        match self.vertex_objects.get(&geometry.id()) {
            Some(vertex_object) => *vertex_object,
            None => panic!(
                "vertex object queried before first upsert ({:?})",
                geometry.id()
            ),
        }
    }

    /// Cached uniform buffer for an entity. Same precondition as
    /// [`Self::vertex_object`].
    pub fn uniform_buffer_id(&self, entity: EntityId) -> UniformBufferId {
        match self.uniform_buffers.get(&entity) {
            Some(&buffer) => buffer,
            None => panic!("uniform buffer queried before first upsert ({entity:?})"),
        }
    }

    /// Release every cache entry exactly once, in any order. Must run before
    /// the graphics context is destroyed.
    pub fn cleanup(&mut self) {
        let programs = self.shader_programs.len();
        let vertex_objects = self.vertex_objects.len();
        let uniform_buffers = self.uniform_buffers.len();

        for (_, program) in self.shader_programs.drain() {
            self.backend.delete_shader_program(program);
        }
        for (_, vertex_object) in self.vertex_objects.drain() {
            self.backend.delete_vertex_object(&vertex_object);
        }
        for (_, buffer) in self.uniform_buffers.drain() {
            self.backend.delete_uniform_buffer(buffer);
        }

        log::info!(
            "released {programs} shader programs, {vertex_objects} vertex objects, {uniform_buffers} uniform buffers"
        );
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::recording::RecordingBackend;

    fn manager() -> GpuResourceManager<RecordingBackend> {
        GpuResourceManager::new(RecordingBackend::new())
    }

    #[test]
    fn upsert_creates_once_updates_every_time() {
        let mut resources = manager();
        let geometry = Geometry::cube(1.0, 1.0, 1.0);

        resources.upsert_vertex_object(&geometry);
        resources.upsert_vertex_object(&geometry);
        resources.upsert_vertex_object(&geometry);

        assert_eq!(resources.backend().vertex_object_creates, 1);
        assert_eq!(resources.backend().vertex_object_updates, 3);
        assert_eq!(resources.vertex_objects.len(), 1);
    }

    #[test]
    fn update_refreshes_draw_counts() {
        let mut resources = manager();
        let geometry = Geometry::cube(1.0, 1.0, 1.0);

        resources.upsert_vertex_object(&geometry);
        let vertex_object = resources.vertex_object(&geometry);
        assert_eq!(vertex_object.vertex_count, 24);
        assert_eq!(vertex_object.index_count, 36);
        assert!(vertex_object.index_buffer.is_some());
        assert_eq!(vertex_object.draw_count(), 36);
    }

    #[test]
    fn distinct_geometries_get_distinct_entries() {
        let mut resources = manager();
        let a = Geometry::triangle();
        let b = Geometry::triangle();

        resources.upsert_vertex_object(&a);
        resources.upsert_vertex_object(&b);

        assert_eq!(resources.backend().vertex_object_creates, 2);
        assert_eq!(resources.vertex_objects.len(), 2);
    }

    #[test]
    fn shader_programs_shared_per_type() {
        let mut resources = manager();

        let a = resources.shader_program(MaterialType::Phong).unwrap();
        let b = resources.shader_program(MaterialType::Phong).unwrap();
        let c = resources.shader_program(MaterialType::Basic).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            resources.backend().program_creates,
            vec![MaterialType::Phong, MaterialType::Basic]
        );
    }

    #[test]
    fn uniform_buffer_created_once_per_entity() {
        let mut resources = manager();
        let mut camera = crate::camera::Camera::perspective(1.0, 1.0, 0.1, 100.0);
        let id = camera.id();

        resources.upsert_uniform_buffer(id, camera.uniform_bytes());
        camera.look_at(glam::Vec3::ONE, glam::Vec3::ZERO, glam::Vec3::Y);
        resources.upsert_uniform_buffer(id, camera.uniform_bytes());

        assert_eq!(resources.backend().uniform_buffer_creates, 1);
        assert_eq!(resources.backend().uniform_buffer_updates.len(), 2);

        let buffer = resources.uniform_buffer_id(id);
        assert!(resources
            .backend()
            .uniform_buffer_updates
            .iter()
            .all(|(b, _)| *b == buffer));
    }

    #[test]
    fn cleanup_releases_every_entry_once() {
        let mut resources = manager();
        let geometry = Geometry::cube(1.0, 1.0, 1.0);
        let camera = crate::camera::Camera::perspective(1.0, 1.0, 0.1, 100.0);

        resources.shader_program(MaterialType::Basic).unwrap();
        resources.shader_program(MaterialType::Phong).unwrap();
        resources.upsert_vertex_object(&geometry);
        resources.upsert_uniform_buffer(camera.id(), camera.uniform_bytes());

        resources.cleanup();

        assert_eq!(resources.backend().program_deletes.len(), 2);
        assert_eq!(resources.backend().vertex_object_deletes, 1);
        assert_eq!(resources.backend().uniform_buffer_deletes.len(), 1);

        // Second cleanup sees empty caches and releases nothing twice.
        resources.cleanup();
        assert_eq!(resources.backend().program_deletes.len(), 2);
        assert_eq!(resources.backend().vertex_object_deletes, 1);
        assert_eq!(resources.backend().uniform_buffer_deletes.len(), 1);
    }

    #[test]
    #[should_panic(expected = "before first upsert")]
    fn vertex_object_query_before_upsert_panics() {
        let resources = manager();
        let geometry = Geometry::triangle();
        resources.vertex_object(&geometry);
    }

    #[test]
    #[should_panic(expected = "before first upsert")]
    fn uniform_buffer_query_before_upsert_panics() {
        let resources = manager();
        let camera = crate::camera::Camera::perspective(1.0, 1.0, 0.1, 100.0);
        resources.uniform_buffer_id(camera.id());
    }
}
