// src/scene.rs
//! Scene graph: the single active camera, the two lights, and pools of
//! geometries, materials and meshes. Meshes reference pool entries through
//! typed handles; draw order is mesh insertion order. The scene owns no
//! GPU state.
//!
//! The scene also owns the physics world. Simulated bodies are paired with
//! meshes through `PhysicsEntity`; once per frame the engine copies body
//! poses into the paired meshes, which flags them for re-upload.

use crate::camera::Camera;
use crate::geometry::Geometry;
use crate::lighting::{AmbientLight, DirectionalLight};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::physics::{PhysicsWorld, RigidBodyHandle};

use glam::Vec3;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GeometryHandle(u32);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct MaterialHandle(u32);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct MeshHandle(u32);

/// A mesh driven by a rigid body.
pub struct PhysicsEntity {
    pub mesh: MeshHandle,
    pub body: RigidBodyHandle,
}

pub struct Scene {
    pub camera: Camera,
    pub ambient_light: AmbientLight,
    pub directional_light: DirectionalLight,
    pub physics: PhysicsWorld,

    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    meshes: Vec<Mesh>,
    entities: Vec<PhysicsEntity>,
}

impl Scene {
    pub fn new(
        camera: Camera,
        ambient_light: AmbientLight,
        directional_light: DirectionalLight,
    ) -> Self {
        Self {
            camera,
            ambient_light,
            directional_light,
            physics: PhysicsWorld::new(),
            geometries: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            entities: Vec::new(),
        }
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.push(geometry);
        GeometryHandle((self.geometries.len() - 1) as u32)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle((self.materials.len() - 1) as u32)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle((self.meshes.len() - 1) as u32)
    }

    pub fn geometry(&self, handle: GeometryHandle) -> &Geometry {
        &self.geometries[handle.0 as usize]
    }

    pub fn geometry_mut(&mut self, handle: GeometryHandle) -> &mut Geometry {
        &mut self.geometries[handle.0 as usize]
    }

    pub fn material(&self, handle: MaterialHandle) -> &Material {
        &self.materials[handle.0 as usize]
    }

    pub fn material_mut(&mut self, handle: MaterialHandle) -> &mut Material {
        &mut self.materials[handle.0 as usize]
    }

    pub fn mesh(&self, handle: MeshHandle) -> &Mesh {
        &self.meshes[handle.0 as usize]
    }

    pub fn mesh_mut(&mut self, handle: MeshHandle) -> &mut Mesh {
        &mut self.meshes[handle.0 as usize]
    }

    /// Meshes in draw order.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh_handles(&self) -> impl Iterator<Item = MeshHandle> {
        (0..self.meshes.len() as u32).map(MeshHandle)
    }

    /// Pair a mesh with a rigid body already spawned in `self.physics`.
    pub fn add_physics_entity(&mut self, mesh: MeshHandle, body: RigidBodyHandle) {
        self.entities.push(PhysicsEntity { mesh, body });
    }

    pub fn step_physics(&mut self, dt: f32) {
        self.physics.step(dt);
    }

    /// Copy simulated body poses into the paired meshes. Each touched mesh
    /// comes out flagged for re-upload.
    pub fn sync_meshes_with_physics(&mut self) {
        for entity in &self.entities {
            let (position, rotation) = self.physics.body_pose(entity.body);
            self.meshes[entity.mesh.0 as usize].set_pose(position, rotation);
        }
    }

    /// Push mesh poses back into the paired bodies (initial placement of
    /// kinematic setups).
    pub fn sync_bodies_with_meshes(&mut self) {
        for entity in &self.entities {
            let mesh = &self.meshes[entity.mesh.0 as usize];
            self.physics
                .set_body_pose(entity.body, mesh.translation(), mesh.rotation());
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(
            Camera::perspective(std::f32::consts::FRAC_PI_3, 4.0 / 3.0, 0.1, 100.0),
            AmbientLight::new(0.3, Vec3::ONE),
            DirectionalLight::new(1.0, Vec3::ONE, Vec3::new(-0.5, -1.0, -0.5)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn handles_resolve_to_inserted_objects() {
        let mut scene = Scene::default();
        let geometry = scene.add_geometry(Geometry::cube(1.0, 1.0, 1.0));
        let material = scene.add_material(Material::phong(Vec3::ONE, 0.8, 0.5, 16.0));
        let mesh = scene.add_mesh(Mesh::new(geometry, material));

        assert_eq!(scene.geometry(geometry).vertex_count(), 24);
        assert_eq!(
            scene.material(material).material_type(),
            crate::material::MaterialType::Phong
        );
        assert_eq!(scene.mesh(mesh).geometry(), geometry);
        assert_eq!(scene.meshes().len(), 1);
    }

    #[test]
    fn physics_sync_moves_and_dirties_mesh() {
        let mut scene = Scene::default();
        let geometry = scene.add_geometry(Geometry::cube(1.0, 1.0, 1.0));
        let material = scene.add_material(Material::basic());
        let mesh = scene.add_mesh(Mesh::new(geometry, material));

        let body = scene.physics.spawn_box(
            Vec3::splat(0.5),
            1.0,
            Vec3::new(0.0, 5.0, 0.0),
            Quat::IDENTITY,
        );
        scene.add_physics_entity(mesh, body);

        scene.sync_meshes_with_physics();
        scene.mesh_mut(mesh).clear_dirty();

        for _ in 0..30 {
            scene.step_physics(1.0 / 60.0);
        }
        scene.sync_meshes_with_physics();

        let mesh = scene.mesh(mesh);
        assert!(mesh.needs_update());
        assert!(mesh.translation().y < 5.0);
    }
}
