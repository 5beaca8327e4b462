// src/physics.rs
//! Rigid-body simulation wrapper around Rapier. The renderer never touches
//! this directly; the engine steps the world and copies resulting body
//! poses into meshes before the GPU update pass runs.

use glam::{Quat, Vec3};
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude as rap;

pub use rapier3d::prelude::RigidBodyHandle;

use crate::geometry::Geometry;

pub struct PhysicsWorld {
    gravity: Vector3<f32>,
    pipeline: rap::PhysicsPipeline,
    integration_params: rap::IntegrationParameters,
    islands: rap::IslandManager,
    broad_phase: rap::BroadPhase,
    narrow_phase: rap::NarrowPhase,
    bodies: rap::RigidBodySet,
    colliders: rap::ColliderSet,
    impulse_joints: rap::ImpulseJointSet,
    multibody_joints: rap::MultibodyJointSet,
    ccd_solver: rap::CCDSolver,
    query_pipeline: rap::QueryPipeline,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity: Vector3::new(gravity.x, gravity.y, gravity.z),
            pipeline: rap::PhysicsPipeline::new(),
            integration_params: rap::IntegrationParameters::default(),
            islands: rap::IslandManager::new(),
            broad_phase: rap::BroadPhase::new(),
            narrow_phase: rap::NarrowPhase::new(),
            bodies: rap::RigidBodySet::new(),
            colliders: rap::ColliderSet::new(),
            impulse_joints: rap::ImpulseJointSet::new(),
            multibody_joints: rap::MultibodyJointSet::new(),
            ccd_solver: rap::CCDSolver::new(),
            query_pipeline: rap::QueryPipeline::new(),
        }
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Dynamic body with a box collider.
    pub fn spawn_box(
        &mut self,
        half_extents: Vec3,
        mass: f32,
        position: Vec3,
        rotation: Quat,
    ) -> RigidBodyHandle {
        let body = rap::RigidBodyBuilder::dynamic()
            .position(to_isometry(position, rotation))
            .build();
        let handle = self.bodies.insert(body);

        let collider = rap::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .mass(mass)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Immovable box, used for floors and walls.
    pub fn spawn_fixed_box(&mut self, half_extents: Vec3, position: Vec3) -> RigidBodyHandle {
        let body = rap::RigidBodyBuilder::fixed()
            .position(to_isometry(position, Quat::IDENTITY))
            .build();
        let handle = self.bodies.insert(body);

        let collider =
            rap::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Dynamic body whose collider is built from the geometry's triangles.
    pub fn spawn_trimesh(
        &mut self,
        geometry: &Geometry,
        mass: f32,
        position: Vec3,
        rotation: Quat,
    ) -> RigidBodyHandle {
        let vertices: Vec<rap::Point<f32>> = geometry
            .vertices()
            .iter()
            .map(|v| rap::Point::new(v.position[0], v.position[1], v.position[2]))
            .collect();

        let indices: Vec<[u32; 3]> = match geometry.indices() {
            Some(indices) => indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect(),
            None => (0..geometry.vertex_count() / 3)
                .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
                .collect(),
        };

        let body = rap::RigidBodyBuilder::dynamic()
            .position(to_isometry(position, rotation))
            .build();
        let handle = self.bodies.insert(body);

        let collider = rap::ColliderBuilder::trimesh(vertices, indices)
            .mass(mass)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn body_pose(&self, handle: RigidBodyHandle) -> (Vec3, Quat) {
        let position = self.bodies[handle].position();
        let t = position.translation.vector;
        let r = position.rotation;
        (
            Vec3::new(t.x, t.y, t.z),
            Quat::from_xyzw(r.i, r.j, r.k, r.w),
        )
    }

    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_position(to_isometry(position, rotation), true);
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn to_isometry(position: Vec3, rotation: Quat) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::new(position.x, position.y, position.z),
        UnitQuaternion::from_quaternion(Quaternion::new(
            rotation.w, rotation.x, rotation.y, rotation.z,
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_box_falls() {
        let mut world = PhysicsWorld::new();
        let body = world.spawn_box(Vec3::splat(0.5), 1.0, Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY);

        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }

        let (position, _) = world.body_pose(body);
        assert!(position.y < 10.0);
    }

    #[test]
    fn fixed_box_stays_put() {
        let mut world = PhysicsWorld::new();
        let body = world.spawn_fixed_box(Vec3::new(10.0, 0.5, 10.0), Vec3::new(0.0, -0.5, 0.0));

        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }

        let (position, _) = world.body_pose(body);
        assert_eq!(position, Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn pose_round_trips() {
        let mut world = PhysicsWorld::new();
        let body = world.spawn_box(Vec3::splat(0.5), 1.0, Vec3::ZERO, Quat::IDENTITY);

        let target = Vec3::new(1.0, 2.0, 3.0);
        world.set_body_pose(body, target, Quat::IDENTITY);

        let (position, _) = world.body_pose(body);
        assert!((position - target).length() < 1e-6);
    }
}
