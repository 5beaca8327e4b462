// src/mesh.rs
//! A mesh ties one geometry and one material together and owns the model
//! transform. Transform mutators keep the packed model matrix current and
//! flag the mesh so its uniform buffer is re-uploaded next frame.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

use crate::render_state::{EntityId, RenderState};
use crate::scene::{GeometryHandle, MaterialHandle};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

pub struct Mesh {
    state: RenderState,
    uniform: ModelUniform,
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    geometry: GeometryHandle,
    material: MaterialHandle,
}

impl Mesh {
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self {
            state: RenderState::new(),
            uniform: ModelUniform {
                model: Mat4::IDENTITY.to_cols_array_2d(),
            },
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            geometry,
            material,
        }
    }

    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn translate(&mut self, translation: Vec3) {
        self.translation += translation;
        self.rebuild_model_matrix();
    }

    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        self.rotation = (self.rotation * Quat::from_axis_angle(axis.normalize(), angle)).normalize();
        self.rebuild_model_matrix();
    }

    pub fn scale(&mut self, scaling: Vec3) {
        self.scale *= scaling;
        self.rebuild_model_matrix();
    }

    /// Overwrite translation and rotation in one go. This is the path the
    /// physics sync uses every step, so it must stay cheap.
    pub fn set_pose(&mut self, translation: Vec3, rotation: Quat) {
        self.translation = translation;
        self.rotation = rotation;
        self.rebuild_model_matrix();
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.uniform.model)
    }

    fn rebuild_model_matrix(&mut self) {
        let model =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
        self.uniform.model = model.to_cols_array_2d();
        self.state.mark_dirty();
    }

    pub fn uniform_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.uniform)
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
    use crate::scene::Scene;
    use crate::{geometry::Geometry, material::Material};

    fn test_mesh() -> Mesh {
        let mut scene = Scene::default();
        let geometry = scene.add_geometry(Geometry::triangle());
        let material = scene.add_material(Material::basic());
        Mesh::new(geometry, material)
    }

    #[test]
    fn translate_marks_dirty_and_changes_payload() {
        let mut mesh = test_mesh();
        mesh.clear_dirty();
        let before = mesh.uniform_bytes().to_vec();

        mesh.translate(Vec3::new(1.0, 0.0, 0.0));
        assert!(mesh.needs_update());
        assert_ne!(mesh.uniform_bytes(), &before[..]);
    }

    #[test]
    fn transforms_compose() {
        let mut mesh = test_mesh();
        mesh.translate(Vec3::new(1.0, 2.0, 3.0));
        mesh.scale(Vec3::splat(2.0));

        let model = mesh.model_matrix();
        let origin = model.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(1.0, 2.0, 3.0));

        let unit_x = model.transform_vector3(Vec3::X);
        assert!((unit_x.length() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn set_pose_overwrites_translation() {
        let mut mesh = test_mesh();
        mesh.translate(Vec3::new(5.0, 0.0, 0.0));
        mesh.set_pose(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY);
        assert_eq!(mesh.translation(), Vec3::new(0.0, 1.0, 0.0));
    }
}
