// src/camera.rs
//! Scene camera: view transform plus a perspective or orthographic
//! projection. The GPU-facing payload is kept packed and ready so the
//! upload path is a plain byte copy.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::render_state::{EntityId, RenderState};

/// GPU layout of the camera uniform block.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Eye position, w unused.
    pub eye: [f32; 4],
}

#[derive(Copy, Clone, Debug)]
enum Projection {
    Perspective {
        fovy: f32,
        aspect: f32,
        znear: f32,
        zfar: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        znear: f32,
        zfar: f32,
    },
}

impl Projection {
    fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fovy,
                aspect,
                znear,
                zfar,
            } => Mat4::perspective_rh(fovy, aspect, znear, zfar),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                znear,
                zfar,
            } => Mat4::orthographic_rh(left, right, bottom, top, znear, zfar),
        }
    }
}

pub struct Camera {
    state: RenderState,
    uniform: CameraUniform,
    projection: Projection,
}

impl Camera {
    /// Perspective camera looking at the origin from (0, 0, 1).
    pub fn perspective(fovy: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        let projection = Projection::Perspective {
            fovy,
            aspect,
            znear,
            zfar,
        };
        Self::with_projection(projection)
    }

    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let projection = Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            znear,
            zfar,
        };
        Self::with_projection(projection)
    }

    fn with_projection(projection: Projection) -> Self {
        let mut camera = Self {
            state: RenderState::new(),
            uniform: CameraUniform::zeroed(),
            projection,
        };
        camera.uniform.proj = projection.matrix().to_cols_array_2d();
        camera.look_at(Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO, Vec3::Y);
        camera
    }

    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.uniform.view = Mat4::look_at_rh(eye, center, up).to_cols_array_2d();
        self.uniform.eye = [eye.x, eye.y, eye.z, 0.0];
        self.state.mark_dirty();
    }

    pub fn set_perspective(&mut self, fovy: f32, aspect: f32, znear: f32, zfar: f32) {
        self.projection = Projection::Perspective {
            fovy,
            aspect,
            znear,
            zfar,
        };
        self.uniform.proj = self.projection.matrix().to_cols_array_2d();
        self.state.mark_dirty();
    }

    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        znear: f32,
        zfar: f32,
    ) {
        self.projection = Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            znear,
            zfar,
        };
        self.uniform.proj = self.projection.matrix().to_cols_array_2d();
        self.state.mark_dirty();
    }

    /// Rebuild the projection for a new surface aspect ratio. No effect on
    /// orthographic cameras.
    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective {
            fovy, znear, zfar, ..
        } = self.projection
        {
            self.set_perspective(fovy, aspect, znear, zfar);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.uniform.view)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.uniform.proj)
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

    #[test]
    fn uniform_is_std140_sized() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
    }

    #[test]
    fn mutators_mark_dirty() {
        let mut camera = Camera::perspective(1.0, 16.0 / 9.0, 0.1, 100.0);
        camera.clear_dirty();

        camera.look_at(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert!(camera.needs_update());

        camera.clear_dirty();
        camera.set_aspect(4.0 / 3.0);
        assert!(camera.needs_update());
    }

    #[test]
    fn look_at_records_eye() {
        let mut camera = Camera::perspective(1.0, 1.0, 0.1, 100.0);
        camera.look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(camera.uniform.eye, [1.0, 2.0, 3.0, 0.0]);
    }
}
