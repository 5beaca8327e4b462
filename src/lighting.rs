// src/lighting.rs
//! Scene lights. One ambient and one directional light, each owning its
//! packed uniform payload; every setter flags the light for re-upload.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::render_state::{EntityId, RenderState};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct AmbientLightUniform {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    pub color: [f32; 3],
    pub intensity: f32,
    pub direction: [f32; 3],
    pub _pad: f32,
}

pub struct AmbientLight {
    state: RenderState,
    uniform: AmbientLightUniform,
}

impl AmbientLight {
    pub fn new(intensity: f32, color: Vec3) -> Self {
        Self {
            state: RenderState::new(),
            uniform: AmbientLightUniform {
                color: color.to_array(),
                intensity,
            },
        }
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.uniform.intensity = intensity;
        self.state.mark_dirty();
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.uniform.color = color.to_array();
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

pub struct DirectionalLight {
    state: RenderState,
    uniform: DirectionalLightUniform,
}

impl DirectionalLight {
    pub fn new(intensity: f32, color: Vec3, direction: Vec3) -> Self {
        Self {
            state: RenderState::new(),
            uniform: DirectionalLightUniform {
                color: color.to_array(),
                intensity,
                direction: direction.to_array(),
                _pad: 0.0,
            },
        }
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.uniform.intensity = intensity;
        self.state.mark_dirty();
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.uniform.color = color.to_array();
        self.state.mark_dirty();
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.uniform.direction = direction.to_array();
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

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<AmbientLightUniform>(), 16);
        assert_eq!(std::mem::size_of::<DirectionalLightUniform>(), 32);
    }

    #[test]
    fn setters_mark_dirty() {
        let mut light = DirectionalLight::new(1.0, Vec3::ONE, Vec3::new(0.0, -1.0, 0.0));
        assert!(light.needs_update());
        light.clear_dirty();

        light.set_direction(Vec3::new(1.0, -1.0, 0.0));
        assert!(light.needs_update());

        light.clear_dirty();
        light.set_intensity(0.5);
        assert!(light.needs_update());
    }
}
