// src/material.rs
//! Materials. The type tag decides which shader program a mesh renders
//! with and which uniform blocks that program expects; instance parameters
//! (when the type has any) live in a packed payload owned by the material.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::render_state::{EntityId, RenderState};

/// Shader programs are compiled and cached per material *type*, not per
/// material instance.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MaterialType {
    Basic,
    Normal,
    TextureCoord,
    SingleColor,
    Phong,
}

impl MaterialType {
    pub const ALL: [MaterialType; 5] = [
        MaterialType::Basic,
        MaterialType::Normal,
        MaterialType::TextureCoord,
        MaterialType::SingleColor,
        MaterialType::Phong,
    ];
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SingleColorUniform {
    pub color: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PhongUniform {
    pub color: [f32; 3],
    pub diffuse: f32,
    pub specular: f32,
    pub alpha: f32,
    pub _pad: [f32; 2],
}

enum MaterialParams {
    Basic,
    Normal,
    TextureCoord,
    SingleColor(SingleColorUniform),
    Phong(PhongUniform),
}

pub struct Material {
    state: RenderState,
    params: MaterialParams,
}

impl Material {
    /// Flat fixed-color output, no per-instance parameters.
    pub fn basic() -> Self {
        Self::with_params(MaterialParams::Basic)
    }

    /// Visualizes vertex normals.
    pub fn normal() -> Self {
        Self::with_params(MaterialParams::Normal)
    }

    /// Visualizes texture coordinates.
    pub fn texture_coord() -> Self {
        Self::with_params(MaterialParams::TextureCoord)
    }

    pub fn single_color(color: Vec3) -> Self {
        Self::with_params(MaterialParams::SingleColor(SingleColorUniform {
            color: color.to_array(),
            _pad: 0.0,
        }))
    }

    pub fn phong(color: Vec3, diffuse: f32, specular: f32, alpha: f32) -> Self {
        Self::with_params(MaterialParams::Phong(PhongUniform {
            color: color.to_array(),
            diffuse,
            specular,
            alpha,
            _pad: [0.0; 2],
        }))
    }

    fn with_params(params: MaterialParams) -> Self {
        Self {
            state: RenderState::new(),
            params,
        }
    }

    pub fn material_type(&self) -> MaterialType {
        match self.params {
            MaterialParams::Basic => MaterialType::Basic,
            MaterialParams::Normal => MaterialType::Normal,
            MaterialParams::TextureCoord => MaterialType::TextureCoord,
            MaterialParams::SingleColor(_) => MaterialType::SingleColor,
            MaterialParams::Phong(_) => MaterialType::Phong,
        }
    }

    /// Packed instance parameters, `None` for types without a material
    /// uniform block.
    pub fn uniform_bytes(&self) -> Option<&[u8]> {
        match &self.params {
            MaterialParams::Basic | MaterialParams::Normal | MaterialParams::TextureCoord => None,
            MaterialParams::SingleColor(uniform) => Some(bytemuck::bytes_of(uniform)),
            MaterialParams::Phong(uniform) => Some(bytemuck::bytes_of(uniform)),
        }
    }

    /// Set the base color. Ignored by types without a color parameter.
    pub fn set_color(&mut self, color: Vec3) {
        match &mut self.params {
            MaterialParams::SingleColor(uniform) => {
                uniform.color = color.to_array();
                self.state.mark_dirty();
            }
            MaterialParams::Phong(uniform) => {
                uniform.color = color.to_array();
                self.state.mark_dirty();
            }
            _ => {}
        }
    }

    pub fn set_diffuse(&mut self, diffuse: f32) {
        if let MaterialParams::Phong(uniform) = &mut self.params {
            uniform.diffuse = diffuse;
            self.state.mark_dirty();
        }
    }

    pub fn set_specular(&mut self, specular: f32) {
        if let MaterialParams::Phong(uniform) = &mut self.params {
            uniform.specular = specular;
            self.state.mark_dirty();
        }
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        if let MaterialParams::Phong(uniform) = &mut self.params {
            uniform.alpha = alpha;
            self.state.mark_dirty();
        }
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
    fn payload_presence_follows_type() {
        assert!(Material::basic().uniform_bytes().is_none());
        assert!(Material::normal().uniform_bytes().is_none());
        assert!(Material::texture_coord().uniform_bytes().is_none());
        assert!(Material::single_color(Vec3::ONE).uniform_bytes().is_some());
        assert!(Material::phong(Vec3::ONE, 0.8, 0.5, 16.0)
            .uniform_bytes()
            .is_some());
    }

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<SingleColorUniform>(), 16);
        assert_eq!(std::mem::size_of::<PhongUniform>(), 32);
    }

    #[test]
    fn set_color_marks_dirty_and_changes_payload() {
        let mut material = Material::single_color(Vec3::ONE);
        material.clear_dirty();
        let before = material.uniform_bytes().unwrap().to_vec();

        material.set_color(Vec3::new(1.0, 0.0, 0.0));
        assert!(material.needs_update());
        assert_ne!(material.uniform_bytes().unwrap(), &before[..]);
    }

    #[test]
    fn set_color_is_inert_for_basic() {
        let mut material = Material::basic();
        material.clear_dirty();
        material.set_color(Vec3::ONE);
        assert!(!material.needs_update());
    }
}
