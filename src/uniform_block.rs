// src/uniform_block.rs
//! Static tables tying material types to the uniform blocks their shader
//! programs consume. Both tables are fixed data; they must stay in sync
//! with the shader sources in `shader_source.rs`.

use crate::material::MaterialType;

/// Logical category of shader-visible constant data, independent of the
/// binding integers a backend assigns at draw time.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum UniformBlockRole {
    Camera,
    Model,
    Material,
    AmbientLight,
    DirectionalLight,
}

/// Fixed bijection from role to the block name declared in shader source.
pub fn block_name(role: UniformBlockRole) -> &'static str {
    match role {
        UniformBlockRole::Camera => "CameraBlock",
        UniformBlockRole::Model => "ModelBlock",
        UniformBlockRole::Material => "MaterialBlock",
        UniformBlockRole::AmbientLight => "AmbientLightBlock",
        UniformBlockRole::DirectionalLight => "DirectionalLightBlock",
    }
}

/// The uniform blocks a material type's program requires. Pure lookup
/// table; the set for each type never changes at runtime.
pub fn required_blocks(material_type: MaterialType) -> &'static [UniformBlockRole] {
    match material_type {
        MaterialType::Basic | MaterialType::Normal | MaterialType::TextureCoord => {
            &[UniformBlockRole::Camera, UniformBlockRole::Model]
        }
        MaterialType::SingleColor => &[
            UniformBlockRole::Camera,
            UniformBlockRole::Model,
            UniformBlockRole::Material,
        ],
        MaterialType::Phong => &[
            UniformBlockRole::Camera,
            UniformBlockRole::Model,
            UniformBlockRole::Material,
            UniformBlockRole::AmbientLight,
            UniformBlockRole::DirectionalLight,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn phong_requires_all_five_roles() {
        let roles: HashSet<_> = required_blocks(MaterialType::Phong).iter().copied().collect();
        assert_eq!(roles.len(), 5);
        assert!(roles.contains(&UniformBlockRole::Camera));
        assert!(roles.contains(&UniformBlockRole::Model));
        assert!(roles.contains(&UniformBlockRole::Material));
        assert!(roles.contains(&UniformBlockRole::AmbientLight));
        assert!(roles.contains(&UniformBlockRole::DirectionalLight));
    }

    #[test]
    fn every_material_type_has_resolvable_roles() {
        for ty in MaterialType::ALL {
            let roles = required_blocks(ty);
            assert!(!roles.is_empty());
            for role in roles {
                assert!(!block_name(*role).is_empty());
            }
        }
    }

    #[test]
    fn block_names_are_distinct() {
        let names: HashSet<_> = [
            UniformBlockRole::Camera,
            UniformBlockRole::Model,
            UniformBlockRole::Material,
            UniformBlockRole::AmbientLight,
            UniformBlockRole::DirectionalLight,
        ]
        .iter()
        .map(|role| block_name(*role))
        .collect();
        assert_eq!(names.len(), 5);
    }
}
