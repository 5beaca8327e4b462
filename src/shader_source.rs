// src/shader_source.rs
//! Static WGSL shader text, one program per material type.
//!
//! Each source declares its uniform blocks at `@group(0)` with binding
//! slots matching `blocks` (index = binding). The block names and the
//! role tables in `uniform_block.rs` are two views of the same contract;
//! a drift between them surfaces as a fatal configuration error at draw
//! time.

use crate::material::MaterialType;

pub struct ShaderSource {
    pub wgsl: &'static str,
    /// Uniform block names in declaration order; the index is the binding
    /// slot the program declares for that block.
    pub blocks: &'static [&'static str],
}

pub fn shader_source(material_type: MaterialType) -> ShaderSource {
    match material_type {
        MaterialType::Basic => ShaderSource {
            wgsl: BASIC_WGSL,
            blocks: &["CameraBlock", "ModelBlock"],
        },
        MaterialType::Normal => ShaderSource {
            wgsl: NORMAL_WGSL,
            blocks: &["CameraBlock", "ModelBlock"],
        },
        MaterialType::TextureCoord => ShaderSource {
            wgsl: TEXTURE_COORD_WGSL,
            blocks: &["CameraBlock", "ModelBlock"],
        },
        MaterialType::SingleColor => ShaderSource {
            wgsl: SINGLE_COLOR_WGSL,
            blocks: &["CameraBlock", "ModelBlock", "MaterialBlock"],
        },
        MaterialType::Phong => ShaderSource {
            wgsl: PHONG_WGSL,
            blocks: &[
                "CameraBlock",
                "ModelBlock",
                "MaterialBlock",
                "AmbientLightBlock",
                "DirectionalLightBlock",
            ],
        },
    }
}

const BASIC_WGSL: &str = r#"
struct CameraBlock { view: mat4x4<f32>, proj: mat4x4<f32>, eye: vec4<f32> }
struct ModelBlock { model: mat4x4<f32> }

@group(0) @binding(0) var<uniform> camera: CameraBlock;
@group(0) @binding(1) var<uniform> model: ModelBlock;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
}

@vertex
fn vs_main(in: VsIn) -> @builtin(position) vec4<f32> {
    return camera.proj * camera.view * model.model * vec4<f32>(in.position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

const NORMAL_WGSL: &str = r#"
struct CameraBlock { view: mat4x4<f32>, proj: mat4x4<f32>, eye: vec4<f32> }
struct ModelBlock { model: mat4x4<f32> }

@group(0) @binding(0) var<uniform> camera: CameraBlock;
@group(0) @binding(1) var<uniform> model: ModelBlock;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
}

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
}

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.clip_position = camera.proj * camera.view * model.model * vec4<f32>(in.position, 1.0);
    out.normal = normalize((model.model * vec4<f32>(in.normal, 0.0)).xyz);
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(normalize(in.normal) * 0.5 + 0.5, 1.0);
}
"#;

const TEXTURE_COORD_WGSL: &str = r#"
struct CameraBlock { view: mat4x4<f32>, proj: mat4x4<f32>, eye: vec4<f32> }
struct ModelBlock { model: mat4x4<f32> }

@group(0) @binding(0) var<uniform> camera: CameraBlock;
@group(0) @binding(1) var<uniform> model: ModelBlock;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
}

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
}

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.clip_position = camera.proj * camera.view * model.model * vec4<f32>(in.position, 1.0);
    out.tex_coord = in.tex_coord;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return vec4<f32>(in.tex_coord, 0.0, 1.0);
}
"#;

const SINGLE_COLOR_WGSL: &str = r#"
struct CameraBlock { view: mat4x4<f32>, proj: mat4x4<f32>, eye: vec4<f32> }
struct ModelBlock { model: mat4x4<f32> }
struct MaterialBlock { color: vec3<f32> }

@group(0) @binding(0) var<uniform> camera: CameraBlock;
@group(0) @binding(1) var<uniform> model: ModelBlock;
@group(0) @binding(2) var<uniform> material: MaterialBlock;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
}

@vertex
fn vs_main(in: VsIn) -> @builtin(position) vec4<f32> {
    return camera.proj * camera.view * model.model * vec4<f32>(in.position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(material.color, 1.0);
}
"#;

const PHONG_WGSL: &str = r#"
struct CameraBlock { view: mat4x4<f32>, proj: mat4x4<f32>, eye: vec4<f32> }
struct ModelBlock { model: mat4x4<f32> }
struct MaterialBlock { color: vec3<f32>, diffuse: f32, specular: f32, alpha: f32 }
struct AmbientLightBlock { color: vec3<f32>, intensity: f32 }
struct DirectionalLightBlock { color: vec3<f32>, intensity: f32, direction: vec3<f32> }

@group(0) @binding(0) var<uniform> camera: CameraBlock;
@group(0) @binding(1) var<uniform> model: ModelBlock;
@group(0) @binding(2) var<uniform> material: MaterialBlock;
@group(0) @binding(3) var<uniform> ambient_light: AmbientLightBlock;
@group(0) @binding(4) var<uniform> directional_light: DirectionalLightBlock;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coord: vec2<f32>,
}

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) world_position: vec3<f32>,
}

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    let world = model.model * vec4<f32>(in.position, 1.0);
    out.clip_position = camera.proj * camera.view * world;
    out.normal = normalize((model.model * vec4<f32>(in.normal, 0.0)).xyz);
    out.world_position = world.xyz;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let light_dir = normalize(-directional_light.direction);
    let view_dir = normalize(camera.eye.xyz - in.world_position);

    let ambient = ambient_light.color * ambient_light.intensity;

    let lambert = max(dot(n, light_dir), 0.0);
    let diffuse = directional_light.color * directional_light.intensity * lambert * material.diffuse;

    let halfway = normalize(light_dir + view_dir);
    let highlight = pow(max(dot(n, halfway), 0.0), material.alpha);
    let specular = directional_light.color * directional_light.intensity * highlight * material.specular;

    let color = (ambient + diffuse + specular) * material.color;
    return vec4<f32>(color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniform_block::{block_name, required_blocks};

    #[test]
    fn declared_blocks_match_role_tables() {
        for ty in MaterialType::ALL {
            let source = shader_source(ty);
            let required = required_blocks(ty);
            assert_eq!(
                source.blocks.len(),
                required.len(),
                "block count mismatch for {ty:?}"
            );
            for role in required {
                assert!(
                    source.blocks.contains(&block_name(*role)),
                    "{ty:?} shader does not declare {}",
                    block_name(*role)
                );
            }
        }
    }

    #[test]
    fn wgsl_declares_every_listed_block() {
        for ty in MaterialType::ALL {
            let source = shader_source(ty);
            for (slot, block) in source.blocks.iter().enumerate() {
                assert!(source.wgsl.contains(block), "{ty:?}: missing {block}");
                assert!(
                    source.wgsl.contains(&format!("@binding({slot})")),
                    "{ty:?}: missing binding slot {slot}"
                );
            }
        }
    }
}
