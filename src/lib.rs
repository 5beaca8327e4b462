// src/lib.rs
//! prism_engine: a small real-time 3D rendering framework.
//!
//! A scene graph of cameras, lights, materials, geometries and meshes is
//! kept in sync with GPU-resident buffers and shader programs by a
//! dirty-flag driven resource manager, rendered once per display tick
//! through a wgpu backend (desktop and browser from the same code), with
//! Rapier driving rigid-body entities.

use glam::{Quat, Vec3, Vec4};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod camera;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod mesh_loader;
pub mod physics;
pub mod render_state;
pub mod render_system;
pub mod resource_manager;
pub mod scene;
pub mod shader_source;
pub mod time;
pub mod uniform_block;

pub use camera::Camera;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use geometry::{Geometry, Vertex};
pub use lighting::{AmbientLight, DirectionalLight};
pub use material::{Material, MaterialType};
pub use mesh::Mesh;
pub use render_system::WindowOptions;
pub use scene::{GeometryHandle, MaterialHandle, MeshHandle, Scene};

// ----------------------------------------------------------------------------
// Demo scene: a die dropped onto a plane, plus a spinning showcase cube
// ----------------------------------------------------------------------------

/// Build the demo scene. Returns the scene and the handle of the mesh the
/// render loop spins.
pub fn build_demo_scene() -> (Scene, MeshHandle) {
    let mut camera = Camera::perspective(
        45f32.to_radians(),
        800.0 / 600.0,
        0.1,
        100.0,
    );
    camera.look_at(Vec3::new(0.0, 3.0, 8.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y);

    let ambient = AmbientLight::new(0.25, Vec3::ONE);
    let directional = DirectionalLight::new(1.0, Vec3::ONE, Vec3::new(-0.4, -1.0, -0.3));
    let mut scene = Scene::new(camera, ambient, directional);

    // Ground plane, immovable.
    let ground_geometry = scene.add_geometry(Geometry::plane(20.0, 20.0));
    let ground_material = scene.add_material(Material::single_color(Vec3::new(0.45, 0.5, 0.55)));
    scene.add_mesh(Mesh::new(ground_geometry, ground_material));
    scene
        .physics
        .spawn_fixed_box(Vec3::new(10.0, 0.05, 10.0), Vec3::new(0.0, -0.05, 0.0));

    // The die: a phong-lit cube dropped from above with a slight tumble.
    let cube_geometry = scene.add_geometry(Geometry::cube(1.0, 1.0, 1.0));
    let die_material = scene.add_material(Material::phong(Vec3::new(0.9, 0.35, 0.2), 0.9, 0.6, 32.0));
    let die_mesh = scene.add_mesh(Mesh::new(cube_geometry, die_material));
    let half_extents = scene.geometry(cube_geometry).half_extents();
    let die_body = scene.physics.spawn_box(
        half_extents,
        1.0,
        Vec3::new(0.0, 6.0, 0.0),
        Quat::from_axis_angle(Vec3::new(0.4, 1.0, 0.2).normalize(), 0.7),
    );
    scene.add_physics_entity(die_mesh, die_body);

    // Spinning cube off to the side, sharing the die's geometry.
    let spinner_material = scene.add_material(Material::texture_coord());
    let spinner = scene.add_mesh(Mesh::new(cube_geometry, spinner_material));
    scene.mesh_mut(spinner).translate(Vec3::new(2.5, 1.0, 0.0));

    (scene, spinner)
}

async fn run_inner() -> Result<()> {
    let (scene, spinner) = build_demo_scene();

    let mut engine = Engine::new(
        scene,
        WindowOptions {
            title: "prism dice".into(),
            width: 800,
            height: 600,
        },
    )
    .await?;
    engine
        .render_system_mut()
        .set_clear_color(Vec4::new(0.08, 0.1, 0.14, 1.0));

    engine.render_scene(move |scene, _elapsed_ms, delta_ms| {
        scene
            .mesh_mut(spinner)
            .rotate(delta_ms * 0.001, Vec3::Y);
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn run_native() -> Result<()> {
    pollster::block_on(run_inner())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn run() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    let _ = console_log::init_with_level(log::Level::Info);

    if let Err(err) = run_inner().await {
        log::error!("engine failed to start: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_shares_cube_geometry() {
        let (scene, spinner) = build_demo_scene();
        assert_eq!(scene.meshes().len(), 3);

        let die = &scene.meshes()[1];
        assert_eq!(die.geometry(), scene.mesh(spinner).geometry());
    }
}
