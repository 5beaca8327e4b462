// src/engine.rs
//! Render loop orchestrator. Each frame runs strictly Update → Draw: the
//! update pass walks the scene and upserts every dirty resource, the draw
//! pass resolves shader programs, vertex objects and uniform-block buffers
//! per mesh and records the draw calls. Both passes are generic over the
//! backend so they run under a recording mock in tests.

use std::collections::HashMap;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use crate::error::Result;
use crate::gpu::{RenderBackend, WgpuBackend};
use crate::render_system::{GraphicsContext, RenderSystem, WindowOptions};
use crate::resource_manager::GpuResourceManager;
use crate::scene::Scene;
use crate::time::FrameClock;
use crate::uniform_block::{required_blocks, UniformBlockRole};

/// Upsert every dirty resource in the scene and clear the flags. Must run
/// to completion before the draw pass of the same frame.
pub fn update_gpu_resources<B: RenderBackend>(
    scene: &mut Scene,
    resources: &mut GpuResourceManager<B>,
) {
    if scene.camera.needs_update() {
        resources.upsert_uniform_buffer(scene.camera.id(), scene.camera.uniform_bytes());
        scene.camera.clear_dirty();
    }

    if scene.ambient_light.needs_update() {
        resources.upsert_uniform_buffer(
            scene.ambient_light.id(),
            scene.ambient_light.uniform_bytes(),
        );
        scene.ambient_light.clear_dirty();
    }

    if scene.directional_light.needs_update() {
        resources.upsert_uniform_buffer(
            scene.directional_light.id(),
            scene.directional_light.uniform_bytes(),
        );
        scene.directional_light.clear_dirty();
    }

    let handles: Vec<_> = scene.mesh_handles().collect();
    for handle in handles {
        let mesh = scene.mesh_mut(handle);
        if mesh.needs_update() {
            resources.upsert_uniform_buffer(mesh.id(), mesh.uniform_bytes());
            mesh.clear_dirty();
        }

        let geometry_handle = scene.mesh(handle).geometry();
        let geometry = scene.geometry_mut(geometry_handle);
        if geometry.needs_update() {
            resources.upsert_vertex_object(geometry);
            geometry.clear_dirty();
        }

        let material_handle = scene.mesh(handle).material();
        let material = scene.material_mut(material_handle);
        if material.needs_update() {
            if let Some(bytes) = material.uniform_bytes() {
                resources.upsert_uniform_buffer(material.id(), bytes);
            }
            material.clear_dirty();
        }
    }
}

/// Record one draw call per mesh, in scene order. Resolves each mesh's
/// program, vertex object and the buffer for every uniform-block role its
/// material type requires (camera and lights are scene-global, model and
/// material buffers are per instance).
pub fn draw_scene<B: RenderBackend>(
    scene: &Scene,
    resources: &mut GpuResourceManager<B>,
) -> Result<()> {
    let camera_buffer = resources.uniform_buffer_id(scene.camera.id());
    let ambient_buffer = resources.uniform_buffer_id(scene.ambient_light.id());
    let directional_buffer = resources.uniform_buffer_id(scene.directional_light.id());

    for mesh in scene.meshes() {
        let material = scene.material(mesh.material());
        let material_type = material.material_type();
        let program = resources.shader_program(material_type)?;

        let geometry = scene.geometry(mesh.geometry());
        let vertex_object = resources.vertex_object(geometry);

        let mut block_buffers = HashMap::new();
        for role in required_blocks(material_type) {
            let buffer = match role {
                UniformBlockRole::Camera => camera_buffer,
                UniformBlockRole::Model => resources.uniform_buffer_id(mesh.id()),
                UniformBlockRole::Material => resources.uniform_buffer_id(material.id()),
                UniformBlockRole::AmbientLight => ambient_buffer,
                UniformBlockRole::DirectionalLight => directional_buffer,
            };
            block_buffers.insert(*role, buffer);
        }

        resources
            .backend_mut()
            .draw_triangles(program, &vertex_object, &block_buffers)?;
    }
    Ok(())
}

pub struct Engine {
    scene: Scene,
    resources: GpuResourceManager<WgpuBackend>,
    render_system: RenderSystem,
    clock: FrameClock,
}

impl Engine {
    /// Async to support browser wgpu initialization; native callers block
    /// on it with `pollster`.
    pub async fn new(scene: Scene, options: WindowOptions) -> Result<Self> {
        let context = GraphicsContext::new().await?;
        let backend = WgpuBackend::new(
            context.device.clone(),
            context.queue.clone(),
            wgpu::TextureFormat::Bgra8UnormSrgb,
        );
        let render_system = RenderSystem::new(context, options);

        Ok(Self {
            scene,
            resources: GpuResourceManager::new(backend),
            render_system,
            clock: FrameClock::new(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn render_system_mut(&mut self) -> &mut RenderSystem {
        &mut self.render_system
    }

    /// Enter the event loop. `loop_func` runs once per refresh tick with
    /// the scene and (elapsed_ms, delta_ms) before physics and the GPU
    /// passes; it never returns on the web target.
    pub fn render_scene<F>(self, loop_func: F) -> Result<()>
    where
        F: FnMut(&mut Scene, f32, f32) + 'static,
    {
        let event_loop = EventLoop::new()?;
        let app = EngineApp {
            engine: self,
            loop_func,
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut app = app;
            event_loop.run_app(&mut app)?;
        }

        // The browser main loop keeps running after this call returns.
        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
        }

        Ok(())
    }

    fn frame<F>(&mut self, loop_func: &mut F) -> Result<()>
    where
        F: FnMut(&mut Scene, f32, f32),
    {
        let (elapsed_ms, delta_ms) = self.clock.tick();
        loop_func(&mut self.scene, elapsed_ms, delta_ms);

        self.scene.step_physics(delta_ms / 1000.0);
        self.scene.sync_meshes_with_physics();

        update_gpu_resources(&mut self.scene, &mut self.resources);
        draw_scene(&self.scene, &mut self.resources)?;

        self.render_system.present_frame(self.resources.backend_mut());
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.render_system.resize(width, height);
        if height > 0 {
            self.scene.camera.set_aspect(width as f32 / height as f32);
        }
    }
}

struct EngineApp<F: FnMut(&mut Scene, f32, f32)> {
    engine: Engine,
    loop_func: F,
}

impl<F: FnMut(&mut Scene, f32, f32)> ApplicationHandler for EngineApp<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        match self.engine.render_system.init_window(event_loop) {
            Ok(format) => self.engine.resources.backend_mut().set_surface_format(format),
            Err(err) => {
                log::error!("window initialization failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.engine.render_system.window().cloned() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.engine.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.engine.frame(&mut self.loop_func) {
                    log::error!("fatal render error: {err}");
                    event_loop.exit();
                    return;
                }
                window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Caches must be released while the graphics context is still alive.
        self.engine.resources.cleanup();
    }
}
