// src/render_system.rs
//! Windowing driver: winit window + wgpu surface, native and web through
//! the same code path. Owns surface configuration, the depth buffer, the
//! clear color and frame presentation; the engine is invoked from inside
//! the event loop and never manages it directly.

use std::sync::Arc;

use glam::Vec4;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

#[cfg(target_arch = "wasm32")]
use winit::platform::web::WindowExtWebSys;

use crate::error::{EngineError, Result};
use crate::gpu::wgpu_backend::{WgpuBackend, DEPTH_FORMAT};

/// Device, queue and adapter shared by the backend and the window surface.
pub struct GraphicsContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GraphicsContext {
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // No compatible surface yet: the window is created later, inside the
        // event loop's `resumed` callback.
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(EngineError::AdapterUnavailable)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("prism_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        // The web build cannot poll validation scopes synchronously, so
        // route anything uncaptured through the logger there.
        #[cfg(target_arch = "wasm32")]
        device.on_uncaptured_error(Box::new(|error| {
            log::error!("uncaptured wgpu error: {error}");
        }));

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }
}

pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "prism".into(),
            width: 800,
            height: 600,
        }
    }
}

pub struct RenderSystem {
    context: GraphicsContext,
    options: WindowOptions,
    clear_color: wgpu::Color,

    // Created inside the `resumed` event.
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    config: Option<wgpu::SurfaceConfiguration>,
    depth_view: Option<wgpu::TextureView>,
}

impl RenderSystem {
    pub fn new(context: GraphicsContext, options: WindowOptions) -> Self {
        Self {
            context,
            options,
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            window: None,
            surface: None,
            config: None,
            depth_view: None,
        }
    }

    pub fn context(&self) -> &GraphicsContext {
        &self.context
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = wgpu::Color {
            r: color.x as f64,
            g: color.y as f64,
            b: color.z as f64,
            a: color.w as f64,
        };
    }

    /// Create window, surface and depth buffer. Returns the surface format
    /// the pipelines must target. Idempotent across repeated `resumed`
    /// events.
    pub fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<wgpu::TextureFormat> {
        if let Some(config) = &self.config {
            return Ok(config.format);
        }

        let attrs = Window::default_attributes()
            .with_title(&self.options.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.options.width,
                self.options.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);

        #[cfg(target_arch = "wasm32")]
        {
            let canvas = match window.canvas() {
                Some(canvas) => canvas,
                None => {
                    return Err(EngineError::Asset(
                        "winit window has no canvas".to_string(),
                    ))
                }
            };
            let canvas_el: web_sys::Element = canvas.into();
            let document = web_sys::window().and_then(|w| w.document());
            if let Some(document) = document {
                let target = document
                    .get_element_by_id("prism-container")
                    .or_else(|| document.body().map(Into::into));
                if let Some(target) = target {
                    let _ = target.append_child(&canvas_el);
                }
            }
        }

        let surface = self.context.instance.create_surface(window.clone())?;
        let size = window.inner_size();
        let caps = surface.get_capabilities(&self.context.adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: caps.present_modes[0],
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&self.context.device, &config);

        self.depth_view = Some(Self::create_depth_view(&self.context.device, &config));
        window.request_redraw();

        log::info!(
            "window up: {}x{}, surface format {format:?}",
            config.width,
            config.height
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.config = Some(config);
        Ok(format)
    }

    /// Reconfigure the surface and depth buffer after a size change.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let (Some(surface), Some(config)) = (self.surface.as_ref(), self.config.as_mut()) {
            config.width = width;
            config.height = height;
            surface.configure(&self.context.device, config);
            self.depth_view = Some(Self::create_depth_view(&self.context.device, config));
        }
    }

    /// Ask the windowing system for a new window size; the resulting
    /// `Resized` event drives the actual surface reconfiguration.
    pub fn update_window_size(&self, width: u32, height: u32) {
        if let Some(window) = &self.window {
            let _ = window.request_inner_size(winit::dpi::PhysicalSize::new(width, height));
        }
    }

    pub fn aspect(&self) -> f32 {
        match &self.config {
            Some(config) if config.height > 0 => config.width as f32 / config.height as f32,
            _ => self.options.width as f32 / self.options.height.max(1) as f32,
        }
    }

    pub fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }

    /// Acquire the next swapchain texture, flush the backend's recorded
    /// draws into it and present.
    pub fn present_frame(&mut self, backend: &mut WgpuBackend) {
        let (Some(surface), Some(config), Some(depth_view)) = (
            self.surface.as_ref(),
            self.config.as_ref(),
            self.depth_view.as_ref(),
        ) else {
            return;
        };

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("failed to acquire frame: {err:?}, reconfiguring surface");
                surface.configure(&self.context.device, config);
                match surface.get_current_texture() {
                    Ok(frame) => frame,
                    Err(err) => {
                        log::error!("failed to acquire frame after reconfigure: {err:?}");
                        return;
                    }
                }
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        backend.submit_frame(&view, depth_view, self.clear_color);
        frame.present();
    }

    fn create_depth_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}
