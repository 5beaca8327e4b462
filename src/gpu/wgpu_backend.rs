// src/gpu/wgpu_backend.rs
//! Production backend on top of wgpu. Covers desktop and browser targets
//! through one API.
//!
//! Resources live in slabs indexed by the opaque ids handed out through the
//! `RenderBackend` trait. Draws are recorded during the draw pass and
//! replayed into a single render pass when the frame is submitted, so the
//! trait surface stays free of render-pass lifetimes.

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::error::{EngineError, Result};
use crate::geometry::{Geometry, Vertex};
use crate::material::MaterialType;
use crate::shader_source::shader_source;
use crate::uniform_block::{block_name, UniformBlockRole};

use super::{BufferId, RenderBackend, ShaderProgramId, UniformBufferId, VertexObject};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct ProgramRecord {
    material_type: MaterialType,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    /// Block names in declaration order; the index is the binding slot the
    /// program declares for that name.
    blocks: &'static [&'static str],
}

struct DrawCall {
    program: ShaderProgramId,
    vertex_buffer: BufferId,
    index_buffer: Option<BufferId>,
    draw_count: u32,
    bind_group: wgpu::BindGroup,
}

pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface_format: wgpu::TextureFormat,

    programs: Vec<Option<ProgramRecord>>,
    // One slab for vertex, index and uniform buffers; slots are None until
    // the first update fills them (create allocates handles only).
    buffers: Vec<Option<wgpu::Buffer>>,
    frame: Vec<DrawCall>,
}

impl WgpuBackend {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            programs: Vec::new(),
            buffers: Vec::new(),
            frame: Vec::new(),
        }
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    /// Record the format pipelines must render into. Called once the
    /// surface exists, before any program is compiled.
    pub fn set_surface_format(&mut self, format: wgpu::TextureFormat) {
        self.surface_format = format;
    }

    fn alloc_buffer_slot(&mut self) -> BufferId {
        self.buffers.push(None);
        BufferId((self.buffers.len() - 1) as u32)
    }

    fn buffer(&self, id: u32) -> &wgpu::Buffer {
        self.buffers[id as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("buffer slot {id} used before first update"))
    }

    fn program(&self, id: ShaderProgramId) -> &ProgramRecord {
        self.programs[id.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("shader program {id:?} used after deletion"))
    }

    /// Replay the draws recorded this frame into one depth-tested render
    /// pass and submit it. Called by the render system once per frame after
    /// the draw pass has run.
    pub fn submit_frame(
        &mut self,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        clear_color: wgpu::Color,
    ) {
        let draws = std::mem::take(&mut self.frame);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &draws {
                let record = self.program(draw.program);
                rpass.set_pipeline(&record.pipeline);
                rpass.set_bind_group(0, &draw.bind_group, &[]);
                rpass.set_vertex_buffer(0, self.buffer(draw.vertex_buffer.0).slice(..));
                match draw.index_buffer {
                    Some(index_buffer) => {
                        rpass.set_index_buffer(
                            self.buffer(index_buffer.0).slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        rpass.draw_indexed(0..draw.draw_count, 0, 0..1);
                    }
                    None => rpass.draw(0..draw.draw_count, 0..1),
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
    }
}

impl RenderBackend for WgpuBackend {
    fn create_shader_program(&mut self, material_type: MaterialType) -> Result<ShaderProgramId> {
        let source = shader_source(material_type);
        let label = format!("{material_type:?}_program");

        // Validation errors (bad WGSL, pipeline mismatch) are collected via
        // an error scope so the diagnostic log can be attached. On the web
        // build the scope cannot be polled synchronously; failures surface
        // through the device's uncaptured-error handler instead.
        #[cfg(not(target_arch = "wasm32"))]
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(source.wgsl.into()),
            });

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = (0..source.blocks.len())
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot as u32,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&label),
                    entries: &layout_entries,
                });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&label),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let attributes =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: "vs_main",
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: Vertex::STRIDE,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: "fs_main",
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(EngineError::ShaderBuild {
                material_type,
                log: error.to_string(),
            });
        }

        self.programs.push(Some(ProgramRecord {
            material_type,
            pipeline,
            bind_group_layout,
            blocks: source.blocks,
        }));
        Ok(ShaderProgramId((self.programs.len() - 1) as u32))
    }

    fn create_vertex_object(&mut self, geometry: &Geometry) -> VertexObject {
        let vertex_buffer = self.alloc_buffer_slot();
        let index_buffer = geometry.indices().map(|_| self.alloc_buffer_slot());
        VertexObject {
            vertex_buffer,
            index_buffer,
            vertex_count: 0,
            index_count: 0,
        }
    }

    fn update_vertex_object(&mut self, vertex_object: &mut VertexObject, geometry: &Geometry) {
        // Buffers are re-specified on every update, so a vertex-count change
        // between frames needs no special casing.
        let vertex = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("vertex_buffer"),
                contents: geometry.vertex_bytes(),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        self.buffers[vertex_object.vertex_buffer.0 as usize] = Some(vertex);

        match geometry.index_bytes() {
            Some(bytes) => {
                let slot = match vertex_object.index_buffer {
                    Some(slot) => slot,
                    // A geometry that gained indices after creation.
                    None => self.alloc_buffer_slot(),
                };
                let index = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("index_buffer"),
                        contents: bytes,
                        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                    });
                self.buffers[slot.0 as usize] = Some(index);
                vertex_object.index_buffer = Some(slot);
            }
            None => {
                if let Some(slot) = vertex_object.index_buffer.take() {
                    self.buffers[slot.0 as usize] = None;
                }
            }
        }

        vertex_object.vertex_count = geometry.vertex_count();
        vertex_object.index_count = geometry.index_count();
    }

    fn create_uniform_buffer(&mut self) -> UniformBufferId {
        let slot = self.alloc_buffer_slot();
        UniformBufferId(slot.0)
    }

    fn update_uniform_buffer(&mut self, buffer: UniformBufferId, bytes: &[u8]) {
        let slot = buffer.0 as usize;
        match &self.buffers[slot] {
            // Same size: plain re-upload into the existing allocation.
            Some(existing) if existing.size() == bytes.len() as u64 => {
                self.queue.write_buffer(existing, 0, bytes);
            }
            _ => {
                let created = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("uniform_buffer"),
                        contents: bytes,
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    });
                self.buffers[slot] = Some(created);
            }
        }
    }

    fn delete_shader_program(&mut self, program: ShaderProgramId) {
        self.programs[program.0 as usize] = None;
    }

    fn delete_vertex_object(&mut self, vertex_object: &VertexObject) {
        self.buffers[vertex_object.vertex_buffer.0 as usize] = None;
        if let Some(index_buffer) = vertex_object.index_buffer {
            self.buffers[index_buffer.0 as usize] = None;
        }
    }

    fn delete_uniform_buffer(&mut self, buffer: UniformBufferId) {
        self.buffers[buffer.0 as usize] = None;
    }

    fn draw_triangles(
        &mut self,
        program: ShaderProgramId,
        vertex_object: &VertexObject,
        block_buffers: &HashMap<UniformBlockRole, UniformBufferId>,
    ) -> Result<()> {
        let bind_group = {
            let record = self.program(program);

            if block_buffers.len() != record.blocks.len() {
                return Err(EngineError::IncompleteBlockBindings {
                    material_type: record.material_type,
                    bound: block_buffers.len(),
                    declared: record.blocks.len(),
                });
            }

            // Resolve each role's block name to the binding slot the program
            // declares for it. Iteration order over the map is irrelevant:
            // the slot comes from the name lookup, not from the iteration.
            let mut entries = Vec::with_capacity(block_buffers.len());
            for (role, buffer) in block_buffers {
                let name = block_name(*role);
                let binding = record
                    .blocks
                    .iter()
                    .position(|declared| *declared == name)
                    .ok_or(EngineError::UnknownBlockName {
                        block: name,
                        material_type: record.material_type,
                    })? as u32;
                entries.push(wgpu::BindGroupEntry {
                    binding,
                    resource: self.buffer(buffer.0).as_entire_binding(),
                });
            }

            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("draw_bind_group"),
                layout: &record.bind_group_layout,
                entries: &entries,
            })
        };

        self.frame.push(DrawCall {
            program,
            vertex_buffer: vertex_object.vertex_buffer,
            index_buffer: vertex_object.index_buffer,
            draw_count: vertex_object.draw_count(),
            bind_group,
        });
        Ok(())
    }
}
