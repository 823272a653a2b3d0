//! Uploads a [`VertexBatch`] and draws it with depth testing.
//!
//! The renderer owns two pipelines over one shader: a triangle-list pipeline
//! with back-face culling and a line-list pipeline for pixel lines. Vertex
//! and index buffers grow to fit the largest batch seen so far and are
//! reused between frames.
//!
//! With a sample count above 1 the pass draws into a multisampled color
//! target and resolves it into the surface texture. The depth buffer always
//! matches the color target's sample count.
//!
//! # Bind groups
//!
//! - **Group 0**: [`SceneUniforms`] (view-projection, lights, camera position)

use glam::Mat4;

use crate::batch::{Topology, VertexBatch};
use crate::color::Color;
use crate::gpu::GpuContext;
use crate::lighting::{Lighting, LightingUniforms};
use crate::mesh::Vertex3d;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_VERTEX_CAPACITY: u64 = 16 * 1024;
const INITIAL_INDEX_CAPACITY: u64 = 32 * 1024;

/// MSAA sample counts the renderer accepts, in cycling order.
pub const SAMPLE_COUNTS: [u32; 4] = [1, 2, 4, 8];

/// Returns `requested` if `supported` accepts it, else 1.
pub fn effective_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    if requested > 1 && SAMPLE_COUNTS.contains(&requested) && supported(requested) {
        requested
    } else {
        1
    }
}

/// Per-frame uniforms shared by both pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// Combined view-projection matrix for lit and unlit vertices.
    pub view_proj: [[f32; 4]; 4],
    pub lighting: LightingUniforms,
}

impl SceneUniforms {
    pub fn new(view_proj: Mat4, lighting: &Lighting) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            lighting: lighting.to_uniforms(),
        }
    }
}

/// Draws a frame's [`VertexBatch`] to the window surface.
pub struct BatchRenderer {
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    sample_count: u32,
    triangle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    /// Capacity of `vertex_buffer` in vertices.
    vertex_capacity: u64,
    index_buffer: wgpu::Buffer,
    /// Capacity of `index_buffer` in indices.
    index_capacity: u64,
    depth_view: wgpu::TextureView,
    /// Multisampled color target, absent when `sample_count` is 1.
    msaa_view: Option<wgpu::TextureView>,
    target_size: (u32, u32),
    /// Background color.
    pub clear_color: Color,
}

impl BatchRenderer {
    /// Creates the renderer with `sample_count` samples, lowered to 1 if the
    /// surface or depth format cannot use it.
    pub fn new(gpu: &GpuContext, sample_count: u32) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Robot Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/robot.wgsl").into()),
        });

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Robot Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let sample_count = Self::supported_sample_count(gpu, sample_count);
        let (triangle_pipeline, line_pipeline) =
            Self::create_pipelines(gpu, &pipeline_layout, &shader, sample_count);

        let vertex_buffer = Self::create_vertex_buffer(gpu, INITIAL_VERTEX_CAPACITY);
        let index_buffer = Self::create_index_buffer(gpu, INITIAL_INDEX_CAPACITY);
        let depth_view = Self::create_depth_view(gpu, sample_count);
        let msaa_view = Self::create_msaa_view(gpu, sample_count);

        Self {
            shader,
            pipeline_layout,
            sample_count,
            triangle_pipeline,
            line_pipeline,
            scene_buffer,
            scene_bind_group,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            index_buffer,
            index_capacity: INITIAL_INDEX_CAPACITY,
            depth_view,
            msaa_view,
            target_size: (gpu.width(), gpu.height()),
            clear_color: Color::from_rgb8(45, 45, 60),
        }
    }

    fn supported_sample_count(gpu: &GpuContext, requested: u32) -> u32 {
        let count = effective_sample_count(requested, |count| {
            gpu.supports_sample_count(gpu.config.format, count)
                && gpu.supports_sample_count(DEPTH_FORMAT, count)
        });
        if count != requested {
            log::warn!("MSAA x{requested} is not supported here, falling back to x{count}");
        }
        count
    }

    /// The sample count in use.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Rebuilds pipelines and render targets for a new sample count.
    /// Returns the count actually applied.
    pub fn set_sample_count(&mut self, gpu: &GpuContext, requested: u32) -> u32 {
        let sample_count = Self::supported_sample_count(gpu, requested);
        if sample_count != self.sample_count {
            let (triangle_pipeline, line_pipeline) =
                Self::create_pipelines(gpu, &self.pipeline_layout, &self.shader, sample_count);
            self.triangle_pipeline = triangle_pipeline;
            self.line_pipeline = line_pipeline;
            self.sample_count = sample_count;
            self.depth_view = Self::create_depth_view(gpu, sample_count);
            self.msaa_view = Self::create_msaa_view(gpu, sample_count);
            self.target_size = (gpu.width(), gpu.height());
            log::info!("MSAA sample count set to {sample_count}");
        }
        sample_count
    }

    fn create_pipelines(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        sample_count: u32,
    ) -> (wgpu::RenderPipeline, wgpu::RenderPipeline) {
        let triangles = Self::create_pipeline(
            gpu,
            layout,
            shader,
            "Robot Triangle Pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            sample_count,
        );
        let lines = Self::create_pipeline(
            gpu,
            layout,
            shader,
            "Robot Line Pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            sample_count,
        );
        (triangles, lines)
    }

    fn create_pipeline(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        label: &str,
        primitive: wgpu::PrimitiveState,
        sample_count: u32,
    ) -> wgpu::RenderPipeline {
        gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive,
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_vertex_buffer(gpu: &GpuContext, capacity: u64) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Batch Vertex Buffer"),
            size: capacity * std::mem::size_of::<Vertex3d>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_index_buffer(gpu: &GpuContext, capacity: u64) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Batch Index Buffer"),
            size: capacity * std::mem::size_of::<u32>() as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_target(
        gpu: &GpuContext,
        label: &str,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_depth_view(gpu: &GpuContext, sample_count: u32) -> wgpu::TextureView {
        Self::create_target(gpu, "Depth Texture", DEPTH_FORMAT, sample_count)
    }

    fn create_msaa_view(gpu: &GpuContext, sample_count: u32) -> Option<wgpu::TextureView> {
        (sample_count > 1)
            .then(|| Self::create_target(gpu, "MSAA Color Texture", gpu.config.format, sample_count))
    }

    /// Recreates the depth and MSAA targets if the surface size changed.
    pub fn ensure_target_size(&mut self, gpu: &GpuContext) {
        if self.target_size != (gpu.width(), gpu.height()) {
            self.depth_view = Self::create_depth_view(gpu, self.sample_count);
            self.msaa_view = Self::create_msaa_view(gpu, self.sample_count);
            self.target_size = (gpu.width(), gpu.height());
        }
    }

    /// Copies the batch into the GPU buffers, growing them if needed.
    pub fn upload(&mut self, gpu: &GpuContext, batch: &VertexBatch) {
        let vertex_count = batch.vertices().len() as u64;
        if vertex_count > self.vertex_capacity {
            let capacity = vertex_count.next_power_of_two();
            log::debug!("growing vertex buffer to {capacity} vertices");
            self.vertex_buffer = Self::create_vertex_buffer(gpu, capacity);
            self.vertex_capacity = capacity;
        }

        let index_count = batch.indices().len() as u64;
        if index_count > self.index_capacity {
            let capacity = index_count.next_power_of_two();
            log::debug!("growing index buffer to {capacity} indices");
            self.index_buffer = Self::create_index_buffer(gpu, capacity);
            self.index_capacity = capacity;
        }

        if !batch.is_empty() {
            gpu.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(batch.vertices()));
            gpu.queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(batch.indices()));
        }
    }

    /// Uploads and draws one frame.
    ///
    /// Returns the surface error if no frame could be acquired; the caller
    /// decides whether to reconfigure, skip or quit.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        batch: &VertexBatch,
        view_proj: Mat4,
        lighting: &Lighting,
    ) -> Result<(), wgpu::SurfaceError> {
        self.ensure_target_size(gpu);
        self.upload(gpu, batch);

        let uniforms = SceneUniforms::new(view_proj, lighting);
        gpu.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Multisampled passes resolve into the surface; the samples themselves are not kept.
        let (color_view, resolve_target, color_store) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&view), wgpu::StoreOp::Discard),
            None => (&view, None, wgpu::StoreOp::Store),
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Robot Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Robot Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.into()),
                        store: color_store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !batch.is_empty() {
                pass.set_bind_group(0, &self.scene_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                for (topology, range) in batch.draw_runs() {
                    let pipeline = match topology {
                        Topology::Triangles => &self.triangle_pipeline,
                        Topology::Lines => &self.line_pipeline,
                    };
                    pass.set_pipeline(pipeline);
                    pass.draw_indexed(range, 0, 0..1);
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::Light;

    #[test]
    fn sample_count_falls_back_to_one() {
        assert_eq!(effective_sample_count(4, |_| true), 4);
        assert_eq!(effective_sample_count(8, |count| count <= 4), 1);
        assert_eq!(effective_sample_count(3, |_| true), 1);
        assert_eq!(effective_sample_count(1, |_| false), 1);
    }

    #[test]
    fn scene_uniforms_carry_combined_view_projection() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 64 + std::mem::size_of::<LightingUniforms>());

        let projection = Mat4::perspective_rh(1.0, 1.5, 0.1, 10.0);
        let view = Mat4::look_at_rh(glam::Vec3::new(1.0, 2.0, 3.0), glam::Vec3::ZERO, glam::Vec3::Z);
        let mut lighting = Lighting::new();
        lighting.add(Light::default());

        let uniforms = SceneUniforms::new(projection * view, &lighting);
        assert_eq!(uniforms.view_proj, (projection * view).to_cols_array_2d());
        assert_eq!(uniforms.lighting, lighting.to_uniforms());
    }
}
