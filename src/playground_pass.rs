//! The full-screen playground pass.
//!
//! [`PlaygroundPass`] pairs the vertex generator with a user fragment shader and
//! draws them as a single triangle covering the whole target. Nothing is bound
//! besides the [`PushConstant`] record: no vertex buffer, no index buffer.
//!
//! # Shader Requirements
//!
//! The vertex shader defines `vs_main` and the fragment shader `fs_main`. Both
//! are compiled with the prelude from [`shader::compose`](crate::shader::compose),
//! so they can read the record through `pc`:
//!
//! ```wgsl
//! @fragment
//! fn fs_main(@location(0) uv: vec2f) -> @location(0) vec4f {
//!     return vec4f(0.5 + 0.5 * sin(uv.x * 10.0 + pc.time), uv.y, 0.5, 1.0);
//! }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use trigon::{GpuContext, PlaygroundPass, PushConstant, VERTEX_SHADER_WGSL};
//!
//! let pass = PlaygroundPass::new(&gpu, VERTEX_SHADER_WGSL, include_str!("plasma.wgsl"))?;
//! pass.render(&gpu, &mut render_pass, &PushConstant::new(gpu.resolution()));
//! ```

use crate::gpu::GpuContext;
use crate::push_constant::{PUSH_CONSTANT_SIZE, PushConstant};
use crate::shader::{BindingMode, FRAGMENT_ENTRY_POINT, ShaderError, compose};
use crate::vertex::{FULLSCREEN_VERTEX_COUNT, VERTEX_ENTRY_POINT};

const RECORD_STAGES: wgpu::ShaderStages =
    wgpu::ShaderStages::VERTEX.union(wgpu::ShaderStages::FRAGMENT);

/// Uniform-mode resources; absent when the record travels as push constants.
struct UniformBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// A compiled vertex + fragment pipeline drawing the full-screen triangle.
pub struct PlaygroundPass {
    pipeline: wgpu::RenderPipeline,
    uniform: Option<UniformBinding>,
}

impl PlaygroundPass {
    /// Compile a pass that renders to the window surface.
    pub fn new(
        gpu: &GpuContext,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        Self::with_format(gpu, vertex_source, fragment_source, gpu.config.format)
    }

    /// Compile a pass for an arbitrary color target format.
    ///
    /// Shader and pipeline creation run inside a validation error scope, so a
    /// broken shader surfaces as [`ShaderError::Validation`] rather than through
    /// the device's uncaptured error handler.
    pub fn with_format(
        gpu: &GpuContext,
        vertex_source: &str,
        fragment_source: &str,
        format: wgpu::TextureFormat,
    ) -> Result<Self, ShaderError> {
        let device = &gpu.device;
        let mode = gpu.binding_mode;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Playground Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(compose(mode, vertex_source).into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Playground Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(compose(mode, fragment_source).into()),
        });

        let (uniform, bind_group_layout) = match mode {
            BindingMode::PushConstant => (None, None),
            BindingMode::Uniform => {
                let (binding, layout) = Self::create_uniform_binding(device);
                (Some(binding), Some(layout))
            }
        };

        let record_range = [wgpu::PushConstantRange {
            stages: RECORD_STAGES,
            range: 0..PUSH_CONSTANT_SIZE,
        }];
        let push_constant_ranges: &[wgpu::PushConstantRange] = match mode {
            BindingMode::PushConstant => &record_range,
            BindingMode::Uniform => &[],
        };

        let bind_group_layouts: Vec<&wgpu::BindGroupLayout> =
            bind_group_layout.iter().collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Playground Pipeline Layout"),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Playground Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(VERTEX_ENTRY_POINT),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(FRAGMENT_ENTRY_POINT),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Validation(err.to_string()));
        }

        Ok(Self { pipeline, uniform })
    }

    fn create_uniform_binding(device: &wgpu::Device) -> (UniformBinding, wgpu::BindGroupLayout) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Playground Uniforms"),
            size: PUSH_CONSTANT_SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Playground Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: RECORD_STAGES,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Playground Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        (UniformBinding { buffer, bind_group }, layout)
    }

    /// Upload the record and draw the full-screen triangle.
    pub fn render(&self, gpu: &GpuContext, render_pass: &mut wgpu::RenderPass, pc: &PushConstant) {
        render_pass.set_pipeline(&self.pipeline);

        match &self.uniform {
            Some(uniform) => {
                gpu.queue.write_buffer(&uniform.buffer, 0, pc.as_bytes());
                render_pass.set_bind_group(0, &uniform.bind_group, &[]);
            }
            None => render_pass.set_push_constants(RECORD_STAGES, 0, pc.as_bytes()),
        }

        render_pass.draw(0..FULLSCREEN_VERTEX_COUNT, 0..1);
    }
}
