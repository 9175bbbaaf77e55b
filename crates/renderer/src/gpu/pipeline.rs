use crate::compile::{compile_fragment_shader, compile_vertex_shader};
use crate::error::RenderError;
use crate::types::ShaderCompiler;

use super::context::GpuDevice;

/// A linked program: the built-in vertex stage plus one fragment payload.
pub(crate) struct ProgramPipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl ProgramPipeline {
    /// Compiles `fragment_source` and links it into a render pipeline.
    ///
    /// Validation errors raised while the modules and pipeline are created are
    /// collected through an error scope and reported as compile failures.
    pub(crate) fn new(
        gpu: &GpuDevice,
        surface_format: wgpu::TextureFormat,
        fragment_source: &str,
        compiler: ShaderCompiler,
    ) -> Result<Self, RenderError> {
        let device = &gpu.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let built = Self::build(gpu, surface_format, fragment_source, compiler);
        let scope_error = pollster::block_on(device.pop_error_scope());

        let pipeline = built?;
        if let Some(err) = scope_error {
            return Err(RenderError::ShaderCompile(err.to_string()));
        }
        Ok(Self { pipeline })
    }

    fn build(
        gpu: &GpuDevice,
        surface_format: wgpu::TextureFormat,
        fragment_source: &str,
        compiler: ShaderCompiler,
    ) -> Result<wgpu::RenderPipeline, RenderError> {
        let device = &gpu.device;
        let vertex_module = compile_vertex_shader(device, compiler)?;
        let fragment_module = compile_fragment_shader(device, fragment_source, compiler)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("raytunnel pipeline layout"),
            bind_group_layouts: &[&gpu.uniform_layout],
            push_constant_ranges: &[],
        });

        Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("raytunnel pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        }))
    }
}
