//! `wgpu` implementation of [`RenderBackend`].
//!
//! The backend walks the same phases the intro has always required, just with
//! checked results:
//! - `context` turns the window into a surface, picks an adapter and a surface
//!   format, and owns device/queue plus the uniform buffer.
//! - `pipeline` links the fragment payload with the built-in vertex stage and
//!   reports driver validation errors as compile failures.
//! - `uniforms` mirrors the prelude's `FrameParams` block.
//!
//! Every phase is stored as an `Option` that the next phase requires; calling
//! out of order yields [`RenderError::OutOfOrder`] instead of touching the GPU.

mod context;
mod pipeline;
pub(crate) mod uniforms;

use tracing::{debug, warn};

use crate::backend::{Capability, CapabilityTable, RenderBackend};
use crate::color::FrameColor;
use crate::error::RenderError;
use crate::surface::SurfaceHandle;
use crate::types::{ContextId, FormatDescriptor, FormatId, ProgramId, ShaderCompiler, ShaderStage};

use context::{is_transient, select_format, surface_configuration, GpuDevice, SurfaceTarget};
use pipeline::ProgramPipeline;
use uniforms::FrameUniforms;

/// GPU backend bound to one window for the life of the process.
pub struct WgpuBackend {
    compiler: ShaderCompiler,
    uniforms: FrameUniforms,
    frame: Option<wgpu::SurfaceTexture>,
    programs: Vec<ProgramPipeline>,
    active_program: Option<usize>,
    current: bool,
    gpu: Option<GpuDevice>,
    config: Option<wgpu::SurfaceConfiguration>,
    negotiated: Option<FormatId>,
    // Fields drop in order: the surface must go before the window backing it.
    target: Option<SurfaceTarget>,
    instance: wgpu::Instance,
    surface: SurfaceHandle,
}

impl WgpuBackend {
    pub fn new(surface: SurfaceHandle, compiler: ShaderCompiler) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });
        let size = surface.size();
        Self {
            compiler,
            uniforms: FrameUniforms::new(size.width.max(1), size.height.max(1)),
            frame: None,
            programs: Vec::new(),
            active_program: None,
            current: false,
            gpu: None,
            config: None,
            negotiated: None,
            target: None,
            instance,
            surface,
        }
    }

    fn current_gpu(&self, operation: &'static str) -> Result<&GpuDevice, RenderError> {
        if !self.current {
            return Err(RenderError::out_of_order(operation, "activate"));
        }
        self.gpu
            .as_ref()
            .ok_or(RenderError::out_of_order(operation, "create_context"))
    }

    /// Acquires the next swapchain texture, retrying once after a transient
    /// failure. Stale surfaces are reconfigured before the retry.
    fn acquire_frame(&self) -> Result<wgpu::SurfaceTexture, RenderError> {
        let (Some(target), Some(gpu), Some(config)) =
            (self.target.as_ref(), self.gpu.as_ref(), self.config.as_ref())
        else {
            return Err(RenderError::out_of_order("draw_fullscreen_rect", "activate"));
        };
        match target.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(err) if is_transient(&err) => {
                if matches!(err, wgpu::SurfaceError::Timeout) {
                    warn!("surface timeout; retrying frame acquisition");
                } else {
                    warn!("surface lost or outdated; reconfiguring");
                    target.surface.configure(&gpu.device, config);
                }
                target
                    .surface
                    .get_current_texture()
                    .map_err(|err| RenderError::Present(err.to_string()))
            }
            Err(err) => Err(RenderError::Present(err.to_string())),
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn negotiate_format(&mut self, descriptor: &FormatDescriptor) -> Result<FormatId, RenderError> {
        let target = SurfaceTarget::new(&self.instance, self.surface.window(), descriptor)?;
        let format = select_format(&target.caps.formats, descriptor).ok_or_else(|| {
            RenderError::ContextAcquisition(format!(
                "no surface format satisfies flags {:#x} (advertised: {:?})",
                descriptor.flags.bits(),
                target.caps.formats
            ))
        })?;
        self.target = Some(target);
        self.negotiated = Some(format);
        Ok(format)
    }

    fn bind_format(
        &mut self,
        format: FormatId,
        descriptor: &FormatDescriptor,
    ) -> Result<(), RenderError> {
        let target = self
            .target
            .as_ref()
            .ok_or(RenderError::out_of_order("bind_format", "negotiate_format"))?;
        if self.negotiated != Some(format) {
            return Err(RenderError::ContextAcquisition(format!(
                "format {} was not produced by negotiation",
                format.0
            )));
        }
        let config = surface_configuration(&target.caps, format, descriptor, self.surface.size())?;
        self.uniforms.set_surface(config.width, config.height);
        self.config = Some(config);
        Ok(())
    }

    fn create_context(&mut self) -> Result<ContextId, RenderError> {
        if self.gpu.is_some() {
            return Err(RenderError::ContextAcquisition(
                "a rendering context already exists".into(),
            ));
        }
        let target = self
            .target
            .as_ref()
            .ok_or(RenderError::out_of_order("create_context", "negotiate_format"))?;
        self.gpu = Some(GpuDevice::new(&target.adapter, &self.uniforms)?);
        Ok(ContextId(1))
    }

    fn activate(&mut self, context: ContextId) -> Result<(), RenderError> {
        if self.current {
            return Err(RenderError::ContextAcquisition(
                "rendering context is already current".into(),
            ));
        }
        let gpu = self
            .gpu
            .as_ref()
            .filter(|_| context == ContextId(1))
            .ok_or(RenderError::out_of_order("activate", "create_context"))?;
        let config = self
            .config
            .as_ref()
            .ok_or(RenderError::out_of_order("activate", "bind_format"))?;
        let target = self
            .target
            .as_ref()
            .ok_or(RenderError::out_of_order("activate", "negotiate_format"))?;
        target.surface.configure(&gpu.device, config);
        self.current = true;
        debug!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "surface configured"
        );
        Ok(())
    }

    fn capabilities(&self) -> CapabilityTable {
        let mut entries = vec![Capability::UseProgram];
        if self.compiler.available() {
            entries.push(Capability::CreateProgramFromSource);
        }
        CapabilityTable::new(entries)
    }

    fn create_program(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ProgramId, RenderError> {
        if stage != ShaderStage::FRAGMENT {
            return Err(RenderError::ShaderCompile(format!(
                "unsupported shader stage {:#x}",
                stage.0
            )));
        }
        let gpu = self.current_gpu("create_program")?;
        let format = self
            .config
            .as_ref()
            .map(|config| config.format)
            .ok_or(RenderError::out_of_order("create_program", "bind_format"))?;
        let program = ProgramPipeline::new(gpu, format, source, self.compiler)?;
        self.programs.push(program);
        ProgramId::new(self.programs.len() as u32)
            .ok_or_else(|| RenderError::ShaderCompile("program table overflow".into()))
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), RenderError> {
        let index = program.get() as usize - 1;
        if index >= self.programs.len() {
            return Err(RenderError::ShaderCompile(format!(
                "unknown program {}",
                program.get()
            )));
        }
        self.active_program = Some(index);
        Ok(())
    }

    fn set_color(&mut self, color: FrameColor) {
        self.uniforms.set_color(color);
    }

    fn draw_fullscreen_rect(&mut self) -> Result<(), RenderError> {
        let index = self.active_program.ok_or(RenderError::out_of_order(
            "draw_fullscreen_rect",
            "use_program",
        ))?;
        self.current_gpu("draw_fullscreen_rect")?
            .write_uniforms(&self.uniforms);
        let frame = self.acquire_frame()?;
        let gpu = self.current_gpu("draw_fullscreen_rect")?;

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fullscreen rect"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.programs[index].pipeline);
            render_pass.set_bind_group(0, &gpu.uniform_bind_group, &[]);
            render_pass.draw(0..4, 0..1);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));

        self.frame = Some(frame);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let frame = self
            .frame
            .take()
            .ok_or(RenderError::out_of_order("present", "draw_fullscreen_rect"))?;
        frame.present();
        Ok(())
    }
}
