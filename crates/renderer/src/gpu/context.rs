use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::error::RenderError;
use crate::types::{FormatDescriptor, FormatFlags, FormatId};

use super::uniforms::FrameUniforms;

/// Surface plus the adapter chosen to drive it.
pub(crate) struct SurfaceTarget {
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
    pub caps: wgpu::SurfaceCapabilities,
}

impl SurfaceTarget {
    /// Creates the surface for `target` and finds an adapter that can present to it.
    ///
    /// The caller must keep `target` alive for as long as the returned surface.
    pub(crate) fn new<T>(
        instance: &wgpu::Instance,
        target: &T,
        descriptor: &FormatDescriptor,
    ) -> Result<Self, RenderError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let window_handle = target.window_handle().map_err(|err| {
            RenderError::ContextAcquisition(format!("failed to acquire window handle: {err}"))
        })?;
        let display_handle = target.display_handle().map_err(|err| {
            RenderError::ContextAcquisition(format!("failed to acquire display handle: {err}"))
        })?;

        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(|err| {
            RenderError::ContextAcquisition(format!("failed to create rendering surface: {err}"))
        })?;

        let accelerated = descriptor
            .flags
            .contains(FormatFlags::SUPPORT_ACCELERATION);
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: !accelerated,
        }))
        .map_err(|err| {
            RenderError::ContextAcquisition(format!("failed to find a suitable GPU adapter: {err}"))
        })?;

        let info = adapter.get_info();
        tracing::debug!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let caps = surface.get_capabilities(&adapter);
        Ok(Self {
            surface,
            adapter,
            caps,
        })
    }
}

/// Index of the surface format that best matches `descriptor`.
///
/// Non-sRGB 8-bit formats come first so shader output reaches the screen
/// without a transfer-function conversion.
pub(crate) fn select_format(
    formats: &[wgpu::TextureFormat],
    descriptor: &FormatDescriptor,
) -> Option<FormatId> {
    if !descriptor.draws_to_window() {
        return None;
    }
    let preferred = [
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Rgba8Unorm,
    ];
    let index = preferred
        .iter()
        .find_map(|wanted| formats.iter().position(|format| format == wanted))
        .or_else(|| formats.iter().position(|format| !format.is_srgb()))
        .or_else(|| (!formats.is_empty()).then_some(0))?;
    Some(FormatId(index as u32))
}

/// Double buffering maps to FIFO presentation; otherwise the fastest mode on offer.
pub(crate) fn select_present_mode(
    modes: &[wgpu::PresentMode],
    descriptor: &FormatDescriptor,
) -> wgpu::PresentMode {
    if descriptor.double_buffered() {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| modes.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

/// Acquisition failures worth one more attempt before the frame is abandoned.
pub(crate) fn is_transient(err: &wgpu::SurfaceError) -> bool {
    matches!(
        err,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated
    )
}

/// Builds the configuration committed by `bind_format`.
pub(crate) fn surface_configuration(
    caps: &wgpu::SurfaceCapabilities,
    format: FormatId,
    descriptor: &FormatDescriptor,
    size: PhysicalSize<u32>,
) -> Result<wgpu::SurfaceConfiguration, RenderError> {
    let texture_format = caps
        .formats
        .get(format.0 as usize)
        .copied()
        .ok_or_else(|| {
            RenderError::ContextAcquisition(format!("surface format {} is not advertised", format.0))
        })?;
    if !caps.usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
        return Err(RenderError::ContextAcquisition(
            "surface cannot be used as a render attachment".into(),
        ));
    }
    let present_mode = select_present_mode(&caps.present_modes, descriptor);
    tracing::debug!(?texture_format, ?present_mode, "binding surface format");

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: texture_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode: caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}

/// Device, queue, and the uniform resources every draw binds.
pub(crate) struct GpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
}

impl GpuDevice {
    pub(crate) fn new(
        adapter: &wgpu::Adapter,
        uniforms: &FrameUniforms,
    ) -> Result<Self, RenderError> {
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("raytunnel device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| {
            RenderError::ContextAcquisition(format!("failed to create GPU device: {err}"))
        })?;

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame uniforms"),
            contents: bytemuck::bytes_of(uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            device,
            queue,
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
        })
    }

    pub(crate) fn write_uniforms(&self, uniforms: &FrameUniforms) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }
}
