use std::sync::Arc;

use tracing::{info, warn};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::EventLoopWindowTarget;
use winit::window::{Fullscreen, Window, WindowBuilder, WindowId};

use crate::error::RenderError;

/// Source of the drawable target for the current display.
pub trait SurfaceProvider {
    type Handle;

    /// Reserves a drawable for the rest of the process.
    fn acquire(&mut self) -> Result<Self::Handle, RenderError>;
}

/// Drawable window handed to the GPU backend.
///
/// Clones share the same window; the backend keeps one so the window outlives
/// the surface created from it.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    window: Arc<Window>,
}

impl SurfaceHandle {
    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }

    /// Parks the pointer at `origin`. Platforms that refuse warping only log.
    pub fn reset_cursor(&self, origin: (i32, i32)) {
        let position = PhysicalPosition::new(origin.0, origin.1);
        match self.window.set_cursor_position(position) {
            Ok(()) => tracing::debug!(x = origin.0, y = origin.1, "cursor reset"),
            Err(err) => warn!("cursor reset refused by the platform: {err}"),
        }
    }
}

/// Opens one borderless fullscreen window on the current monitor.
pub struct DisplaySurfaceProvider<'a> {
    target: &'a EventLoopWindowTarget<()>,
    title: &'a str,
}

impl<'a> DisplaySurfaceProvider<'a> {
    pub fn new(target: &'a EventLoopWindowTarget<()>, title: &'a str) -> Self {
        Self { target, title }
    }
}

impl SurfaceProvider for DisplaySurfaceProvider<'_> {
    type Handle = SurfaceHandle;

    fn acquire(&mut self) -> Result<SurfaceHandle, RenderError> {
        let window = WindowBuilder::new()
            .with_title(self.title)
            .with_decorations(false)
            .with_resizable(false)
            .with_fullscreen(Some(Fullscreen::Borderless(None)))
            .build(self.target)
            .map_err(|err| {
                RenderError::ContextAcquisition(format!("failed to create window: {err}"))
            })?;
        let size = window.inner_size();
        info!(width = size.width, height = size.height, "surface acquired");
        Ok(SurfaceHandle {
            window: Arc::new(window),
        })
    }
}
