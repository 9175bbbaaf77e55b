use tracing::{debug, info};

use crate::backend::RenderBackend;
use crate::error::RenderError;
use crate::types::{ContextId, FormatDescriptor, FormatId};

/// The single rendering context bound to the intro's surface.
///
/// Holding a `GraphicsContext` proves the four acquisition steps ran in order
/// and that the context is current. Shader and draw calls take it by
/// reference so they cannot be issued earlier.
#[derive(Debug)]
pub struct GraphicsContext {
    format: FormatId,
    context: ContextId,
}

impl GraphicsContext {
    /// Negotiates and binds a surface format, then creates and activates the
    /// rendering context. Stops at the first failing step.
    pub fn establish<B: RenderBackend>(
        backend: &mut B,
        descriptor: &FormatDescriptor,
    ) -> Result<Self, RenderError> {
        let format = backend.negotiate_format(descriptor)?;
        debug!(?format, flags = descriptor.flags.bits(), "negotiated surface format");

        backend.bind_format(format, descriptor)?;

        let context = backend.create_context()?;
        backend.activate(context)?;
        info!(?context, "rendering context is current");

        Ok(Self { format, context })
    }

    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn context(&self) -> ContextId {
        self.context
    }
}
