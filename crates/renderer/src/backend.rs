//! The seam between the intro's sequencing logic and the graphics driver.
//!
//! [`GraphicsContext`](crate::GraphicsContext),
//! [`ShaderPipeline`](crate::ShaderPipeline) and
//! [`RenderLoop`](crate::RenderLoop) only ever talk to a [`RenderBackend`].
//! The production implementation lives in `gpu`; tests substitute a recorder.

use crate::color::FrameColor;
use crate::error::RenderError;
use crate::types::{ContextId, FormatDescriptor, FormatId, ProgramId, ShaderStage};

/// Optional entry points a backend may or may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Compile and link a single-stage program from source text.
    CreateProgramFromSource,
    /// Make a linked program the active one for subsequent draws.
    UseProgram,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::CreateProgramFromSource, Capability::UseProgram];

    /// Name the capability is looked up by.
    pub fn name(self) -> &'static str {
        match self {
            Capability::CreateProgramFromSource => "create_program_from_source",
            Capability::UseProgram => "use_program",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.name() == name)
    }
}

/// Set of capabilities a backend advertises.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    entries: Vec<Capability>,
}

impl CapabilityTable {
    pub fn new(entries: impl IntoIterator<Item = Capability>) -> Self {
        let mut table = Self::default();
        for capability in entries {
            if !table.entries.contains(&capability) {
                table.entries.push(capability);
            }
        }
        table
    }

    /// Resolves a capability by name, if the backend provides it.
    pub fn lookup(&self, name: &str) -> Option<Capability> {
        Capability::from_name(name).filter(|capability| self.entries.contains(capability))
    }

    /// Resolves a capability by name or fails with `MissingCapability`.
    pub fn require(&self, name: &str) -> Result<Capability, RenderError> {
        self.lookup(name)
            .ok_or_else(|| RenderError::MissingCapability(name.to_string()))
    }
}

/// Blocking operations the intro issues against the graphics driver.
///
/// Every call returns a checked result. Implementations may assume callers
/// respect the documented order but must report violations with
/// [`RenderError::OutOfOrder`] rather than misbehave.
pub trait RenderBackend {
    /// Picks a surface format satisfying `descriptor`.
    fn negotiate_format(&mut self, descriptor: &FormatDescriptor) -> Result<FormatId, RenderError>;

    /// Commits the negotiated format to the surface. Requires `negotiate_format`.
    fn bind_format(
        &mut self,
        format: FormatId,
        descriptor: &FormatDescriptor,
    ) -> Result<(), RenderError>;

    /// Creates the rendering context for the surface.
    fn create_context(&mut self) -> Result<ContextId, RenderError>;

    /// Makes `context` current. Requires `bind_format` and `create_context`.
    fn activate(&mut self, context: ContextId) -> Result<(), RenderError>;

    /// Capabilities this backend can serve.
    fn capabilities(&self) -> CapabilityTable;

    /// Compiles and links a program from a single stage of source text.
    fn create_program(&mut self, stage: ShaderStage, source: &str)
        -> Result<ProgramId, RenderError>;

    /// Makes `program` the active program for every later draw.
    fn use_program(&mut self, program: ProgramId) -> Result<(), RenderError>;

    /// Sets the color state read by the next draw.
    fn set_color(&mut self, color: FrameColor);

    /// Draws a rectangle over the full normalized device range.
    fn draw_fullscreen_rect(&mut self) -> Result<(), RenderError>;

    /// Presents the frame that the last draw rendered.
    fn present(&mut self) -> Result<(), RenderError>;
}

impl<B: RenderBackend + ?Sized> RenderBackend for &mut B {
    fn negotiate_format(&mut self, descriptor: &FormatDescriptor) -> Result<FormatId, RenderError> {
        (**self).negotiate_format(descriptor)
    }

    fn bind_format(
        &mut self,
        format: FormatId,
        descriptor: &FormatDescriptor,
    ) -> Result<(), RenderError> {
        (**self).bind_format(format, descriptor)
    }

    fn create_context(&mut self) -> Result<ContextId, RenderError> {
        (**self).create_context()
    }

    fn activate(&mut self, context: ContextId) -> Result<(), RenderError> {
        (**self).activate(context)
    }

    fn capabilities(&self) -> CapabilityTable {
        (**self).capabilities()
    }

    fn create_program(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ProgramId, RenderError> {
        (**self).create_program(stage, source)
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), RenderError> {
        (**self).use_program(program)
    }

    fn set_color(&mut self, color: FrameColor) {
        (**self).set_color(color)
    }

    fn draw_fullscreen_rect(&mut self) -> Result<(), RenderError> {
        (**self).draw_fullscreen_rect()
    }

    fn present(&mut self) -> Result<(), RenderError> {
        (**self).present()
    }
}
