//! Renderer crate for raytunnel, a one-shader fullscreen intro.
//!
//! The crate acquires a fullscreen surface, binds a GPU context to it, links
//! one embedded fragment program, and redraws a full-screen rectangle until
//! the run times out or the exit key is pressed. The overall flow is:
//!
//! ```text
//!   raytunnel (bin)
//!          │ DemoConfig
//!          ▼
//!   Renderer::run ──▶ SurfaceProvider ──▶ GraphicsContext ──▶ ShaderPipeline
//!                                                                   │
//!          process exit ◀── TerminationController ◀── RenderLoop ◀──┘
//! ```
//!
//! Every graphics call goes through the [`RenderBackend`] trait. The `wgpu`
//! backend in `gpu` is what the binary uses; tests drive the same
//! components against in-memory backends, so the acquisition order, the
//! per-frame color and the exit predicates can be checked without a display.

mod backend;
mod color;
mod compile;
mod error;
mod gpu;
mod graphics;
mod input;
mod program;
mod render_loop;
mod runtime;
mod shader;
mod surface;
mod termination;
#[cfg(test)]
mod testing;
mod types;
mod window;

use anyhow::Result;

pub use backend::{Capability, CapabilityTable, RenderBackend};
pub use color::FrameColor;
pub use error::RenderError;
pub use gpu::WgpuBackend;
pub use graphics::GraphicsContext;
pub use input::{virtual_key_code, InputSnapshot, KeyboardState};
pub use program::ShaderPipeline;
pub use render_loop::RenderLoop;
pub use runtime::{Clock, ElapsedTime, ManualClock, SystemClock};
pub use shader::FRAGMENT_SOURCE;
pub use surface::{DisplaySurfaceProvider, SurfaceHandle, SurfaceProvider};
pub use termination::{ExitReason, LoopState, TerminationController};
pub use types::{
    ContextId, DemoConfig, FormatDescriptor, FormatFlags, FormatId, KeyCode, ProgramId,
    ShaderCompiler, ShaderStage, DEFAULT_RUNTIME_SECONDS, SHADER_VIEWPORT,
    TIMEOUT_MILLIS_PER_SECOND,
};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: DemoConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Opens the fullscreen window and blocks until the intro ends.
    ///
    /// Returns `Ok` after a timeout or exit-key termination. Any acquisition,
    /// compile or presentation failure is returned as an error; there is no
    /// degraded mode.
    pub fn run(&self) -> Result<()> {
        window::run_fullscreen(&self.config)
    }
}
