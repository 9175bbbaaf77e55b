use tracing::{info, trace};

use crate::backend::RenderBackend;
use crate::color::FrameColor;
use crate::error::RenderError;
use crate::input::InputSnapshot;
use crate::program::ShaderPipeline;
use crate::runtime::{Clock, ElapsedTime};
use crate::termination::{ExitReason, LoopState, TerminationController};
use crate::types::DemoConfig;

/// The timed poll/draw/present cycle.
///
/// Each [`RenderLoop::step`] is one iteration:
///
/// ```text
///   elapsed ─▶ timed out? ──yes──▶ Exiting(Timeout)      (no draw)
///                  │ no
///                  ▼
///   set color ─▶ draw rect ─▶ present ─▶ exit key? ──yes──▶ Exiting(ExitKey)
///                                            │ no
///                                            ▼
///                                         Running
/// ```
pub struct RenderLoop<C: Clock> {
    clock: C,
    start_millis: u64,
    runtime_seconds: u32,
    controller: TerminationController,
    state: LoopState,
    frames: u64,
}

impl<C: Clock> RenderLoop<C> {
    /// Starts the loop. The clock is sampled once here for the start time.
    ///
    /// Requiring the pipeline guarantees a program is active before the first
    /// draw.
    pub fn new(
        config: &DemoConfig,
        _pipeline: &ShaderPipeline,
        mut clock: C,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        let start_millis = clock.now_millis();
        let controller = TerminationController::new(config);
        info!(
            runtime_seconds = config.runtime_seconds,
            timeout_ms = controller.timeout_millis(),
            "render loop running"
        );
        Ok(Self {
            clock,
            start_millis,
            runtime_seconds: config.runtime_seconds,
            controller,
            state: LoopState::Running,
            frames: 0,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames drawn and presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one iteration. Does nothing once the loop has left `Running`.
    pub fn step<B, I>(&mut self, backend: &mut B, input: &I) -> Result<LoopState, RenderError>
    where
        B: RenderBackend + ?Sized,
        I: InputSnapshot + ?Sized,
    {
        if !self.state.is_running() {
            return Ok(self.state);
        }

        let elapsed = self.elapsed();
        if self.controller.timed_out(elapsed) {
            self.state = LoopState::Exiting(ExitReason::Timeout);
            return Ok(self.state);
        }

        let color = FrameColor::from_elapsed(elapsed, self.runtime_seconds);
        backend.set_color(color);
        backend.draw_fullscreen_rect()?;
        backend.present()?;
        self.frames += 1;
        trace!(elapsed_ms = elapsed.as_millis(), red = color.red, "frame presented");

        if self.controller.exit_requested(input) {
            self.state = LoopState::Exiting(ExitReason::ExitKey);
        }
        Ok(self.state)
    }

    /// Moves an exiting loop into its terminal state.
    pub fn terminate(&mut self) -> LoopState {
        self.state = self.controller.terminate(self.state);
        self.state
    }

    fn elapsed(&mut self) -> ElapsedTime {
        let now = self.clock.now_millis();
        ElapsedTime::from_millis(now.saturating_sub(self.start_millis))
    }
}
