use tracing::info;

use crate::input::InputSnapshot;
use crate::runtime::ElapsedTime;
use crate::types::{DemoConfig, KeyCode};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Elapsed time passed `runtime_seconds * 64000` milliseconds.
    Timeout,
    /// The exit key was seen by the input poll.
    ExitKey,
}

/// Position of the render loop in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Exiting(ExitReason),
    Terminated(ExitReason),
}

impl LoopState {
    pub fn is_running(self) -> bool {
        matches!(self, LoopState::Running)
    }
}

/// Owns the two exit conditions and the transition into the terminal state.
#[derive(Debug, Clone, Copy)]
pub struct TerminationController {
    timeout_millis: u64,
    exit_key: KeyCode,
}

impl TerminationController {
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            timeout_millis: config.timeout_millis(),
            exit_key: config.exit_key,
        }
    }

    pub fn timeout_millis(&self) -> u64 {
        self.timeout_millis
    }

    /// Strictly greater: a frame at exactly the timeout still renders.
    pub fn timed_out(&self, elapsed: ElapsedTime) -> bool {
        elapsed.as_millis() > self.timeout_millis
    }

    pub fn exit_requested<I: InputSnapshot + ?Sized>(&self, input: &I) -> bool {
        input.is_pressed(self.exit_key)
    }

    /// Moves an exiting loop into its terminal state. Any other state is
    /// returned unchanged.
    pub fn terminate(&self, state: LoopState) -> LoopState {
        match state {
            LoopState::Exiting(reason) => {
                info!(?reason, "intro finished");
                LoopState::Terminated(reason)
            }
            other => other,
        }
    }
}
