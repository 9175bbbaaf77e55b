use thiserror::Error;

/// Fatal failures raised at the boundary where they occur.
///
/// The intro has no degraded mode, so every variant ends the run.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The surface, adapter, format, or device could not be obtained.
    #[error("failed to acquire rendering context: {0}")]
    ContextAcquisition(String),
    /// The fragment program failed to compile or link.
    #[error("failed to compile shader program: {0}")]
    ShaderCompile(String),
    /// A frame could not be acquired or presented.
    #[error("failed to present frame: {0}")]
    Present(String),
    /// The backend does not provide a named capability the pipeline needs.
    #[error("missing graphics capability `{0}`")]
    MissingCapability(String),
    /// A boundary call was issued before the call it depends on.
    #[error("{operation} called before {requires}")]
    OutOfOrder {
        operation: &'static str,
        requires: &'static str,
    },
    /// The configuration cannot drive the render loop.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RenderError {
    pub(crate) fn out_of_order(operation: &'static str, requires: &'static str) -> Self {
        Self::OutOfOrder {
            operation,
            requires,
        }
    }
}
