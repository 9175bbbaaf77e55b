use tracing::{debug, info};

use crate::backend::{Capability, RenderBackend};
use crate::error::RenderError;
use crate::graphics::GraphicsContext;
use crate::types::{ProgramId, ShaderStage};

/// The fragment program that every draw of the run uses.
///
/// Constructed exactly once by [`ShaderPipeline::install`]; there is no way to
/// swap programs afterwards.
#[derive(Debug)]
pub struct ShaderPipeline {
    program: ProgramId,
}

impl ShaderPipeline {
    /// Resolves the required capabilities, compiles `source` as a fragment
    /// program and makes it active.
    ///
    /// The source is handed to the backend untouched.
    pub fn install<B: RenderBackend>(
        backend: &mut B,
        _context: &GraphicsContext,
        source: &str,
    ) -> Result<Self, RenderError> {
        let capabilities = backend.capabilities();
        capabilities.require(Capability::CreateProgramFromSource.name())?;
        capabilities.require(Capability::UseProgram.name())?;

        let program = backend.create_program(ShaderStage::FRAGMENT, source)?;
        debug!(program = program.get(), bytes = source.len(), "linked fragment program");

        backend.use_program(program)?;
        info!(program = program.get(), "fragment program active");

        Ok(Self { program })
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::FRAGMENT_SOURCE;
    use crate::testing::{Call, FailAt, RecordingBackend};
    use crate::types::FormatDescriptor;

    fn context(backend: &mut RecordingBackend) -> GraphicsContext {
        GraphicsContext::establish(backend, &FormatDescriptor::INTRO).expect("context")
    }

    #[test]
    fn compiles_fragment_stage_and_uses_it_once() {
        let mut backend = RecordingBackend::default();
        let context = context(&mut backend);
        let pipeline = ShaderPipeline::install(&mut backend, &context, FRAGMENT_SOURCE)
            .expect("pipeline installed");

        assert!(backend
            .calls
            .contains(&Call::CreateProgram(ShaderStage::FRAGMENT, FRAGMENT_SOURCE.len())));
        assert_eq!(backend.count(|call| matches!(call, Call::UseProgram(_))), 1);
        assert_eq!(backend.active_program, Some(pipeline.program()));
    }

    #[test]
    fn compile_failure_is_reported_and_nothing_is_used() {
        let mut backend = RecordingBackend::failing_at(FailAt::Compile);
        let context = context(&mut backend);
        let err = ShaderPipeline::install(&mut backend, &context, FRAGMENT_SOURCE).unwrap_err();

        assert!(matches!(err, RenderError::ShaderCompile(_)));
        assert_eq!(backend.count(|call| matches!(call, Call::UseProgram(_))), 0);
        assert!(backend.active_program.is_none());
    }

    #[test]
    fn missing_capability_fails_before_compiling() {
        let mut backend = RecordingBackend::default();
        backend.capabilities = vec![Capability::UseProgram];
        let context = context(&mut backend);
        let err = ShaderPipeline::install(&mut backend, &context, FRAGMENT_SOURCE).unwrap_err();

        assert!(
            matches!(err, RenderError::MissingCapability(ref name) if name == "create_program_from_source")
        );
        assert_eq!(backend.count(|call| matches!(call, Call::CreateProgram(..))), 0);
    }
}
