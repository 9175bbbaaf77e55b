//! Fakes shared by the unit tests.

use std::collections::HashSet;

use crate::backend::{Capability, CapabilityTable, RenderBackend};
use crate::color::FrameColor;
use crate::error::RenderError;
use crate::input::InputSnapshot;
use crate::types::{ContextId, FormatDescriptor, FormatId, KeyCode, ProgramId, ShaderStage};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    NegotiateFormat,
    BindFormat(FormatId),
    CreateContext,
    Activate(ContextId),
    CreateProgram(ShaderStage, usize),
    UseProgram(ProgramId),
    SetColor(FrameColor),
    Draw,
    Present,
}

/// Operation a [`RecordingBackend`] should fail on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailAt {
    Negotiate,
    Bind,
    Create,
    Activate,
    Compile,
    Present,
}

/// Backend that records every call and enforces the ordering invariants.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
    pub capabilities: Vec<Capability>,
    pub fail_at: Option<FailAt>,
    negotiated: Option<FormatId>,
    bound: bool,
    created: Option<ContextId>,
    pub current_contexts: usize,
    pub active_program: Option<ProgramId>,
    next_program: u32,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            capabilities: Capability::ALL.to_vec(),
            fail_at: None,
            negotiated: None,
            bound: false,
            created: None,
            current_contexts: 0,
            active_program: None,
            next_program: 1,
        }
    }
}

impl RecordingBackend {
    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at: Some(fail_at),
            ..Self::default()
        }
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }

    pub fn draws(&self) -> usize {
        self.count(|call| matches!(call, Call::Draw))
    }

    pub fn presents(&self) -> usize {
        self.count(|call| matches!(call, Call::Present))
    }

    pub fn colors(&self) -> Vec<FrameColor> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetColor(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    fn fails(&self, at: FailAt) -> bool {
        self.fail_at == Some(at)
    }
}

impl RenderBackend for RecordingBackend {
    fn negotiate_format(&mut self, _descriptor: &FormatDescriptor) -> Result<FormatId, RenderError> {
        self.calls.push(Call::NegotiateFormat);
        if self.fails(FailAt::Negotiate) {
            return Err(RenderError::ContextAcquisition("no matching format".into()));
        }
        let format = FormatId(0);
        self.negotiated = Some(format);
        Ok(format)
    }

    fn bind_format(
        &mut self,
        format: FormatId,
        _descriptor: &FormatDescriptor,
    ) -> Result<(), RenderError> {
        self.calls.push(Call::BindFormat(format));
        if self.negotiated != Some(format) {
            return Err(RenderError::out_of_order("bind_format", "negotiate_format"));
        }
        if self.fails(FailAt::Bind) {
            return Err(RenderError::ContextAcquisition("format rejected".into()));
        }
        self.bound = true;
        Ok(())
    }

    fn create_context(&mut self) -> Result<ContextId, RenderError> {
        self.calls.push(Call::CreateContext);
        if self.fails(FailAt::Create) {
            return Err(RenderError::ContextAcquisition("no device".into()));
        }
        let context = ContextId(1);
        self.created = Some(context);
        Ok(context)
    }

    fn activate(&mut self, context: ContextId) -> Result<(), RenderError> {
        self.calls.push(Call::Activate(context));
        if !self.bound {
            return Err(RenderError::out_of_order("activate", "bind_format"));
        }
        if self.created != Some(context) {
            return Err(RenderError::out_of_order("activate", "create_context"));
        }
        if self.current_contexts > 0 {
            return Err(RenderError::ContextAcquisition(
                "rendering context is already current".into(),
            ));
        }
        if self.fails(FailAt::Activate) {
            return Err(RenderError::ContextAcquisition("make current failed".into()));
        }
        self.current_contexts = 1;
        Ok(())
    }

    fn capabilities(&self) -> CapabilityTable {
        CapabilityTable::new(self.capabilities.iter().copied())
    }

    fn create_program(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ProgramId, RenderError> {
        self.calls.push(Call::CreateProgram(stage, source.len()));
        if self.current_contexts == 0 {
            return Err(RenderError::out_of_order("create_program", "activate"));
        }
        if self.fails(FailAt::Compile) {
            return Err(RenderError::ShaderCompile("syntax error".into()));
        }
        let program = ProgramId::new(self.next_program)
            .ok_or_else(|| RenderError::ShaderCompile("program id overflow".into()))?;
        self.next_program += 1;
        Ok(program)
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), RenderError> {
        self.calls.push(Call::UseProgram(program));
        self.active_program = Some(program);
        Ok(())
    }

    fn set_color(&mut self, color: FrameColor) {
        self.calls.push(Call::SetColor(color));
    }

    fn draw_fullscreen_rect(&mut self) -> Result<(), RenderError> {
        self.calls.push(Call::Draw);
        if self.active_program.is_none() {
            return Err(RenderError::out_of_order("draw_fullscreen_rect", "use_program"));
        }
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.calls.push(Call::Present);
        if self.fails(FailAt::Present) {
            return Err(RenderError::Present("swap failed".into()));
        }
        Ok(())
    }
}

/// Input snapshot with a fixed set of held keys.
#[derive(Debug, Default)]
pub(crate) struct HeldKeys(pub HashSet<KeyCode>);

impl HeldKeys {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn holding(key: KeyCode) -> Self {
        Self(HashSet::from([key]))
    }
}

impl InputSnapshot for HeldKeys {
    fn is_pressed(&self, key: KeyCode) -> bool {
        self.0.contains(&key)
    }
}
