use std::cell::Cell;
use std::rc::Rc;

use renderer::{
    Capability, CapabilityTable, Clock, ContextId, DemoConfig, ExitReason, FormatDescriptor,
    FormatId, FrameColor, GraphicsContext, InputSnapshot, KeyCode, KeyboardState, LoopState,
    ProgramId, RenderBackend, RenderError, RenderLoop, ShaderPipeline, ShaderStage,
    FRAGMENT_SOURCE,
};

/// Minimal in-memory driver: remembers the program source and every frame.
#[derive(Default)]
struct FrameLog {
    negotiated: bool,
    context_current: bool,
    program_source: Option<String>,
    active: Option<ProgramId>,
    pending: Option<FrameColor>,
    presented: Vec<FrameColor>,
    missing: Option<Capability>,
}

impl RenderBackend for FrameLog {
    fn negotiate_format(&mut self, descriptor: &FormatDescriptor) -> Result<FormatId, RenderError> {
        assert_eq!(descriptor.flags.bits(), 37);
        self.negotiated = true;
        Ok(FormatId(0))
    }

    fn bind_format(&mut self, _: FormatId, _: &FormatDescriptor) -> Result<(), RenderError> {
        assert!(self.negotiated);
        Ok(())
    }

    fn create_context(&mut self) -> Result<ContextId, RenderError> {
        Ok(ContextId(7))
    }

    fn activate(&mut self, context: ContextId) -> Result<(), RenderError> {
        assert_eq!(context, ContextId(7));
        self.context_current = true;
        Ok(())
    }

    fn capabilities(&self) -> CapabilityTable {
        CapabilityTable::new(
            Capability::ALL
                .into_iter()
                .filter(|capability| Some(*capability) != self.missing),
        )
    }

    fn create_program(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ProgramId, RenderError> {
        assert!(self.context_current);
        assert_eq!(stage, ShaderStage::FRAGMENT);
        self.program_source = Some(source.to_string());
        Ok(ProgramId::new(1).expect("non-zero"))
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), RenderError> {
        self.active = Some(program);
        Ok(())
    }

    fn set_color(&mut self, color: FrameColor) {
        self.pending = Some(color);
    }

    fn draw_fullscreen_rect(&mut self) -> Result<(), RenderError> {
        assert!(self.active.is_some(), "draw before a program is active");
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let color = self.pending.take().expect("color set before present");
        self.presented.push(color);
        Ok(())
    }
}

/// Clock the test can move while the render loop owns a handle to it.
#[derive(Clone, Default)]
struct SharedClock(Rc<Cell<u64>>);

impl SharedClock {
    fn set(&self, now: u64) {
        self.0.set(now);
    }
}

impl Clock for SharedClock {
    fn now_millis(&mut self) -> u64 {
        self.0.get()
    }
}

struct NoKeys;

impl InputSnapshot for NoKeys {
    fn is_pressed(&self, _: KeyCode) -> bool {
        false
    }
}

fn start(backend: &mut FrameLog, clock: &SharedClock) -> RenderLoop<SharedClock> {
    let config = DemoConfig::default();
    let context = GraphicsContext::establish(backend, &config.format).expect("context");
    let pipeline = ShaderPipeline::install(backend, &context, FRAGMENT_SOURCE).expect("pipeline");
    RenderLoop::new(&config, &pipeline, clock.clone()).expect("loop")
}

#[test]
fn intro_colors_frames_by_elapsed_time_then_times_out() {
    let mut backend = FrameLog::default();
    let clock = SharedClock::default();
    let mut render_loop = start(&mut backend, &clock);

    assert_eq!(
        backend.program_source.as_deref(),
        Some(FRAGMENT_SOURCE),
        "payload reaches the driver unchanged"
    );

    assert_eq!(render_loop.step(&mut backend, &NoKeys).expect("step"), LoopState::Running);
    clock.set(96_000);
    assert_eq!(render_loop.step(&mut backend, &NoKeys).expect("step"), LoopState::Running);
    clock.set(192_000);
    assert_eq!(render_loop.step(&mut backend, &NoKeys).expect("step"), LoopState::Running);

    assert_eq!(
        backend.presented,
        vec![
            FrameColor::new(0, 3, 3),
            FrameColor::new(32_000, 3, 3),
            FrameColor::new(64_000, 3, 3),
        ]
    );

    clock.set(192_001);
    assert_eq!(
        render_loop.step(&mut backend, &NoKeys).expect("step"),
        LoopState::Exiting(ExitReason::Timeout)
    );
    assert_eq!(backend.presented.len(), 3, "no frame drawn once timed out");
    assert_eq!(
        render_loop.terminate(),
        LoopState::Terminated(ExitReason::Timeout)
    );
    assert_eq!(render_loop.frames(), 3);
}

#[test]
fn escape_pressed_between_polls_ends_the_run() {
    let mut backend = FrameLog::default();
    let clock = SharedClock::default();
    let mut render_loop = start(&mut backend, &clock);
    let mut keyboard = KeyboardState::default();

    assert_eq!(
        render_loop.step(&mut backend, &keyboard).expect("step"),
        LoopState::Running
    );
    keyboard.settle();

    keyboard.press(KeyCode::ESCAPE);
    keyboard.release(KeyCode::ESCAPE);
    clock.set(1_000);

    assert_eq!(
        render_loop.step(&mut backend, &keyboard).expect("step"),
        LoopState::Exiting(ExitReason::ExitKey)
    );
    assert_eq!(backend.presented.len(), 2, "the frame is presented before exiting");
}

#[test]
fn missing_capability_stops_before_compiling() {
    let config = DemoConfig::default();
    let mut backend = FrameLog {
        missing: Some(Capability::UseProgram),
        ..FrameLog::default()
    };
    let context = GraphicsContext::establish(&mut backend, &config.format).expect("context");

    let err = ShaderPipeline::install(&mut backend, &context, FRAGMENT_SOURCE).unwrap_err();

    assert!(matches!(err, RenderError::MissingCapability(ref name) if name == "use_program"));
    assert!(backend.program_source.is_none());
}
