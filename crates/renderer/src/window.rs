use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

use crate::error::RenderError;
use crate::gpu::WgpuBackend;
use crate::graphics::GraphicsContext;
use crate::input::KeyboardState;
use crate::program::ShaderPipeline;
use crate::render_loop::RenderLoop;
use crate::runtime::SystemClock;
use crate::shader::FRAGMENT_SOURCE;
use crate::surface::{DisplaySurfaceProvider, SurfaceProvider};
use crate::types::DemoConfig;

/// Runs the intro on a fullscreen window until it times out or the exit key
/// is seen.
///
/// Set-up happens before the event loop starts, so every acquisition failure
/// is reported before the first frame. Inside the loop `AboutToWait` drives
/// one [`RenderLoop::step`] per pass and keyboard events only update the
/// snapshot that step polls.
pub(crate) fn run_fullscreen(config: &DemoConfig) -> Result<()> {
    config.validate()?;

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let surface = DisplaySurfaceProvider::new(&event_loop, &config.window_title)
        .acquire()
        .context("failed to acquire fullscreen surface")?;
    let window_id = surface.id();

    let mut backend = WgpuBackend::new(surface.clone(), config.shader_compiler);
    let context = GraphicsContext::establish(&mut backend, &config.format)
        .context("failed to establish graphics context")?;
    let pipeline = ShaderPipeline::install(&mut backend, &context, FRAGMENT_SOURCE)
        .context("failed to install fragment program")?;

    surface.reset_cursor(config.cursor_origin);

    let mut render_loop = RenderLoop::new(config, &pipeline, SystemClock::new())?;
    let mut keyboard = KeyboardState::default();
    let mut failure: Option<RenderError> = None;

    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id: id, event } if id == window_id => match event {
            WindowEvent::KeyboardInput { event, .. } => {
                keyboard.handle_event(&event);
            }
            WindowEvent::CloseRequested => {
                debug!("ignoring close request; the intro ends on timeout or exit key");
            }
            WindowEvent::Destroyed => {
                failure = Some(RenderError::Present("window was destroyed".into()));
                elwt.exit();
            }
            _ => {}
        },
        Event::AboutToWait => {
            if elwt.exiting() {
                return;
            }
            match render_loop.step(&mut backend, &keyboard) {
                Ok(state) if state.is_running() => keyboard.settle(),
                Ok(_) => {
                    render_loop.terminate();
                    elwt.exit();
                }
                Err(err) => {
                    error!("render loop failed: {err}");
                    failure = Some(err);
                    elwt.exit();
                }
            }
        }
        _ => {}
    });

    info!(frames = render_loop.frames(), "render loop finished");

    if let Some(err) = failure {
        return Err(err).context("intro aborted");
    }
    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
