use anyhow::{Context, Result};
use renderer::{DemoConfig, Renderer};
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let config = DemoConfig::default();
    tracing::info!(
        runtime_seconds = config.runtime_seconds,
        compiler = %config.shader_compiler,
        "starting raytunnel"
    );
    Renderer::new(config)
        .run()
        .context("raytunnel exited with an error")
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
