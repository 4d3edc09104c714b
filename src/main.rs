//! softgl - headless CPU rasterizer
//!
//! Loads the configured scene, renders `run.frames` frames with a fixed
//! simulated time step, and optionally writes the last frame as TGA.

use std::process::ExitCode;

use softgl::config::AppConfig;
use softgl::scene::build_from_config;
use softgl::systems::{AnimationSystem, RenderSystem};
use softgl_render::FrameStats;

fn main() -> ExitCode {
    // Load configuration first; it names the default log level
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting softgl");

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut scene = build_from_config(&config.scene)?;
    let mut renderer = RenderSystem::new(config)?;
    let mut animation = AnimationSystem::new(&config.animation);

    let (width, height) = renderer.size();
    log::info!(
        "Rendering {} frames at {}x{} ({:?})",
        config.run.frames,
        width,
        height,
        config.rendering.raster_mode
    );

    let mut total = FrameStats::default();
    for frame in 0..config.run.frames {
        if frame > 0 {
            animation.update(config.run.frame_dt, &mut scene);
        }
        total.accumulate(renderer.render_frame(&scene));
    }

    log::info!(
        "Done after {:.2}s simulated: {} triangles, {} drawn, {} culled, {} behind camera, {} degenerate",
        animation.elapsed(),
        total.triangles,
        total.drawn,
        total.culled,
        total.behind_camera,
        total.degenerate
    );

    if let Some(path) = &config.run.output {
        renderer.save_frame(path)?;
    }
    Ok(())
}
