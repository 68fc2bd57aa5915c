use anyhow::{Context, Result};
use appconfig::AppConfig;
use renderer::{RenderPolicy, Renderer, WindowConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::lessons::{self, Lesson, LessonContext};
use crate::paths::{AppPaths, ConfigSource};

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let (config, source) = resolve_config(&paths, &args)?;
    let assets = paths.asset_dir(&config);
    let lesson = args.lesson.unwrap_or_default();

    tracing::debug!(
        config = ?source.path(),
        assets = %assets.display(),
        "resolved spacecraft paths"
    );
    tracing::info!(lesson = lesson.name(), "starting lesson");

    let renderer = Renderer::new(window_config(&config), render_policy(&args, &config));
    renderer.run(|gl| {
        let context = LessonContext::new(&assets, &config);
        lessons::build(lesson, gl, &context)
            .with_context(|| format!("failed to build lesson '{}'", lesson.name()))
    })
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn print_lessons() {
    println!("Lessons:");
    for lesson in Lesson::ALL {
        let marker = if lesson == Lesson::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {:<14} {}{marker}", lesson.name(), lesson.description());
    }
}

pub fn config_where(args: &RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let (config, source) = resolve_config(&paths, args)?;
    let file = match &source {
        ConfigSource::Explicit(path) => format!("{} (--config)", path.display()),
        ConfigSource::Discovered(path) => path.display().to_string(),
        ConfigSource::Defaults => format!(
            "{} (not found; using defaults)",
            paths.config_file().display()
        ),
    };

    println!("Configuration:");
    println!("  config dir: {}", paths.config_dir().display());
    println!("  file:       {file}");
    println!("Assets:");
    println!("  active:     {}", paths.asset_dir(&config).display());
    println!("  bundled:    {}", paths.bundled_assets().display());
    Ok(())
}

pub fn config_show(args: &RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let (config, _) = resolve_config(&paths, args)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

/// Loads the configuration file (if any) and layers the CLI flags on top.
fn resolve_config(paths: &AppPaths, args: &RunArgs) -> Result<(AppConfig, ConfigSource)> {
    let source = paths.config_source(args.config.as_deref());
    let mut config = match source.path() {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, args);
    config
        .validate()
        .context("command-line overrides produced an invalid configuration")?;
    Ok((config, source))
}

fn apply_overrides(config: &mut AppConfig, args: &RunArgs) {
    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }
    if let Some(title) = &args.title {
        config.window.title = title.clone();
    }
    if let Some(vsync) = args.vsync {
        config.window.vsync = vsync;
    }
    if args.wireframe {
        config.render.wireframe = true;
    }
    if let Some(exit_after) = args.exit_after {
        config.render.exit_after = Some(exit_after);
    }
}

fn window_config(config: &AppConfig) -> WindowConfig {
    WindowConfig {
        width: config.window.width,
        height: config.window.height,
        title: config.window.title.clone(),
        vsync: config.window.vsync,
        resizable: config.window.resizable,
        clear_color: config.clear_color(),
    }
}

fn render_policy(args: &RunArgs, config: &AppConfig) -> RenderPolicy {
    match &args.capture {
        Some(path) => RenderPolicy::Export {
            path: path.clone(),
            time: args.capture_time,
        },
        None => RenderPolicy::Animate {
            exit_after: config.render.exit_after,
        },
    }
}
