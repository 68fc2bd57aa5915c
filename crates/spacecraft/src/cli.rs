use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::lessons::Lesson;

#[derive(Parser, Debug)]
#[command(
    name = "spacecraft",
    author,
    version,
    about = "OpenGL lessons, one concept at a time",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Lesson to run (see `spacecraft lessons`).
    #[arg(value_enum, value_name = "LESSON")]
    pub lesson: Option<Lesson>,

    /// Configuration file to use instead of the discovered one.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Override the window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Override the window title.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Wait for vertical sync between frames.
    #[arg(long, value_name = "BOOL")]
    pub vsync: Option<bool>,

    /// Draw polygons as outlines in lessons that support it.
    #[arg(long)]
    pub wireframe: bool,

    /// Render one frame, save it to this PNG path and exit.
    #[arg(long, value_name = "PATH", value_parser = parse_capture_path)]
    pub capture: Option<PathBuf>,

    /// Scene time in seconds for the captured frame (defaults to 0).
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = parse_seconds,
        requires = "capture"
    )]
    pub capture_time: Option<f32>,

    /// Close the window after this long (e.g. `10s`, `1m 30s`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub exit_after: Option<Duration>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available lessons.
    Lessons,
    /// Inspect the effective configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file and asset directory.
    Where,
    /// Print the effective configuration as TOML.
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT (e.g. 1280x720), got '{value}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", width.trim()))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", height.trim()))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".to_string());
    }
    Ok((width, height))
}

pub fn parse_capture_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => Ok(path),
        None => Err("capture path has no extension; expected .png".to_string()),
        Some(other) => Err(format!(
            "unsupported capture format '.{other}'; expected .png"
        )),
    }
}

pub fn parse_seconds(value: &str) -> Result<f32, String> {
    let seconds: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds '{value}'"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("capture time must be a non-negative number of seconds".to_string());
    }
    Ok(seconds)
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err("duration must be non-negative".to_string());
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("invalid duration '{value}': {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{value}': {err}"))
}
