use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::api::GlApi;
use crate::capture::capture_frame;
use crate::context::{create_gl_context, GlWindowSurface};
use crate::error::RendererError;
use crate::Gl;

/// Window and framebuffer settings for a lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
    pub resizable: bool,
    /// RGBA colour the framebuffer is cleared to before every frame.
    pub clear_color: [f32; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1368,
            height: 768,
            title: "Spacecraft".to_string(),
            vsync: true,
            resizable: true,
            clear_color: [0.072, 0.13, 0.17, 1.0],
        }
    }
}

/// How long the loop runs and what happens to the frames it draws.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Present frames until the window closes, Escape is pressed or the
    /// optional deadline passes.
    Animate { exit_after: Option<Duration> },
    /// Draw a single frame at `time` seconds, write it to `path` as PNG and
    /// stop.
    Export { path: PathBuf, time: Option<f32> },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { exit_after: None }
    }
}

impl RenderPolicy {
    /// Scene time handed to [`Scene::draw`] after `elapsed` wall-clock time.
    pub fn scene_time(&self, elapsed: Duration) -> f32 {
        match self {
            Self::Animate { .. } => elapsed.as_secs_f32(),
            Self::Export { time, .. } => time.unwrap_or(0.0),
        }
    }

    /// True once an animated run has outlived its deadline.
    pub fn expired(&self, elapsed: Duration) -> bool {
        match self {
            Self::Animate {
                exit_after: Some(limit),
            } => elapsed >= *limit,
            _ => false,
        }
    }
}

/// Per-frame inputs for a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Seconds since the loop started (fixed when exporting).
    pub elapsed: f32,
    /// Zero-based frame counter.
    pub frame: u64,
    /// Framebuffer size in physical pixels.
    pub size: (u32, u32),
}

/// Something that draws into the current framebuffer once per frame.
///
/// The framebuffer has already been cleared when `draw` runs.
pub trait Scene {
    fn draw(&mut self, frame: &FrameInfo) -> Result<()>;

    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Entry point that owns the window, the GL context and the render loop.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: WindowConfig,
    policy: RenderPolicy,
}

impl Renderer {
    pub fn new(config: WindowConfig, policy: RenderPolicy) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn policy(&self) -> &RenderPolicy {
        &self.policy
    }

    /// Opens the window, calls `build` once with the live context and
    /// drives the scene until the policy says to stop.
    pub fn run<F>(self, build: F) -> Result<()>
    where
        F: FnOnce(&Rc<Gl>) -> Result<Box<dyn Scene>>,
    {
        let event_loop = EventLoop::new()
            .map_err(|err| RendererError::init(format!("failed to create event loop: {err}")))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = LessonApp {
            config: self.config,
            policy: self.policy,
            build: Some(build),
            running: None,
            outcome: Ok(()),
        };
        event_loop
            .run_app(&mut app)
            .map_err(|err| anyhow!("window event loop error: {err}"))?;
        app.outcome
    }
}

/// Live resources, declared so the scene drops before the context and the
/// context before the window.
struct Running {
    scene: Box<dyn Scene>,
    gl: Rc<Gl>,
    surface: GlWindowSurface,
    window: Window,
    started: Instant,
    frame: u64,
    size: (u32, u32),
}

enum FrameStatus {
    Presented,
    Captured(PathBuf),
}

impl Running {
    fn render(&mut self, policy: &RenderPolicy, clear_color: [f32; 4]) -> Result<FrameStatus> {
        let info = FrameInfo {
            elapsed: policy.scene_time(self.started.elapsed()),
            frame: self.frame,
            size: self.size,
        };

        begin_frame(self.gl.as_ref(), clear_color);
        self.scene
            .draw(&info)
            .with_context(|| format!("failed to draw frame {}", self.frame))?;
        self.frame += 1;

        if let RenderPolicy::Export { path, .. } = policy {
            let (width, height) = self.size;
            let image = capture_frame(self.gl.as_ref(), width, height)?;
            image
                .save(path)
                .with_context(|| format!("failed to write capture to {}", path.display()))?;
            return Ok(FrameStatus::Captured(path.clone()));
        }

        self.window.pre_present_notify();
        self.surface.swap_buffers()?;
        Ok(FrameStatus::Presented)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.size = (size.width, size.height);
        self.surface.resize(size.width, size.height);
        fit_viewport(self.gl.as_ref(), size.width, size.height);
        self.scene.resize(size.width, size.height);
        debug!(width = size.width, height = size.height, "resized framebuffer");
    }
}

fn begin_frame<G: GlApi>(gl: &G, clear_color: [f32; 4]) {
    gl.clear_color(clear_color);
    gl.clear();
}

fn fit_viewport<G: GlApi>(gl: &G, width: u32, height: u32) {
    gl.viewport(0, 0, width as i32, height as i32);
}

struct LessonApp<F> {
    config: WindowConfig,
    policy: RenderPolicy,
    build: Option<F>,
    running: Option<Running>,
    outcome: Result<()>,
}

impl<F> LessonApp<F>
where
    F: FnOnce(&Rc<Gl>) -> Result<Box<dyn Scene>>,
{
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let build = self
            .build
            .take()
            .ok_or_else(|| anyhow!("scene was already built"))?;

        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(self.config.resizable);
        let window = event_loop
            .create_window(attributes)
            .map_err(|err| RendererError::init(format!("failed to create window: {err}")))?;

        let (surface, gl) = create_gl_context(&window, self.config.vsync)?;
        let gl = Rc::new(gl);

        let size = window.inner_size();
        fit_viewport(gl.as_ref(), size.width, size.height);

        let scene = build(&gl).context("failed to set up scene")?;
        info!(
            title = %self.config.title,
            width = size.width,
            height = size.height,
            policy = ?self.policy,
            "window ready"
        );

        Ok(Running {
            scene,
            gl,
            surface,
            window,
            started: Instant::now(),
            frame: 0,
            size: (size.width, size.height),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        if self.outcome.is_ok() {
            self.outcome = Err(err);
        }
        self.running = None;
        event_loop.exit();
    }
}

impl<F> ApplicationHandler for LessonApp<F>
where
    F: FnOnce(&Rc<Gl>) -> Result<Box<dyn Scene>>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.build.is_none() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if running.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                info!(frames = running.frame, "window closed");
                self.running = None;
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                info!(frames = running.frame, "escape pressed; closing");
                self.running = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => running.resize(size),
            WindowEvent::RedrawRequested => {
                match running.render(&self.policy, self.config.clear_color) {
                    Ok(FrameStatus::Presented) => {}
                    Ok(FrameStatus::Captured(path)) => {
                        info!(path = %path.display(), "frame captured");
                        self.running = None;
                        event_loop.exit();
                    }
                    Err(err) => self.fail(event_loop, err),
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_ref() else {
            return;
        };
        if self.policy.expired(running.started.elapsed()) {
            info!(frames = running.frame, "run deadline reached");
            self.running = None;
            event_loop.exit();
            return;
        }
        running.window.request_redraw();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.running = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, FakeGl};

    #[test]
    fn frame_starts_with_configured_clear() {
        let gl = FakeGl::default();
        let color = WindowConfig::default().clear_color;
        begin_frame(&gl, color);
        fit_viewport(&gl, 640, 480);
        assert_eq!(
            gl.calls(),
            vec![
                Call::ClearColor(color),
                Call::Clear,
                Call::Viewport(0, 0, 640, 480),
            ]
        );
    }

    #[test]
    fn default_window_matches_lesson_constants() {
        let config = WindowConfig::default();
        assert_eq!((config.width, config.height), (1368, 768));
        assert_eq!(config.title, "Spacecraft");
        assert_eq!(config.clear_color, [0.072, 0.13, 0.17, 1.0]);
    }

    #[test]
    fn animate_uses_wall_clock_and_honours_deadline() {
        let policy = RenderPolicy::Animate {
            exit_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(policy.scene_time(Duration::from_millis(1500)), 1.5);
        assert!(!policy.expired(Duration::from_millis(1999)));
        assert!(policy.expired(Duration::from_secs(2)));
        assert!(!RenderPolicy::default().expired(Duration::from_secs(3600)));
    }

    #[test]
    fn export_pins_scene_time() {
        let policy = RenderPolicy::Export {
            path: PathBuf::from("frame.png"),
            time: Some(0.75),
        };
        assert_eq!(policy.scene_time(Duration::from_secs(9)), 0.75);
        assert!(!policy.expired(Duration::from_secs(9)));

        let unpinned = RenderPolicy::Export {
            path: PathBuf::from("frame.png"),
            time: None,
        };
        assert_eq!(unpinned.scene_time(Duration::from_secs(9)), 0.0);
    }
}
