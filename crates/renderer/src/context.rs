//! OpenGL context creation on top of a winit window.

use std::ffi::CStr;
use std::num::NonZeroU32;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, info, warn};
use winit::window::Window;

use crate::error::{RendererError, Result};

/// Core profile version requested from the driver.
pub const GL_VERSION: (u8, u8) = (3, 3);

/// A window surface plus the current context rendering into it.
pub struct GlWindowSurface {
    pub(crate) surface: Surface<WindowSurface>,
    pub(crate) context: PossiblyCurrentContext,
}

impl GlWindowSurface {
    pub fn resize(&self, width: u32, height: u32) {
        let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return;
        };
        self.surface.resize(&self.context, width, height);
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|err| RendererError::init(format!("failed to swap buffers: {err}")))
    }
}

/// Creates a GL 3.3 core context for `window`, makes it current and loads
/// the function pointers.
pub fn create_gl_context(window: &Window, vsync: bool) -> Result<(GlWindowSurface, glow::Context)> {
    let display_handle = window
        .display_handle()
        .map_err(|err| RendererError::init(format!("window has no display handle: {err}")))?
        .as_raw();

    #[cfg(target_os = "windows")]
    let preference = DisplayApiPreference::Wgl(Some(
        window
            .window_handle()
            .map_err(|err| RendererError::init(format!("window has no native handle: {err}")))?
            .as_raw(),
    ));
    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;
    #[cfg(all(unix, not(target_os = "macos")))]
    let preference = DisplayApiPreference::Egl;

    let display = unsafe { Display::new(display_handle, preference) }
        .map_err(|err| RendererError::init(format!("failed to open GL display: {err}")))?;

    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_transparency(false)
        .build();
    let config = pick_config(&display, template)?;

    let (width, height): (u32, u32) = window.inner_size().into();
    let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
        return Err(RendererError::init(format!(
            "window has a zero-sized surface ({width}x{height})"
        )));
    };
    let raw_window_handle = window
        .window_handle()
        .map_err(|err| RendererError::init(format!("window has no native handle: {err}")))?
        .as_raw();
    let surface_attributes =
        SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window_handle, width, height);
    let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
        .map_err(|err| RendererError::init(format!("failed to create window surface: {err}")))?;

    let (major, minor) = GL_VERSION;
    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
        .with_profile(GlProfile::Core)
        .build(Some(raw_window_handle));
    let context = unsafe { display.create_context(&config, &context_attributes) }
        .map_err(|err| {
            RendererError::init(format!(
                "failed to create OpenGL {major}.{minor} core context: {err}"
            ))
        })?
        .make_current(&surface)
        .map_err(|err| RendererError::init(format!("failed to make context current: {err}")))?;

    let interval = if vsync {
        SwapInterval::Wait(NonZeroU32::MIN)
    } else {
        SwapInterval::DontWait
    };
    if let Err(err) = surface.set_swap_interval(&context, interval) {
        warn!(error = %err, vsync, "failed to set swap interval");
    }

    let gl = unsafe {
        glow::Context::from_loader_function_cstr(|symbol: &CStr| display.get_proc_address(symbol))
    };
    log_driver_info(&gl);

    Ok((GlWindowSurface { surface, context }, gl))
}

fn pick_config(
    display: &Display,
    template: glutin::config::ConfigTemplate,
) -> Result<Config> {
    let configs = unsafe { display.find_configs(template) }
        .map_err(|err| RendererError::init(format!("failed to query GL configs: {err}")))?;
    configs
        .reduce(|best, candidate| {
            if candidate.num_samples() < best.num_samples() {
                candidate
            } else {
                best
            }
        })
        .ok_or_else(|| RendererError::init("no suitable GL config found"))
}

fn log_driver_info(gl: &glow::Context) {
    use glow::HasContext;

    let (vendor, renderer, version) = unsafe {
        (
            gl.get_parameter_string(glow::VENDOR),
            gl.get_parameter_string(glow::RENDERER),
            gl.get_parameter_string(glow::VERSION),
        )
    };
    info!(%vendor, %renderer, %version, "OpenGL context ready");
    debug!(version = ?gl.version(), "parsed GL version");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presents_frames<S: GlSurface<WindowSurface>>() {}

    #[test]
    fn glutin_surface_trait_stays_in_scope() {
        presents_frames::<Surface<WindowSurface>>();
        assert_eq!(GL_VERSION, (3, 3));
    }
}
