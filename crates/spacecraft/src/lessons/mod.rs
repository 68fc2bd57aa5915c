//! The lessons, each adding one OpenGL concept to the previous one.

mod circle;
mod clear;
mod rectangle;
mod textured;
mod triangle;
mod two_programs;
mod uniform_color;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use appconfig::AppConfig;
use clap::ValueEnum;
use renderer::{GlApi, Scene, ShaderProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Lesson {
    /// Open a window and clear it every frame.
    #[default]
    Window,
    /// Draw one triangle from a vertex buffer.
    Triangle,
    /// Pulse the triangle colour through a uniform.
    UniformColor,
    /// Draw an indexed quad (honours --wireframe).
    Rectangle,
    /// Draw two triangles with two shader programs.
    TwoPrograms,
    /// Sample an image texture on an indexed quad.
    Textured,
    /// Approximate a circle with a triangle fan.
    Circle,
}

impl Lesson {
    pub const ALL: [Lesson; 7] = [
        Lesson::Window,
        Lesson::Triangle,
        Lesson::UniformColor,
        Lesson::Rectangle,
        Lesson::TwoPrograms,
        Lesson::Textured,
        Lesson::Circle,
    ];

    /// Name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Lesson::Window => "window",
            Lesson::Triangle => "triangle",
            Lesson::UniformColor => "uniform-color",
            Lesson::Rectangle => "rectangle",
            Lesson::TwoPrograms => "two-programs",
            Lesson::Textured => "textured",
            Lesson::Circle => "circle",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Lesson::Window => "open a window and clear it every frame",
            Lesson::Triangle => "compile and link shaders, draw one triangle from a vertex buffer",
            Lesson::UniformColor => "drive the fragment colour from a time-based uniform",
            Lesson::Rectangle => "reuse vertices with an element buffer (honours --wireframe)",
            Lesson::TwoPrograms => "draw two triangles with two different shader programs",
            Lesson::Textured => "sample an image texture on an indexed quad",
            Lesson::Circle => "approximate a circle with a triangle fan",
        }
    }

    /// `(vertex, fragment)` file names under `shaders/` that the lesson links.
    pub fn shader_pairs(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Lesson::Window => &[],
            Lesson::Triangle | Lesson::Rectangle => &[("position.vs", "orange.fs")],
            Lesson::UniformColor => &[("position.vs", "uniform_color.fs")],
            Lesson::TwoPrograms => &[("position.vs", "orange.fs"), ("position.vs", "yellow.fs")],
            Lesson::Textured => &[("textured.vs", "textured.fs")],
            Lesson::Circle => &[("circle.vs", "circle.fs")],
        }
    }
}

/// What a lesson needs besides the GL context.
pub struct LessonContext<'a> {
    assets: &'a Path,
    config: &'a AppConfig,
}

impl<'a> LessonContext<'a> {
    pub fn new(assets: &'a Path, config: &'a AppConfig) -> Self {
        Self { assets, config }
    }

    pub fn config(&self) -> &AppConfig {
        self.config
    }

    /// Resolves `relative` against the asset directory; absolute paths pass
    /// through unchanged.
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets.join(relative)
    }

    /// Compiles and links `shaders/<vertex>` with `shaders/<fragment>`.
    pub fn program<G: GlApi>(
        &self,
        gl: &Rc<G>,
        vertex: &str,
        fragment: &str,
    ) -> Result<ShaderProgram<G>> {
        let vertex_path = self.asset(Path::new("shaders").join(vertex));
        let fragment_path = self.asset(Path::new("shaders").join(fragment));
        let program = ShaderProgram::from_files(gl, &vertex_path, &fragment_path)
            .with_context(|| format!("failed to build shader program {vertex} + {fragment}"))?;
        tracing::debug!(vertex, fragment, "linked shader program");
        Ok(program)
    }

    fn linked_pair<G: GlApi>(
        &self,
        gl: &Rc<G>,
        lesson: Lesson,
        index: usize,
    ) -> Result<ShaderProgram<G>> {
        let (vertex, fragment) = lesson
            .shader_pairs()
            .get(index)
            .copied()
            .with_context(|| format!("lesson '{}' has no shader pair {index}", lesson.name()))?;
        self.program(gl, vertex, fragment)
    }
}

/// Builds the scene for `lesson` on the current context.
pub fn build<G: GlApi + 'static>(
    lesson: Lesson,
    gl: &Rc<G>,
    context: &LessonContext<'_>,
) -> Result<Box<dyn Scene>> {
    let scene: Box<dyn Scene> = match lesson {
        Lesson::Window => Box::new(clear::ClearScene),
        Lesson::Triangle => Box::new(triangle::TriangleScene::new(gl, context)?),
        Lesson::UniformColor => Box::new(uniform_color::UniformColorScene::new(gl, context)?),
        Lesson::Rectangle => Box::new(rectangle::RectangleScene::new(gl, context)?),
        Lesson::TwoPrograms => Box::new(two_programs::TwoProgramsScene::new(gl, context)?),
        Lesson::Textured => Box::new(textured::TexturedScene::new(gl, context)?),
        Lesson::Circle => Box::new(circle::CircleScene::new(gl, context)?),
    };
    Ok(scene)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;

    use renderer::FrameInfo;

    pub fn bundled_assets() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
    }

    pub fn frame(elapsed: f32, size: (u32, u32)) -> FrameInfo {
        FrameInfo {
            elapsed,
            frame: 0,
            size,
        }
    }
}
