//! Shader Program Builder.
//!
//! Turns GLSL source text into a linked [`ShaderProgram`]:
//!
//! ```text
//!   ShaderSource ──compile──▶ Shader (vertex)   ─┐
//!   ShaderSource ──compile──▶ Shader (fragment) ─┴─link──▶ ShaderProgram
//! ```
//!
//! A [`Shader`] only exists if the driver accepted its source, and a
//! [`ShaderProgram`] only exists if linking succeeded, so a half-built program
//! can never be bound for drawing. Both wrappers delete their GL object when
//! dropped; `link` consumes its inputs so the stage objects are released as
//! soon as the program owns their state.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::api::GlApi;
use crate::error::{bounded_log, RendererError, Result};

/// Pipeline stage a shader object is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Guesses the stage from a conventional file extension.
    ///
    /// `.vs`/`.vert` map to [`ShaderStage::Vertex`], `.fs`/`.frag` to
    /// [`ShaderStage::Fragment`].
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "vs" | "vert" => Some(Self::Vertex),
            "fs" | "frag" => Some(Self::Fragment),
            _ => None,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// GLSL text for one stage, plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    text: String,
    origin: Option<PathBuf>,
}

impl ShaderSource {
    /// Wraps source text embedded in the program.
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: None,
        }
    }

    /// Reads source text from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| RendererError::resource(path, err))?;
        Ok(Self {
            text,
            origin: Some(path.to_path_buf()),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Compiles this source for `stage`. Compile errors name the file the
    /// text was read from.
    pub fn compile<G: GlApi>(&self, gl: &Rc<G>, stage: ShaderStage) -> Result<Shader<G>> {
        compile(gl, stage, &self.text).map_err(|err| match err {
            RendererError::ShaderCompile { stage, log, .. } => RendererError::ShaderCompile {
                stage,
                log,
                origin: self.origin.clone(),
            },
            other => other,
        })
    }
}

/// A value written into a named uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(value: [f32; 2]) -> Self {
        Self::Vec2(value)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(value: [f32; 3]) -> Self {
        Self::Vec3(value)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(value: [f32; 4]) -> Self {
        Self::Vec4(value)
    }
}

/// A successfully compiled shader object.
pub struct Shader<G: GlApi> {
    gl: Rc<G>,
    raw: G::Shader,
    stage: ShaderStage,
}

impl<G: GlApi> Shader<G> {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn raw(&self) -> G::Shader {
        self.raw
    }
}

impl<G: GlApi> fmt::Debug for Shader<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("raw", &self.raw)
            .field("stage", &self.stage)
            .finish()
    }
}

impl<G: GlApi> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.raw);
    }
}

/// Compiles `source` for `stage`.
///
/// On failure the driver log (capped at 511 characters) is returned inside
/// [`RendererError::ShaderCompile`] and the shader object is deleted.
pub fn compile<G: GlApi>(gl: &Rc<G>, stage: ShaderStage, source: &str) -> Result<Shader<G>> {
    let raw = gl
        .create_shader(stage)
        .map_err(|reason| RendererError::Allocation {
            object: "shader object",
            reason,
        })?;
    let shader = Shader {
        gl: Rc::clone(gl),
        raw,
        stage,
    };

    gl.shader_source(raw, source);
    gl.compile_shader(raw);
    if !gl.shader_compile_status(raw) {
        let log = bounded_log(&gl.shader_info_log(raw));
        return Err(RendererError::ShaderCompile {
            stage,
            log,
            origin: None,
        });
    }

    tracing::debug!(%stage, bytes = source.len(), "compiled shader");
    Ok(shader)
}

/// Links one vertex and one fragment shader into a program.
///
/// Both shaders are consumed and deleted whether or not linking succeeds.
pub fn link<G: GlApi>(vertex: Shader<G>, fragment: Shader<G>) -> Result<ShaderProgram<G>> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(RendererError::StageMismatch {
            expected: ShaderStage::Vertex,
            actual: vertex.stage,
        });
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err(RendererError::StageMismatch {
            expected: ShaderStage::Fragment,
            actual: fragment.stage,
        });
    }

    let gl = Rc::clone(&vertex.gl);
    let raw = gl
        .create_program()
        .map_err(|reason| RendererError::Allocation {
            object: "shader program",
            reason,
        })?;
    let program = ShaderProgram {
        gl: Rc::clone(&gl),
        raw,
    };

    gl.attach_shader(raw, vertex.raw);
    gl.attach_shader(raw, fragment.raw);
    gl.link_program(raw);
    let linked = gl.program_link_status(raw);
    gl.detach_shader(raw, vertex.raw);
    gl.detach_shader(raw, fragment.raw);

    if !linked {
        let log = bounded_log(&gl.program_info_log(raw));
        return Err(RendererError::ShaderLink { log });
    }

    tracing::debug!(program = ?raw, "linked shader program");
    Ok(program)
}

/// A linked program, ready to bind for drawing.
pub struct ShaderProgram<G: GlApi> {
    gl: Rc<G>,
    raw: G::Program,
}

impl<G: GlApi> ShaderProgram<G> {
    /// Compiles both stages and links them.
    pub fn from_sources(gl: &Rc<G>, vertex: &str, fragment: &str) -> Result<Self> {
        let vertex = compile(gl, ShaderStage::Vertex, vertex)?;
        let fragment = compile(gl, ShaderStage::Fragment, fragment)?;
        link(vertex, fragment)
    }

    /// Loads both stages from disk, then compiles and links them.
    pub fn from_files(
        gl: &Rc<G>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        let vertex = ShaderSource::from_file(vertex_path)?;
        let fragment = ShaderSource::from_file(fragment_path)?;
        tracing::debug!(
            vertex = %vertex_path.display(),
            fragment = %fragment_path.display(),
            "building shader program from files"
        );
        link(
            vertex.compile(gl, ShaderStage::Vertex)?,
            fragment.compile(gl, ShaderStage::Fragment)?,
        )
    }

    /// Makes this the active program for subsequent draw calls.
    pub fn bind(&self) {
        self.gl.use_program(Some(self.raw));
    }

    /// Writes `value` into the uniform called `name`.
    ///
    /// The program is bound first because GL 3.3 only writes uniforms of the
    /// current program. Names that do not resolve to an active uniform are
    /// ignored.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        self.bind();
        match self.gl.uniform_location(self.raw, name) {
            Some(location) => self.gl.set_uniform(&location, value.into()),
            None => tracing::trace!(uniform = name, "uniform not active; write skipped"),
        }
    }

    pub fn raw(&self) -> G::Program {
        self.raw
    }
}

impl<G: GlApi> fmt::Debug for ShaderProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram").field("raw", &self.raw).finish()
    }
}

impl<G: GlApi> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.raw);
    }
}
