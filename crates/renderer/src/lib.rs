//! OpenGL building blocks for the Spacecraft lessons.
//!
//! The crate wraps the handful of GL objects the lessons need in owned Rust
//! types and drives a single window. The overall flow is:
//!
//! ```text
//!   spacecraft CLI
//!          │ WindowConfig + RenderPolicy
//!          ▼
//!   Renderer::run ──▶ winit window ──▶ create_gl_context() ──▶ build(&Rc<Gl>)
//!          ▲                                                        │
//!          │                                                        ▼
//!          └──── swap / capture ◀── Scene::draw() ◀── clear ◀── RedrawRequested
//! ```
//!
//! Scenes are assembled from [`ShaderProgram`], [`VertexArray`] and
//! [`Texture2d`]. Each of those owns exactly one GL name and deletes it on
//! drop. They are generic over [`GlApi`] so that the bookkeeping can be
//! exercised without a display; the running application always uses
//! [`Gl`].

mod api;
mod capture;
mod context;
mod error;
mod mesh;
mod shader;
mod texture;
mod window;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use api::{
    BufferTarget, BufferUsage, GlApi, Primitive, Sampling, TextureFilter, TextureWrap,
};
pub use capture::{capture_frame, read_pixel};
pub use context::{create_gl_context, GlWindowSurface, GL_VERSION};
pub use error::{RendererError, Result, INFO_LOG_LIMIT};
pub use mesh::{Buffer, VertexArray, VertexAttribute, VertexLayout};
pub use shader::{
    compile, link, Shader, ShaderProgram, ShaderSource, ShaderStage, UniformValue,
};
pub use texture::Texture2d;
pub use window::{FrameInfo, RenderPolicy, Renderer, Scene, WindowConfig};

/// The GL backend used at run time.
pub type Gl = glow::Context;
