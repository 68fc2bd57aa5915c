use std::rc::Rc;

use anyhow::{Context, Result};
use renderer::{
    FrameInfo, GlApi, Primitive, Sampling, Scene, ShaderProgram, Texture2d, VertexArray,
    VertexLayout,
};

use super::rectangle::INDICES;
use super::{Lesson, LessonContext};

const SAMPLER_UNIFORM: &str = "texture1";
const TEXTURE_UNIT: u32 = 0;

/// Position (`x, y, z`) followed by texture coordinates (`u, v`).
#[rustfmt::skip]
pub const VERTICES: [f32; 20] = [
     0.5,  0.5, 0.0,  1.0, 1.0,
     0.5, -0.5, 0.0,  1.0, 0.0,
    -0.5, -0.5, 0.0,  0.0, 0.0,
    -0.5,  0.5, 0.0,  0.0, 1.0,
];

pub struct TexturedScene<G: GlApi> {
    program: ShaderProgram<G>,
    quad: VertexArray<G>,
    texture: Texture2d<G>,
}

impl<G: GlApi> TexturedScene<G> {
    pub fn new(gl: &Rc<G>, context: &LessonContext<'_>) -> Result<Self> {
        let program = context.linked_pair(gl, Lesson::Textured, 0)?;
        let layout = VertexLayout::new().with(0, 3).with(1, 2);
        let quad = VertexArray::with_indices(gl, &VERTICES, &INDICES, &layout)?;

        let path = context.asset(&context.config().assets.texture);
        let texture = Texture2d::from_path(gl, &path, Sampling::default())
            .with_context(|| format!("failed to load texture {}", path.display()))?;
        let (width, height) = texture.size();
        tracing::info!(path = %path.display(), width, height, "loaded texture");

        program.set_uniform(SAMPLER_UNIFORM, TEXTURE_UNIT as i32);
        Ok(Self {
            program,
            quad,
            texture,
        })
    }
}

impl<G: GlApi> Scene for TexturedScene<G> {
    fn draw(&mut self, _frame: &FrameInfo) -> Result<()> {
        self.texture.bind(TEXTURE_UNIT);
        self.program.bind();
        self.quad.draw_elements(Primitive::Triangles);
        Ok(())
    }
}
