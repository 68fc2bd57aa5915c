use std::rc::Rc;

use anyhow::Result;
use renderer::{
    FrameInfo, GlApi, Primitive, Scene, ShaderProgram, VertexArray, VertexLayout,
};

use super::{Lesson, LessonContext};

#[rustfmt::skip]
pub const VERTICES: [f32; 12] = [
     0.5,  0.5, 0.0, // top right
     0.5, -0.5, 0.0, // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5,  0.5, 0.0, // top left
];

/// Two triangles sharing the bottom-right/top-left diagonal.
pub const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

pub struct RectangleScene<G: GlApi> {
    gl: Rc<G>,
    program: ShaderProgram<G>,
    quad: VertexArray<G>,
    wireframe: bool,
}

impl<G: GlApi> RectangleScene<G> {
    pub fn new(gl: &Rc<G>, context: &LessonContext<'_>) -> Result<Self> {
        let program = context.linked_pair(gl, Lesson::Rectangle, 0)?;
        let layout = VertexLayout::new().with(0, 3);
        let quad = VertexArray::with_indices(gl, &VERTICES, &INDICES, &layout)?;
        let wireframe = context.config().render.wireframe;
        if wireframe {
            tracing::info!("drawing rectangle in wireframe mode");
        }
        Ok(Self {
            gl: Rc::clone(gl),
            program,
            quad,
            wireframe,
        })
    }
}

impl<G: GlApi> Scene for RectangleScene<G> {
    fn draw(&mut self, _frame: &FrameInfo) -> Result<()> {
        self.gl.polygon_mode(self.wireframe);
        self.program.bind();
        self.quad.draw_elements(Primitive::Triangles);
        self.gl.polygon_mode(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lessons::testing::{bundled_assets, frame};
    use appconfig::AppConfig;
    use renderer::fake::{Call, FakeGl};

    #[test]
    fn indices_cover_every_corner_once_per_triangle() {
        let vertex_count = (VERTICES.len() / 3) as u32;
        assert!(INDICES.iter().all(|&index| index < vertex_count));
        for triangle in INDICES.chunks_exact(3) {
            assert_ne!(triangle[0], triangle[1]);
            assert_ne!(triangle[1], triangle[2]);
            assert_ne!(triangle[0], triangle[2]);
        }
        let used: std::collections::BTreeSet<_> = INDICES.iter().copied().collect();
        assert_eq!(used.len(), 4);
    }

    fn draw_calls(wireframe: bool) -> (Vec<Call>, Vec<Call>) {
        let gl = Rc::new(FakeGl::default());
        let assets = bundled_assets();
        let mut config = AppConfig::default();
        config.render.wireframe = wireframe;
        let mut scene = RectangleScene::new(&gl, &LessonContext::new(&assets, &config)).unwrap();
        let built = gl.calls().len();
        scene.draw(&frame(0.0, (800, 600))).unwrap();

        let expected = vec![
            Call::PolygonMode { wireframe },
            Call::UseProgram(Some(scene.program.raw())),
            Call::BindVertexArray(Some(scene.quad.raw())),
            Call::DrawElements {
                primitive: Primitive::Triangles,
                count: INDICES.len() as i32,
                offset: 0,
            },
            Call::PolygonMode { wireframe: false },
        ];
        (gl.calls()[built..].to_vec(), expected)
    }

    #[test]
    fn filled_draw_uses_six_indices() {
        let (actual, expected) = draw_calls(false);
        assert_eq!(actual, expected);
    }

    #[test]
    fn wireframe_is_reset_after_the_draw() {
        let (actual, expected) = draw_calls(true);
        assert_eq!(actual, expected);
        assert_eq!(actual.last(), Some(&Call::PolygonMode { wireframe: false }));
    }
}
