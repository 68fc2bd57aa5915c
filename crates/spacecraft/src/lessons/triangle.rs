use std::rc::Rc;

use anyhow::Result;
use renderer::{FrameInfo, GlApi, Primitive, Scene, ShaderProgram, VertexArray, VertexLayout};

use super::{Lesson, LessonContext};

/// Counter-clockwise, `x, y, z` per vertex.
#[rustfmt::skip]
pub const VERTICES: [f32; 9] = [
    -0.5, -0.5, 0.0,
     0.5, -0.5, 0.0,
     0.0,  0.5, 0.0,
];

pub struct TriangleScene<G: GlApi> {
    program: ShaderProgram<G>,
    triangle: VertexArray<G>,
}

impl<G: GlApi> TriangleScene<G> {
    pub fn new(gl: &Rc<G>, context: &LessonContext<'_>) -> Result<Self> {
        let program = context.linked_pair(gl, Lesson::Triangle, 0)?;
        let layout = VertexLayout::new().with(0, 3);
        let triangle = VertexArray::with_vertices(gl, &VERTICES, &layout)?;
        Ok(Self { program, triangle })
    }
}

impl<G: GlApi> Scene for TriangleScene<G> {
    fn draw(&mut self, _frame: &FrameInfo) -> Result<()> {
        self.program.bind();
        self.triangle.draw_all(Primitive::Triangles);
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
    fn centroid_is_inside_clip_space() {
        let (sum_x, sum_y) = VERTICES
            .chunks_exact(3)
            .fold((0.0, 0.0), |(x, y), v| (x + v[0], y + v[1]));
        let centroid = (sum_x / 3.0, sum_y / 3.0);
        assert!((centroid.0 - 0.0f32).abs() < 1e-6);
        assert!((centroid.1 - (-0.5f32 / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn draw_binds_program_then_draws_three_vertices() {
        let gl = Rc::new(FakeGl::default());
        let (assets, config) = (bundled_assets(), AppConfig::default());
        let mut scene = TriangleScene::new(&gl, &LessonContext::new(&assets, &config)).unwrap();
        let built = gl.calls().len();

        scene.draw(&frame(0.0, (800, 600))).unwrap();
        assert_eq!(
            gl.calls()[built..],
            [
                Call::UseProgram(Some(scene.program.raw())),
                Call::BindVertexArray(Some(scene.triangle.raw())),
                Call::DrawArrays {
                    primitive: Primitive::Triangles,
                    first: 0,
                    count: 3,
                },
            ]
        );
    }
}
