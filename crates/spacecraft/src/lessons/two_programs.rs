use std::rc::Rc;

use anyhow::Result;
use renderer::{FrameInfo, GlApi, Primitive, Scene, ShaderProgram, VertexArray, VertexLayout};

use super::{Lesson, LessonContext};

#[rustfmt::skip]
pub const LEFT: [f32; 9] = [
    -0.9, -0.5, 0.0,
     0.0, -0.5, 0.0,
    -0.45, 0.5, 0.0,
];

#[rustfmt::skip]
pub const RIGHT: [f32; 9] = [
    0.0,  -0.5, 0.0,
    0.9,  -0.5, 0.0,
    0.45,  0.5, 0.0,
];

/// One triangle per program, each with its own vertex array.
pub struct TwoProgramsScene<G: GlApi> {
    orange: ShaderProgram<G>,
    yellow: ShaderProgram<G>,
    left: VertexArray<G>,
    right: VertexArray<G>,
}

impl<G: GlApi> TwoProgramsScene<G> {
    pub fn new(gl: &Rc<G>, context: &LessonContext<'_>) -> Result<Self> {
        let orange = context.linked_pair(gl, Lesson::TwoPrograms, 0)?;
        let yellow = context.linked_pair(gl, Lesson::TwoPrograms, 1)?;
        let layout = VertexLayout::new().with(0, 3);
        Ok(Self {
            orange,
            yellow,
            left: VertexArray::with_vertices(gl, &LEFT, &layout)?,
            right: VertexArray::with_vertices(gl, &RIGHT, &layout)?,
        })
    }
}

impl<G: GlApi> Scene for TwoProgramsScene<G> {
    fn draw(&mut self, _frame: &FrameInfo) -> Result<()> {
        self.orange.bind();
        self.left.draw_all(Primitive::Triangles);
        self.yellow.bind();
        self.right.draw_all(Primitive::Triangles);
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
    fn triangles_do_not_overlap() {
        let max_left = LEFT.chunks_exact(3).map(|v| v[0]).fold(f32::MIN, f32::max);
        let min_right = RIGHT.chunks_exact(3).map(|v| v[0]).fold(f32::MAX, f32::min);
        assert!(max_left <= min_right);
    }

    #[test]
    fn each_triangle_is_drawn_with_its_own_program() {
        let gl = Rc::new(FakeGl::default());
        let (assets, config) = (bundled_assets(), AppConfig::default());
        let mut scene =
            TwoProgramsScene::new(&gl, &LessonContext::new(&assets, &config)).unwrap();
        assert_ne!(scene.orange.raw(), scene.yellow.raw());
        let built = gl.calls().len();

        scene.draw(&frame(0.0, (800, 600))).unwrap();
        let triangle = Call::DrawArrays {
            primitive: Primitive::Triangles,
            first: 0,
            count: 3,
        };
        assert_eq!(
            gl.calls()[built..],
            [
                Call::UseProgram(Some(scene.orange.raw())),
                Call::BindVertexArray(Some(scene.left.raw())),
                triangle.clone(),
                Call::UseProgram(Some(scene.yellow.raw())),
                Call::BindVertexArray(Some(scene.right.raw())),
                triangle,
            ]
        );
    }
}
