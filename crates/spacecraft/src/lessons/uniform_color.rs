use std::rc::Rc;

use anyhow::Result;
use renderer::{FrameInfo, GlApi, Primitive, Scene, ShaderProgram, VertexArray, VertexLayout};

use super::triangle::VERTICES;
use super::{Lesson, LessonContext};

const COLOR_UNIFORM: &str = "ourColor";

/// Green channel at `seconds`, oscillating within `[0, 1]`.
pub fn pulse_green(seconds: f32) -> f32 {
    seconds.sin() / 2.0 + 0.5
}

pub struct UniformColorScene<G: GlApi> {
    program: ShaderProgram<G>,
    triangle: VertexArray<G>,
}

impl<G: GlApi> UniformColorScene<G> {
    pub fn new(gl: &Rc<G>, context: &LessonContext<'_>) -> Result<Self> {
        let program = context.linked_pair(gl, Lesson::UniformColor, 0)?;
        let layout = VertexLayout::new().with(0, 3);
        let triangle = VertexArray::with_vertices(gl, &VERTICES, &layout)?;
        Ok(Self { program, triangle })
    }
}

impl<G: GlApi> Scene for UniformColorScene<G> {
    fn draw(&mut self, frame: &FrameInfo) -> Result<()> {
        let green = pulse_green(frame.elapsed);
        self.program.set_uniform(COLOR_UNIFORM, [0.0, green, 0.0, 1.0]);
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
    use renderer::UniformValue;

    #[test]
    fn pulse_stays_in_unit_range() {
        assert_eq!(pulse_green(0.0), 0.5);
        assert!((pulse_green(std::f32::consts::FRAC_PI_2) - 1.0).abs() < 1e-6);
        for step in 0..200 {
            let green = pulse_green(step as f32 * 0.1);
            assert!((0.0..=1.0).contains(&green));
        }
    }

    #[test]
    fn draw_writes_pulsing_colour_before_drawing() {
        let gl = Rc::new(FakeGl::default());
        let (assets, config) = (bundled_assets(), AppConfig::default());
        let mut scene =
            UniformColorScene::new(&gl, &LessonContext::new(&assets, &config)).unwrap();
        let built = gl.calls().len();

        let seconds = std::f32::consts::FRAC_PI_2;
        scene.draw(&frame(seconds, (800, 600))).unwrap();
        assert_eq!(
            gl.calls()[built..],
            [
                Call::UseProgram(Some(scene.program.raw())),
                Call::Uniform {
                    name: COLOR_UNIFORM.to_string(),
                    value: UniformValue::Vec4([0.0, pulse_green(seconds), 0.0, 1.0]),
                },
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
