use std::f32::consts::TAU;
use std::rc::Rc;

use anyhow::Result;
use renderer::{FrameInfo, GlApi, Primitive, Scene, ShaderProgram, VertexArray, VertexLayout};

use super::{Lesson, LessonContext};

const ASPECT_UNIFORM: &str = "aspect";

/// Triangle-fan vertices (`x, y`): the centre, then `segments + 1` rim points
/// so the last slice closes onto the first.
pub fn fan_vertices(radius: f32, segments: u32) -> Vec<f32> {
    let mut vertices = Vec::with_capacity((segments as usize + 2) * 2);
    vertices.extend_from_slice(&[0.0, 0.0]);
    for step in 0..=segments {
        let angle = if step == segments {
            0.0
        } else {
            TAU * step as f32 / segments as f32
        };
        vertices.push(radius * angle.cos());
        vertices.push(radius * angle.sin());
    }
    vertices
}

/// Horizontal scale that keeps the circle round in a `width` x `height`
/// framebuffer.
pub fn aspect_correction((width, height): (u32, u32)) -> f32 {
    if width == 0 {
        1.0
    } else {
        height as f32 / width as f32
    }
}

pub struct CircleScene<G: GlApi> {
    program: ShaderProgram<G>,
    fan: VertexArray<G>,
}

impl<G: GlApi> CircleScene<G> {
    pub fn new(gl: &Rc<G>, context: &LessonContext<'_>) -> Result<Self> {
        let circle = &context.config().circle;
        let program = context.linked_pair(gl, Lesson::Circle, 0)?;
        let vertices = fan_vertices(circle.radius as f32, circle.segments);
        let fan = VertexArray::with_vertices(gl, &vertices, &VertexLayout::new().with(0, 2))?;
        tracing::debug!(
            radius = circle.radius,
            segments = circle.segments,
            vertices = fan.vertex_count(),
            "built circle fan"
        );
        Ok(Self { program, fan })
    }
}

impl<G: GlApi> Scene for CircleScene<G> {
    fn draw(&mut self, frame: &FrameInfo) -> Result<()> {
        self.program.set_uniform(ASPECT_UNIFORM, aspect_correction(frame.size));
        self.fan.draw_all(Primitive::TriangleFan);
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
    fn fan_starts_at_centre_and_closes() {
        let vertices = fan_vertices(0.5, 100);
        assert_eq!(vertices.len(), 102 * 2);
        assert_eq!(&vertices[..2], &[0.0, 0.0]);
        assert_eq!(&vertices[2..4], &vertices[vertices.len() - 2..]);
    }

    #[test]
    fn rim_points_sit_on_the_radius() {
        let vertices = fan_vertices(0.25, 12);
        for point in vertices[2..].chunks_exact(2) {
            let distance = (point[0] * point[0] + point[1] * point[1]).sqrt();
            assert!((distance - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn aspect_shrinks_x_on_wide_windows() {
        assert!((aspect_correction((1368, 768)) - 768.0 / 1368.0).abs() < 1e-6);
        assert_eq!(aspect_correction((500, 500)), 1.0);
        assert_eq!(aspect_correction((0, 10)), 1.0);
    }

    #[test]
    fn draw_sets_aspect_and_fans_every_vertex() {
        let gl = Rc::new(FakeGl::default());
        let assets = bundled_assets();
        let mut config = AppConfig::default();
        config.circle.segments = 16;
        let mut scene = CircleScene::new(&gl, &LessonContext::new(&assets, &config)).unwrap();
        let built = gl.calls().len();

        scene.draw(&frame(0.0, (1000, 500))).unwrap();
        assert_eq!(
            gl.calls()[built..],
            [
                Call::UseProgram(Some(scene.program.raw())),
                Call::Uniform {
                    name: ASPECT_UNIFORM.to_string(),
                    value: UniformValue::Float(0.5),
                },
                Call::BindVertexArray(Some(scene.fan.raw())),
                Call::DrawArrays {
                    primitive: Primitive::TriangleFan,
                    first: 0,
                    count: 18,
                },
            ]
        );
    }
}
