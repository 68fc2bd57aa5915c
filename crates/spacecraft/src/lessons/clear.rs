use anyhow::Result;
use renderer::{FrameInfo, Scene};

/// The framebuffer is cleared by the render loop; nothing else is drawn.
pub struct ClearScene;

impl Scene for ClearScene {
    fn draw(&mut self, _frame: &FrameInfo) -> Result<()> {
        Ok(())
    }
}
