//! Reading rendered pixels back from the framebuffer.

use image::imageops::flip_vertical_in_place;
use image::RgbaImage;

use crate::api::GlApi;
use crate::error::{RendererError, Result};

/// Reads the RGBA value of one pixel, with `(0, 0)` at the bottom-left.
pub fn read_pixel<G: GlApi>(gl: &G, x: i32, y: i32) -> [u8; 4] {
    let mut pixel = [0u8; 4];
    gl.read_pixels_rgba(x, y, 1, 1, &mut pixel);
    pixel
}

/// Reads the whole `width` x `height` framebuffer into a top-down image.
pub fn capture_frame<G: GlApi>(gl: &G, width: u32, height: u32) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(RendererError::InvalidData(
            "cannot capture a zero-sized framebuffer".to_string(),
        ));
    }

    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    gl.read_pixels_rgba(0, 0, width as i32, height as i32, &mut pixels);

    let mut image = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
        RendererError::InvalidData("captured pixel buffer has the wrong size".into())
    })?;
    // GL rows start at the bottom
    flip_vertical_in_place(&mut image);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeGl;

    fn two_row_framebuffer() -> FakeGl {
        let gl = FakeGl::default();
        // bottom row red, top row blue
        let mut pixels = Vec::new();
        pixels.extend_from_slice(&[255, 0, 0, 255, 255, 0, 0, 255]);
        pixels.extend_from_slice(&[0, 0, 255, 255, 0, 0, 255, 255]);
        gl.set_framebuffer(2, 2, pixels);
        gl
    }

    #[test]
    fn read_pixel_uses_bottom_left_origin() {
        let gl = two_row_framebuffer();
        assert_eq!(read_pixel(&gl, 0, 0), [255, 0, 0, 255]);
        assert_eq!(read_pixel(&gl, 1, 1), [0, 0, 255, 255]);
    }

    #[test]
    fn capture_flips_to_top_down_rows() {
        let gl = two_row_framebuffer();
        let image = capture_frame(&gl, 2, 2).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn capture_rejects_empty_framebuffer() {
        let gl = FakeGl::default();
        assert!(capture_frame(&gl, 0, 10).is_err());
    }

    #[test]
    fn capture_keeps_middle_row_of_odd_heights() {
        let gl = FakeGl::default();
        let pixels: Vec<u8> = (0..3).flat_map(|row| [row; 4]).collect();
        gl.set_framebuffer(1, 3, pixels);
        let image = capture_frame(&gl, 1, 3).unwrap();
        assert_eq!(image.into_raw(), vec![2, 2, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0]);
    }
}
