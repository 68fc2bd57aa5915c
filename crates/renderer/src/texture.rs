//! 2D textures decoded with `image` and uploaded as RGBA8.
//!
//! Images are flipped on load so texture coordinate `(0, 0)` lands on the
//! bottom-left of the picture, matching GL's origin.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use image::imageops::flip_vertical_in_place;
use image::GenericImageView;

use crate::api::{GlApi, Sampling};
use crate::error::{RendererError, Result};

/// A 2D RGBA8 texture.
pub struct Texture2d<G: GlApi> {
    gl: Rc<G>,
    raw: G::Texture,
    width: u32,
    height: u32,
}

impl<G: GlApi> Texture2d<G> {
    /// Decodes an image file and uploads it.
    ///
    /// Rows are flipped so that UV `(0, 0)` samples the bottom-left corner of
    /// the picture, matching GL's texture origin.
    pub fn from_path(gl: &Rc<G>, path: impl AsRef<Path>, sampling: Sampling) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|err| RendererError::resource(path, err))?;
        let (width, height) = image.dimensions();
        let mut rgba = image.to_rgba8();
        flip_vertical_in_place(&mut rgba);

        tracing::debug!(path = %path.display(), width, height, "decoded texture");
        Self::from_rgba8(gl, width, height, rgba.as_raw(), sampling)
    }

    /// Uploads tightly packed RGBA8 pixels, bottom row first.
    pub fn from_rgba8(
        gl: &Rc<G>,
        width: u32,
        height: u32,
        pixels: &[u8],
        sampling: Sampling,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RendererError::InvalidData(format!(
                "texture dimensions must be non-zero (got {width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RendererError::InvalidData(format!(
                "{width}x{height} RGBA8 texture needs {expected} bytes, got {}",
                pixels.len()
            )));
        }

        let raw = gl.create_texture().map_err(|reason| RendererError::Allocation {
            object: "texture",
            reason,
        })?;
        let texture = Self {
            gl: Rc::clone(gl),
            raw,
            width,
            height,
        };

        gl.bind_texture_2d(Some(raw));
        gl.texture_sampling(sampling);
        gl.upload_rgba8(width, height, pixels);
        if sampling.mipmaps {
            gl.generate_mipmap();
        }
        Ok(texture)
    }

    /// Binds the texture to texture unit `unit` (`GL_TEXTURE0 + unit`).
    pub fn bind(&self, unit: u32) {
        self.gl.active_texture(unit);
        self.gl.bind_texture_2d(Some(self.raw));
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn raw(&self) -> G::Texture {
        self.raw
    }
}

impl<G: GlApi> fmt::Debug for Texture2d<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture2d")
            .field("raw", &self.raw)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl<G: GlApi> Drop for Texture2d<G> {
    fn drop(&mut self) {
        self.gl.delete_texture(self.raw);
    }
}
