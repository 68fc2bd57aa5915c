//! Vertex arrays, buffers and attribute layouts.

use std::fmt;
use std::mem::size_of;
use std::rc::Rc;

use bytemuck::Pod;

use crate::api::{BufferTarget, BufferUsage, GlApi, Primitive};
use crate::error::{RendererError, Result};

/// A GPU buffer holding vertex or index data.
pub struct Buffer<G: GlApi> {
    gl: Rc<G>,
    raw: G::Buffer,
    target: BufferTarget,
    len: usize,
}

impl<G: GlApi> Buffer<G> {
    /// Creates a buffer, binds it to `target` and uploads `data`.
    ///
    /// Element buffers must be created while the owning vertex array is
    /// bound, since the vertex array records the element binding.
    pub fn new<T: Pod>(
        gl: &Rc<G>,
        target: BufferTarget,
        data: &[T],
        usage: BufferUsage,
    ) -> Result<Self> {
        let raw = gl.create_buffer().map_err(|reason| RendererError::Allocation {
            object: "buffer",
            reason,
        })?;
        let buffer = Self {
            gl: Rc::clone(gl),
            raw,
            target,
            len: data.len(),
        };
        gl.bind_buffer(target, Some(raw));
        gl.buffer_data(target, bytemuck::cast_slice(data), usage);
        Ok(buffer)
    }

    pub fn bind(&self) {
        self.gl.bind_buffer(self.target, Some(self.raw));
    }

    /// Number of elements (not bytes) uploaded at creation.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }
}

impl<G: GlApi> fmt::Debug for Buffer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("raw", &self.raw)
            .field("target", &self.target)
            .field("len", &self.len)
            .finish()
    }
}

impl<G: GlApi> Drop for Buffer<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.raw);
    }
}

/// One interleaved float attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader `layout (location = N)` slot.
    pub location: u32,
    /// Float components (1-4).
    pub components: i32,
}

/// Interleaved float vertex format, e.g. `[position: 3, uv: 2]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute at the next offset.
    pub fn with(mut self, location: u32, components: i32) -> Self {
        self.attributes.push(VertexAttribute {
            location,
            components,
        });
        self
    }

    /// Floats per vertex.
    pub fn floats_per_vertex(&self) -> usize {
        self.attributes
            .iter()
            .map(|attribute| attribute.components as usize)
            .sum()
    }

    /// Bytes between consecutive vertices.
    pub fn stride(&self) -> i32 {
        (self.floats_per_vertex() * size_of::<f32>()) as i32
    }

    /// Points every attribute at the currently bound array buffer.
    pub fn apply<G: GlApi>(&self, gl: &G) {
        let stride = self.stride();
        let mut offset = 0;
        for attribute in &self.attributes {
            gl.vertex_attrib_pointer_f32(attribute.location, attribute.components, stride, offset);
            gl.enable_vertex_attrib_array(attribute.location);
            offset += attribute.components * size_of::<f32>() as i32;
        }
    }
}

/// A vertex array object together with the buffers it references.
pub struct VertexArray<G: GlApi> {
    gl: Rc<G>,
    raw: G::VertexArray,
    _vertices: Option<Buffer<G>>,
    indices: Option<Buffer<G>>,
    vertex_count: i32,
}

impl<G: GlApi> VertexArray<G> {
    /// Creates an empty vertex array.
    pub fn new(gl: &Rc<G>) -> Result<Self> {
        let raw = gl
            .create_vertex_array()
            .map_err(|reason| RendererError::Allocation {
                object: "vertex array",
                reason,
            })?;
        Ok(Self {
            gl: Rc::clone(gl),
            raw,
            _vertices: None,
            indices: None,
            vertex_count: 0,
        })
    }

    /// Builds a vertex array from interleaved floats described by `layout`.
    pub fn with_vertices(gl: &Rc<G>, vertices: &[f32], layout: &VertexLayout) -> Result<Self> {
        Self::build(gl, vertices, None, layout)
    }

    /// Builds an indexed vertex array (vertex buffer plus element buffer).
    pub fn with_indices(
        gl: &Rc<G>,
        vertices: &[f32],
        indices: &[u32],
        layout: &VertexLayout,
    ) -> Result<Self> {
        Self::build(gl, vertices, Some(indices), layout)
    }

    fn build(
        gl: &Rc<G>,
        vertices: &[f32],
        indices: Option<&[u32]>,
        layout: &VertexLayout,
    ) -> Result<Self> {
        let floats = layout.floats_per_vertex();
        if floats == 0 || vertices.len() % floats != 0 {
            return Err(RendererError::InvalidData(format!(
                "vertex data of {} floats does not divide into {floats}-float vertices",
                vertices.len()
            )));
        }

        let mut vao = Self::new(gl)?;
        vao.bind();
        let vbo = Buffer::new(gl, BufferTarget::Array, vertices, BufferUsage::Static)?;
        let ebo = indices
            .map(|indices| Buffer::new(gl, BufferTarget::Element, indices, BufferUsage::Static))
            .transpose()?;
        layout.apply(gl.as_ref());

        gl.bind_buffer(BufferTarget::Array, None);
        gl.bind_vertex_array(None);

        vao.vertex_count = (vertices.len() / floats) as i32;
        vao._vertices = Some(vbo);
        vao.indices = ebo;
        Ok(vao)
    }

    pub fn bind(&self) {
        self.gl.bind_vertex_array(Some(self.raw));
    }

    pub fn raw(&self) -> G::VertexArray {
        self.raw
    }

    /// Vertices in the attached vertex buffer.
    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Indices in the attached element buffer, if any.
    pub fn index_count(&self) -> Option<i32> {
        self.indices.as_ref().map(|indices| indices.len() as i32)
    }

    /// Binds and issues a non-indexed draw.
    pub fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        self.bind();
        self.gl.draw_arrays(primitive, first, count);
    }

    /// Draws every vertex in the attached vertex buffer.
    pub fn draw_all(&self, primitive: Primitive) {
        self.draw_arrays(primitive, 0, self.vertex_count);
    }

    /// Binds and issues an indexed draw using the attached element buffer.
    ///
    /// Falls back to a plain draw when no element buffer was attached.
    pub fn draw_elements(&self, primitive: Primitive) {
        match self.index_count() {
            Some(count) => {
                self.bind();
                self.gl.draw_elements_u32(primitive, count, 0);
            }
            None => self.draw_all(primitive),
        }
    }
}

impl<G: GlApi> fmt::Debug for VertexArray<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexArray")
            .field("raw", &self.raw)
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count())
            .finish()
    }
}

impl<G: GlApi> Drop for VertexArray<G> {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.raw);
    }
}
