//! In-memory stand-in for a GL driver, used by unit tests here and, through
//! the `test-support` feature, by crates that build on the renderer.
//!
//! It does not rasterise anything. It models just enough driver behaviour to
//! exercise the wrappers: compile status (`#error` or a missing `main` fails),
//! link status (every fragment `in` needs a matching vertex `out`), active
//! uniforms, object lifetimes and a readable framebuffer.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::api::{BufferTarget, BufferUsage, GlApi, Primitive, Sampling};
use crate::shader::{ShaderStage, UniformValue};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram(Option<u32>),
    Uniform { name: String, value: UniformValue },
    BindVertexArray(Option<u32>),
    BindBuffer(BufferTarget, Option<u32>),
    BufferData { target: BufferTarget, bytes: usize, usage: BufferUsage },
    AttribPointer { index: u32, components: i32, stride: i32, offset: i32 },
    EnableAttrib(u32),
    ActiveTexture(u32),
    BindTexture(Option<u32>),
    Sampling(Sampling),
    Upload { width: u32, height: u32, bytes: usize },
    GenerateMipmap,
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear,
    PolygonMode { wireframe: bool },
    DrawArrays { primitive: Primitive, first: i32, count: i32 },
    DrawElements { primitive: Primitive, count: i32, offset: i32 },
}

#[derive(Debug)]
struct FakeShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeUniform {
    program: u32,
    name: String,
}

#[derive(Debug, Default)]
struct Framebuffer {
    width: i32,
    height: i32,
    // Rows stored bottom-up, like GL.
    pixels: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    next_name: u32,
    shaders: BTreeMap<u32, FakeShader>,
    programs: BTreeMap<u32, FakeProgram>,
    vertex_arrays: BTreeSet<u32>,
    buffers: BTreeSet<u32>,
    textures: BTreeSet<u32>,
    created_shaders: usize,
    created_programs: usize,
    current_program: Option<u32>,
    log_padding: usize,
    framebuffer: Framebuffer,
    calls: Vec<Call>,
}

impl State {
    fn name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }
}

#[derive(Debug, Default)]
pub struct FakeGl {
    state: RefCell<State>,
}

impl FakeGl {
    pub fn set_log_padding(&self, extra: usize) {
        self.state.borrow_mut().log_padding = extra;
    }

    pub fn set_framebuffer(&self, width: i32, height: i32, pixels: Vec<u8>) {
        assert_eq!(pixels.len(), (width * height * 4) as usize);
        self.state.borrow_mut().framebuffer = Framebuffer {
            width,
            height,
            pixels,
        };
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn created_shaders(&self) -> usize {
        self.state.borrow().created_shaders
    }

    pub fn created_programs(&self) -> usize {
        self.state.borrow().created_programs
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    pub fn active_uniforms(&self, program: u32) -> Vec<String> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|program| program.uniforms.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// Names declared by lines shaped like `<qualifier> <type> <name>;`.
fn declared(source: &str, qualifier: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix(qualifier)?.strip_prefix(' ')?;
            let name = rest.split_whitespace().last()?.trim_end_matches(';');
            Some(name.to_string())
        })
        .collect()
}

impl GlApi for FakeGl {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = FakeUniform;
    type VertexArray = u32;
    type Buffer = u32;
    type Texture = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let name = state.name();
        state.created_shaders += 1;
        state.shaders.insert(
            name,
            FakeShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(name)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        let shader = state.shaders.get_mut(&shader).expect("live shader");
        shader.source = source.to_string();
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        let padding = state.log_padding;
        let shader = state.shaders.get_mut(&shader).expect("live shader");
        let valid = !shader.source.contains("#error") && shader.source.contains("void main");
        shader.compiled = valid;
        if !valid {
            shader.log = format!(
                "0:1(1): error: syntax error in {} shader{}\n\0",
                shader.stage,
                "!".repeat(padding)
            );
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state.borrow().shaders[&shader].compiled
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state.borrow().shaders[&shader].log.clone()
    }

    fn delete_shader(&self, shader: u32) {
        let removed = self.state.borrow_mut().shaders.remove(&shader);
        assert!(removed.is_some(), "shader {shader} deleted twice");
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let name = state.name();
        state.created_programs += 1;
        state.programs.insert(name, FakeProgram::default());
        Ok(name)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        assert!(state.shaders.contains_key(&shader), "attach of dead shader");
        let program = state.programs.get_mut(&program).expect("live program");
        program.attached.push(shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        let program = state.programs.get_mut(&program).expect("live program");
        program.attached.retain(|attached| *attached != shader);
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let attached = state.programs[&program].attached.clone();

        let mut outputs = Vec::new();
        let mut inputs = Vec::new();
        let mut uniforms = Vec::new();
        let mut errors = Vec::new();
        for name in &attached {
            let shader = &state.shaders[name];
            if !shader.compiled {
                errors.push(format!("error: {} shader was not compiled", shader.stage));
            }
            match shader.stage {
                ShaderStage::Vertex => outputs.extend(declared(&shader.source, "out")),
                ShaderStage::Fragment => inputs.extend(declared(&shader.source, "in")),
            }
            for uniform in declared(&shader.source, "uniform") {
                if !uniforms.contains(&uniform) {
                    uniforms.push(uniform);
                }
            }
        }
        for input in inputs {
            if !outputs.contains(&input) {
                errors.push(format!(
                    "error: fragment shader input `{input}` has no matching vertex output"
                ));
            }
        }

        let program = state.programs.get_mut(&program).expect("live program");
        program.linked = errors.is_empty();
        program.log = errors.join("\n");
        program.uniforms = if program.linked { uniforms } else { Vec::new() };
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state.borrow().programs[&program].linked
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state.borrow().programs[&program].log.clone()
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current_program = program;
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let removed = state.programs.remove(&program);
        assert!(removed.is_some(), "program {program} deleted twice");
        if state.current_program == Some(program) {
            state.current_program = None;
        }
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<FakeUniform> {
        let state = self.state.borrow();
        let linked = state.programs.get(&program)?;
        linked
            .uniforms
            .iter()
            .any(|uniform| uniform == name)
            .then(|| FakeUniform {
                program,
                name: name.to_string(),
            })
    }

    fn set_uniform(&self, location: &FakeUniform, value: UniformValue) {
        assert_eq!(
            self.current_program(),
            Some(location.program),
            "uniform written while another program is bound"
        );
        self.record(Call::Uniform {
            name: location.name.clone(),
            value,
        });
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let name = state.name();
        state.vertex_arrays.insert(name);
        Ok(name)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let removed = self.state.borrow_mut().vertex_arrays.remove(&vertex_array);
        assert!(removed, "vertex array {vertex_array} deleted twice");
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, components: i32, stride: i32, offset: i32) {
        self.record(Call::AttribPointer {
            index,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableAttrib(index));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let name = state.name();
        state.buffers.insert(name);
        Ok(name)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(Call::BufferData {
            target,
            bytes: data.len(),
            usage,
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        let removed = self.state.borrow_mut().buffers.remove(&buffer);
        assert!(removed, "buffer {buffer} deleted twice");
    }

    fn create_texture(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let name = state.name();
        state.textures.insert(name);
        Ok(name)
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture_2d(&self, texture: Option<u32>) {
        self.record(Call::BindTexture(texture));
    }

    fn texture_sampling(&self, sampling: Sampling) {
        self.record(Call::Sampling(sampling));
    }

    fn upload_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        self.record(Call::Upload {
            width,
            height,
            bytes: pixels.len(),
        });
    }

    fn generate_mipmap(&self) {
        self.record(Call::GenerateMipmap);
    }

    fn delete_texture(&self, texture: u32) {
        let removed = self.state.borrow_mut().textures.remove(&texture);
        assert!(removed, "texture {texture} deleted twice");
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(Call::ClearColor(rgba));
    }

    fn clear(&self) {
        self.record(Call::Clear);
    }

    fn polygon_mode(&self, wireframe: bool) {
        self.record(Call::PolygonMode { wireframe });
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        self.record(Call::DrawArrays {
            primitive,
            first,
            count,
        });
    }

    fn draw_elements_u32(&self, primitive: Primitive, count: i32, offset: i32) {
        self.record(Call::DrawElements {
            primitive,
            count,
            offset,
        });
    }

    fn read_pixels_rgba(&self, x: i32, y: i32, width: i32, height: i32, out: &mut [u8]) {
        let state = self.state.borrow();
        let fb = &state.framebuffer;
        for row in 0..height {
            for col in 0..width {
                let (src_x, src_y) = (x + col, y + row);
                let dst = ((row * width + col) * 4) as usize;
                if src_x < 0 || src_y < 0 || src_x >= fb.width || src_y >= fb.height {
                    out[dst..dst + 4].fill(0);
                    continue;
                }
                let src = ((src_y * fb.width + src_x) * 4) as usize;
                out[dst..dst + 4].copy_from_slice(&fb.pixels[src..src + 4]);
            }
        }
    }
}
