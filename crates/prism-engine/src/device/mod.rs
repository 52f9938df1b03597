//! GL device seam.
//!
//! The rest of the engine talks to the driver only through [`Device`]:
//! - [`GlowDevice`] issues the calls against a live GL context
//! - [`RecordingDevice`] records them as [`Call`] values for tests and headless runs
//!
//! Raw handles are plain copyable ids; the resource wrappers in
//! [`crate::resources`] own them and delete them on drop.

mod gl;
mod recording;
mod types;

use std::num::NonZeroU32;

use crate::color::Color;
use crate::state::{Capability, Param};

pub use gl::GlowDevice;
pub use recording::{Call, RecordingDevice};
pub use types::{
    AttachmentPoint, AttribType, AttributeDescriptor, BufferTarget, BufferUsage, Channels,
    ClearFlags, ComponentType, Extent, Filter, FramebufferStatus, PixelFormat, Pixels, Region,
    ShaderStage, TexParam, TextureFormat, TextureKind, Topology, UniformData, Wrap,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawBuffer(pub NonZeroU32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawVertexArray(pub NonZeroU32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawTexture(pub NonZeroU32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawFramebuffer(pub NonZeroU32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawShader(pub NonZeroU32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawProgram(pub NonZeroU32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawUniformLocation(pub u32);

/// Driver calls issued by the engine.
///
/// Methods take `&self`: a GL context is single-threaded global state and the
/// engine shares one device between every resource through `Rc<dyn Device>`.
/// Object creation can fail; everything else reports errors through
/// [`Device::poll_error`], like GL itself.
pub trait Device {
    // ── limits / diagnostics ──────────────────────────────────────────────

    /// Combined texture image units available to all stages.
    fn max_texture_units(&self) -> u32;
    fn max_color_attachments(&self) -> u32;
    /// Whether [`Device::clear_texture`] is available.
    fn supports_texture_clear(&self) -> bool;
    /// Pops the oldest pending driver error code.
    fn poll_error(&self) -> Option<u32>;

    // ── fixed function ────────────────────────────────────────────────────

    fn enable(&self, cap: Capability);
    fn disable(&self, cap: Capability);
    fn set_param(&self, param: &Param);
    fn viewport(&self, x: i32, y: i32, width: u32, height: u32);

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Result<RawBuffer, String>;
    fn delete_buffer(&self, buffer: RawBuffer);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<RawBuffer>);
    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<RawBuffer>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    // ── vertex input ──────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<RawVertexArray, String>;
    fn delete_vertex_array(&self, vao: RawVertexArray);
    fn bind_vertex_array(&self, vao: Option<RawVertexArray>);
    fn enable_vertex_attrib(&self, index: u32);
    fn disable_vertex_attrib(&self, index: u32);
    /// Points the attribute at the buffer currently bound to `Array`.
    fn vertex_attrib_pointer(&self, attribute: &AttributeDescriptor);
    fn draw_arrays(&self, topology: Topology, first: u32, count: u32);

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<RawTexture, String>;
    fn delete_texture(&self, texture: RawTexture);
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, kind: TextureKind, texture: Option<RawTexture>);
    fn tex_parameter(&self, kind: TextureKind, param: TexParam);
    /// Allocates (and optionally fills) level `level` of the bound texture.
    fn tex_image(
        &self,
        kind: TextureKind,
        level: u32,
        format: TextureFormat,
        extent: Extent,
        pixels: Option<Pixels<'_>>,
    );
    fn generate_mipmap(&self, kind: TextureKind);
    /// Fills `region` of `level`; `data == None` clears to zero.
    fn clear_texture(
        &self,
        texture: RawTexture,
        level: u32,
        region: Region,
        format: PixelFormat,
        data: Option<&[u8]>,
    );

    // ── framebuffers ──────────────────────────────────────────────────────

    fn create_framebuffer(&self) -> Result<RawFramebuffer, String>;
    fn delete_framebuffer(&self, framebuffer: RawFramebuffer);
    /// `None` binds the default (on-screen) framebuffer.
    fn bind_framebuffer(&self, framebuffer: Option<RawFramebuffer>);
    fn framebuffer_texture(
        &self,
        point: AttachmentPoint,
        kind: TextureKind,
        texture: Option<RawTexture>,
        level: u32,
    );
    fn draw_buffers(&self, points: &[AttachmentPoint]);
    fn framebuffer_status(&self) -> FramebufferStatus;

    // ── clears ────────────────────────────────────────────────────────────

    fn clear_color(&self, color: Color);
    fn clear_depth(&self, depth: f32);
    fn clear_stencil(&self, stencil: i32);
    fn clear(&self, flags: ClearFlags);
    fn clear_buffer_color(&self, draw_buffer: u32, color: Color);
    fn clear_buffer_depth(&self, depth: f32);
    fn clear_buffer_stencil(&self, stencil: i32);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<RawShader, String>;
    fn delete_shader(&self, shader: RawShader);
    /// Uploads and compiles; `Err` carries the info log.
    fn compile_shader(&self, shader: RawShader, source: &str) -> Result<(), String>;
    fn create_program(&self) -> Result<RawProgram, String>;
    fn delete_program(&self, program: RawProgram);
    fn attach_shader(&self, program: RawProgram, shader: RawShader);
    fn detach_shader(&self, program: RawProgram, shader: RawShader);
    /// Links; `Err` carries the info log.
    fn link_program(&self, program: RawProgram) -> Result<(), String>;
    fn use_program(&self, program: Option<RawProgram>);
    fn uniform_location(&self, program: RawProgram, name: &str) -> Option<RawUniformLocation>;
    /// Uploads to the program currently in use.
    fn set_uniform(&self, location: RawUniformLocation, value: &UniformData);
    fn storage_block_index(&self, program: RawProgram, name: &str) -> Option<u32>;
    fn storage_block_binding(&self, program: RawProgram, block_index: u32, binding: u32);
    fn dispatch_compute(&self, groups: [u32; 3]);
}
