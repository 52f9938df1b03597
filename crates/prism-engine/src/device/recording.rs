use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::num::NonZeroU32;
use std::rc::Rc;

use crate::color::Color;
use crate::state::{Capability, Param};

use super::{
    AttachmentPoint, AttributeDescriptor, BufferTarget, BufferUsage, ClearFlags, Device, Extent,
    FramebufferStatus, PixelFormat, Pixels, RawBuffer, RawFramebuffer, RawProgram, RawShader,
    RawTexture, RawUniformLocation, RawVertexArray, Region, ShaderStage, TexParam, TextureFormat,
    TextureKind, Topology, UniformData,
};

/// One recorded driver call.
///
/// Pure queries (uniform lookup, framebuffer status, error polling) are not
/// recorded so call sequences stay readable.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enable(Capability),
    Disable(Capability),
    SetParam(Param),
    Viewport { x: i32, y: i32, width: u32, height: u32 },

    CreateBuffer(RawBuffer),
    DeleteBuffer(RawBuffer),
    BindBuffer(BufferTarget, Option<RawBuffer>),
    BindBufferBase(BufferTarget, u32, Option<RawBuffer>),
    BufferData { target: BufferTarget, len: usize, usage: BufferUsage },

    CreateVertexArray(RawVertexArray),
    DeleteVertexArray(RawVertexArray),
    BindVertexArray(Option<RawVertexArray>),
    EnableVertexAttrib(u32),
    DisableVertexAttrib(u32),
    VertexAttribPointer(AttributeDescriptor),
    DrawArrays { topology: Topology, first: u32, count: u32 },

    CreateTexture(RawTexture),
    DeleteTexture(RawTexture),
    ActiveTexture(u32),
    BindTexture(TextureKind, Option<RawTexture>),
    TexParameter(TextureKind, TexParam),
    TexImage {
        kind: TextureKind,
        level: u32,
        format: TextureFormat,
        extent: Extent,
        data_len: Option<usize>,
    },
    GenerateMipmap(TextureKind),
    ClearTexture { texture: RawTexture, level: u32, region: Region, zeroed: bool },

    CreateFramebuffer(RawFramebuffer),
    DeleteFramebuffer(RawFramebuffer),
    BindFramebuffer(Option<RawFramebuffer>),
    FramebufferTexture { point: AttachmentPoint, texture: Option<RawTexture>, level: u32 },
    DrawBuffers(Vec<AttachmentPoint>),

    ClearColor(Color),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(ClearFlags),
    ClearBufferColor(u32, Color),
    ClearBufferDepth(f32),
    ClearBufferStencil(i32),

    CreateShader(RawShader, ShaderStage),
    DeleteShader(RawShader),
    CompileShader(RawShader),
    CreateProgram(RawProgram),
    DeleteProgram(RawProgram),
    AttachShader(RawProgram, RawShader),
    DetachShader(RawProgram, RawShader),
    LinkProgram(RawProgram),
    UseProgram(Option<RawProgram>),
    SetUniform { location: RawUniformLocation, value: UniformData },
    StorageBlockBinding { program: RawProgram, block_index: u32, binding: u32 },
    DispatchCompute([u32; 3]),
}

/// Headless [`Device`] that records every call.
///
/// Object ids come from one counter starting at 1, so every handle the device
/// hands out is distinct across object kinds. Every uniform and storage block
/// name resolves unless hidden with [`RecordingDevice::hide_uniform`] /
/// [`RecordingDevice::hide_storage_block`].
#[derive(Debug)]
pub struct RecordingDevice {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
    live: RefCell<HashSet<u32>>,

    max_texture_units: u32,
    max_color_attachments: u32,
    texture_clear: bool,
    framebuffer_status: FramebufferStatus,

    hidden_uniforms: HashSet<String>,
    hidden_blocks: HashSet<String>,
    locations: RefCell<HashMap<(RawProgram, String), RawUniformLocation>>,
    compile_error: Option<String>,
    link_error: Option<String>,
    pending_errors: RefCell<VecDeque<u32>>,
}

impl RecordingDevice {
    /// A device with 16 texture units and 8 color attachments.
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            live: RefCell::new(HashSet::new()),
            max_texture_units: 16,
            max_color_attachments: 8,
            texture_clear: true,
            framebuffer_status: FramebufferStatus::Complete,
            hidden_uniforms: HashSet::new(),
            hidden_blocks: HashSet::new(),
            locations: RefCell::new(HashMap::new()),
            compile_error: None,
            link_error: None,
            pending_errors: RefCell::new(VecDeque::new()),
        }
    }

    // ── configuration ─────────────────────────────────────────────────────

    pub fn with_max_texture_units(mut self, units: u32) -> Self {
        self.max_texture_units = units;
        self
    }

    pub fn with_max_color_attachments(mut self, attachments: u32) -> Self {
        self.max_color_attachments = attachments;
        self
    }

    pub fn without_texture_clear(mut self) -> Self {
        self.texture_clear = false;
        self
    }

    pub fn with_framebuffer_status(mut self, status: FramebufferStatus) -> Self {
        self.framebuffer_status = status;
        self
    }

    /// Makes `name` resolve to no location in every program.
    pub fn hide_uniform(mut self, name: impl Into<String>) -> Self {
        self.hidden_uniforms.insert(name.into());
        self
    }

    pub fn hide_storage_block(mut self, name: impl Into<String>) -> Self {
        self.hidden_blocks.insert(name.into());
        self
    }

    /// Every shader compile fails with `log`.
    pub fn fail_compile(mut self, log: impl Into<String>) -> Self {
        self.compile_error = Some(log.into());
        self
    }

    /// Every program link fails with `log`.
    pub fn fail_link(mut self, log: impl Into<String>) -> Self {
        self.link_error = Some(log.into());
        self
    }

    /// Queues a driver error for the next [`Device::poll_error`].
    pub fn push_error(&self, code: u32) {
        self.pending_errors.borrow_mut().push_back(code);
    }

    /// Shares the device, keeping a concrete handle for inspection next to
    /// the trait object the engine consumes.
    pub fn shared(self) -> (Rc<Self>, Rc<dyn Device>) {
        let rec = Rc::new(self);
        let device: Rc<dyn Device> = rec.clone();
        (rec, device)
    }

    // ── inspection ────────────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Returns the recorded calls and starts a fresh recording.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of created objects not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.live.borrow().len()
    }

    /// Uniform name behind a location handed out by this device.
    pub fn uniform_name(&self, location: RawUniformLocation) -> Option<String> {
        self.locations
            .borrow()
            .iter()
            .find(|(_, loc)| **loc == location)
            .map(|((_, name), _)| name.clone())
    }

    /// Recorded uniform uploads as `(name, value)` pairs.
    pub fn uniform_uploads(&self) -> Vec<(String, UniformData)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::SetUniform { location, value } => {
                    Some((self.uniform_name(*location).unwrap_or_default(), *value))
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> NonZeroU32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.live.borrow_mut().insert(id);
        NonZeroU32::new(id).unwrap_or(NonZeroU32::MIN)
    }

    fn release(&self, id: NonZeroU32) {
        self.live.borrow_mut().remove(&id.get());
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for RecordingDevice {
    fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    fn max_color_attachments(&self) -> u32 {
        self.max_color_attachments
    }

    fn supports_texture_clear(&self) -> bool {
        self.texture_clear
    }

    fn poll_error(&self) -> Option<u32> {
        self.pending_errors.borrow_mut().pop_front()
    }

    fn enable(&self, cap: Capability) {
        self.record(Call::Enable(cap));
    }

    fn disable(&self, cap: Capability) {
        self.record(Call::Disable(cap));
    }

    fn set_param(&self, param: &Param) {
        self.record(Call::SetParam(*param));
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record(Call::Viewport { x, y, width, height });
    }

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Result<RawBuffer, String> {
        let raw = RawBuffer(self.allocate());
        self.record(Call::CreateBuffer(raw));
        Ok(raw)
    }

    fn delete_buffer(&self, buffer: RawBuffer) {
        self.release(buffer.0);
        self.record(Call::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<RawBuffer>) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<RawBuffer>) {
        self.record(Call::BindBufferBase(target, index, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(Call::BufferData {
            target,
            len: data.len(),
            usage,
        });
    }

    // ── vertex input ──────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<RawVertexArray, String> {
        let raw = RawVertexArray(self.allocate());
        self.record(Call::CreateVertexArray(raw));
        Ok(raw)
    }

    fn delete_vertex_array(&self, vao: RawVertexArray) {
        self.release(vao.0);
        self.record(Call::DeleteVertexArray(vao));
    }

    fn bind_vertex_array(&self, vao: Option<RawVertexArray>) {
        self.record(Call::BindVertexArray(vao));
    }

    fn enable_vertex_attrib(&self, index: u32) {
        self.record(Call::EnableVertexAttrib(index));
    }

    fn disable_vertex_attrib(&self, index: u32) {
        self.record(Call::DisableVertexAttrib(index));
    }

    fn vertex_attrib_pointer(&self, attribute: &AttributeDescriptor) {
        self.record(Call::VertexAttribPointer(*attribute));
    }

    fn draw_arrays(&self, topology: Topology, first: u32, count: u32) {
        self.record(Call::DrawArrays {
            topology,
            first,
            count,
        });
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<RawTexture, String> {
        let raw = RawTexture(self.allocate());
        self.record(Call::CreateTexture(raw));
        Ok(raw)
    }

    fn delete_texture(&self, texture: RawTexture) {
        self.release(texture.0);
        self.record(Call::DeleteTexture(texture));
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, kind: TextureKind, texture: Option<RawTexture>) {
        self.record(Call::BindTexture(kind, texture));
    }

    fn tex_parameter(&self, kind: TextureKind, param: TexParam) {
        self.record(Call::TexParameter(kind, param));
    }

    fn tex_image(
        &self,
        kind: TextureKind,
        level: u32,
        format: TextureFormat,
        extent: Extent,
        pixels: Option<Pixels<'_>>,
    ) {
        self.record(Call::TexImage {
            kind,
            level,
            format,
            extent,
            data_len: pixels.map(|p| p.data.len()),
        });
    }

    fn generate_mipmap(&self, kind: TextureKind) {
        self.record(Call::GenerateMipmap(kind));
    }

    fn clear_texture(
        &self,
        texture: RawTexture,
        level: u32,
        region: Region,
        _format: PixelFormat,
        data: Option<&[u8]>,
    ) {
        self.record(Call::ClearTexture {
            texture,
            level,
            region,
            zeroed: data.is_none(),
        });
    }

    // ── framebuffers ──────────────────────────────────────────────────────

    fn create_framebuffer(&self) -> Result<RawFramebuffer, String> {
        let raw = RawFramebuffer(self.allocate());
        self.record(Call::CreateFramebuffer(raw));
        Ok(raw)
    }

    fn delete_framebuffer(&self, framebuffer: RawFramebuffer) {
        self.release(framebuffer.0);
        self.record(Call::DeleteFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&self, framebuffer: Option<RawFramebuffer>) {
        self.record(Call::BindFramebuffer(framebuffer));
    }

    fn framebuffer_texture(
        &self,
        point: AttachmentPoint,
        _kind: TextureKind,
        texture: Option<RawTexture>,
        level: u32,
    ) {
        self.record(Call::FramebufferTexture {
            point,
            texture,
            level,
        });
    }

    fn draw_buffers(&self, points: &[AttachmentPoint]) {
        self.record(Call::DrawBuffers(points.to_vec()));
    }

    fn framebuffer_status(&self) -> FramebufferStatus {
        self.framebuffer_status
    }

    // ── clears ────────────────────────────────────────────────────────────

    fn clear_color(&self, color: Color) {
        self.record(Call::ClearColor(color));
    }

    fn clear_depth(&self, depth: f32) {
        self.record(Call::ClearDepth(depth));
    }

    fn clear_stencil(&self, stencil: i32) {
        self.record(Call::ClearStencil(stencil));
    }

    fn clear(&self, flags: ClearFlags) {
        self.record(Call::Clear(flags));
    }

    fn clear_buffer_color(&self, draw_buffer: u32, color: Color) {
        self.record(Call::ClearBufferColor(draw_buffer, color));
    }

    fn clear_buffer_depth(&self, depth: f32) {
        self.record(Call::ClearBufferDepth(depth));
    }

    fn clear_buffer_stencil(&self, stencil: i32) {
        self.record(Call::ClearBufferStencil(stencil));
    }

    // ── programs ──────────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<RawShader, String> {
        let raw = RawShader(self.allocate());
        self.record(Call::CreateShader(raw, stage));
        Ok(raw)
    }

    fn delete_shader(&self, shader: RawShader) {
        self.release(shader.0);
        self.record(Call::DeleteShader(shader));
    }

    fn compile_shader(&self, shader: RawShader, _source: &str) -> Result<(), String> {
        self.record(Call::CompileShader(shader));
        match &self.compile_error {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn create_program(&self) -> Result<RawProgram, String> {
        let raw = RawProgram(self.allocate());
        self.record(Call::CreateProgram(raw));
        Ok(raw)
    }

    fn delete_program(&self, program: RawProgram) {
        self.release(program.0);
        self.record(Call::DeleteProgram(program));
    }

    fn attach_shader(&self, program: RawProgram, shader: RawShader) {
        self.record(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: RawProgram, shader: RawShader) {
        self.record(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: RawProgram) -> Result<(), String> {
        self.record(Call::LinkProgram(program));
        match &self.link_error {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn use_program(&self, program: Option<RawProgram>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_location(&self, program: RawProgram, name: &str) -> Option<RawUniformLocation> {
        if self.hidden_uniforms.contains(name) {
            return None;
        }
        let mut locations = self.locations.borrow_mut();
        let next = RawUniformLocation(locations.len() as u32);
        Some(*locations.entry((program, name.to_string())).or_insert(next))
    }

    fn set_uniform(&self, location: RawUniformLocation, value: &UniformData) {
        self.record(Call::SetUniform {
            location,
            value: *value,
        });
    }

    fn storage_block_index(&self, _program: RawProgram, name: &str) -> Option<u32> {
        if self.hidden_blocks.contains(name) {
            None
        } else {
            Some(0)
        }
    }

    fn storage_block_binding(&self, program: RawProgram, block_index: u32, binding: u32) {
        self.record(Call::StorageBlockBinding {
            program,
            block_index,
            binding,
        });
    }

    fn dispatch_compute(&self, groups: [u32; 3]) {
        self.record(Call::DispatchCompute(groups));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_across_kinds() {
        let d = RecordingDevice::new();
        let b = d.create_buffer().unwrap();
        let t = d.create_texture().unwrap();
        assert_ne!(b.0, t.0);
        assert_eq!(d.live_objects(), 2);

        d.delete_buffer(b);
        assert_eq!(d.live_objects(), 1);
    }

    #[test]
    fn uniform_locations_are_stable_per_program_and_name() {
        let d = RecordingDevice::new().hide_uniform("missing");
        let p = d.create_program().unwrap();

        let a = d.uniform_location(p, "a");
        assert_eq!(d.uniform_location(p, "a"), a);
        assert_ne!(d.uniform_location(p, "b"), a);
        assert_eq!(d.uniform_location(p, "missing"), None);

        let loc = a.unwrap();
        assert_eq!(d.uniform_name(loc).as_deref(), Some("a"));
    }

    #[test]
    fn pending_errors_pop_in_order() {
        let d = RecordingDevice::new();
        d.push_error(0x0500);
        d.push_error(0x0502);
        assert_eq!(d.poll_error(), Some(0x0500));
        assert_eq!(d.poll_error(), Some(0x0502));
        assert_eq!(d.poll_error(), None);
    }

    #[test]
    fn take_calls_restarts_recording() {
        let d = RecordingDevice::new();
        d.enable(Capability::Blend);
        assert_eq!(d.take_calls(), vec![Call::Enable(Capability::Blend)]);
        assert_eq!(d.call_count(), 0);
    }
}
