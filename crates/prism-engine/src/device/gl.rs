use std::ffi::{CStr, c_void};

use glow::{HasContext, PixelUnpackData};

use crate::color::Color;
use crate::state::{
    BlendFactor, BlendOp, Capability, CompareFunc, Face, FillMode, Param, StencilAction,
};

use super::{
    AttachmentPoint, AttribType, AttributeDescriptor, BufferTarget, BufferUsage, Channels,
    ClearFlags, ComponentType, Device, Extent, Filter, FramebufferStatus, PixelFormat, Pixels,
    RawBuffer, RawFramebuffer, RawProgram, RawShader, RawTexture, RawUniformLocation,
    RawVertexArray, Region, ShaderStage, TexParam, TextureFormat, TextureKind, Topology,
    UniformData, Wrap,
};

type PointSizeFn = unsafe extern "system" fn(f32);
type PrimitiveRestartIndexFn = unsafe extern "system" fn(u32);
type MinSampleShadingFn = unsafe extern "system" fn(f32);
type SampleCoverageFn = unsafe extern "system" fn(f32, u8);
type SampleMaskiFn = unsafe extern "system" fn(u32, u32);
type ClearTexSubImageFn =
    unsafe extern "system" fn(u32, i32, i32, i32, i32, i32, i32, i32, u32, u32, *const c_void);

/// Entry points `glow` does not wrap, resolved through the context's loader.
struct ExtraFns {
    point_size: Option<PointSizeFn>,
    primitive_restart_index: Option<PrimitiveRestartIndexFn>,
    min_sample_shading: Option<MinSampleShadingFn>,
    sample_coverage: Option<SampleCoverageFn>,
    sample_maski: Option<SampleMaskiFn>,
    clear_tex_sub_image: Option<ClearTexSubImageFn>,
}

impl ExtraFns {
    fn load(loader: &mut dyn FnMut(&CStr) -> *const c_void) -> Self {
        // SAFETY: each symbol is transmuted to the signature the GL registry
        // declares for it.
        unsafe {
            Self {
                point_size: load_fn(loader, c"glPointSize"),
                primitive_restart_index: load_fn(loader, c"glPrimitiveRestartIndex"),
                min_sample_shading: load_fn(loader, c"glMinSampleShading"),
                sample_coverage: load_fn(loader, c"glSampleCoverage"),
                sample_maski: load_fn(loader, c"glSampleMaski"),
                clear_tex_sub_image: load_fn(loader, c"glClearTexSubImage"),
            }
        }
    }
}

/// # Safety
/// `F` must be an `extern "system"` fn pointer type matching the symbol.
unsafe fn load_fn<F: Copy>(loader: &mut dyn FnMut(&CStr) -> *const c_void, name: &CStr) -> Option<F> {
    debug_assert_eq!(size_of::<F>(), size_of::<*const c_void>());
    let ptr = loader(name);
    if ptr.is_null() {
        log::warn!("GL entry point {name:?} unavailable; calls to it are ignored");
        None
    } else {
        Some(unsafe { std::mem::transmute_copy::<*const c_void, F>(&ptr) })
    }
}

/// [`Device`] over a current `glow` context.
///
/// The context must stay current on the calling thread for the device's
/// lifetime.
pub struct GlowDevice {
    gl: glow::Context,
    extra: ExtraFns,
    max_texture_units: u32,
    max_color_attachments: u32,
}

impl GlowDevice {
    /// Wraps `gl`. `loader` is the proc-address function the context was
    /// built from.
    pub fn new(gl: glow::Context, mut loader: impl FnMut(&CStr) -> *const c_void) -> Self {
        let extra = ExtraFns::load(&mut loader);

        // SAFETY: plain state queries on a current context.
        let (max_texture_units, max_color_attachments) = unsafe {
            log::info!(
                "GL {} on {}",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER)
            );
            (
                gl.get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS).max(0) as u32,
                gl.get_parameter_i32(glow::MAX_COLOR_ATTACHMENTS).max(0) as u32,
            )
        };
        log::debug!(
            "device limits: {max_texture_units} texture units, {max_color_attachments} color attachments"
        );

        Self {
            gl,
            extra,
            max_texture_units,
            max_color_attachments,
        }
    }

    /// The wrapped context, for calls the engine does not cover.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

// SAFETY: every call below only requires the context to be current.
impl Device for GlowDevice {
    fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    fn max_color_attachments(&self) -> u32 {
        self.max_color_attachments
    }

    fn supports_texture_clear(&self) -> bool {
        self.extra.clear_tex_sub_image.is_some()
    }

    fn poll_error(&self) -> Option<u32> {
        let code = unsafe { self.gl.get_error() };
        (code != glow::NO_ERROR).then_some(code)
    }

    fn enable(&self, cap: Capability) {
        unsafe { self.gl.enable(capability(cap)) }
    }

    fn disable(&self, cap: Capability) {
        unsafe { self.gl.disable(capability(cap)) }
    }

    fn set_param(&self, param: &Param) {
        let gl = &self.gl;
        unsafe {
            match *param {
                Param::BlendFunction(p) => match p.draw_buffer {
                    Some(buf) => gl.blend_func_separate_draw_buffer(
                        buf,
                        blend_factor(p.src_rgb),
                        blend_factor(p.dst_rgb),
                        blend_factor(p.src_alpha),
                        blend_factor(p.dst_alpha),
                    ),
                    None => gl.blend_func_separate(
                        blend_factor(p.src_rgb),
                        blend_factor(p.dst_rgb),
                        blend_factor(p.src_alpha),
                        blend_factor(p.dst_alpha),
                    ),
                },
                Param::BlendEquation(p) => match p.draw_buffer {
                    Some(buf) => {
                        gl.blend_equation_separate_draw_buffer(buf, blend_op(p.rgb), blend_op(p.alpha))
                    }
                    None => gl.blend_equation_separate(blend_op(p.rgb), blend_op(p.alpha)),
                },
                Param::CullFace(p) => gl.cull_face(face(p.0)),
                Param::DepthRange(p) => gl.depth_range_f64(p.near, p.far),
                Param::DepthFunction(p) => gl.depth_func(compare_func(p.0)),
                Param::LineWidth(p) => gl.line_width(p.0),
                Param::PointSize(p) => {
                    if let Some(f) = self.extra.point_size {
                        f(p.0)
                    }
                }
                Param::SampleCoverage(p) => {
                    if let Some(f) = self.extra.sample_coverage {
                        f(p.value, p.invert as u8)
                    }
                }
                Param::PolygonOffset(p) => gl.polygon_offset(p.factor, p.units),
                Param::PolygonMode(p) => gl.polygon_mode(face(p.face), fill_mode(p.mode)),
                Param::StencilFunction(p) => {
                    gl.stencil_func(compare_func(p.func), p.reference, p.mask)
                }
                Param::StencilOperation(p) => gl.stencil_op(
                    stencil_action(p.stencil_fail),
                    stencil_action(p.depth_fail),
                    stencil_action(p.depth_pass),
                ),
                Param::ScissorBox(p) => gl.scissor(p.x, p.y, p.width as i32, p.height as i32),
                Param::PrimitiveRestartIndex(p) => {
                    if let Some(f) = self.extra.primitive_restart_index {
                        f(p.0)
                    }
                }
                Param::MinSampleShading(p) => {
                    if let Some(f) = self.extra.min_sample_shading {
                        f(p.0)
                    }
                }
                Param::SampleMask(p) => {
                    if let Some(f) = self.extra.sample_maski {
                        f(p.mask_number, p.mask)
                    }
                }
            }
        }
    }

    fn viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) }
    }

    // ── buffers ───────────────────────────────────────────────────────────

    fn create_buffer(&self) -> Result<RawBuffer, String> {
        unsafe { self.gl.create_buffer() }.map(|b| RawBuffer(b.0))
    }

    fn delete_buffer(&self, buffer: RawBuffer) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<RawBuffer>) {
        unsafe {
            self.gl
                .bind_buffer(buffer_target(target), buffer.map(|b| glow::NativeBuffer(b.0)))
        }
    }

    fn bind_buffer_base(&self, target: BufferTarget, index: u32, buffer: Option<RawBuffer>) {
        unsafe {
            self.gl.bind_buffer_base(
                buffer_target(target),
                index,
                buffer.map(|b| glow::NativeBuffer(b.0)),
            )
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, buffer_usage(usage))
        }
    }

    // ── vertex input ──────────────────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<RawVertexArray, String> {
        unsafe { self.gl.create_vertex_array() }.map(|v| RawVertexArray(v.0))
    }

    fn delete_vertex_array(&self, vao: RawVertexArray) {
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vao.0)) }
    }

    fn bind_vertex_array(&self, vao: Option<RawVertexArray>) {
        unsafe {
            self.gl
                .bind_vertex_array(vao.map(|v| glow::NativeVertexArray(v.0)))
        }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib(&self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer(&self, a: &AttributeDescriptor) {
        let size = a.components as i32;
        let stride = a.stride as i32;
        let offset = a.offset as i32;
        unsafe {
            if a.ty == AttribType::F32 || a.normalized {
                self.gl
                    .vertex_attrib_pointer_f32(a.index, size, attrib_type(a.ty), a.normalized, stride, offset)
            } else {
                self.gl
                    .vertex_attrib_pointer_i32(a.index, size, attrib_type(a.ty), stride, offset)
            }
        }
    }

    fn draw_arrays(&self, topology: Topology, first: u32, count: u32) {
        unsafe {
            self.gl
                .draw_arrays(primitive(topology), first as i32, count as i32)
        }
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<RawTexture, String> {
        unsafe { self.gl.create_texture() }.map(|t| RawTexture(t.0))
    }

    fn delete_texture(&self, texture: RawTexture) {
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture.0)) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture(&self, kind: TextureKind, texture: Option<RawTexture>) {
        unsafe {
            self.gl
                .bind_texture(texture_kind(kind), texture.map(|t| glow::NativeTexture(t.0)))
        }
    }

    fn tex_parameter(&self, kind: TextureKind, param: TexParam) {
        let (pname, value) = match param {
            TexParam::WrapS(w) => (glow::TEXTURE_WRAP_S, wrap(w) as i32),
            TexParam::WrapT(w) => (glow::TEXTURE_WRAP_T, wrap(w) as i32),
            TexParam::WrapR(w) => (glow::TEXTURE_WRAP_R, wrap(w) as i32),
            TexParam::MinFilter(f) => (glow::TEXTURE_MIN_FILTER, filter(f) as i32),
            TexParam::MagFilter(f) => (glow::TEXTURE_MAG_FILTER, filter(f) as i32),
            TexParam::BaseLevel(l) => (glow::TEXTURE_BASE_LEVEL, l),
            TexParam::MaxLevel(l) => (glow::TEXTURE_MAX_LEVEL, l),
        };
        unsafe { self.gl.tex_parameter_i32(texture_kind(kind), pname, value) }
    }

    fn tex_image(
        &self,
        kind: TextureKind,
        level: u32,
        format: TextureFormat,
        extent: Extent,
        pixels: Option<Pixels<'_>>,
    ) {
        let layout = pixels.map_or(format.upload_format(), |p| p.format);
        let (client_format, client_type) = pixel_format(layout);
        let data = PixelUnpackData::Slice(pixels.map(|p| p.data));
        unsafe {
            match kind {
                TextureKind::D2 => self.gl.tex_image_2d(
                    glow::TEXTURE_2D,
                    level as i32,
                    internal_format(format) as i32,
                    extent.width as i32,
                    extent.height as i32,
                    0,
                    client_format,
                    client_type,
                    data,
                ),
                TextureKind::D3 | TextureKind::D2Array => self.gl.tex_image_3d(
                    texture_kind(kind),
                    level as i32,
                    internal_format(format) as i32,
                    extent.width as i32,
                    extent.height as i32,
                    extent.depth as i32,
                    0,
                    client_format,
                    client_type,
                    data,
                ),
            }
        }
    }

    fn generate_mipmap(&self, kind: TextureKind) {
        unsafe { self.gl.generate_mipmap(texture_kind(kind)) }
    }

    fn clear_texture(
        &self,
        texture: RawTexture,
        level: u32,
        region: Region,
        format: PixelFormat,
        data: Option<&[u8]>,
    ) {
        let Some(clear) = self.extra.clear_tex_sub_image else {
            return;
        };
        let (client_format, client_type) = pixel_format(format);
        let ptr = data.map_or(std::ptr::null(), |d| d.as_ptr().cast::<c_void>());
        // SAFETY: `ptr` is null or points at one texel of `format` held by `data`.
        unsafe {
            clear(
                texture.0.get(),
                level as i32,
                region.x as i32,
                region.y as i32,
                region.z as i32,
                region.extent.width as i32,
                region.extent.height as i32,
                region.extent.depth as i32,
                client_format,
                client_type,
                ptr,
            )
        }
    }

    // ── framebuffers ──────────────────────────────────────────────────────

    fn create_framebuffer(&self) -> Result<RawFramebuffer, String> {
        unsafe { self.gl.create_framebuffer() }.map(|f| RawFramebuffer(f.0))
    }

    fn delete_framebuffer(&self, framebuffer: RawFramebuffer) {
        unsafe { self.gl.delete_framebuffer(glow::NativeFramebuffer(framebuffer.0)) }
    }

    fn bind_framebuffer(&self, framebuffer: Option<RawFramebuffer>) {
        unsafe {
            self.gl.bind_framebuffer(
                glow::FRAMEBUFFER,
                framebuffer.map(|f| glow::NativeFramebuffer(f.0)),
            )
        }
    }

    fn framebuffer_texture(
        &self,
        point: AttachmentPoint,
        kind: TextureKind,
        texture: Option<RawTexture>,
        level: u32,
    ) {
        let texture = texture.map(|t| glow::NativeTexture(t.0));
        unsafe {
            match kind {
                TextureKind::D2 => self.gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    attachment(point),
                    glow::TEXTURE_2D,
                    texture,
                    level as i32,
                ),
                TextureKind::D3 | TextureKind::D2Array => self.gl.framebuffer_texture_layer(
                    glow::FRAMEBUFFER,
                    attachment(point),
                    texture,
                    level as i32,
                    0,
                ),
            }
        }
    }

    fn draw_buffers(&self, points: &[AttachmentPoint]) {
        let buffers: Vec<u32> = points.iter().map(|p| attachment(*p)).collect();
        unsafe { self.gl.draw_buffers(&buffers) }
    }

    fn framebuffer_status(&self) -> FramebufferStatus {
        match unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) } {
            glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
            glow::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
            glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
            glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
            glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
            glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
            glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
            glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
            glow::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => FramebufferStatus::IncompleteLayerTargets,
            other => FramebufferStatus::Other(other),
        }
    }

    // ── clears ────────────────────────────────────────────────────────────

    fn clear_color(&self, c: Color) {
        unsafe { self.gl.clear_color(c.r, c.g, c.b, c.a) }
    }

    fn clear_depth(&self, depth: f32) {
        unsafe { self.gl.clear_depth_f32(depth) }
    }

    fn clear_stencil(&self, stencil: i32) {
        unsafe { self.gl.clear_stencil(stencil) }
    }

    fn clear(&self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe { self.gl.clear(mask) }
    }

    fn clear_buffer_color(&self, draw_buffer: u32, color: Color) {
        unsafe {
            self.gl
                .clear_buffer_f32_slice(glow::COLOR, draw_buffer, &color.to_array())
        }
    }

    fn clear_buffer_depth(&self, depth: f32) {
        unsafe { self.gl.clear_buffer_f32_slice(glow::DEPTH, 0, &[depth]) }
    }

    fn clear_buffer_stencil(&self, stencil: i32) {
        unsafe { self.gl.clear_buffer_i32_slice(glow::STENCIL, 0, &[stencil]) }
    }

    // ── programs ──────────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<RawShader, String> {
        unsafe { self.gl.create_shader(shader_stage(stage)) }.map(|s| RawShader(s.0))
    }

    fn delete_shader(&self, shader: RawShader) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    fn compile_shader(&self, shader: RawShader, source: &str) -> Result<(), String> {
        let shader = glow::NativeShader(shader.0);
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if self.gl.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.gl.get_shader_info_log(shader))
            }
        }
    }

    fn create_program(&self) -> Result<RawProgram, String> {
        unsafe { self.gl.create_program() }.map(|p| RawProgram(p.0))
    }

    fn delete_program(&self, program: RawProgram) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn attach_shader(&self, program: RawProgram, shader: RawShader) {
        unsafe {
            self.gl
                .attach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn detach_shader(&self, program: RawProgram, shader: RawShader) {
        unsafe {
            self.gl
                .detach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn link_program(&self, program: RawProgram) -> Result<(), String> {
        let program = glow::NativeProgram(program.0);
        unsafe {
            self.gl.link_program(program);
            if self.gl.get_program_link_status(program) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(program))
            }
        }
    }

    fn use_program(&self, program: Option<RawProgram>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    fn uniform_location(&self, program: RawProgram, name: &str) -> Option<RawUniformLocation> {
        unsafe {
            self.gl
                .get_uniform_location(glow::NativeProgram(program.0), name)
        }
        .map(|l| RawUniformLocation(l.0))
    }

    fn set_uniform(&self, location: RawUniformLocation, value: &UniformData) {
        let loc = glow::NativeUniformLocation(location.0);
        let loc = Some(&loc);
        let gl = &self.gl;
        unsafe {
            match *value {
                UniformData::Float(v) => gl.uniform_1_f32(loc, v),
                UniformData::Vec2(v) => gl.uniform_2_f32(loc, v.x, v.y),
                UniformData::Vec3(v) => gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformData::Vec4(v) => gl.uniform_4_f32(loc, v.x, v.y, v.z, v.w),
                UniformData::Int(v) => gl.uniform_1_i32(loc, v),
                UniformData::IVec2(v) => gl.uniform_2_i32(loc, v.x, v.y),
                UniformData::IVec3(v) => gl.uniform_3_i32(loc, v.x, v.y, v.z),
                UniformData::IVec4(v) => gl.uniform_4_i32(loc, v.x, v.y, v.z, v.w),
                UniformData::UInt(v) => gl.uniform_1_u32(loc, v),
                UniformData::UVec2(v) => gl.uniform_2_u32(loc, v.x, v.y),
                UniformData::UVec3(v) => gl.uniform_3_u32(loc, v.x, v.y, v.z),
                UniformData::UVec4(v) => gl.uniform_4_u32(loc, v.x, v.y, v.z, v.w),
                UniformData::Mat2(m) => gl.uniform_matrix_2_f32_slice(loc, false, &m.to_cols_array()),
                UniformData::Mat3(m) => gl.uniform_matrix_3_f32_slice(loc, false, &m.to_cols_array()),
                UniformData::Mat4(m) => gl.uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array()),
            }
        }
    }

    fn storage_block_index(&self, program: RawProgram, name: &str) -> Option<u32> {
        unsafe {
            self.gl
                .get_shader_storage_block_index(glow::NativeProgram(program.0), name)
        }
    }

    fn storage_block_binding(&self, program: RawProgram, block_index: u32, binding: u32) {
        unsafe {
            self.gl
                .shader_storage_block_binding(glow::NativeProgram(program.0), block_index, binding)
        }
    }

    fn dispatch_compute(&self, [x, y, z]: [u32; 3]) {
        unsafe { self.gl.dispatch_compute(x, y, z) }
    }
}

// ── enum mapping ──────────────────────────────────────────────────────────

fn capability(cap: Capability) -> u32 {
    match cap {
        Capability::Blend => glow::BLEND,
        Capability::ColorLogicOp => glow::COLOR_LOGIC_OP,
        Capability::CullFace => glow::CULL_FACE,
        Capability::DepthClamp => glow::DEPTH_CLAMP,
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::Dither => glow::DITHER,
        Capability::FramebufferSrgb => glow::FRAMEBUFFER_SRGB,
        Capability::LineSmooth => glow::LINE_SMOOTH,
        Capability::Multisample => glow::MULTISAMPLE,
        Capability::PolygonOffsetFill => glow::POLYGON_OFFSET_FILL,
        Capability::PolygonOffsetLine => glow::POLYGON_OFFSET_LINE,
        Capability::PolygonOffsetPoint => glow::POLYGON_OFFSET_POINT,
        Capability::PolygonSmooth => glow::POLYGON_SMOOTH,
        Capability::PrimitiveRestart => glow::PRIMITIVE_RESTART,
        Capability::PrimitiveRestartFixedIndex => glow::PRIMITIVE_RESTART_FIXED_INDEX,
        Capability::ProgramPointSize => glow::PROGRAM_POINT_SIZE,
        Capability::RasterizerDiscard => glow::RASTERIZER_DISCARD,
        Capability::SampleAlphaToCoverage => glow::SAMPLE_ALPHA_TO_COVERAGE,
        Capability::SampleAlphaToOne => glow::SAMPLE_ALPHA_TO_ONE,
        Capability::SampleCoverage => glow::SAMPLE_COVERAGE,
        Capability::SampleShading => glow::SAMPLE_SHADING,
        Capability::SampleMask => glow::SAMPLE_MASK,
        Capability::ScissorTest => glow::SCISSOR_TEST,
        Capability::StencilTest => glow::STENCIL_TEST,
        Capability::TextureCubeMapSeamless => glow::TEXTURE_CUBE_MAP_SEAMLESS,
    }
}

fn blend_factor(f: BlendFactor) -> u32 {
    match f {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => glow::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => glow::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => glow::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => glow::ONE_MINUS_CONSTANT_ALPHA,
        BlendFactor::SrcAlphaSaturate => glow::SRC_ALPHA_SATURATE,
    }
}

fn blend_op(op: BlendOp) -> u32 {
    match op {
        BlendOp::Add => glow::FUNC_ADD,
        BlendOp::Subtract => glow::FUNC_SUBTRACT,
        BlendOp::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
        BlendOp::Min => glow::MIN,
        BlendOp::Max => glow::MAX,
    }
}

fn face(f: Face) -> u32 {
    match f {
        Face::Front => glow::FRONT,
        Face::Back => glow::BACK,
        Face::FrontAndBack => glow::FRONT_AND_BACK,
    }
}

fn compare_func(f: CompareFunc) -> u32 {
    match f {
        CompareFunc::Never => glow::NEVER,
        CompareFunc::Less => glow::LESS,
        CompareFunc::Equal => glow::EQUAL,
        CompareFunc::LessEqual => glow::LEQUAL,
        CompareFunc::Greater => glow::GREATER,
        CompareFunc::NotEqual => glow::NOTEQUAL,
        CompareFunc::GreaterEqual => glow::GEQUAL,
        CompareFunc::Always => glow::ALWAYS,
    }
}

fn fill_mode(m: FillMode) -> u32 {
    match m {
        FillMode::Point => glow::POINT,
        FillMode::Line => glow::LINE,
        FillMode::Fill => glow::FILL,
    }
}

fn stencil_action(a: StencilAction) -> u32 {
    match a {
        StencilAction::Keep => glow::KEEP,
        StencilAction::Zero => glow::ZERO,
        StencilAction::Replace => glow::REPLACE,
        StencilAction::Incr => glow::INCR,
        StencilAction::IncrWrap => glow::INCR_WRAP,
        StencilAction::Decr => glow::DECR,
        StencilAction::DecrWrap => glow::DECR_WRAP,
        StencilAction::Invert => glow::INVERT,
    }
}

fn buffer_target(t: BufferTarget) -> u32 {
    match t {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        BufferTarget::Uniform => glow::UNIFORM_BUFFER,
        BufferTarget::ShaderStorage => glow::SHADER_STORAGE_BUFFER,
        BufferTarget::CopyRead => glow::COPY_READ_BUFFER,
        BufferTarget::CopyWrite => glow::COPY_WRITE_BUFFER,
        BufferTarget::PixelUnpack => glow::PIXEL_UNPACK_BUFFER,
    }
}

fn buffer_usage(u: BufferUsage) -> u32 {
    match u {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
        BufferUsage::StreamDraw => glow::STREAM_DRAW,
        BufferUsage::StaticRead => glow::STATIC_READ,
        BufferUsage::DynamicCopy => glow::DYNAMIC_COPY,
    }
}

fn primitive(t: Topology) -> u32 {
    match t {
        Topology::Points => glow::POINTS,
        Topology::Lines => glow::LINES,
        Topology::LineStrip => glow::LINE_STRIP,
        Topology::LineLoop => glow::LINE_LOOP,
        Topology::Triangles => glow::TRIANGLES,
        Topology::TriangleStrip => glow::TRIANGLE_STRIP,
        Topology::TriangleFan => glow::TRIANGLE_FAN,
    }
}

fn attrib_type(t: AttribType) -> u32 {
    match t {
        AttribType::F32 => glow::FLOAT,
        AttribType::I8 => glow::BYTE,
        AttribType::U8 => glow::UNSIGNED_BYTE,
        AttribType::I16 => glow::SHORT,
        AttribType::U16 => glow::UNSIGNED_SHORT,
        AttribType::I32 => glow::INT,
        AttribType::U32 => glow::UNSIGNED_INT,
    }
}

fn texture_kind(k: TextureKind) -> u32 {
    match k {
        TextureKind::D2 => glow::TEXTURE_2D,
        TextureKind::D3 => glow::TEXTURE_3D,
        TextureKind::D2Array => glow::TEXTURE_2D_ARRAY,
    }
}

fn internal_format(f: TextureFormat) -> u32 {
    match f {
        TextureFormat::R8 => glow::R8,
        TextureFormat::Rg8 => glow::RG8,
        TextureFormat::Rgb8 => glow::RGB8,
        TextureFormat::Rgba8 => glow::RGBA8,
        TextureFormat::Srgb8Alpha8 => glow::SRGB8_ALPHA8,
        TextureFormat::R32F => glow::R32F,
        TextureFormat::Rg32F => glow::RG32F,
        TextureFormat::Rgba16F => glow::RGBA16F,
        TextureFormat::Rgba32F => glow::RGBA32F,
        TextureFormat::R32UI => glow::R32UI,
        TextureFormat::Depth16 => glow::DEPTH_COMPONENT16,
        TextureFormat::Depth24 => glow::DEPTH_COMPONENT24,
        TextureFormat::Depth32F => glow::DEPTH_COMPONENT32F,
        TextureFormat::Depth24Stencil8 => glow::DEPTH24_STENCIL8,
        TextureFormat::Depth32FStencil8 => glow::DEPTH32F_STENCIL8,
    }
}

fn pixel_format(p: PixelFormat) -> (u32, u32) {
    let format = match p.channels {
        Channels::Red => glow::RED,
        Channels::Rg => glow::RG,
        Channels::Rgb => glow::RGB,
        Channels::Rgba => glow::RGBA,
        Channels::RedInteger => glow::RED_INTEGER,
        Channels::RgbaInteger => glow::RGBA_INTEGER,
        Channels::Depth => glow::DEPTH_COMPONENT,
        Channels::DepthStencil => glow::DEPTH_STENCIL,
    };
    let ty = match p.component {
        ComponentType::U8 => glow::UNSIGNED_BYTE,
        ComponentType::U16 => glow::UNSIGNED_SHORT,
        ComponentType::U32 => glow::UNSIGNED_INT,
        ComponentType::I32 => glow::INT,
        ComponentType::F32 => glow::FLOAT,
        ComponentType::U24S8 => glow::UNSIGNED_INT_24_8,
        ComponentType::F32S24S8 => glow::FLOAT_32_UNSIGNED_INT_24_8_REV,
    };
    (format, ty)
}

fn wrap(w: Wrap) -> u32 {
    match w {
        Wrap::Repeat => glow::REPEAT,
        Wrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
        Wrap::ClampToBorder => glow::CLAMP_TO_BORDER,
    }
}

fn filter(f: Filter) -> u32 {
    match f {
        Filter::Nearest => glow::NEAREST,
        Filter::Linear => glow::LINEAR,
        Filter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        Filter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        Filter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        Filter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }
}

fn attachment(p: AttachmentPoint) -> u32 {
    match p {
        AttachmentPoint::Color(n) => glow::COLOR_ATTACHMENT0 + n,
        AttachmentPoint::Depth => glow::DEPTH_ATTACHMENT,
        AttachmentPoint::Stencil => glow::STENCIL_ATTACHMENT,
        AttachmentPoint::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
    }
}

fn shader_stage(s: ShaderStage) -> u32 {
    match s {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
        ShaderStage::TessEvaluation => glow::TESS_EVALUATION_SHADER,
        ShaderStage::Compute => glow::COMPUTE_SHADER,
    }
}
