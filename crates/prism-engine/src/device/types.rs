use bitflags::bitflags;
use glam::{IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};

use crate::color::Color;

// ── buffers ───────────────────────────────────────────────────────────────

/// Buffer binding point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferTarget {
    Array,
    ElementArray,
    Uniform,
    ShaderStorage,
    CopyRead,
    CopyWrite,
    PixelUnpack,
}

/// Upload usage hint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
    StreamDraw,
    StaticRead,
    DynamicCopy,
}

// ── vertex input ──────────────────────────────────────────────────────────

/// Primitive topology of a non-indexed draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Component type of a vertex attribute as stored in the buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttribType {
    F32,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
}

impl AttribType {
    pub const fn size_bytes(self) -> u32 {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::F32 | Self::I32 | Self::U32 => 4,
        }
    }
}

/// Layout of one vertex attribute inside its buffer.
///
/// Integer types with `normalized == false` reach the shader as integers;
/// everything else reaches it as floats.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AttributeDescriptor {
    pub index: u32,
    /// Components per vertex, `1..=4`.
    pub components: u8,
    pub ty: AttribType,
    pub normalized: bool,
    /// Byte distance between consecutive vertices; `0` means tightly packed.
    pub stride: u32,
    pub offset: u32,
}

impl AttributeDescriptor {
    /// Tightly packed `f32` attribute.
    pub const fn float(index: u32, components: u8) -> Self {
        Self {
            index,
            components,
            ty: AttribType::F32,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Size in bytes of one vertex worth of this attribute when tightly packed.
    pub const fn packed_size(&self) -> u32 {
        self.components as u32 * self.ty.size_bytes()
    }
}

// ── textures ──────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureKind {
    D2,
    D3,
    D2Array,
}

/// Size of a texture image. 2D textures have `depth == 1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }

    pub const fn d2(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    /// Size of mip `level`, never below one texel per axis.
    pub fn mip(self, level: u32) -> Self {
        let shrink = |v: u32| v.checked_shr(level).unwrap_or(0).max(1);
        Self::new(shrink(self.width), shrink(self.height), shrink(self.depth))
    }

    pub fn texel_count(self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }
}

/// Sub-box of a texture level.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub extent: Extent,
}

impl Region {
    /// The whole of an image of size `extent`.
    pub const fn whole(extent: Extent) -> Self {
        Self { x: 0, y: 0, z: 0, extent }
    }
}

/// Sized internal format of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    Rg8,
    Rgb8,
    Rgba8,
    Srgb8Alpha8,
    R32F,
    Rg32F,
    Rgba16F,
    Rgba32F,
    R32UI,
    Depth16,
    Depth24,
    Depth32F,
    Depth24Stencil8,
    Depth32FStencil8,
}

impl TextureFormat {
    pub const fn is_depth(self) -> bool {
        matches!(
            self,
            Self::Depth16 | Self::Depth24 | Self::Depth32F | Self::Depth24Stencil8 | Self::Depth32FStencil8
        )
    }

    pub const fn has_stencil(self) -> bool {
        matches!(self, Self::Depth24Stencil8 | Self::Depth32FStencil8)
    }

    /// Client-side layout that uploads to this format without conversion.
    pub const fn upload_format(self) -> PixelFormat {
        use ComponentType as T;
        let (channels, component) = match self {
            Self::R8 => (Channels::Red, T::U8),
            Self::Rg8 => (Channels::Rg, T::U8),
            Self::Rgb8 => (Channels::Rgb, T::U8),
            Self::Rgba8 | Self::Srgb8Alpha8 => (Channels::Rgba, T::U8),
            Self::R32F => (Channels::Red, T::F32),
            Self::Rg32F => (Channels::Rg, T::F32),
            Self::Rgba16F | Self::Rgba32F => (Channels::Rgba, T::F32),
            Self::R32UI => (Channels::RedInteger, T::U32),
            Self::Depth16 | Self::Depth24 => (Channels::Depth, T::U32),
            Self::Depth32F => (Channels::Depth, T::F32),
            Self::Depth24Stencil8 => (Channels::DepthStencil, T::U24S8),
            Self::Depth32FStencil8 => (Channels::DepthStencil, T::F32S24S8),
        };
        PixelFormat { channels, component }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channels {
    Red,
    Rg,
    Rgb,
    Rgba,
    RedInteger,
    RgbaInteger,
    Depth,
    DepthStencil,
}

impl Channels {
    pub const fn count(self) -> u32 {
        match self {
            Self::Red | Self::RedInteger | Self::Depth => 1,
            Self::Rg | Self::DepthStencil => 2,
            Self::Rgb => 3,
            Self::Rgba | Self::RgbaInteger => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    U8,
    U16,
    U32,
    I32,
    F32,
    /// Packed 24-bit depth + 8-bit stencil.
    U24S8,
    /// Packed 32-bit float depth + 8-bit stencil, 64 bits per texel.
    F32S24S8,
}

/// Client-side pixel layout (`format` + `type` in GL terms).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    pub channels: Channels,
    pub component: ComponentType,
}

impl PixelFormat {
    pub const fn new(channels: Channels, component: ComponentType) -> Self {
        Self { channels, component }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self.component {
            ComponentType::U24S8 => 4,
            ComponentType::F32S24S8 => 8,
            ComponentType::U8 => self.channels.count() as usize,
            ComponentType::U16 => 2 * self.channels.count() as usize,
            ComponentType::U32 | ComponentType::I32 | ComponentType::F32 => {
                4 * self.channels.count() as usize
            }
        }
    }
}

/// Borrowed pixel data plus its layout.
#[derive(Debug, Copy, Clone)]
pub struct Pixels<'a> {
    pub format: PixelFormat,
    pub data: &'a [u8],
}

impl<'a> Pixels<'a> {
    pub fn new(format: PixelFormat, data: &'a [u8]) -> Self {
        Self { format, data }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Wrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

/// One texture sampling parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TexParam {
    WrapS(Wrap),
    WrapT(Wrap),
    WrapR(Wrap),
    MinFilter(Filter),
    MagFilter(Filter),
    BaseLevel(i32),
    MaxLevel(i32),
}

// ── framebuffers ──────────────────────────────────────────────────────────

/// Framebuffer attachment point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttachmentPoint {
    Color(u32),
    Depth,
    Stencil,
    DepthStencil,
}

impl AttachmentPoint {
    /// Whether attaching at `self` would replace whatever is at `other`.
    /// The depth-stencil point covers both the depth and stencil points.
    pub fn overlaps(self, other: AttachmentPoint) -> bool {
        use AttachmentPoint::*;
        match (self, other) {
            (DepthStencil, Depth | Stencil) | (Depth | Stencil, DepthStencil) => true,
            _ => self == other,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    Undefined,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDrawBuffer,
    IncompleteReadBuffer,
    Unsupported,
    IncompleteMultisample,
    IncompleteLayerTargets,
    Other(u32),
}

impl std::fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::Undefined => f.write_str("undefined"),
            Self::IncompleteAttachment => f.write_str("incomplete attachment"),
            Self::MissingAttachment => f.write_str("missing attachment"),
            Self::IncompleteDrawBuffer => f.write_str("incomplete draw buffer"),
            Self::IncompleteReadBuffer => f.write_str("incomplete read buffer"),
            Self::Unsupported => f.write_str("unsupported format combination"),
            Self::IncompleteMultisample => f.write_str("incomplete multisample"),
            Self::IncompleteLayerTargets => f.write_str("incomplete layer targets"),
            Self::Other(code) => write!(f, "status 0x{code:04X}"),
        }
    }
}

bitflags! {
    /// Buffers affected by a clear.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR   = 0b001;
        const DEPTH   = 0b010;
        const STENCIL = 0b100;
    }
}

// ── programs ──────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
    Compute,
}

impl ShaderStage {
    /// Guesses the stage from a conventional file extension
    /// (`.vert`, `.frag`, `.geom`, `.tesc`, `.tese`, `.comp`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "vert" | "vs" => Some(Self::Vertex),
            "frag" | "fs" => Some(Self::Fragment),
            "geom" | "gs" => Some(Self::Geometry),
            "tesc" => Some(Self::TessControl),
            "tese" => Some(Self::TessEvaluation),
            "comp" | "cs" => Some(Self::Compute),
            _ => None,
        }
    }
}

/// A uniform value the driver can upload directly.
///
/// Texture-valued uniforms are resolved to an `Int` unit index before they
/// reach the device.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformData {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    IVec2(IVec2),
    IVec3(IVec3),
    IVec4(IVec4),
    UInt(u32),
    UVec2(UVec2),
    UVec3(UVec3),
    UVec4(UVec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

macro_rules! uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformData {
                #[inline]
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

uniform_from! {
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    i32 => Int,
    IVec2 => IVec2,
    IVec3 => IVec3,
    IVec4 => IVec4,
    u32 => UInt,
    UVec2 => UVec2,
    UVec3 => UVec3,
    UVec4 => UVec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

impl From<bool> for UniformData {
    fn from(v: bool) -> Self {
        Self::Int(v as i32)
    }
}

impl From<Color> for UniformData {
    fn from(c: Color) -> Self {
        Self::Vec4(c.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_extent_never_reaches_zero() {
        let e = Extent::d2(256, 64);
        assert_eq!(e.mip(0), e);
        assert_eq!(e.mip(3), Extent::d2(32, 8));
        assert_eq!(e.mip(7), Extent::d2(2, 1));
        assert_eq!(e.mip(40), Extent::d2(1, 1));
    }

    #[test]
    fn depth_formats_are_classified() {
        assert!(TextureFormat::Depth24.is_depth());
        assert!(!TextureFormat::Depth24.has_stencil());
        assert!(TextureFormat::Depth24Stencil8.has_stencil());
        assert!(!TextureFormat::Rgba32F.is_depth());
    }

    #[test]
    fn bytes_per_pixel_accounts_for_packed_types() {
        assert_eq!(TextureFormat::Rgba8.upload_format().bytes_per_pixel(), 4);
        assert_eq!(TextureFormat::Rgba32F.upload_format().bytes_per_pixel(), 16);
        assert_eq!(TextureFormat::Depth24Stencil8.upload_format().bytes_per_pixel(), 4);
        assert_eq!(TextureFormat::Depth32FStencil8.upload_format().bytes_per_pixel(), 8);
    }

    #[test]
    fn depth_stencil_point_overlaps_depth_and_stencil() {
        use AttachmentPoint::*;
        assert!(DepthStencil.overlaps(Depth));
        assert!(Stencil.overlaps(DepthStencil));
        assert!(Depth.overlaps(Depth));
        assert!(!Depth.overlaps(Stencil));
        assert!(!Color(0).overlaps(Color(1)));
    }

    #[test]
    fn clear_flag_bits() {
        assert_eq!(ClearFlags::COLOR.bits(), 0b001);
        assert_eq!(ClearFlags::DEPTH.bits(), 0b010);
        assert_eq!(ClearFlags::STENCIL.bits(), 0b100);
    }

    #[test]
    fn shader_stage_from_extension() {
        assert_eq!(ShaderStage::from_extension("frag"), Some(ShaderStage::Fragment));
        assert_eq!(ShaderStage::from_extension("comp"), Some(ShaderStage::Compute));
        assert_eq!(ShaderStage::from_extension("txt"), None);
    }
}
