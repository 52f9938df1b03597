//! Fixed-function pipeline vocabulary: capabilities and parameter payloads.
//!
//! Every parameter kind is its own small value type. [`Param`] is the closed
//! sum over them; the device applies one through a single dispatcher.

/// Boolean pipeline capability (`glEnable` / `glDisable`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Blend,
    ColorLogicOp,
    CullFace,
    DepthClamp,
    DepthTest,
    Dither,
    FramebufferSrgb,
    LineSmooth,
    Multisample,
    PolygonOffsetFill,
    PolygonOffsetLine,
    PolygonOffsetPoint,
    PolygonSmooth,
    PrimitiveRestart,
    PrimitiveRestartFixedIndex,
    ProgramPointSize,
    RasterizerDiscard,
    SampleAlphaToCoverage,
    SampleAlphaToOne,
    SampleCoverage,
    SampleShading,
    SampleMask,
    ScissorTest,
    StencilTest,
    TextureCubeMapSeamless,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FillMode {
    Point,
    Line,
    Fill,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StencilAction {
    Keep,
    Zero,
    Replace,
    Incr,
    IncrWrap,
    Decr,
    DecrWrap,
    Invert,
}

// ── parameter payloads ────────────────────────────────────────────────────

/// Separate RGB/alpha blend factors. `draw_buffer: None` targets every buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendFunction {
    pub draw_buffer: Option<u32>,
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendFunction {
    /// Same factors for color and alpha, all draw buffers.
    pub const fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        Self {
            draw_buffer: None,
            src_rgb: src,
            dst_rgb: dst,
            src_alpha: src,
            dst_alpha: dst,
        }
    }

    /// Straight-alpha "over" compositing.
    pub const fn alpha_blending() -> Self {
        Self::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    }
}

impl Default for BlendFunction {
    fn default() -> Self {
        Self::new(BlendFactor::One, BlendFactor::Zero)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendEquation {
    pub draw_buffer: Option<u32>,
    pub rgb: BlendOp,
    pub alpha: BlendOp,
}

impl Default for BlendEquation {
    fn default() -> Self {
        Self {
            draw_buffer: None,
            rgb: BlendOp::Add,
            alpha: BlendOp::Add,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CullFace(pub Face);

impl Default for CullFace {
    fn default() -> Self {
        Self(Face::Back)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthRange {
    pub near: f64,
    pub far: f64,
}

impl Default for DepthRange {
    fn default() -> Self {
        Self { near: 0.0, far: 1.0 }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthFunction(pub CompareFunc);

impl Default for DepthFunction {
    fn default() -> Self {
        Self(CompareFunc::Less)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineWidth(pub f32);

impl Default for LineWidth {
    fn default() -> Self {
        Self(1.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointSize(pub f32);

impl Default for PointSize {
    fn default() -> Self {
        Self(1.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SampleCoverage {
    pub value: f32,
    pub invert: bool,
}

impl Default for SampleCoverage {
    fn default() -> Self {
        Self { value: 1.0, invert: false }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolygonMode {
    pub face: Face,
    pub mode: FillMode,
}

impl Default for PolygonMode {
    fn default() -> Self {
        Self {
            face: Face::FrontAndBack,
            mode: FillMode::Fill,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StencilFunction {
    pub func: CompareFunc,
    pub reference: i32,
    pub mask: u32,
}

impl Default for StencilFunction {
    fn default() -> Self {
        Self {
            func: CompareFunc::Always,
            reference: 0,
            mask: u32::MAX,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StencilOperation {
    pub stencil_fail: StencilAction,
    pub depth_fail: StencilAction,
    pub depth_pass: StencilAction,
}

impl Default for StencilOperation {
    fn default() -> Self {
        Self {
            stencil_fail: StencilAction::Keep,
            depth_fail: StencilAction::Keep,
            depth_pass: StencilAction::Keep,
        }
    }
}

/// Scissor rectangle in window pixels. Has no GL default; the initial box is
/// the window size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScissorBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PrimitiveRestartIndex(pub u32);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MinSampleShading(pub f32);

/// Word `mask_number` of the sample mask.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SampleMask {
    pub mask_number: u32,
    pub mask: u32,
}

// ── closed sum ────────────────────────────────────────────────────────────

/// Discriminant of [`Param`]; one slot per kind in a render state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKind {
    BlendFunction,
    BlendEquation,
    CullFace,
    DepthRange,
    DepthFunction,
    LineWidth,
    PointSize,
    SampleCoverage,
    PolygonOffset,
    PolygonMode,
    StencilFunction,
    StencilOperation,
    ScissorBox,
    PrimitiveRestartIndex,
    MinSampleShading,
    SampleMask,
}

impl ParamKind {
    pub const ALL: [ParamKind; 16] = [
        Self::BlendFunction,
        Self::BlendEquation,
        Self::CullFace,
        Self::DepthRange,
        Self::DepthFunction,
        Self::LineWidth,
        Self::PointSize,
        Self::SampleCoverage,
        Self::PolygonOffset,
        Self::PolygonMode,
        Self::StencilFunction,
        Self::StencilOperation,
        Self::ScissorBox,
        Self::PrimitiveRestartIndex,
        Self::MinSampleShading,
        Self::SampleMask,
    ];

    /// The GL initial value of this kind, if GL defines a context-independent one.
    ///
    /// Scissor box, primitive restart index, minimum sample shading and the
    /// sample mask have none here; a state that drops one of them leaves the
    /// driver value untouched.
    pub fn gl_default(self) -> Option<Param> {
        let p = match self {
            Self::BlendFunction => BlendFunction::default().into(),
            Self::BlendEquation => BlendEquation::default().into(),
            Self::CullFace => CullFace::default().into(),
            Self::DepthRange => DepthRange::default().into(),
            Self::DepthFunction => DepthFunction::default().into(),
            Self::LineWidth => LineWidth::default().into(),
            Self::PointSize => PointSize::default().into(),
            Self::SampleCoverage => SampleCoverage::default().into(),
            Self::PolygonOffset => PolygonOffset::default().into(),
            Self::PolygonMode => PolygonMode::default().into(),
            Self::StencilFunction => StencilFunction::default().into(),
            Self::StencilOperation => StencilOperation::default().into(),
            Self::ScissorBox
            | Self::PrimitiveRestartIndex
            | Self::MinSampleShading
            | Self::SampleMask => return None,
        };
        Some(p)
    }
}

/// One fixed-function parameter value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Param {
    BlendFunction(BlendFunction),
    BlendEquation(BlendEquation),
    CullFace(CullFace),
    DepthRange(DepthRange),
    DepthFunction(DepthFunction),
    LineWidth(LineWidth),
    PointSize(PointSize),
    SampleCoverage(SampleCoverage),
    PolygonOffset(PolygonOffset),
    PolygonMode(PolygonMode),
    StencilFunction(StencilFunction),
    StencilOperation(StencilOperation),
    ScissorBox(ScissorBox),
    PrimitiveRestartIndex(PrimitiveRestartIndex),
    MinSampleShading(MinSampleShading),
    SampleMask(SampleMask),
}

macro_rules! param_variants {
    ($($name:ident),* $(,)?) => {
        impl Param {
            pub fn kind(&self) -> ParamKind {
                match self {
                    $(Self::$name(_) => ParamKind::$name,)*
                }
            }
        }

        $(
            impl From<$name> for Param {
                #[inline]
                fn from(p: $name) -> Self {
                    Self::$name(p)
                }
            }
        )*
    };
}

param_variants!(
    BlendFunction,
    BlendEquation,
    CullFace,
    DepthRange,
    DepthFunction,
    LineWidth,
    PointSize,
    SampleCoverage,
    PolygonOffset,
    PolygonMode,
    StencilFunction,
    StencilOperation,
    ScissorBox,
    PrimitiveRestartIndex,
    MinSampleShading,
    SampleMask,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let p: Param = DepthFunction(CompareFunc::Greater).into();
        assert_eq!(p.kind(), ParamKind::DepthFunction);

        let p: Param = ScissorBox { x: 0, y: 0, width: 4, height: 4 }.into();
        assert_eq!(p.kind(), ParamKind::ScissorBox);
    }

    #[test]
    fn every_default_has_its_own_kind() {
        for kind in ParamKind::ALL {
            if let Some(p) = kind.gl_default() {
                assert_eq!(p.kind(), kind);
            }
        }
    }

    #[test]
    fn kinds_without_gl_default() {
        let missing: Vec<_> = ParamKind::ALL
            .into_iter()
            .filter(|k| k.gl_default().is_none())
            .collect();
        assert_eq!(
            missing,
            vec![
                ParamKind::ScissorBox,
                ParamKind::PrimitiveRestartIndex,
                ParamKind::MinSampleShading,
                ParamKind::SampleMask,
            ]
        );
    }

    #[test]
    fn gl_initial_values() {
        assert_eq!(DepthFunction::default(), DepthFunction(CompareFunc::Less));
        assert_eq!(CullFace::default(), CullFace(Face::Back));
        assert_eq!(StencilFunction::default().mask, u32::MAX);
        assert_eq!(BlendFunction::default().draw_buffer, None);
    }
}
