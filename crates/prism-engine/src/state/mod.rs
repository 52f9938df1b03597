//! Fixed-function render state.
//!
//! A [`RenderState`] is a value: a set of enabled capabilities plus at most one
//! [`Param`] per [`ParamKind`]. Moving the driver from one state to another is
//! done by [`RenderState::apply_diff`], which only touches what differs.

mod params;
mod render_state;

pub use params::{
    BlendEquation, BlendFactor, BlendFunction, BlendOp, Capability, CompareFunc, CullFace,
    DepthFunction, DepthRange, Face, FillMode, LineWidth, MinSampleShading, Param, ParamKind,
    PointSize, PolygonMode, PolygonOffset, PrimitiveRestartIndex, SampleCoverage, SampleMask,
    ScissorBox, StencilAction, StencilFunction, StencilOperation,
};
pub use render_state::{RenderState, StateDiff};
