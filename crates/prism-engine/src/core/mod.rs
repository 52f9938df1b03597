//! Core engine-facing contracts.
//!
//! [`GpuContext`] is the per-GL-context state every command executes
//! against. [`Renderer`] is implemented by higher layers (studio demos) and
//! [`FrameDriver`] runs one renderer per frame; the window runtime owns the
//! driver but nothing here depends on a window.

mod context;
mod frame;
mod renderer;

pub use context::{ContextConfig, GpuContext};
pub use frame::{FrameDriver, FrameStats};
pub use renderer::Renderer;
