//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and a `glutin` GL context, and
//! drives a [`crate::core::FrameDriver`] on every redraw.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
