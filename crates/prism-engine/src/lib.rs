//! Prism engine crate.
//!
//! This crate owns the GL command layer: GPU resource wrappers, the texture
//! unit allocator, render-state diffing and the clear/draw/compute commands a
//! renderer emits each frame. The window runtime drives it against a real GL
//! context; tests drive it against [`device::RecordingDevice`].

pub mod device;
pub mod error;
pub mod units;
pub mod resources;
pub mod state;
pub mod surface;
pub mod mesh;
pub mod command;
pub mod core;
pub mod window;

pub mod logging;
pub mod time;
pub mod color;

pub use error::{Error, Result};
