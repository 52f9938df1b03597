//! Time subsystem.
//!
//! Frame timing for the render loop:
//! - `FrameClock::tick()` once per presented frame yields a `FrameTime`
//! - `FramePacer` computes how long to sleep to hold a target frame rate

mod frame_clock;
mod pacer;

pub use frame_clock::{FrameClock, FrameTime};
pub use pacer::FramePacer;
