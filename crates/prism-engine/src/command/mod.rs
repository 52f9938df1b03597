//! Commands a renderer emits for one frame.
//!
//! A [`CommandList`] is executed strictly in order against a
//! [`GpuContext`]; each command issues its driver calls synchronously and
//! leaves no texture units assigned when it returns.

mod clear;
mod compute;
mod draw;
mod uniform_map;

pub use clear::ClearCommand;
pub use compute::{ComputeCommand, StorageBinding};
pub use draw::DrawCommand;
pub use uniform_map::{UniformMap, UniformValue};

use crate::core::GpuContext;
use crate::error::Result;

#[derive(Debug)]
pub enum Command {
    Clear(ClearCommand),
    Draw(DrawCommand),
    Compute(ComputeCommand),
}

/// Ordered commands for one frame.
pub type CommandList = Vec<Command>;

impl Command {
    pub fn execute(&self, ctx: &mut GpuContext) -> Result<()> {
        match self {
            Self::Clear(c) => c.execute(ctx),
            Self::Draw(d) => d.execute(ctx),
            Self::Compute(c) => c.execute(ctx),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Clear(_) => "clear",
            Self::Draw(_) => "draw",
            Self::Compute(_) => "compute",
        }
    }
}

impl From<ClearCommand> for Command {
    fn from(c: ClearCommand) -> Self {
        Self::Clear(c)
    }
}

impl From<DrawCommand> for Command {
    fn from(d: DrawCommand) -> Self {
        Self::Draw(d)
    }
}

impl From<ComputeCommand> for Command {
    fn from(c: ComputeCommand) -> Self {
        Self::Compute(c)
    }
}
