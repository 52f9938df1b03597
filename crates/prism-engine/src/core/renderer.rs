use crate::command::CommandList;
use crate::error::Result;
use crate::surface::Surface;

use super::GpuContext;

/// Produces the commands of one frame for a target.
///
/// Renderers compose by calling an inner renderer with an offscreen
/// target and splicing its list in front of their own commands.
pub trait Renderer {
    fn render(&mut self, ctx: &mut GpuContext, target: &Surface) -> Result<CommandList>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, ctx: &mut GpuContext, target: &Surface) -> Result<CommandList> {
        (**self).render(ctx, target)
    }
}
