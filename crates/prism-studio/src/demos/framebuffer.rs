use std::rc::Rc;

use anyhow::Result;

use prism_engine::color::Color;
use prism_engine::command::{ClearCommand, CommandList, DrawCommand};
use prism_engine::core::{GpuContext, Renderer};
use prism_engine::device::ClearFlags;
use prism_engine::mesh::Mesh;
use prism_engine::resources::{Framebuffer, Program};
use prism_engine::state::{Capability, CompareFunc, DepthFunction, RenderState};
use prism_engine::surface::Surface;

/// Renders `inner` into an offscreen color+depth target, then draws that
/// target's color texture over the real one.
pub struct FramebufferDemo {
    inner: Box<dyn Renderer>,
    program: Rc<Program>,
    quad: Mesh,
    state: RenderState,
    fbo: Option<Rc<Framebuffer>>,
}

impl FramebufferDemo {
    pub fn new(ctx: &mut GpuContext, inner: Box<dyn Renderer>) -> Result<Self> {
        let device = ctx.device().clone();
        Ok(Self {
            inner,
            program: super::texture_program(&device)?,
            quad: Mesh::fullscreen_quad(&device)?,
            state: RenderState::new()
                .with_capability(Capability::DepthTest)
                .with_param(DepthFunction(CompareFunc::Less)),
            fbo: None,
        })
    }

    /// The offscreen target, rebuilt whenever the outer target changes size.
    fn offscreen(&mut self, ctx: &GpuContext, size: (u32, u32)) -> prism_engine::Result<Rc<Framebuffer>> {
        if let Some(fbo) = &self.fbo {
            if fbo.size() == Some(size) {
                return Ok(fbo.clone());
            }
        }
        let fbo = Framebuffer::typical_fbo(ctx.device(), size.0, size.1)?;
        self.fbo = Some(fbo.clone());
        Ok(fbo)
    }
}

impl Renderer for FramebufferDemo {
    fn render(&mut self, ctx: &mut GpuContext, target: &Surface) -> prism_engine::Result<CommandList> {
        let size = target.size().unwrap_or((1, 1));
        let fbo = self.offscreen(ctx, size)?;

        let mut commands: CommandList = vec![
            ClearCommand::new(target.clone(), ClearFlags::COLOR | ClearFlags::DEPTH)
                .with_color(Color::TRANSPARENT)
                .into(),
        ];
        commands.extend(self.inner.render(ctx, &fbo.clone().into())?);
        commands.push(
            DrawCommand::new(self.program.clone(), self.quad.clone(), target.clone())
                .with_state(self.state.clone())
                .texture("tex", fbo.texture("color")?)
                .into(),
        );
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::core::ContextConfig;
    use prism_engine::device::{Call, RecordingDevice};

    /// Clears whatever it is given.
    struct ClearOnly;

    impl Renderer for ClearOnly {
        fn render(&mut self, _ctx: &mut GpuContext, target: &Surface) -> prism_engine::Result<CommandList> {
            Ok(vec![ClearCommand::new(target.clone(), ClearFlags::COLOR).into()])
        }
    }

    #[test]
    fn inner_commands_target_the_offscreen_buffer() {
        let (rec, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device, 128, 96, ContextConfig::default());
        let mut demo = FramebufferDemo::new(&mut ctx, Box::new(ClearOnly)).unwrap();

        let target = ctx.screen_surface();
        let commands = demo.render(&mut ctx, &target).unwrap();
        assert_eq!(commands.len(), 3);

        let fbo = demo.fbo.clone().unwrap();
        assert_eq!(fbo.size(), Some((128, 96)));

        ctx.execute(&commands).unwrap();
        ctx.end_frame();
        let calls = rec.calls();
        assert!(calls.contains(&Call::BindFramebuffer(Some(fbo.raw()))));
        assert!(calls.iter().any(|c| matches!(c, Call::ClearBufferColor(..))));
        assert_eq!(ctx.units().assigned_count(), 0);
    }

    #[test]
    fn offscreen_target_follows_resize() {
        let (_, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device, 128, 96, ContextConfig::default());
        let mut demo = FramebufferDemo::new(&mut ctx, Box::new(ClearOnly)).unwrap();
        let target = ctx.screen_surface();

        demo.render(&mut ctx, &target).unwrap();
        let before = demo.fbo.clone().unwrap();
        demo.render(&mut ctx, &target).unwrap();
        assert!(Rc::ptr_eq(&before, demo.fbo.as_ref().unwrap()));

        ctx.resize(200, 100);
        demo.render(&mut ctx, &target).unwrap();
        assert_eq!(demo.fbo.as_ref().unwrap().size(), Some((200, 100)));
    }
}
