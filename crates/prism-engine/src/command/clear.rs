use crate::color::Color;
use crate::core::GpuContext;
use crate::device::ClearFlags;
use crate::error::Result;
use crate::surface::Surface;

/// Clears the selected buffers of a target.
#[derive(Debug, Clone)]
pub struct ClearCommand {
    pub target: Surface,
    pub flags: ClearFlags,
    pub color: Color,
    pub depth: f32,
    pub stencil: i32,
}

impl ClearCommand {
    /// Clears to transparent black, depth 1 and stencil 0.
    pub fn new(target: Surface, flags: ClearFlags) -> Self {
        Self {
            target,
            flags,
            color: Color::TRANSPARENT,
            depth: 1.0,
            stencil: 0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_stencil(mut self, stencil: i32) -> Self {
        self.stencil = stencil;
        self
    }

    pub fn execute(&self, ctx: &mut GpuContext) -> Result<()> {
        match &self.target {
            Surface::Offscreen(fb) => {
                fb.bind()?;
                fb.clear(self.flags, self.color, self.depth, self.stencil);
                fb.unbind(ctx.screen());
            }
            Surface::Screen(_) => {
                let device = ctx.device();
                if self.flags.contains(ClearFlags::COLOR) {
                    device.clear_color(self.color);
                }
                if self.flags.contains(ClearFlags::DEPTH) {
                    device.clear_depth(self.depth);
                }
                if self.flags.contains(ClearFlags::STENCIL) {
                    device.clear_stencil(self.stencil);
                }
                device.clear(self.flags);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::core::ContextConfig;
    use crate::device::{Call, Extent, RecordingDevice, TextureFormat};
    use crate::error::Error;
    use crate::resources::{Framebuffer, Texture, TextureParams};

    #[test]
    fn screen_clear_sets_values_then_clears() {
        let (rec, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device, 640, 480, ContextConfig::default());
        rec.take_calls();

        let cmd = ClearCommand::new(ctx.screen_surface(), ClearFlags::COLOR | ClearFlags::DEPTH)
            .with_color(Color::WHITE)
            .with_depth(0.5);
        cmd.execute(&mut ctx).unwrap();

        assert_eq!(
            rec.calls(),
            vec![
                Call::ClearColor(Color::WHITE),
                Call::ClearDepth(0.5),
                Call::Clear(ClearFlags::COLOR | ClearFlags::DEPTH),
            ]
        );
    }

    #[test]
    fn offscreen_clear_uses_buffer_clears() {
        let (rec, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device.clone(), 640, 480, ContextConfig::default());
        let fb = Rc::new(Framebuffer::with_size(&device, 32, 32).unwrap());
        let color = Texture::with_storage(&device, Extent::d2(32, 32), TextureFormat::Rgba8, &TextureParams::new())
            .unwrap();
        fb.bind_texture("color", Rc::new(color)).unwrap();
        rec.take_calls();

        ClearCommand::new(Surface::Offscreen(fb.clone()), ClearFlags::COLOR)
            .execute(&mut ctx)
            .unwrap();

        assert_eq!(
            rec.calls(),
            vec![
                Call::BindFramebuffer(Some(fb.raw())),
                Call::Viewport { x: 0, y: 0, width: 32, height: 32 },
                Call::ClearBufferColor(0, Color::TRANSPARENT),
                Call::BindFramebuffer(None),
                Call::Viewport { x: 0, y: 0, width: 640, height: 480 },
            ]
        );
    }

    #[test]
    fn unconfigured_target_fails() {
        let (_, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device.clone(), 640, 480, ContextConfig::default());
        let fb = Rc::new(Framebuffer::new(&device).unwrap());
        let err = ClearCommand::new(fb.into(), ClearFlags::COLOR)
            .execute(&mut ctx)
            .unwrap_err();
        assert!(matches!(err, Error::UnconfiguredSurface));
    }
}
