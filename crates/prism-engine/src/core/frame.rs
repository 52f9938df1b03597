use std::time::{Duration, Instant};

use crate::error::Result;

use super::{GpuContext, Renderer};

/// What one [`FrameDriver::frame`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameStats {
    pub frame_index: u64,
    pub commands: usize,
    /// CPU time spent building and issuing the frame.
    pub cpu_time: Duration,
}

/// Drives one renderer against one context.
pub struct FrameDriver<R> {
    ctx: GpuContext,
    renderer: R,
}

impl<R: Renderer> FrameDriver<R> {
    pub fn new(ctx: GpuContext, renderer: R) -> Self {
        Self { ctx, renderer }
    }

    /// Begin, render into the screen, execute, end.
    ///
    /// The frame boundary is crossed even when rendering fails, so units are
    /// never carried into the next frame.
    pub fn frame(&mut self) -> Result<FrameStats> {
        let started = Instant::now();
        let frame_index = self.ctx.frame_index();

        self.ctx.begin_frame();
        let target = self.ctx.screen_surface();
        let result = self
            .renderer
            .render(&mut self.ctx, &target)
            .and_then(|commands| {
                self.ctx.execute(&commands)?;
                Ok(commands.len())
            });
        self.ctx.end_frame();

        let commands = result?;
        let stats = FrameStats {
            frame_index,
            commands,
            cpu_time: started.elapsed(),
        };
        log::debug!(
            "frame {frame_index}: {commands} commands in {:.3} ms",
            stats.cpu_time.as_secs_f64() * 1000.0
        );
        Ok(stats)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    #[inline]
    pub fn ctx(&self) -> &GpuContext {
        &self.ctx
    }

    #[inline]
    pub fn ctx_mut(&mut self) -> &mut GpuContext {
        &mut self.ctx
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
