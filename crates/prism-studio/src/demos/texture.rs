use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};

use prism_engine::color::Color;
use prism_engine::command::{ClearCommand, CommandList, DrawCommand};
use prism_engine::core::{GpuContext, Renderer};
use prism_engine::device::{Channels, ClearFlags};
use prism_engine::mesh::Mesh;
use prism_engine::resources::{ImageData, ImagePool, Program, Texture, TextureParams};
use prism_engine::state::RenderState;
use prism_engine::surface::Surface;

/// Frames each image stays on screen when cycling.
const FRAMES_PER_IMAGE: u64 = 180;

/// Draws one texture over the whole target, cycling through `textures`.
pub struct TextureDemo {
    program: Rc<Program>,
    quad: Mesh,
    state: RenderState,
    textures: Vec<Rc<Texture>>,
    frame: u64,
}

impl TextureDemo {
    pub fn new(ctx: &mut GpuContext, images: &[PathBuf]) -> Result<Self> {
        let device = ctx.device().clone();

        let mut pool = ImagePool::new();
        for path in images {
            pool.load(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        if pool.is_empty() {
            pool.add(checkerboard(256, 256, 32)?);
        }

        let params = TextureParams::linear_clamp();
        let textures = (0..pool.len())
            .filter_map(|i| pool.get(i))
            .map(|image| Texture::from_image(&device, image, &params).map(Rc::new))
            .collect::<prism_engine::Result<Vec<_>>>()?;
        log::info!("texture demo: {} image(s)", textures.len());

        Ok(Self {
            program: super::texture_program(&device)?,
            quad: Mesh::fullscreen_quad(&device)?,
            state: super::quad_state(),
            textures,
            frame: 0,
        })
    }

    fn current(&self) -> Option<&Rc<Texture>> {
        let index = (self.frame / FRAMES_PER_IMAGE) as usize % self.textures.len().max(1);
        self.textures.get(index)
    }
}

impl Renderer for TextureDemo {
    fn render(&mut self, _ctx: &mut GpuContext, target: &Surface) -> prism_engine::Result<CommandList> {
        let mut commands: CommandList = vec![
            ClearCommand::new(target.clone(), ClearFlags::COLOR | ClearFlags::DEPTH)
                .with_color(Color::TRANSPARENT)
                .into(),
        ];
        if let Some(texture) = self.current() {
            commands.push(
                DrawCommand::new(self.program.clone(), self.quad.clone(), target.clone())
                    .with_state(self.state.clone())
                    .texture("tex", texture.clone())
                    .into(),
            );
        }
        self.frame += 1;
        Ok(commands)
    }
}

/// RGBA checkerboard with `cell`-texel squares.
fn checkerboard(width: u32, height: u32, cell: u32) -> prism_engine::Result<ImageData> {
    let cell = cell.max(1);
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let light = (x / cell + y / cell) % 2 == 0;
            let v = if light { 0xe0 } else { 0x30 };
            pixels.extend_from_slice(&[v, v, v, 0xff]);
        }
    }
    ImageData::new(width, height, Channels::Rgba, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::core::ContextConfig;
    use prism_engine::device::{Call, RecordingDevice};

    #[test]
    fn checkerboard_alternates_cells() {
        let img = checkerboard(4, 4, 2).unwrap();
        let px = |x: usize, y: usize| img.pixels()[(y * 4 + x) * 4];
        assert_eq!(px(0, 0), 0xe0);
        assert_eq!(px(2, 0), 0x30);
        assert_eq!(px(2, 2), 0xe0);
    }

    #[test]
    fn draws_generated_texture_without_images() {
        let (rec, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device, 64, 64, ContextConfig::default());
        let mut demo = TextureDemo::new(&mut ctx, &[]).unwrap();

        let target = ctx.screen_surface();
        let commands = demo.render(&mut ctx, &target).unwrap();
        assert_eq!(commands.len(), 2);
        ctx.execute(&commands).unwrap();
        ctx.end_frame();

        assert!(rec.calls().iter().any(|c| matches!(c, Call::DrawArrays { count: 6, .. })));
        assert_eq!(ctx.units().assigned_count(), 0);
    }
}
