use std::rc::Rc;

use anyhow::{Context, Result};

use prism_engine::color::Color;
use prism_engine::command::{ClearCommand, CommandList, DrawCommand};
use prism_engine::core::{GpuContext, Renderer};
use prism_engine::device::{
    Channels, ClearFlags, ComponentType, Device, Extent, PixelFormat, Pixels, TextureFormat, TextureKind,
};
use prism_engine::mesh::Mesh;
use prism_engine::resources::{Framebuffer, Program, Texture, TextureParams};
use prism_engine::state::RenderState;
use prism_engine::surface::Surface;

use super::Rng;

const LIFE_FRAG: &str = include_str!("../../shaders/life.frag");

/// One in this many cells starts alive.
const SEED_DENSITY: u64 = 5;

/// Game of life stepped on the GPU.
///
/// Two framebuffers alternate as the generation being written and the one
/// being read, switching every other frame.
pub struct LifeDemo {
    step: Rc<Program>,
    show: Rc<Program>,
    quad: Mesh,
    state: RenderState,
    boards: Option<(Rc<Framebuffer>, Rc<Framebuffer>)>,
    rng: Rng,
    frame: u64,
}

impl LifeDemo {
    pub fn new(ctx: &mut GpuContext, seed: u64) -> Result<Self> {
        let device = ctx.device().clone();
        let step = Program::graphics(&device, super::QUAD_VERT, LIFE_FRAG).context("life program")?;

        Ok(Self {
            step: Rc::new(step),
            show: super::texture_program(&device)?,
            quad: Mesh::fullscreen_quad(&device)?,
            state: super::quad_state(),
            boards: None,
            rng: Rng::new(seed),
            frame: 0,
        })
    }

    /// Builds both boards at `width` x `height`, the second one seeded.
    fn build_boards(&mut self, device: &Rc<dyn Device>, width: u32, height: u32) -> prism_engine::Result<()> {
        log::info!("life board {width}x{height}");
        let blank = self.board(device, width, height, None)?;
        let cells = self.random_cells(width, height);
        let seeded = self.board(device, width, height, Some(&cells))?;
        self.boards = Some((blank, seeded));
        Ok(())
    }

    fn board(
        &self,
        device: &Rc<dyn Device>,
        width: u32,
        height: u32,
        cells: Option<&[u8]>,
    ) -> prism_engine::Result<Rc<Framebuffer>> {
        let texture = Texture::new(device, TextureKind::D2, Extent::d2(width, height))?;
        let pixels = cells.map(|data| Pixels::new(PixelFormat::new(Channels::Rgba, ComponentType::U8), data));
        texture.init(&TextureParams::nearest_repeat(), 0, TextureFormat::Rgba32F, pixels, false)?;

        let fbo = Framebuffer::with_size(device, width, height)?;
        fbo.bind_textures([("color", Rc::new(texture))])?;
        Ok(Rc::new(fbo))
    }

    fn random_cells(&mut self, width: u32, height: u32) -> Vec<u8> {
        let count = width as usize * height as usize;
        let mut cells = Vec::with_capacity(count * 4);
        for _ in 0..count {
            let v = if self.rng.one_in(SEED_DENSITY) { 0xff } else { 0 };
            cells.extend_from_slice(&[v; 4]);
        }
        cells
    }
}

impl Renderer for LifeDemo {
    fn render(&mut self, ctx: &mut GpuContext, target: &Surface) -> prism_engine::Result<CommandList> {
        let (width, height) = target.size().unwrap_or((1, 1));
        let stale = match &self.boards {
            Some((board, _)) => board.size() != Some((width, height)),
            None => true,
        };
        if stale {
            self.build_boards(ctx.device(), width, height)?;
        }
        let Some((first, second)) = &self.boards else {
            return Ok(Vec::new());
        };

        let ping = self.frame % 4 < 2;
        self.frame += 1;
        let (update, prior) = if ping { (first, second) } else { (second, first) };
        let update_surface = Surface::from(update.clone());

        Ok(vec![
            ClearCommand::new(target.clone(), ClearFlags::COLOR | ClearFlags::DEPTH)
                .with_color(Color::TRANSPARENT)
                .into(),
            ClearCommand::new(update_surface.clone(), ClearFlags::COLOR | ClearFlags::DEPTH)
                .with_color(Color::TRANSPARENT)
                .into(),
            DrawCommand::new(self.step.clone(), self.quad.clone(), update_surface)
                .with_state(self.state.clone())
                .texture("prior", prior.texture("color")?)
                .into(),
            DrawCommand::new(self.show.clone(), self.quad.clone(), target.clone())
                .with_state(self.state.clone())
                .texture("tex", update.texture("color")?)
                .into(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::command::Command;
    use prism_engine::core::ContextConfig;
    use prism_engine::device::{Call, RecordingDevice};

    fn setup() -> (Rc<RecordingDevice>, GpuContext, LifeDemo) {
        let (rec, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device, 32, 16, ContextConfig::default());
        let demo = LifeDemo::new(&mut ctx, 7).unwrap();
        (rec, ctx, demo)
    }

    /// The framebuffer the generation step of `commands` writes into.
    fn step_target(commands: &CommandList) -> Rc<Framebuffer> {
        match &commands[1] {
            Command::Clear(clear) => clear.target.framebuffer().cloned().unwrap(),
            other => panic!("expected the board clear, got {}", other.kind()),
        }
    }

    #[test]
    fn boards_are_built_lazily_at_target_size() {
        let (_, mut ctx, mut demo) = setup();
        assert!(demo.boards.is_none());

        let target = ctx.screen_surface();
        demo.render(&mut ctx, &target).unwrap();
        let (first, second) = demo.boards.clone().unwrap();
        assert_eq!(first.size(), Some((32, 16)));
        assert_eq!(second.size(), Some((32, 16)));
        assert_eq!(second.texture("color").unwrap().format(), Some(TextureFormat::Rgba32F));
    }

    #[test]
    fn boards_swap_every_other_frame() {
        let (_, mut ctx, mut demo) = setup();
        let target = ctx.screen_surface();

        let mut written = Vec::new();
        for _ in 0..4 {
            let commands = demo.render(&mut ctx, &target).unwrap();
            written.push(step_target(&commands).raw());
        }
        assert_eq!(written[0], written[1]);
        assert_eq!(written[2], written[3]);
        assert_ne!(written[1], written[2]);
    }

    #[test]
    fn resize_rebuilds_boards() {
        let (_, mut ctx, mut demo) = setup();
        let target = ctx.screen_surface();
        demo.render(&mut ctx, &target).unwrap();

        ctx.resize(64, 64);
        demo.render(&mut ctx, &target).unwrap();
        let (first, _) = demo.boards.clone().unwrap();
        assert_eq!(first.size(), Some((64, 64)));
    }

    #[test]
    fn frame_executes_with_units_released() {
        let (rec, mut ctx, mut demo) = setup();
        let target = ctx.screen_surface();
        let commands = demo.render(&mut ctx, &target).unwrap();
        ctx.execute(&commands).unwrap();
        ctx.end_frame();

        let draws = rec.calls().iter().filter(|c| matches!(c, Call::DrawArrays { .. })).count();
        assert_eq!(draws, 2);
        assert_eq!(ctx.units().assigned_count(), 0);
    }
}
