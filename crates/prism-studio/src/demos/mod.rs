//! Example renderers.
//!
//! Each demo is a [`Renderer`] built once against a live context. They share
//! the fullscreen-quad vertex shader and the textured-quad program.

mod framebuffer;
mod life;
mod points;
mod texture;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::ValueEnum;

use prism_engine::core::{GpuContext, Renderer};
use prism_engine::device::Device;
use prism_engine::resources::Program;
use prism_engine::state::{Capability, CompareFunc, DepthFunction, RenderState};

pub use framebuffer::FramebufferDemo;
pub use life::LifeDemo;
pub use points::PointsDemo;
pub use texture::TextureDemo;

const QUAD_VERT: &str = include_str!("../../shaders/quad.vert");
const TEXTURE_FRAG: &str = include_str!("../../shaders/texture.frag");

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Show an image (or a checkerboard) on a fullscreen quad.
    Texture,
    /// Render the point cloud offscreen, then show the result.
    Framebuffer,
    /// Conway's game of life, ping-ponging between two framebuffers.
    Life,
    /// A compute-driven point cloud.
    Points,
}

/// Inputs shared by every demo.
#[derive(Debug, Clone, Default)]
pub struct DemoOptions {
    pub images: Vec<PathBuf>,
    /// Seed for demos with random initial data.
    pub seed: u64,
}

pub fn build(demo: Demo, ctx: &mut GpuContext, options: &DemoOptions) -> Result<Box<dyn Renderer>> {
    log::info!("building {demo:?} demo");
    let renderer: Box<dyn Renderer> = match demo {
        Demo::Texture => Box::new(TextureDemo::new(ctx, &options.images)?),
        Demo::Framebuffer => {
            let inner = PointsDemo::new(ctx, options.seed)?;
            Box::new(FramebufferDemo::new(ctx, Box::new(inner))?)
        }
        Demo::Life => Box::new(LifeDemo::new(ctx, options.seed)?),
        Demo::Points => Box::new(PointsDemo::new(ctx, options.seed)?),
    };
    Ok(renderer)
}

/// Program drawing `tex` over the fullscreen quad.
fn texture_program(device: &Rc<dyn Device>) -> Result<Rc<Program>> {
    let program = Program::graphics(device, QUAD_VERT, TEXTURE_FRAG).context("texture program")?;
    Ok(Rc::new(program))
}

/// Depth-tested quad state with back-face culling.
fn quad_state() -> RenderState {
    RenderState::new()
        .with_capability(Capability::DepthTest)
        .with_capability(Capability::CullFace)
        .with_param(DepthFunction(CompareFunc::Less))
}

/// xorshift64*; enough for seeding demo data.
#[derive(Debug, Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        // zero is a fixed point
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform in `[-1, 1)`.
    fn signed_unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 23) as f32 - 1.0
    }

    /// `true` with probability `1 / n`.
    fn one_in(&mut self, n: u64) -> bool {
        self.next_u64() % n == 0
    }
}
