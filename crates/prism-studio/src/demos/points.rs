use std::rc::Rc;

use anyhow::{Context, Result};
use glam::Vec4;

use prism_engine::color::Color;
use prism_engine::command::{ClearCommand, CommandList, ComputeCommand, DrawCommand};
use prism_engine::core::{GpuContext, Renderer};
use prism_engine::device::{BufferTarget, BufferUsage, ClearFlags};
use prism_engine::mesh::PointCloud;
use prism_engine::resources::{Buffer, Program};
use prism_engine::state::{BlendFunction, Capability, CompareFunc, DepthFunction, PointSize, RenderState};
use prism_engine::surface::Surface;

use super::Rng;

const POINTS_VERT: &str = include_str!("../../shaders/points.vert");
const POINTS_FRAG: &str = include_str!("../../shaders/points.frag");
const DRIFT_COMP: &str = include_str!("../../shaders/drift.comp");

const POINT_COUNT: usize = 1000;
/// Matches `local_size_x` in the drift shader.
const WORKGROUP_SIZE: u32 = 64;
const POINT_SIZE: f32 = 6.0;

/// Random points in the clip cube, nudged each frame by a compute pass that
/// writes per-point offsets the vertex shader reads back.
pub struct PointsDemo {
    drift: Rc<Program>,
    draw: Rc<Program>,
    cloud: PointCloud,
    offsets: Rc<Buffer>,
    state: RenderState,
    frame: u64,
}

impl PointsDemo {
    pub fn new(ctx: &mut GpuContext, seed: u64) -> Result<Self> {
        let device = ctx.device().clone();

        let mut rng = Rng::new(seed);
        let points: Vec<Vec4> = (0..POINT_COUNT)
            .map(|_| Vec4::new(rng.signed_unit(), rng.signed_unit(), rng.signed_unit(), 1.0))
            .collect();
        let cloud = PointCloud::new(&device, &points)?;

        let zeros = vec![Vec4::ZERO; POINT_COUNT];
        let offsets = Buffer::with_data(
            &device,
            BufferTarget::ShaderStorage,
            bytemuck::cast_slice(&zeros),
            BufferUsage::DynamicCopy,
        )?;

        let drift = Program::compute(&device, DRIFT_COMP).context("drift program")?;
        let draw = Program::graphics(&device, POINTS_VERT, POINTS_FRAG).context("points program")?;

        let state = RenderState::new()
            .with_capability(Capability::DepthTest)
            .with_capability(Capability::Blend)
            .with_capability(Capability::ProgramPointSize)
            .with_param(DepthFunction(CompareFunc::Less))
            .with_param(BlendFunction::alpha_blending())
            .with_param(PointSize(POINT_SIZE));

        Ok(Self {
            drift: Rc::new(drift),
            draw: Rc::new(draw),
            cloud,
            offsets: Rc::new(offsets),
            state,
            frame: 0,
        })
    }

    fn groups(&self) -> [u32; 3] {
        let n = self.cloud.len() as u32;
        [n.div_ceil(WORKGROUP_SIZE), 1, 1]
    }
}

impl Renderer for PointsDemo {
    fn render(&mut self, _ctx: &mut GpuContext, target: &Surface) -> prism_engine::Result<CommandList> {
        let time = self.frame as f32 / 60.0;
        self.frame += 1;

        // No barrier between the dispatch and the draw. The vertex stage may
        // read last frame's offsets, which only lags the drift by a frame.
        Ok(vec![
            ComputeCommand::new(self.drift.clone(), self.groups())
                .storage("Offsets", self.offsets.clone(), 0)
                .uniform("time", time)
                .uniform("count", self.cloud.len() as u32)
                .into(),
            ClearCommand::new(target.clone(), ClearFlags::COLOR | ClearFlags::DEPTH)
                .with_color(Color::BLACK)
                .into(),
            DrawCommand::new(self.draw.clone(), self.cloud.clone(), target.clone())
                .with_state(self.state.clone())
                .uniform("point_size", POINT_SIZE)
                .into(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::core::ContextConfig;
    use prism_engine::device::{Call, RecordingDevice, Topology};

    #[test]
    fn dispatch_covers_every_point() {
        let (_, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device, 64, 64, ContextConfig::default());
        let demo = PointsDemo::new(&mut ctx, 3).unwrap();
        assert_eq!(demo.groups(), [16, 1, 1]);
    }

    #[test]
    fn compute_runs_before_the_draw() {
        let (rec, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device, 64, 64, ContextConfig::default());
        let mut demo = PointsDemo::new(&mut ctx, 3).unwrap();

        let target = ctx.screen_surface();
        let commands = demo.render(&mut ctx, &target).unwrap();
        ctx.execute(&commands).unwrap();
        ctx.end_frame();

        let calls = rec.calls();
        let dispatch = calls
            .iter()
            .position(|c| matches!(c, Call::DispatchCompute(_)))
            .unwrap();
        let draw = calls
            .iter()
            .position(|c| matches!(c, Call::DrawArrays { topology: Topology::Points, count: 1000, .. }))
            .unwrap();
        assert!(dispatch < draw);
        assert!(calls.contains(&Call::Enable(Capability::ProgramPointSize)));
        assert!(calls.contains(&Call::BindBufferBase(
            BufferTarget::ShaderStorage,
            0,
            Some(demo.offsets.raw())
        )));
    }
}
