use std::rc::Rc;

use crate::core::GpuContext;
use crate::device::UniformData;
use crate::error::Result;
use crate::mesh::Drawable;
use crate::resources::{Program, Texture};
use crate::state::RenderState;
use crate::surface::Surface;

use super::UniformMap;

/// Draws one [`Drawable`] with a program, render state and uniforms.
pub struct DrawCommand {
    pub program: Rc<Program>,
    pub target: Surface,
    pub drawable: Box<dyn Drawable>,
    /// `None` draws in the context's default state.
    pub state: Option<RenderState>,
    pub uniforms: UniformMap,
}

impl DrawCommand {
    /// A draw in the context's default state with no uniforms.
    pub fn new(program: Rc<Program>, drawable: impl Drawable + 'static, target: Surface) -> Self {
        Self {
            program,
            target,
            drawable: Box::new(drawable),
            state: None,
            uniforms: UniformMap::new(),
        }
    }

    pub fn with_state(mut self, state: RenderState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_uniforms(mut self, uniforms: UniformMap) -> Self {
        self.uniforms = uniforms;
        self
    }

    pub fn uniform(mut self, name: impl Into<String>, value: impl Into<UniformData>) -> Self {
        self.uniforms.set(name, value);
        self
    }

    pub fn texture(mut self, name: impl Into<String>, texture: Rc<Texture>) -> Self {
        self.uniforms.set_texture(name, texture);
        self
    }

    /// Binds the program, then the target, moves the pipeline to this
    /// command's state, uploads uniforms and draws.
    ///
    /// Texture units taken by the uniforms are released and an offscreen
    /// target is unbound even when the upload fails.
    pub fn execute(&self, ctx: &mut GpuContext) -> Result<()> {
        ctx.register_program(&self.program);
        self.program.bind();
        self.drawable.on_draw();

        let framebuffer = self.target.framebuffer();
        if let Some(fb) = framebuffer {
            fb.bind()?;
        }
        match &self.state {
            Some(state) => ctx.transition_to(state),
            None => ctx.reset_state(),
        }

        let drawn = self
            .uniforms
            .apply(&self.program, ctx.units_mut())
            .map(|()| self.drawable.vertex_array().draw(ctx.units_mut()));
        self.uniforms.post_render(ctx.units_mut());

        if let Some(fb) = framebuffer {
            fb.unbind(ctx.screen());
        }
        drawn
    }
}

impl std::fmt::Debug for DrawCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawCommand")
            .field("program", &self.program)
            .field("target", &self.target)
            .field("vertex_array", self.drawable.vertex_array())
            .field("state", &self.state)
            .field("uniforms", &self.uniforms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::core::ContextConfig;
    use crate::device::{Call, Device, RecordingDevice, Topology};
    use crate::error::Error;
    use crate::mesh::Mesh;
    use crate::resources::{Framebuffer, VertexArray};
    use crate::state::{Capability, CompareFunc, DepthFunction};

    fn setup() -> (Rc<RecordingDevice>, Rc<dyn Device>, GpuContext, Rc<Program>) {
        let (rec, device) = RecordingDevice::new().shared();
        let ctx = GpuContext::new(device.clone(), 320, 240, ContextConfig::default());
        let program = Rc::new(Program::graphics(&device, "void main() {}", "void main() {}").unwrap());
        rec.take_calls();
        (rec, device, ctx, program)
    }

    /// Counts pre-draw hook calls.
    struct Hooked {
        vao: VertexArray,
        calls: Rc<Cell<u32>>,
    }

    impl Drawable for Hooked {
        fn vertex_array(&self) -> &VertexArray {
            &self.vao
        }

        fn on_draw(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    #[test]
    fn draw_binds_program_before_drawing() {
        let (rec, device, mut ctx, program) = setup();
        let quad = Mesh::fullscreen_quad(&device).unwrap();
        rec.take_calls();

        DrawCommand::new(program.clone(), quad, ctx.screen_surface())
            .execute(&mut ctx)
            .unwrap();

        let calls = rec.calls();
        let use_at = calls
            .iter()
            .position(|c| *c == Call::UseProgram(Some(program.raw())))
            .unwrap();
        let draw_at = calls
            .iter()
            .position(|c| matches!(c, Call::DrawArrays { count: 6, .. }))
            .unwrap();
        assert!(use_at < draw_at);
        assert!(!calls.iter().any(|c| matches!(c, Call::BindFramebuffer(_))));
    }

    #[test]
    fn pre_draw_hook_runs_once() {
        let (_, device, mut ctx, program) = setup();
        let calls = Rc::new(Cell::new(0));
        let drawable = Hooked {
            vao: VertexArray::from_floats(&device, &[0.0; 9], 3, Topology::Triangles).unwrap(),
            calls: calls.clone(),
        };

        DrawCommand::new(program, drawable, ctx.screen_surface())
            .execute(&mut ctx)
            .unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn offscreen_target_is_bound_around_the_draw() {
        let (rec, device, mut ctx, program) = setup();
        let fb = Framebuffer::typical_fbo(&device, 64, 64).unwrap();
        let quad = Mesh::fullscreen_quad(&device).unwrap();
        rec.take_calls();

        let command = DrawCommand::new(program, quad, fb.clone().into());
        command.execute(&mut ctx).unwrap();

        let calls = rec.calls();
        let bind_at = calls
            .iter()
            .position(|c| *c == Call::BindFramebuffer(Some(fb.raw())))
            .unwrap();
        let draw_at = calls
            .iter()
            .position(|c| matches!(c, Call::DrawArrays { .. }))
            .unwrap();
        let unbind_at = calls
            .iter()
            .rposition(|c| *c == Call::BindFramebuffer(None))
            .unwrap();
        assert!(bind_at < draw_at && draw_at < unbind_at);
        assert_eq!(
            calls.last(),
            Some(&Call::Viewport { x: 0, y: 0, width: 320, height: 240 })
        );
    }

    #[test]
    fn state_transition_happens_inside_the_target() {
        let (rec, device, mut ctx, program) = setup();
        let fb = Framebuffer::typical_fbo(&device, 8, 8).unwrap();
        let quad = Mesh::fullscreen_quad(&device).unwrap();
        rec.take_calls();

        let state = RenderState::new()
            .with_capability(Capability::DepthTest)
            .with_param(DepthFunction(CompareFunc::Greater));
        DrawCommand::new(program, quad, fb.clone().into())
            .with_state(state.clone())
            .execute(&mut ctx)
            .unwrap();

        let calls = rec.calls();
        let bind_at = calls
            .iter()
            .position(|c| *c == Call::BindFramebuffer(Some(fb.raw())))
            .unwrap();
        let enable_at = calls
            .iter()
            .position(|c| *c == Call::Enable(Capability::DepthTest))
            .unwrap();
        assert!(bind_at < enable_at);
        assert_eq!(ctx.active_state(), &state);
    }

    #[test]
    fn missing_uniform_fails_but_cleans_up() {
        let (rec, device) = RecordingDevice::new().hide_uniform("missing").shared();
        let mut ctx = GpuContext::new(device.clone(), 320, 240, ContextConfig::default());
        let program = Rc::new(Program::graphics(&device, "void main() {}", "void main() {}").unwrap());
        let fb = Framebuffer::typical_fbo(&device, 8, 8).unwrap();
        let quad = Mesh::fullscreen_quad(&device).unwrap();
        rec.take_calls();

        let command = DrawCommand::new(program, quad, fb.clone().into())
            .texture("color_tex", fb.texture("color").unwrap())
            .uniform("missing", 1.0f32);
        let err = command.execute(&mut ctx).unwrap_err();

        assert!(matches!(err, Error::UniformNotFound { .. }));
        assert_eq!(ctx.units().assigned_count(), 0);
        assert!(!rec.calls().iter().any(|c| matches!(c, Call::DrawArrays { .. })));
        assert_eq!(rec.calls().iter().rev().nth(1), Some(&Call::BindFramebuffer(None)));
    }
}
