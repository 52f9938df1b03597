use std::rc::Rc;

use crate::core::GpuContext;
use crate::device::UniformData;
use crate::error::Result;
use crate::resources::{Buffer, Program};

use super::UniformMap;

/// Runs a compute program over a 3-D grid of work groups.
///
/// No memory barrier is issued afterwards. Writes to the storage buffers
/// are not guaranteed visible to a later draw or dispatch; making them
/// visible is up to the caller.
#[derive(Debug)]
pub struct ComputeCommand {
    pub program: Rc<Program>,
    pub groups: [u32; 3],
    pub uniforms: UniformMap,
    pub storage: Vec<StorageBinding>,
}

/// A storage block connected to a buffer for one dispatch.
#[derive(Debug, Clone)]
pub struct StorageBinding {
    pub block: String,
    pub buffer: Rc<Buffer>,
    pub binding: u32,
}

impl ComputeCommand {
    pub fn new(program: Rc<Program>, groups: [u32; 3]) -> Self {
        Self {
            program,
            groups,
            uniforms: UniformMap::new(),
            storage: Vec::new(),
        }
    }

    pub fn with_uniforms(mut self, uniforms: UniformMap) -> Self {
        self.uniforms = uniforms;
        self
    }

    pub fn uniform(mut self, name: impl Into<String>, value: impl Into<UniformData>) -> Self {
        self.uniforms.set(name, value);
        self
    }

    /// Binds storage block `block` to `buffer` at `binding` before dispatch.
    pub fn storage(mut self, block: impl Into<String>, buffer: Rc<Buffer>, binding: u32) -> Self {
        self.storage.push(StorageBinding {
            block: block.into(),
            buffer,
            binding,
        });
        self
    }

    pub fn execute(&self, ctx: &mut GpuContext) -> Result<()> {
        self.program.bind();
        for s in &self.storage {
            self.program.attach_ssbo(&s.block, &s.buffer, s.binding)?;
        }

        let dispatched = self
            .uniforms
            .apply(&self.program, ctx.units_mut())
            .map(|()| self.program.dispatch_compute(self.groups));
        self.uniforms.post_render(ctx.units_mut());
        dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContextConfig;
    use crate::device::{BufferTarget, Call, RecordingDevice};
    use crate::error::Error;

    #[test]
    fn dispatch_follows_bindings_and_uniforms() {
        let (rec, device) = RecordingDevice::new().shared();
        let mut ctx = GpuContext::new(device.clone(), 16, 16, ContextConfig::default());
        let program = Rc::new(Program::compute(&device, "void main() {}").unwrap());
        let particles = Rc::new(Buffer::new(&device, BufferTarget::ShaderStorage).unwrap());
        rec.take_calls();

        ComputeCommand::new(program.clone(), [8, 4, 1])
            .storage("Particles", particles.clone(), 0)
            .uniform("dt", 0.016f32)
            .execute(&mut ctx)
            .unwrap();

        let calls = rec.calls();
        assert_eq!(calls.first(), Some(&Call::UseProgram(Some(program.raw()))));
        assert!(calls.contains(&Call::BindBufferBase(
            BufferTarget::ShaderStorage,
            0,
            Some(particles.raw())
        )));
        assert_eq!(calls.last(), Some(&Call::DispatchCompute([8, 4, 1])));
        assert_eq!(rec.uniform_uploads().len(), 1);
    }

    #[test]
    fn missing_block_stops_before_dispatch() {
        let (rec, device) = RecordingDevice::new().hide_storage_block("Nope").shared();
        let mut ctx = GpuContext::new(device.clone(), 16, 16, ContextConfig::default());
        let program = Rc::new(Program::compute(&device, "void main() {}").unwrap());
        let buffer = Rc::new(Buffer::new(&device, BufferTarget::ShaderStorage).unwrap());

        let err = ComputeCommand::new(program, [1, 1, 1])
            .storage("Nope", buffer, 0)
            .execute(&mut ctx)
            .unwrap_err();
        assert!(matches!(err, Error::StorageBlockNotFound { .. }));
        assert!(!rec.calls().iter().any(|c| matches!(c, Call::DispatchCompute(_))));
    }
}
