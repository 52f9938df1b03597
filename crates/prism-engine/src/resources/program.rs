use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::device::{
    BufferTarget, Device, RawProgram, RawShader, RawUniformLocation, ShaderStage, UniformData,
};
use crate::error::{Error, Result};

use super::Buffer;

/// One compiled shader stage. Deleted on drop; a linked program keeps its
/// own copy of the code.
pub struct Shader {
    device: Rc<dyn Device>,
    raw: RawShader,
    stage: ShaderStage,
}

impl Shader {
    /// Compiles `source`. A failure carries the driver's info log.
    pub fn compile(device: &Rc<dyn Device>, stage: ShaderStage, source: &str) -> Result<Self> {
        let raw = device
            .create_shader(stage)
            .map_err(|e| Error::device("shader", e))?;
        let shader = Self {
            device: device.clone(),
            raw,
            stage,
        };
        device
            .compile_shader(raw, source)
            .map_err(|log| Error::ShaderCompile { stage, log })?;
        Ok(shader)
    }

    /// Reads and compiles a shader file.
    pub fn from_file(device: &Rc<dyn Device>, stage: ShaderStage, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("compiling {stage:?} shader {}", path.display());
        Self::compile(device, stage, &source)
    }

    #[inline]
    pub fn raw(&self) -> RawShader {
        self.raw
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.device.delete_shader(self.raw);
    }
}

/// A linked shader program.
///
/// Uniform locations are looked up once per name and cached, misses
/// included.
pub struct Program {
    device: Rc<dyn Device>,
    raw: RawProgram,
    locations: RefCell<HashMap<String, Option<RawUniformLocation>>>,
}

impl Program {
    /// Compiles every stage and links them.
    pub fn from_sources(device: &Rc<dyn Device>, stages: &[(ShaderStage, &str)]) -> Result<Self> {
        let shaders = stages
            .iter()
            .map(|(stage, src)| Shader::compile(device, *stage, src))
            .collect::<Result<Vec<_>>>()?;
        Self::link(device, &shaders)
    }

    /// Compiles one file per stage and links them.
    pub fn from_files<P: AsRef<Path>>(device: &Rc<dyn Device>, stages: &[(ShaderStage, P)]) -> Result<Self> {
        let shaders = stages
            .iter()
            .map(|(stage, path)| Self::compile_shader_file(device, path, *stage))
            .collect::<Result<Vec<_>>>()?;
        Self::link(device, &shaders)
    }

    /// A vertex + fragment program.
    pub fn graphics(device: &Rc<dyn Device>, vertex: &str, fragment: &str) -> Result<Self> {
        Self::from_sources(device, &[(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)])
    }

    /// A single-stage compute program.
    pub fn compute(device: &Rc<dyn Device>, source: &str) -> Result<Self> {
        Self::from_sources(device, &[(ShaderStage::Compute, source)])
    }

    pub fn compile_shader_file(
        device: &Rc<dyn Device>,
        path: impl AsRef<Path>,
        stage: ShaderStage,
    ) -> Result<Shader> {
        Shader::from_file(device, stage, path)
    }

    /// Links already compiled shaders. They are detached again afterwards
    /// and may be dropped.
    pub fn link(device: &Rc<dyn Device>, shaders: &[Shader]) -> Result<Self> {
        let raw = device
            .create_program()
            .map_err(|e| Error::device("program", e))?;
        let program = Self {
            device: device.clone(),
            raw,
            locations: RefCell::new(HashMap::new()),
        };

        for shader in shaders {
            device.attach_shader(raw, shader.raw());
        }
        let linked = device.link_program(raw);
        for shader in shaders {
            device.detach_shader(raw, shader.raw());
        }
        linked.map_err(|log| Error::ProgramLink { log })?;

        log::debug!("linked program {raw:?} from {} stages", shaders.len());
        Ok(program)
    }

    pub fn bind(&self) {
        self.device.use_program(Some(self.raw));
    }

    pub fn unbind(&self) {
        self.device.use_program(None);
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    /// Location of an active uniform, cached per name.
    pub fn location(&self, name: &str) -> Option<RawUniformLocation> {
        if let Some(cached) = self.locations.borrow().get(name) {
            return *cached;
        }
        let location = self.device.uniform_location(self.raw, name);
        if location.is_none() {
            log::trace!("program {:?} has no uniform `{name}`", self.raw);
        }
        self.locations.borrow_mut().insert(name.to_string(), location);
        location
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.location(name).is_some()
    }

    /// Uploads `value` to `name`. The program must be bound.
    ///
    /// A name the program does not declare (or the compiler optimized out)
    /// is an error.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformData>) -> Result<()> {
        let location = self.location(name).ok_or_else(|| Error::UniformNotFound {
            name: name.to_string(),
        })?;
        self.device.set_uniform(location, &value.into());
        Ok(())
    }

    /// Like [`Program::set_uniform`] but skips undeclared names. Returns
    /// whether the value was uploaded.
    pub fn try_set_uniform(&self, name: &str, value: impl Into<UniformData>) -> bool {
        match self.location(name) {
            Some(location) => {
                self.device.set_uniform(location, &value.into());
                true
            }
            None => false,
        }
    }

    // ── storage buffers & compute ─────────────────────────────────────────

    /// Connects the storage block `name` to `buffer` through binding point
    /// `binding`.
    pub fn attach_ssbo(&self, name: &str, buffer: &Buffer, binding: u32) -> Result<()> {
        let block = self
            .device
            .storage_block_index(self.raw, name)
            .ok_or_else(|| Error::StorageBlockNotFound {
                name: name.to_string(),
            })?;
        self.device.storage_block_binding(self.raw, block, binding);
        self.device
            .bind_buffer_base(BufferTarget::ShaderStorage, binding, Some(buffer.raw()));
        Ok(())
    }

    /// Dispatches `groups` work groups. The program must be bound.
    pub fn dispatch_compute(&self, groups: [u32; 3]) {
        log::trace!("dispatch {groups:?} on program {:?}", self.raw);
        self.device.dispatch_compute(groups);
    }

    #[inline]
    pub fn raw(&self) -> RawProgram {
        self.raw
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        log::debug!("deleting program {:?}", self.raw);
        self.device.delete_program(self.raw);
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("raw", &self.raw)
            .field("stage", &self.stage)
            .finish()
    }
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program").field("raw", &self.raw).finish()
    }
}
