use std::rc::{Rc, Weak};

use crate::command::Command;
use crate::device::{Device, UniformData};
use crate::error::{Error, Result};
use crate::resources::Program;
use crate::state::RenderState;
use crate::surface::{Screen, Surface};
use crate::units::UnitAllocator;

/// Context construction options.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// State the pipeline starts in, the state of draws that set none, and
    /// the source of reset values when a state drops a parameter.
    pub default_state: RenderState,

    /// Caps the texture unit count below what the driver reports.
    pub max_texture_units: Option<u32>,

    /// Poll the driver error flag after every command.
    pub check_errors: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            default_state: RenderState::gl_defaults(),
            max_texture_units: None,
            check_errors: cfg!(debug_assertions),
        }
    }
}

/// Per-GL-context state shared by every command: the device, the unit
/// allocator, the tracked render state and the programs seen so far.
pub struct GpuContext {
    device: Rc<dyn Device>,
    units: UnitAllocator,
    programs: Vec<Weak<Program>>,

    default_state: RenderState,
    active_state: RenderState,

    screen: Rc<Screen>,
    frame_index: u64,
    poll_errors: bool,
}

impl GpuContext {
    /// Queries the unit ceiling once and puts the pipeline in the default
    /// state so tracked and actual state agree.
    pub fn new(device: Rc<dyn Device>, width: u32, height: u32, config: ContextConfig) -> Self {
        let hw_units = device.max_texture_units();
        let max_units = config.max_texture_units.map_or(hw_units, |cap| cap.min(hw_units));
        log::info!(
            "gpu context: {max_units} texture units, {} color attachments",
            device.max_color_attachments()
        );

        config.default_state.apply_all(&*device);

        Self {
            units: UnitAllocator::new(max_units),
            programs: Vec::new(),
            active_state: config.default_state.clone(),
            default_state: config.default_state,
            screen: Rc::new(Screen::new(width, height)),
            frame_index: 0,
            poll_errors: config.check_errors,
            device,
        }
    }

    // ── frame boundary ────────────────────────────────────────────────────

    /// Targets the default framebuffer over the whole screen.
    pub fn begin_frame(&mut self) {
        let (width, height) = self.screen.size();
        self.device.bind_framebuffer(None);
        self.device.viewport(0, 0, width, height);
    }

    /// Reclaims every texture unit and advances the frame counter.
    pub fn end_frame(&mut self) {
        self.units.release_all_units();
        self.frame_index += 1;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen.resize(width, height);
    }

    // ── execution ─────────────────────────────────────────────────────────

    /// Runs `commands` in order, stopping at the first failure.
    pub fn execute(&mut self, commands: &[Command]) -> Result<()> {
        for (i, command) in commands.iter().enumerate() {
            let result = command.execute(self).and_then(|()| {
                if self.poll_errors {
                    self.check_errors()
                } else {
                    Ok(())
                }
            });
            if let Err(e) = result {
                log::error!(
                    "frame {}: {} command #{i} failed: {e}",
                    self.frame_index,
                    command.kind()
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Moves the pipeline from the active state to `target`, touching only
    /// what differs.
    pub fn transition_to(&mut self, target: &RenderState) {
        if *target == self.active_state {
            return;
        }
        self.active_state
            .apply_diff(target, &self.default_state, &*self.device);
        self.active_state = target.clone();
    }

    /// Moves the pipeline back to the default state.
    pub fn reset_state(&mut self) {
        if self.active_state == self.default_state {
            return;
        }
        self.active_state
            .apply_diff(&self.default_state, &self.default_state, &*self.device);
        self.active_state = self.default_state.clone();
    }

    /// Drains the driver error flag. The first pending error is returned;
    /// any further ones are logged.
    pub fn check_errors(&self) -> Result<()> {
        let Some(code) = self.device.poll_error() else {
            return Ok(());
        };
        while let Some(extra) = self.device.poll_error() {
            log::warn!("additional driver error 0x{extra:04X}");
        }
        Err(Error::Driver { code })
    }

    // ── programs ──────────────────────────────────────────────────────────

    /// Remembers `program` for [`GpuContext::set_uniform_all`]. Registering
    /// the same program again is a no-op.
    pub fn register_program(&mut self, program: &Rc<Program>) {
        self.programs.retain(|p| p.strong_count() > 0);
        let ptr = Rc::as_ptr(program);
        if !self.programs.iter().any(|p| p.as_ptr() == ptr) {
            log::debug!("registered program {:?}", program.raw());
            self.programs.push(Rc::downgrade(program));
        }
    }

    /// Uploads `value` to every live registered program that declares
    /// `name`, returning how many did. Leaves no program bound.
    pub fn set_uniform_all(&mut self, name: &str, value: impl Into<UniformData>) -> usize {
        let value = value.into();
        let mut updated = 0;
        for program in self.programs.iter().filter_map(Weak::upgrade) {
            if program.has_uniform(name) {
                program.bind();
                program.try_set_uniform(name, value);
                updated += 1;
            }
        }
        if updated > 0 {
            self.device.use_program(None);
        }
        updated
    }

    /// Number of registered programs still alive.
    pub fn program_count(&self) -> usize {
        self.programs.iter().filter(|p| p.strong_count() > 0).count()
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn device(&self) -> &Rc<dyn Device> {
        &self.device
    }

    #[inline]
    pub fn units(&self) -> &UnitAllocator {
        &self.units
    }

    #[inline]
    pub fn units_mut(&mut self) -> &mut UnitAllocator {
        &mut self.units
    }

    #[inline]
    pub fn screen(&self) -> &Rc<Screen> {
        &self.screen
    }

    /// The default framebuffer as a command target.
    pub fn screen_surface(&self) -> Surface {
        Surface::Screen(self.screen.clone())
    }

    #[inline]
    pub fn active_state(&self) -> &RenderState {
        &self.active_state
    }

    #[inline]
    pub fn default_state(&self) -> &RenderState {
        &self.default_state
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
