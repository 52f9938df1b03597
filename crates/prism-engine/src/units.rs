//! Texture unit and buffer-target bookkeeping.
//!
//! One [`UnitAllocator`] exists per GL context (owned by
//! [`crate::core::GpuContext`]). Texture binds take a unit from it; buffer
//! binds consult it to skip redundant driver calls. Units are reclaimed in
//! bulk once per frame with [`UnitAllocator::release_all_units`].

use std::collections::{BTreeSet, HashSet};

use crate::device::BufferTarget;
use crate::error::{Error, Result};

/// Index of a texture image unit (`GL_TEXTURE0 + index`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureUnit(u32);

impl TextureUnit {
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Value to upload to a sampler uniform.
    #[inline]
    pub fn sampler_value(self) -> i32 {
        self.0 as i32
    }
}

#[derive(Debug)]
pub struct UnitAllocator {
    assigned: BTreeSet<u32>,
    max_units: u32,
    bound_targets: HashSet<BufferTarget>,
}

impl UnitAllocator {
    pub fn new(max_units: u32) -> Self {
        Self {
            assigned: BTreeSet::new(),
            max_units,
            bound_targets: HashSet::new(),
        }
    }

    #[inline]
    pub fn max_units(&self) -> u32 {
        self.max_units
    }

    // ── texture units ─────────────────────────────────────────────────────

    /// Takes the lowest free unit.
    ///
    /// Fails with [`Error::ResourceExhausted`] when all `max_units` are held;
    /// nothing is evicted.
    pub fn acquire_unit(&mut self) -> Result<TextureUnit> {
        let free = (0..self.max_units).find(|i| !self.assigned.contains(i));
        match free {
            Some(index) => {
                self.assigned.insert(index);
                log::trace!("texture unit {index} acquired");
                Ok(TextureUnit(index))
            }
            None => Err(Error::ResourceExhausted {
                resource: "texture unit",
                limit: self.max_units,
            }),
        }
    }

    /// Returns `true` if the unit was assigned.
    pub fn release_unit(&mut self, unit: TextureUnit) -> bool {
        self.assigned.remove(&unit.0)
    }

    /// Frees every unit. Called by the frame driver at the frame boundary.
    pub fn release_all_units(&mut self) {
        if !self.assigned.is_empty() {
            log::trace!("releasing {} texture units", self.assigned.len());
        }
        self.assigned.clear();
    }

    #[inline]
    pub fn is_assigned(&self, unit: TextureUnit) -> bool {
        self.assigned.contains(&unit.0)
    }

    #[inline]
    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    pub fn assigned_units(&self) -> impl Iterator<Item = TextureUnit> + '_ {
        self.assigned.iter().map(|i| TextureUnit(*i))
    }

    // ── buffer targets ────────────────────────────────────────────────────

    /// Marks `target` bound. `false` means it already was and the caller
    /// should skip the driver call.
    pub fn bind_buffer_target(&mut self, target: BufferTarget) -> bool {
        self.bound_targets.insert(target)
    }

    /// Clears the mark. `false` means it was not bound.
    pub fn unbind_buffer_target(&mut self, target: BufferTarget) -> bool {
        self.bound_targets.remove(&target)
    }

    #[inline]
    pub fn is_target_bound(&self, target: BufferTarget) -> bool {
        self.bound_targets.contains(&target)
    }
}
