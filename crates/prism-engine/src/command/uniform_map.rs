use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::device::UniformData;
use crate::error::Result;
use crate::resources::{Program, Texture};
use crate::units::{TextureUnit, UnitAllocator};

/// Value of one entry in a [`UniformMap`].
#[derive(Debug, Clone)]
pub enum UniformValue {
    Data(UniformData),
    /// Bound to a fresh unit at apply time; the sampler receives the unit
    /// index.
    Texture(Rc<Texture>),
}

/// Uniform values for a single command.
///
/// [`UniformMap::apply`] uploads every entry to the bound program, binding
/// textures as it goes; [`UniformMap::post_render`] gives the units back.
/// Every `apply` must be followed by `post_render` before the map is applied
/// again.
#[derive(Debug, Default)]
pub struct UniformMap {
    entries: BTreeMap<String, UniformValue>,
    acquired: RefCell<Vec<TextureUnit>>,
}

impl UniformMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, replacing an earlier value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformData>) -> &mut Self {
        self.entries
            .insert(name.into(), UniformValue::Data(value.into()));
        self
    }

    pub fn set_texture(&mut self, name: impl Into<String>, texture: Rc<Texture>) -> &mut Self {
        self.entries
            .insert(name.into(), UniformValue::Texture(texture));
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<UniformData>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_texture(mut self, name: impl Into<String>, texture: Rc<Texture>) -> Self {
        self.set_texture(name, texture);
        self
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uploads every entry to `program`, which must be bound.
    ///
    /// Units taken before a failure stay recorded, so `post_render` still
    /// releases them.
    pub fn apply(&self, program: &Program, units: &mut UnitAllocator) -> Result<()> {
        for (name, value) in &self.entries {
            match value {
                UniformValue::Data(data) => program.set_uniform(name, *data)?,
                UniformValue::Texture(texture) => {
                    let unit = texture.bind(units)?;
                    self.acquired.borrow_mut().push(unit);
                    program.set_uniform(name, unit.sampler_value())?;
                }
            }
        }
        Ok(())
    }

    /// Releases the units taken by the last [`UniformMap::apply`].
    pub fn post_render(&self, units: &mut UnitAllocator) {
        for unit in self.acquired.borrow_mut().drain(..) {
            units.release_unit(unit);
        }
    }

    /// Units currently held by this map.
    pub fn acquired_units(&self) -> Vec<TextureUnit> {
        self.acquired.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Device, Extent, RecordingDevice, TextureFormat};
    use crate::error::Error;
    use crate::resources::TextureParams;
    use glam::Vec3;

    fn program(device: &Rc<dyn Device>) -> Program {
        Program::graphics(device, "void main() {}", "void main() {}").unwrap()
    }

    fn texture(device: &Rc<dyn Device>) -> Rc<Texture> {
        Rc::new(
            Texture::with_storage(device, Extent::d2(2, 2), TextureFormat::Rgba8, &TextureParams::new())
                .unwrap(),
        )
    }

    #[test]
    fn later_set_replaces_earlier() {
        let mut map = UniformMap::new();
        map.set("t", 1.0f32).set("t", 2.0f32);
        assert_eq!(map.len(), 1);
        assert!(matches!(map.get("t"), Some(UniformValue::Data(UniformData::Float(v))) if *v == 2.0));
    }

    #[test]
    fn post_render_releases_every_texture_unit() {
        let (_, device) = RecordingDevice::new().shared();
        let program = program(&device);
        let mut units = UnitAllocator::new(8);

        let map = UniformMap::new()
            .with_texture("a", texture(&device))
            .with_texture("b", texture(&device))
            .with("tint", Vec3::ONE);

        map.apply(&program, &mut units).unwrap();
        let acquired = map.acquired_units();
        assert_eq!(acquired.len(), 2);
        assert!(acquired.iter().all(|u| units.is_assigned(*u)));

        map.post_render(&mut units);
        assert!(acquired.iter().all(|u| !units.is_assigned(*u)));
        assert_eq!(units.assigned_count(), 0);
    }

    #[test]
    fn samplers_receive_their_unit_index() {
        let (rec, device) = RecordingDevice::new().shared();
        let program = program(&device);
        let mut units = UnitAllocator::new(8);
        // unit 0 is held by someone else
        units.acquire_unit().unwrap();

        let map = UniformMap::new().with_texture("tex", texture(&device));
        map.apply(&program, &mut units).unwrap();

        assert_eq!(rec.uniform_uploads(), vec![("tex".to_string(), UniformData::Int(1))]);
        map.post_render(&mut units);
    }

    #[test]
    fn failed_apply_still_releases_units() {
        let (_, device) = RecordingDevice::new().hide_uniform("z_missing").shared();
        let program = program(&device);
        let mut units = UnitAllocator::new(8);

        let map = UniformMap::new()
            .with_texture("a_tex", texture(&device))
            .with("z_missing", 1);

        assert!(matches!(
            map.apply(&program, &mut units),
            Err(Error::UniformNotFound { .. })
        ));
        assert_eq!(units.assigned_count(), 1);

        map.post_render(&mut units);
        assert_eq!(units.assigned_count(), 0);
    }

    #[test]
    fn exhausted_units_fail_apply() {
        let (_, device) = RecordingDevice::new().shared();
        let program = program(&device);
        let mut units = UnitAllocator::new(1);

        let map = UniformMap::new()
            .with_texture("a", texture(&device))
            .with_texture("b", texture(&device));
        assert!(matches!(
            map.apply(&program, &mut units),
            Err(Error::ResourceExhausted { .. })
        ));
        map.post_render(&mut units);
        assert_eq!(units.assigned_count(), 0);
    }
}
