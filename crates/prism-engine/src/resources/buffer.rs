use std::cell::Cell;
use std::rc::Rc;

use crate::device::{BufferTarget, BufferUsage, Device, RawBuffer};
use crate::error::{Error, Result};
use crate::units::UnitAllocator;

/// Device memory bound to one buffer target.
///
/// Uploads are synchronous and replace the whole store; there is no
/// sub-range update.
pub struct Buffer {
    device: Rc<dyn Device>,
    raw: RawBuffer,
    target: BufferTarget,
    len: Cell<usize>,
}

impl Buffer {
    /// Creates an empty buffer.
    pub fn new(device: &Rc<dyn Device>, target: BufferTarget) -> Result<Self> {
        let raw = device
            .create_buffer()
            .map_err(|e| Error::device("buffer", e))?;
        log::debug!("created {target:?} buffer {raw:?}");
        Ok(Self {
            device: device.clone(),
            raw,
            target,
            len: Cell::new(0),
        })
    }

    /// Creates a buffer and uploads `data` with `usage`.
    pub fn with_data(
        device: &Rc<dyn Device>,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<Self> {
        let buffer = Self::new(device, target)?;
        buffer.load(data, usage);
        Ok(buffer)
    }

    /// Creates a static buffer from a slice of plain-old-data values.
    pub fn from_slice<T: bytemuck::Pod>(
        device: &Rc<dyn Device>,
        target: BufferTarget,
        data: &[T],
    ) -> Result<Self> {
        Self::with_data(device, target, bytemuck::cast_slice(data), BufferUsage::StaticDraw)
    }

    /// Replaces the buffer contents.
    ///
    /// Binds and unbinds `target` directly, so it must not run while another
    /// buffer is bound to the same target through [`Buffer::bind`].
    pub fn load(&self, data: &[u8], usage: BufferUsage) {
        self.device.bind_buffer(self.target, Some(self.raw));
        self.device.buffer_data(self.target, data, usage);
        self.device.bind_buffer(self.target, None);
        self.len.set(data.len());
    }

    /// [`Buffer::load`] with a dynamic usage hint.
    pub fn update(&self, data: &[u8]) {
        self.load(data, BufferUsage::DynamicDraw);
    }

    /// Binds to the buffer's target unless the target is already marked bound.
    pub fn bind(&self, units: &mut UnitAllocator) {
        if units.bind_buffer_target(self.target) {
            self.device.bind_buffer(self.target, Some(self.raw));
        } else {
            log::trace!("{:?} already bound; skipping bind of {:?}", self.target, self.raw);
        }
    }

    /// Inverse of [`Buffer::bind`].
    pub fn unbind(&self, units: &mut UnitAllocator) {
        if units.unbind_buffer_target(self.target) {
            self.device.bind_buffer(self.target, None);
        }
    }

    #[inline]
    pub fn raw(&self) -> RawBuffer {
        self.raw
    }

    #[inline]
    pub fn target(&self) -> BufferTarget {
        self.target
    }

    /// Size of the current store in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len.get() == 0
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        log::debug!("deleting buffer {:?}", self.raw);
        self.device.delete_buffer(self.raw);
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("raw", &self.raw)
            .field("target", &self.target)
            .field("len", &self.len.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, RecordingDevice};

    fn setup() -> (Rc<RecordingDevice>, Rc<dyn Device>) {
        RecordingDevice::new().shared()
    }

    #[test]
    fn load_uploads_between_bind_and_unbind() {
        let (rec, device) = setup();
        let buffer = Buffer::from_slice(&device, BufferTarget::Array, &[1.0f32, 2.0, 3.0]).unwrap();

        assert_eq!(buffer.len(), 12);
        assert_eq!(
            rec.calls()[1..],
            [
                Call::BindBuffer(BufferTarget::Array, Some(buffer.raw())),
                Call::BufferData {
                    target: BufferTarget::Array,
                    len: 12,
                    usage: BufferUsage::StaticDraw,
                },
                Call::BindBuffer(BufferTarget::Array, None),
            ]
        );
    }

    #[test]
    fn update_uses_dynamic_usage() {
        let (rec, device) = setup();
        let buffer = Buffer::new(&device, BufferTarget::Array).unwrap();
        rec.take_calls();

        buffer.update(&[0u8; 8]);
        assert!(rec.calls().contains(&Call::BufferData {
            target: BufferTarget::Array,
            len: 8,
            usage: BufferUsage::DynamicDraw,
        }));
    }

    #[test]
    fn redundant_bind_is_elided() {
        let (rec, device) = setup();
        let mut units = UnitAllocator::new(4);
        let buffer = Buffer::new(&device, BufferTarget::Array).unwrap();
        rec.take_calls();

        buffer.bind(&mut units);
        buffer.bind(&mut units);
        buffer.unbind(&mut units);
        buffer.unbind(&mut units);

        assert_eq!(
            rec.calls(),
            vec![
                Call::BindBuffer(BufferTarget::Array, Some(buffer.raw())),
                Call::BindBuffer(BufferTarget::Array, None),
            ]
        );
    }

    #[test]
    fn drop_deletes_the_buffer() {
        let (rec, device) = setup();
        let buffer = Buffer::new(&device, BufferTarget::Array).unwrap();
        assert_eq!(rec.live_objects(), 1);
        drop(buffer);
        assert_eq!(rec.live_objects(), 0);
    }
}
