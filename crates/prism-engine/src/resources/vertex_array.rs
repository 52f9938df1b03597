use std::collections::HashSet;
use std::rc::Rc;

use crate::device::{AttributeDescriptor, BufferTarget, Device, RawVertexArray, Topology};
use crate::error::{Error, Result};
use crate::units::UnitAllocator;

use super::Buffer;

/// Attribute buffers plus the topology and vertex count of one draw.
///
/// Cloning aliases the same driver objects; the vertex array and its buffers
/// are deleted when the last clone drops.
#[derive(Clone)]
pub struct VertexArray {
    inner: Rc<Inner>,
}

struct Inner {
    device: Rc<dyn Device>,
    raw: RawVertexArray,
    attributes: Vec<(Buffer, AttributeDescriptor)>,
    topology: Topology,
    num_vertices: u32,
}

impl VertexArray {
    /// Fails with [`Error::DuplicateAttribute`] if two descriptors share an index.
    pub fn new(
        device: &Rc<dyn Device>,
        attributes: Vec<(Buffer, AttributeDescriptor)>,
        topology: Topology,
        num_vertices: u32,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(attributes.len());
        for (_, attr) in &attributes {
            if !seen.insert(attr.index) {
                return Err(Error::DuplicateAttribute { index: attr.index });
            }
        }
        debug_assert!(
            attributes.iter().all(|(b, _)| b.target() == BufferTarget::Array),
            "vertex attributes must come from array buffers"
        );

        let raw = device
            .create_vertex_array()
            .map_err(|e| Error::device("vertex array", e))?;
        log::debug!(
            "created vertex array {raw:?}: {} attributes, {num_vertices} vertices",
            attributes.len()
        );

        Ok(Self {
            inner: Rc::new(Inner {
                device: device.clone(),
                raw,
                attributes,
                topology,
                num_vertices,
            }),
        })
    }

    /// One tightly packed float attribute at index 0; the vertex count is
    /// `data.len() / components`.
    pub fn from_floats(
        device: &Rc<dyn Device>,
        data: &[f32],
        components: u8,
        topology: Topology,
    ) -> Result<Self> {
        debug_assert!((1..=4).contains(&components));
        let buffer = Buffer::from_slice(device, BufferTarget::Array, data)?;
        let num_vertices = (data.len() / components as usize) as u32;
        Self::new(
            device,
            vec![(buffer, AttributeDescriptor::float(0, components))],
            topology,
            num_vertices,
        )
    }

    /// Issues one non-indexed draw over `[0, num_vertices)`.
    ///
    /// Attribute pointers are re-specified on every draw, each buffer bound
    /// only while its pointer is set.
    pub fn draw(&self, units: &mut UnitAllocator) {
        let inner = &*self.inner;
        let device = &*inner.device;

        device.bind_vertex_array(Some(inner.raw));
        for (buffer, attr) in &inner.attributes {
            device.enable_vertex_attrib(attr.index);
            buffer.bind(units);
            device.vertex_attrib_pointer(attr);
            buffer.unbind(units);
        }

        device.draw_arrays(inner.topology, 0, inner.num_vertices);

        for (_, attr) in &inner.attributes {
            device.disable_vertex_attrib(attr.index);
        }
        device.bind_vertex_array(None);
    }

    #[inline]
    pub fn raw(&self) -> RawVertexArray {
        self.inner.raw
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.inner.topology
    }

    #[inline]
    pub fn num_vertices(&self) -> u32 {
        self.inner.num_vertices
    }

    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDescriptor> + '_ {
        self.inner.attributes.iter().map(|(_, a)| a)
    }

    /// Whether `self` and `other` alias the same driver object.
    pub fn same_as(&self, other: &VertexArray) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        log::debug!("deleting vertex array {:?}", self.raw);
        self.device.delete_vertex_array(self.raw);
    }
}

impl std::fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexArray")
            .field("raw", &self.inner.raw)
            .field("topology", &self.inner.topology)
            .field("num_vertices", &self.inner.num_vertices)
            .field("attributes", &self.inner.attributes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, RecordingDevice};

    fn buffer(device: &Rc<dyn Device>) -> Buffer {
        Buffer::from_slice(device, BufferTarget::Array, &[0.0f32; 18]).unwrap()
    }

    #[test]
    fn duplicate_attribute_index_fails() {
        let (_, device) = RecordingDevice::new().shared();
        let attrs = vec![
            (buffer(&device), AttributeDescriptor::float(0, 3)),
            (buffer(&device), AttributeDescriptor::float(1, 2)),
            (buffer(&device), AttributeDescriptor::float(0, 4)),
        ];

        match VertexArray::new(&device, attrs, Topology::Triangles, 6) {
            Err(Error::DuplicateAttribute { index }) => assert_eq!(index, 0),
            other => panic!("expected duplicate attribute, got {other:?}"),
        }
    }

    #[test]
    fn unique_indices_draw_once_with_vertex_count() {
        let (rec, device) = RecordingDevice::new().shared();
        let attrs = vec![
            (buffer(&device), AttributeDescriptor::float(0, 3)),
            (buffer(&device), AttributeDescriptor::float(1, 3)),
        ];
        let vao = VertexArray::new(&device, attrs, Topology::Triangles, 6).unwrap();
        let mut units = UnitAllocator::new(4);
        rec.take_calls();

        vao.draw(&mut units);

        let draws: Vec<_> = rec
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::DrawArrays { .. }))
            .collect();
        assert_eq!(
            draws,
            vec![Call::DrawArrays {
                topology: Topology::Triangles,
                first: 0,
                count: 6,
            }]
        );
        assert!(!units.is_target_bound(BufferTarget::Array));
    }

    #[test]
    fn draw_enables_then_disables_each_attribute() {
        let (rec, device) = RecordingDevice::new().shared();
        let vao = VertexArray::from_floats(&device, &[0.0; 12], 4, Topology::Points).unwrap();
        let mut units = UnitAllocator::new(4);
        rec.take_calls();

        vao.draw(&mut units);

        let calls = rec.calls();
        assert_eq!(calls.first(), Some(&Call::BindVertexArray(Some(vao.raw()))));
        assert_eq!(calls.last(), Some(&Call::BindVertexArray(None)));
        assert!(calls.contains(&Call::EnableVertexAttrib(0)));
        assert!(calls.contains(&Call::DisableVertexAttrib(0)));
        assert!(calls.contains(&Call::DrawArrays {
            topology: Topology::Points,
            first: 0,
            count: 3,
        }));
    }

    #[test]
    fn clones_alias_until_last_drop() {
        let (rec, device) = RecordingDevice::new().shared();
        let vao = VertexArray::from_floats(&device, &[0.0; 9], 3, Topology::Triangles).unwrap();
        let alias = vao.clone();
        assert!(alias.same_as(&vao));

        // one vertex array + one buffer
        assert_eq!(rec.live_objects(), 2);
        drop(vao);
        assert_eq!(rec.live_objects(), 2);
        drop(alias);
        assert_eq!(rec.live_objects(), 0);
    }
}
