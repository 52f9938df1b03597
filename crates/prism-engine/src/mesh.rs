//! Drawable geometry.

use std::rc::Rc;

use glam::Vec4;

use crate::device::{Device, Topology};
use crate::error::Result;
use crate::resources::VertexArray;

/// Anything a draw command can render.
pub trait Drawable {
    fn vertex_array(&self) -> &VertexArray;

    /// Called after the program is bound and before the target is bound.
    fn on_draw(&self) {}
}

impl Drawable for VertexArray {
    fn vertex_array(&self) -> &VertexArray {
        self
    }
}

/// Plain geometry with a single position attribute.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertex_array: VertexArray,
}

impl Mesh {
    pub fn new(vertex_array: VertexArray) -> Self {
        Self { vertex_array }
    }

    /// Two triangles covering clip space, 3-component positions at
    /// attribute 0. Post-processing passes draw this with a vertex shader
    /// that derives UVs from position.
    pub fn fullscreen_quad(device: &Rc<dyn Device>) -> Result<Self> {
        #[rustfmt::skip]
        const QUAD: [f32; 18] = [
            -1.0, -1.0, 0.0,
             1.0, -1.0, 0.0,
             1.0,  1.0, 0.0,
            -1.0, -1.0, 0.0,
             1.0,  1.0, 0.0,
            -1.0,  1.0, 0.0,
        ];
        let vertex_array = VertexArray::from_floats(device, &QUAD, 3, Topology::Triangles)?;
        Ok(Self::new(vertex_array))
    }
}

impl Drawable for Mesh {
    fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }
}

/// Points drawn from `vec4` positions at attribute 0.
#[derive(Debug, Clone)]
pub struct PointCloud {
    vertex_array: VertexArray,
    len: usize,
}

impl PointCloud {
    pub fn new(device: &Rc<dyn Device>, points: &[Vec4]) -> Result<Self> {
        let floats: &[f32] = bytemuck::cast_slice(points);
        let vertex_array = VertexArray::from_floats(device, floats, 4, Topology::Points)?;
        Ok(Self {
            vertex_array,
            len: points.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drawable for PointCloud {
    fn vertex_array(&self) -> &VertexArray {
        &self.vertex_array
    }
}
