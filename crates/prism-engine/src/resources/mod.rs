//! GPU resource wrappers.
//!
//! Each wrapper owns one driver object and deletes it on drop. Sharing is
//! explicit: vertex arrays clone as aliases of the same object, textures and
//! framebuffers are handed around as `Rc<_>`.

mod buffer;
mod framebuffer;
mod image;
mod program;
mod texture;
mod vertex_array;

pub use buffer::Buffer;
pub use framebuffer::Framebuffer;
pub use self::image::{ImageData, ImagePool};
pub use program::{Program, Shader};
pub use texture::{Texture, TextureParams};
pub use vertex_array::VertexArray;
