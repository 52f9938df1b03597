use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::color::Color;
use crate::device::{
    AttachmentPoint, ClearFlags, Device, Extent, FramebufferStatus, RawFramebuffer, TextureFormat,
};
use crate::error::{Error, Result};
use crate::surface::Screen;

use super::{Texture, TextureParams};

struct Attachment {
    name: String,
    point: AttachmentPoint,
    texture: Rc<Texture>,
}

/// An offscreen render target with named texture attachments.
///
/// Usually shared as `Rc<Framebuffer>` between the renderer that draws into
/// it and the one that samples it. Attachments are only added, never
/// replaced: a name and an attachment point can each be used once.
pub struct Framebuffer {
    device: Rc<dyn Device>,
    raw: RawFramebuffer,
    size: Cell<Option<(u32, u32)>>,
    attachments: RefCell<Vec<Attachment>>,
}

impl Framebuffer {
    /// Creates a framebuffer with no size and no attachments.
    pub fn new(device: &Rc<dyn Device>) -> Result<Self> {
        let raw = device
            .create_framebuffer()
            .map_err(|e| Error::device("framebuffer", e))?;
        log::debug!("created framebuffer {raw:?}");
        Ok(Self {
            device: device.clone(),
            raw,
            size: Cell::new(None),
            attachments: RefCell::new(Vec::new()),
        })
    }

    pub fn with_size(device: &Rc<dyn Device>, width: u32, height: u32) -> Result<Self> {
        let fb = Self::new(device)?;
        fb.on_resize(width, height);
        Ok(fb)
    }

    /// One RGBA8 color attachment named `color` (linear, clamped) and one
    /// 24-bit depth attachment named `depth`.
    pub fn typical_fbo(device: &Rc<dyn Device>, width: u32, height: u32) -> Result<Rc<Self>> {
        let extent = Extent::d2(width, height);
        let color = Texture::with_storage(device, extent, TextureFormat::Rgba8, &TextureParams::linear_clamp())?;
        let depth = Texture::with_storage(device, extent, TextureFormat::Depth24, &TextureParams::new())?;

        let fb = Self::with_size(device, width, height)?;
        fb.bind_texture("color", Rc::new(color))?;
        fb.bind_texture("depth", Rc::new(depth))?;
        fb.check_complete()?;
        Ok(Rc::new(fb))
    }

    // ── size ──────────────────────────────────────────────────────────────

    /// Records the target size. Attachments keep their storage; the owner
    /// rebuilds them if they should follow.
    pub fn on_resize(&self, width: u32, height: u32) {
        self.size.set(Some((width, height)));
    }

    #[inline]
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size.get()
    }

    /// Whether a size was ever set. Renderers use this to build their
    /// targets lazily on the first frame.
    pub fn is_configured(&self) -> bool {
        self.size.get().is_some()
    }

    // ── binding ───────────────────────────────────────────────────────────

    /// Makes this the draw target and sets the viewport to its size.
    pub fn bind(&self) -> Result<()> {
        let (width, height) = self.size.get().ok_or(Error::UnconfiguredSurface)?;
        self.device.bind_framebuffer(Some(self.raw));
        self.device.viewport(0, 0, width, height);
        Ok(())
    }

    /// Restores the default framebuffer and the screen viewport.
    pub fn unbind(&self, screen: &Screen) {
        let (width, height) = screen.size();
        self.device.bind_framebuffer(None);
        self.device.viewport(0, 0, width, height);
    }

    // ── attachments ───────────────────────────────────────────────────────

    /// Attaches `texture` under `name`, choosing the point from its format:
    /// depth formats go to the depth (or depth-stencil) point, everything
    /// else to the lowest free color point.
    pub fn bind_texture(&self, name: impl Into<String>, texture: Rc<Texture>) -> Result<AttachmentPoint> {
        let point = match texture.format() {
            Some(f) if f.has_stencil() => AttachmentPoint::DepthStencil,
            Some(f) if f.is_depth() => AttachmentPoint::Depth,
            _ => self.next_color_point()?,
        };
        self.bind_texture_at(name, point, texture)?;
        Ok(point)
    }

    /// Attaches textures in the order given.
    pub fn bind_textures<S, I>(&self, textures: I) -> Result<Vec<AttachmentPoint>>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Rc<Texture>)>,
    {
        textures
            .into_iter()
            .map(|(name, texture)| self.bind_texture(name, texture))
            .collect()
    }

    /// Attaches `texture` at an explicit point.
    pub fn bind_texture_at(
        &self,
        name: impl Into<String>,
        point: AttachmentPoint,
        texture: Rc<Texture>,
    ) -> Result<()> {
        let name = name.into();
        {
            let attachments = self.attachments.borrow();
            if attachments.iter().any(|a| a.name == name) {
                return Err(Error::DuplicateAttachment { name });
            }
            if let Some(existing) = attachments.iter().find(|a| a.point.overlaps(point)) {
                return Err(Error::AttachmentPointInUse {
                    point,
                    existing: existing.name.clone(),
                });
            }
        }
        if let AttachmentPoint::Color(i) = point {
            let limit = self.device.max_color_attachments();
            if i >= limit {
                return Err(Error::TooManyColorAttachments { limit });
            }
        }

        self.device.bind_framebuffer(Some(self.raw));
        self.device.framebuffer_texture(point, texture.kind(), Some(texture.raw()), 0);

        let mut attachments = self.attachments.borrow_mut();
        attachments.push(Attachment { name, point, texture });
        self.device.draw_buffers(&color_points(&attachments));
        self.device.bind_framebuffer(None);

        log::debug!("framebuffer {:?}: attached {point:?}", self.raw);
        Ok(())
    }

    /// The texture attached under `name`.
    pub fn texture(&self, name: &str) -> Result<Rc<Texture>> {
        self.attachments
            .borrow()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.texture.clone())
            .ok_or_else(|| Error::AttachmentNotFound { name: name.to_string() })
    }

    /// `(name, point)` of every attachment, in attach order.
    pub fn attachments(&self) -> Vec<(String, AttachmentPoint)> {
        self.attachments
            .borrow()
            .iter()
            .map(|a| (a.name.clone(), a.point))
            .collect()
    }

    /// Asks the driver whether the attachments form a usable target.
    pub fn check_complete(&self) -> Result<()> {
        self.device.bind_framebuffer(Some(self.raw));
        let status = self.device.framebuffer_status();
        self.device.bind_framebuffer(None);
        match status {
            FramebufferStatus::Complete => Ok(()),
            other => Err(Error::IncompleteFramebuffer {
                status: other.to_string(),
            }),
        }
    }

    // ── clearing ──────────────────────────────────────────────────────────

    /// Clears the attachments selected by `flags`. The framebuffer must be
    /// bound.
    pub fn clear(&self, flags: ClearFlags, color: Color, depth: f32, stencil: i32) {
        if flags.contains(ClearFlags::COLOR) {
            let count = color_points(&self.attachments.borrow()).len() as u32;
            for draw_buffer in 0..count {
                self.device.clear_buffer_color(draw_buffer, color);
            }
        }
        if flags.contains(ClearFlags::DEPTH) {
            self.device.clear_buffer_depth(depth);
        }
        if flags.contains(ClearFlags::STENCIL) {
            self.device.clear_buffer_stencil(stencil);
        }
    }

    #[inline]
    pub fn raw(&self) -> RawFramebuffer {
        self.raw
    }

    fn next_color_point(&self) -> Result<AttachmentPoint> {
        let used = color_points(&self.attachments.borrow());
        let limit = self.device.max_color_attachments();
        (0..limit)
            .map(AttachmentPoint::Color)
            .find(|p| !used.contains(p))
            .ok_or(Error::TooManyColorAttachments { limit })
    }
}

/// Color points in ascending order; draw buffer `i` is the `i`-th entry.
fn color_points(attachments: &[Attachment]) -> Vec<AttachmentPoint> {
    let mut points: Vec<_> = attachments
        .iter()
        .map(|a| a.point)
        .filter(|p| matches!(p, AttachmentPoint::Color(_)))
        .collect();
    points.sort();
    points
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        log::debug!("deleting framebuffer {:?}", self.raw);
        self.device.delete_framebuffer(self.raw);
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("raw", &self.raw)
            .field("size", &self.size.get())
            .field("attachments", &self.attachments())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, RecordingDevice};

    fn texture(device: &Rc<dyn Device>, format: TextureFormat) -> Rc<Texture> {
        Rc::new(Texture::with_storage(device, Extent::d2(4, 4), format, &TextureParams::new()).unwrap())
    }

    // ── attachments ───────────────────────────────────────────────────────

    #[test]
    fn distinct_names_are_retrievable() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        let a = texture(&device, TextureFormat::Rgba8);
        let b = texture(&device, TextureFormat::Rgba32F);

        assert_eq!(fb.bind_texture("a", a.clone()).unwrap(), AttachmentPoint::Color(0));
        assert_eq!(fb.bind_texture("b", b.clone()).unwrap(), AttachmentPoint::Color(1));

        assert!(Rc::ptr_eq(&fb.texture("a").unwrap(), &a));
        assert!(Rc::ptr_eq(&fb.texture("b").unwrap(), &b));
    }

    #[test]
    fn same_name_twice_fails() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        fb.bind_texture("color", texture(&device, TextureFormat::Rgba8)).unwrap();

        let err = fb
            .bind_texture("color", texture(&device, TextureFormat::Rgba8))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAttachment { name } if name == "color"));
    }

    #[test]
    fn same_point_twice_fails() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        fb.bind_texture("depth", texture(&device, TextureFormat::Depth24)).unwrap();

        let err = fb
            .bind_texture("depth2", texture(&device, TextureFormat::Depth32F))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AttachmentPointInUse { point: AttachmentPoint::Depth, existing } if existing == "depth"
        ));
    }

    #[test]
    fn depth_stencil_conflicts_with_depth() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        let depth = texture(&device, TextureFormat::Depth24);
        fb.bind_texture("depth", depth.clone()).unwrap();

        let err = fb
            .bind_texture("depth_stencil", texture(&device, TextureFormat::Depth24Stencil8))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AttachmentPointInUse { point: AttachmentPoint::DepthStencil, existing } if existing == "depth"
        ));
        assert_eq!(fb.attachments(), vec![("depth".to_string(), AttachmentPoint::Depth)]);
        assert!(Rc::ptr_eq(&fb.texture("depth").unwrap(), &depth));
    }

    #[test]
    fn stencil_conflicts_with_depth_stencil() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        fb.bind_texture("ds", texture(&device, TextureFormat::Depth24Stencil8)).unwrap();

        let stencil = texture(&device, TextureFormat::Rgba8);
        assert!(matches!(
            fb.bind_texture_at("stencil", AttachmentPoint::Stencil, stencil),
            Err(Error::AttachmentPointInUse { point: AttachmentPoint::Stencil, .. })
        ));
    }

    #[test]
    fn formats_pick_attachment_points() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        let points = fb
            .bind_textures([
                ("ds", texture(&device, TextureFormat::Depth24Stencil8)),
                ("c", texture(&device, TextureFormat::Rgba8)),
            ])
            .unwrap();
        assert_eq!(points, vec![AttachmentPoint::DepthStencil, AttachmentPoint::Color(0)]);
    }

    #[test]
    fn color_attachments_are_capped() {
        let (_, device) = RecordingDevice::new().with_max_color_attachments(1).shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        fb.bind_texture("a", texture(&device, TextureFormat::Rgba8)).unwrap();
        assert!(matches!(
            fb.bind_texture("b", texture(&device, TextureFormat::Rgba8)),
            Err(Error::TooManyColorAttachments { limit: 1 })
        ));
    }

    #[test]
    fn missing_attachment_is_an_error() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::new(&device).unwrap();
        assert!(matches!(fb.texture("nope"), Err(Error::AttachmentNotFound { .. })));
    }

    #[test]
    fn attaching_updates_draw_buffers() {
        let (rec, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        let tex = texture(&device, TextureFormat::Rgba8);
        rec.take_calls();

        fb.bind_texture("color", tex.clone()).unwrap();
        assert_eq!(
            rec.calls(),
            vec![
                Call::BindFramebuffer(Some(fb.raw())),
                Call::FramebufferTexture {
                    point: AttachmentPoint::Color(0),
                    texture: Some(tex.raw()),
                    level: 0,
                },
                Call::DrawBuffers(vec![AttachmentPoint::Color(0)]),
                Call::BindFramebuffer(None),
            ]
        );
    }

    // ── binding ───────────────────────────────────────────────────────────

    #[test]
    fn unsized_framebuffer_cannot_bind() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::new(&device).unwrap();
        assert!(!fb.is_configured());
        assert!(matches!(fb.bind(), Err(Error::UnconfiguredSurface)));
    }

    #[test]
    fn bind_sets_viewport_and_unbind_restores_screen() {
        let (rec, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 64, 32).unwrap();
        let screen = Screen::new(800, 600);
        rec.take_calls();

        fb.bind().unwrap();
        fb.unbind(&screen);
        assert_eq!(
            rec.calls(),
            vec![
                Call::BindFramebuffer(Some(fb.raw())),
                Call::Viewport { x: 0, y: 0, width: 64, height: 32 },
                Call::BindFramebuffer(None),
                Call::Viewport { x: 0, y: 0, width: 800, height: 600 },
            ]
        );
    }

    #[test]
    fn typical_fbo_has_color_and_depth() {
        let (_, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::typical_fbo(&device, 16, 16).unwrap();
        assert_eq!(
            fb.attachments(),
            vec![
                ("color".to_string(), AttachmentPoint::Color(0)),
                ("depth".to_string(), AttachmentPoint::Depth),
            ]
        );
        assert!(fb.texture("depth").unwrap().is_depth());
    }

    #[test]
    fn incomplete_status_is_reported() {
        let (_, device) = RecordingDevice::new()
            .with_framebuffer_status(FramebufferStatus::MissingAttachment)
            .shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        assert!(matches!(fb.check_complete(), Err(Error::IncompleteFramebuffer { .. })));
    }

    #[test]
    fn clear_touches_each_color_buffer() {
        let (rec, device) = RecordingDevice::new().shared();
        let fb = Framebuffer::with_size(&device, 4, 4).unwrap();
        fb.bind_texture("a", texture(&device, TextureFormat::Rgba8)).unwrap();
        fb.bind_texture("b", texture(&device, TextureFormat::Rgba8)).unwrap();
        rec.take_calls();

        fb.clear(ClearFlags::COLOR | ClearFlags::DEPTH, Color::BLACK, 1.0, 0);
        assert_eq!(
            rec.calls(),
            vec![
                Call::ClearBufferColor(0, Color::BLACK),
                Call::ClearBufferColor(1, Color::BLACK),
                Call::ClearBufferDepth(1.0),
            ]
        );
    }
}
