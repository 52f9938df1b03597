use std::cell::Cell;
use std::rc::Rc;

use crate::device::{
    Device, Extent, Filter, Pixels, RawTexture, Region, TexParam, TextureFormat, TextureKind, Wrap,
};
use crate::error::{Error, Result};
use crate::units::{TextureUnit, UnitAllocator};

use super::ImageData;

/// Sampling parameters applied by [`Texture::init`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureParams {
    params: Vec<TexParam>,
}

impl TextureParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest filtering, repeat wrapping. Suits data textures.
    pub fn nearest_repeat() -> Self {
        Self::new()
            .with(TexParam::MinFilter(Filter::Nearest))
            .with(TexParam::MagFilter(Filter::Nearest))
            .with(TexParam::WrapS(Wrap::Repeat))
            .with(TexParam::WrapT(Wrap::Repeat))
    }

    /// Linear filtering, clamped to the edge. Suits render targets.
    pub fn linear_clamp() -> Self {
        Self::new()
            .with(TexParam::MinFilter(Filter::Linear))
            .with(TexParam::MagFilter(Filter::Linear))
            .with(TexParam::WrapS(Wrap::ClampToEdge))
            .with(TexParam::WrapT(Wrap::ClampToEdge))
    }

    pub fn with(mut self, param: TexParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = TexParam> + '_ {
        self.params.iter().copied()
    }
}

/// A device image of `(width, height, depth)` texels.
///
/// A texture can be created empty and given storage later with
/// [`Texture::init`], which may also be called again to resize or reformat.
pub struct Texture {
    device: Rc<dyn Device>,
    raw: RawTexture,
    kind: TextureKind,
    extent: Cell<Extent>,
    format: Cell<Option<TextureFormat>>,
}

impl Texture {
    /// Creates a texture object without storage.
    pub fn new(device: &Rc<dyn Device>, kind: TextureKind, extent: Extent) -> Result<Self> {
        let raw = device
            .create_texture()
            .map_err(|e| Error::device("texture", e))?;
        log::debug!("created {kind:?} texture {raw:?} ({}x{}x{})", extent.width, extent.height, extent.depth);
        Ok(Self {
            device: device.clone(),
            raw,
            kind,
            extent: Cell::new(extent),
            format: Cell::new(None),
        })
    }

    /// Creates a 2D texture and initializes it with `format` and no data.
    pub fn with_storage(
        device: &Rc<dyn Device>,
        extent: Extent,
        format: TextureFormat,
        params: &TextureParams,
    ) -> Result<Self> {
        let texture = Self::new(device, TextureKind::D2, extent)?;
        texture.init(params, 0, format, None, false)?;
        Ok(texture)
    }

    /// Creates a 2D texture holding a decoded image.
    pub fn from_image(device: &Rc<dyn Device>, image: &ImageData, params: &TextureParams) -> Result<Self> {
        let texture = Self::new(device, TextureKind::D2, image.extent())?;
        let pixels = Pixels::new(image.pixel_format(), image.pixels());
        texture.init(params, 0, image.texture_format(), Some(pixels), false)?;
        Ok(texture)
    }

    /// (Re)allocates level `level` with `format`, optionally filled with `pixels`.
    ///
    /// `pixels` must cover the whole level. Leaves no texture bound.
    pub fn init(
        &self,
        params: &TextureParams,
        level: u32,
        format: TextureFormat,
        pixels: Option<Pixels<'_>>,
        mipmaps: bool,
    ) -> Result<()> {
        let extent = self.extent.get().mip(level);
        if let Some(p) = pixels {
            let expected = extent.texel_count() * p.format.bytes_per_pixel();
            if p.data.len() < expected {
                return Err(Error::PixelDataTooShort {
                    expected,
                    actual: p.data.len(),
                });
            }
        }

        self.bind_current();
        for param in params.iter() {
            self.device.tex_parameter(self.kind, param);
        }
        self.device.tex_image(self.kind, level, format, extent, pixels);
        if mipmaps {
            self.device.generate_mipmap(self.kind);
        }
        self.device.bind_texture(self.kind, None);

        self.format.set(Some(format));
        Ok(())
    }

    /// Changes the size used by the next [`Texture::init`]. Existing storage
    /// is untouched until then.
    pub fn set_extent(&self, extent: Extent) {
        self.extent.set(extent);
    }

    /// Fills `region` of `level` (the whole level if `None`) with one texel
    /// of `data`, or zeros if `data` is `None`.
    ///
    /// Fails with [`Error::Unsupported`] on devices without targeted texture
    /// clears; the operation is not emulated.
    pub fn clear(&self, level: u32, data: Option<&[u8]>, region: Option<Region>) -> Result<()> {
        if !self.device.supports_texture_clear() {
            return Err(Error::Unsupported("texture clear"));
        }
        let format = self.format.get().ok_or(Error::TextureUninitialized)?;
        let layout = format.upload_format();

        if let Some(d) = data {
            let expected = layout.bytes_per_pixel();
            if d.len() < expected {
                return Err(Error::PixelDataTooShort {
                    expected,
                    actual: d.len(),
                });
            }
        }

        let level_extent = self.extent.get().mip(level);
        let region = region.unwrap_or(Region::whole(level_extent));
        debug_assert!(
            region.x + region.extent.width <= level_extent.width
                && region.y + region.extent.height <= level_extent.height
                && region.z + region.extent.depth <= level_extent.depth,
            "clear region {region:?} exceeds level {level} extent {level_extent:?}"
        );

        self.device.clear_texture(self.raw, level, region, layout, data);
        Ok(())
    }

    /// Binds to a freshly acquired unit and returns it.
    ///
    /// The unit stays assigned until the allocator is reset or the caller
    /// releases it.
    pub fn bind(&self, units: &mut UnitAllocator) -> Result<TextureUnit> {
        let unit = units.acquire_unit()?;
        self.device.active_texture(unit.index());
        self.device.bind_texture(self.kind, Some(self.raw));
        log::trace!("texture {:?} bound to unit {}", self.raw, unit.index());
        Ok(unit)
    }

    /// Binds to whatever unit is currently active, without touching the
    /// allocator. Used for uploads.
    pub fn bind_current(&self) {
        self.device.bind_texture(self.kind, Some(self.raw));
    }

    #[inline]
    pub fn raw(&self) -> RawTexture {
        self.raw
    }

    #[inline]
    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent.get()
    }

    /// `None` until the first successful [`Texture::init`].
    #[inline]
    pub fn format(&self) -> Option<TextureFormat> {
        self.format.get()
    }

    pub fn is_depth(&self) -> bool {
        self.format.get().is_some_and(TextureFormat::is_depth)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        log::debug!("deleting texture {:?}", self.raw);
        self.device.delete_texture(self.raw);
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("raw", &self.raw)
            .field("kind", &self.kind)
            .field("extent", &self.extent.get())
            .field("format", &self.format.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Call, RecordingDevice};

    fn rgba_texture(device: &Rc<dyn Device>) -> Texture {
        Texture::with_storage(device, Extent::d2(4, 4), TextureFormat::Rgba8, &TextureParams::new())
            .unwrap()
    }

    // ── init ──────────────────────────────────────────────────────────────

    #[test]
    fn new_texture_is_a_zombie() {
        let (_, device) = RecordingDevice::new().shared();
        let tex = Texture::new(&device, TextureKind::D2, Extent::d2(8, 8)).unwrap();
        assert_eq!(tex.format(), None);
        assert!(!tex.is_depth());
    }

    #[test]
    fn init_applies_params_then_allocates() {
        let (rec, device) = RecordingDevice::new().shared();
        let tex = Texture::new(&device, TextureKind::D2, Extent::d2(2, 2)).unwrap();
        rec.take_calls();

        let data = [0u8; 16];
        tex.init(
            &TextureParams::new().with(TexParam::MagFilter(Filter::Nearest)),
            0,
            TextureFormat::Rgba8,
            Some(Pixels::new(TextureFormat::Rgba8.upload_format(), &data)),
            true,
        )
        .unwrap();

        assert_eq!(
            rec.calls(),
            vec![
                Call::BindTexture(TextureKind::D2, Some(tex.raw())),
                Call::TexParameter(TextureKind::D2, TexParam::MagFilter(Filter::Nearest)),
                Call::TexImage {
                    kind: TextureKind::D2,
                    level: 0,
                    format: TextureFormat::Rgba8,
                    extent: Extent::d2(2, 2),
                    data_len: Some(16),
                },
                Call::GenerateMipmap(TextureKind::D2),
                Call::BindTexture(TextureKind::D2, None),
            ]
        );
        assert_eq!(tex.format(), Some(TextureFormat::Rgba8));
    }

    #[test]
    fn init_rejects_short_pixel_data() {
        let (_, device) = RecordingDevice::new().shared();
        let tex = Texture::new(&device, TextureKind::D2, Extent::d2(4, 4)).unwrap();
        let data = [0u8; 10];
        let err = tex
            .init(
                &TextureParams::new(),
                0,
                TextureFormat::Rgba32F,
                Some(Pixels::new(TextureFormat::Rgba32F.upload_format(), &data)),
                false,
            )
            .unwrap_err();
        assert!(matches!(err, Error::PixelDataTooShort { expected: 256, actual: 10 }));
    }

    #[test]
    fn reinit_changes_format() {
        let (_, device) = RecordingDevice::new().shared();
        let tex = rgba_texture(&device);
        tex.set_extent(Extent::d2(8, 8));
        tex.init(&TextureParams::new(), 0, TextureFormat::Depth24, None, false).unwrap();
        assert!(tex.is_depth());
        assert_eq!(tex.extent(), Extent::d2(8, 8));
    }

    // ── bind ──────────────────────────────────────────────────────────────

    #[test]
    fn bind_acquires_a_fresh_unit_each_time() {
        let (rec, device) = RecordingDevice::new().shared();
        let tex = rgba_texture(&device);
        let mut units = UnitAllocator::new(4);
        rec.take_calls();

        let a = tex.bind(&mut units).unwrap();
        let b = tex.bind(&mut units).unwrap();
        assert_ne!(a, b);
        assert_eq!(
            rec.calls(),
            vec![
                Call::ActiveTexture(0),
                Call::BindTexture(TextureKind::D2, Some(tex.raw())),
                Call::ActiveTexture(1),
                Call::BindTexture(TextureKind::D2, Some(tex.raw())),
            ]
        );
    }

    #[test]
    fn bind_fails_when_units_are_exhausted() {
        let (_, device) = RecordingDevice::new().shared();
        let tex = rgba_texture(&device);
        let mut units = UnitAllocator::new(1);
        tex.bind(&mut units).unwrap();
        assert!(matches!(tex.bind(&mut units), Err(Error::ResourceExhausted { .. })));
    }

    // ── clear ─────────────────────────────────────────────────────────────

    #[test]
    fn clear_defaults_to_whole_level() {
        let (rec, device) = RecordingDevice::new().shared();
        let tex = rgba_texture(&device);
        rec.take_calls();

        tex.clear(0, None, None).unwrap();
        assert_eq!(
            rec.calls(),
            vec![Call::ClearTexture {
                texture: tex.raw(),
                level: 0,
                region: Region::whole(Extent::d2(4, 4)),
                zeroed: true,
            }]
        );
    }

    #[test]
    fn clear_sub_region_with_value() {
        let (rec, device) = RecordingDevice::new().shared();
        let tex = rgba_texture(&device);
        rec.take_calls();

        let region = Region { x: 1, y: 1, z: 0, extent: Extent::d2(2, 2) };
        tex.clear(0, Some(&[255, 0, 0, 255]), Some(region)).unwrap();
        assert!(matches!(
            rec.calls()[..],
            [Call::ClearTexture { zeroed: false, region: r, .. }] if r == region
        ));
    }

    #[test]
    fn clear_is_capability_gated() {
        let (rec, device) = RecordingDevice::new().without_texture_clear().shared();
        let tex = rgba_texture(&device);
        rec.take_calls();

        assert!(matches!(tex.clear(0, None, None), Err(Error::Unsupported(_))));
        assert!(rec.calls().is_empty());
    }

    #[test]
    fn clear_requires_storage() {
        let (_, device) = RecordingDevice::new().shared();
        let tex = Texture::new(&device, TextureKind::D2, Extent::d2(4, 4)).unwrap();
        assert!(matches!(tex.clear(0, None, None), Err(Error::TextureUninitialized)));
    }
}
