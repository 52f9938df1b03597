use std::path::Path;

use image::DynamicImage;

use crate::device::{Channels, ComponentType, Extent, PixelFormat, TextureFormat};
use crate::error::{Error, Result};

/// Decoded 8-bit image, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    width: u32,
    height: u32,
    channels: Channels,
    pixels: Vec<u8>,
}

impl ImageData {
    /// Wraps raw 8-bit pixels. `channels` must be one of the color layouts.
    pub fn new(width: u32, height: u32, channels: Channels, pixels: Vec<u8>) -> Result<Self> {
        debug_assert!(matches!(
            channels,
            Channels::Red | Channels::Rg | Channels::Rgb | Channels::Rgba
        ));
        let expected = width as usize * height as usize * channels.count() as usize;
        if pixels.len() < expected {
            return Err(Error::PixelDataTooShort {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Decodes an image file. 1 to 4 channel 8-bit images keep their
    /// channel count; anything else is converted to RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let data = Self::from_dynamic(img);
        log::debug!(
            "loaded {} ({}x{}, {:?})",
            path.display(),
            data.width,
            data.height,
            data.channels
        );
        Ok(data)
    }

    pub fn from_dynamic(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let (channels, pixels) = match img {
            DynamicImage::ImageLuma8(buf) => (Channels::Red, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (Channels::Rg, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (Channels::Rgb, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (Channels::Rgba, buf.into_raw()),
            other => (Channels::Rgba, other.into_rgba8().into_raw()),
        };
        Self {
            width,
            height,
            channels,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn extent(&self) -> Extent {
        Extent::d2(self.width, self.height)
    }

    /// Sized format that stores this image without loss.
    pub fn texture_format(&self) -> TextureFormat {
        match self.channels {
            Channels::Red => TextureFormat::R8,
            Channels::Rg => TextureFormat::Rg8,
            Channels::Rgb => TextureFormat::Rgb8,
            _ => TextureFormat::Rgba8,
        }
    }

    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::new(self.channels, ComponentType::U8)
    }
}

/// Indexed store of decoded images. Removed slots are reused by later adds,
/// so an index stays valid until its own removal.
#[derive(Debug, Default)]
pub struct ImagePool {
    slots: Vec<Option<ImageData>>,
}

impl ImagePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `image` in the first vacant slot and returns its index.
    pub fn add(&mut self, image: ImageData) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(image);
                index
            }
            None => {
                self.slots.push(Some(image));
                self.slots.len() - 1
            }
        }
    }

    /// Decodes `path` and adds it.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let image = ImageData::load(path)?;
        Ok(self.add(image))
    }

    pub fn get(&self, index: usize) -> Option<&ImageData> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Vacates `index`, returning what it held.
    pub fn remove(&mut self, index: usize) -> Option<ImageData> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
