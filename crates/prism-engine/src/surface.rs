//! Render targets.
//!
//! A command either targets the default framebuffer ([`Screen`]) or an
//! offscreen [`Framebuffer`]. The distinction is an explicit variant rather
//! than something inferred from a size.

use std::cell::Cell;
use std::rc::Rc;

use crate::resources::Framebuffer;

/// The default framebuffer. Its size follows the window.
#[derive(Debug)]
pub struct Screen {
    size: Cell<(u32, u32)>,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Cell::new((width, height)),
        }
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    pub fn resize(&self, width: u32, height: u32) {
        log::debug!("screen resized to {width}x{height}");
        self.size.set((width, height));
    }
}

/// Where a command renders.
#[derive(Debug, Clone)]
pub enum Surface {
    Screen(Rc<Screen>),
    Offscreen(Rc<Framebuffer>),
}

impl Surface {
    pub fn is_offscreen(&self) -> bool {
        matches!(self, Self::Offscreen(_))
    }

    /// The framebuffer behind an offscreen target.
    pub fn framebuffer(&self) -> Option<&Rc<Framebuffer>> {
        match self {
            Self::Offscreen(fb) => Some(fb),
            Self::Screen(_) => None,
        }
    }

    /// Current size in pixels; `None` for a framebuffer that was never sized.
    pub fn size(&self) -> Option<(u32, u32)> {
        match self {
            Self::Screen(screen) => Some(screen.size()),
            Self::Offscreen(fb) => fb.size(),
        }
    }
}

impl From<Rc<Framebuffer>> for Surface {
    fn from(fb: Rc<Framebuffer>) -> Self {
        Self::Offscreen(fb)
    }
}

impl From<Rc<Screen>> for Surface {
    fn from(screen: Rc<Screen>) -> Self {
        Self::Screen(screen)
    }
}
