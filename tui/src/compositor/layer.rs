//! Compositor Layer

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::LayerId;

/// One independently positioned drawing surface
pub struct Layer {
    /// Layer identity
    pub id: LayerId,
    /// Screen position and size
    pub bounds: Rect,
    /// Higher draws on top
    pub z_index: i32,
    /// Hidden layers neither draw nor receive clicks
    pub visible: bool,
    /// Opaque layers cover what is beneath, spaces included
    pub opaque: bool,
    /// Layer-local contents, origin at (0, 0)
    pub buffer: Buffer,
}

impl Layer {
    /// Create an empty layer
    pub fn new(id: LayerId, bounds: Rect, z_index: i32) -> Self {
        Self {
            id,
            bounds,
            z_index,
            visible: true,
            opaque: false,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }

    /// Whether a screen cell falls inside the layer
    #[must_use]
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.bounds.x
            && y >= self.bounds.y
            && u32::from(x) < u32::from(self.bounds.x) + u32::from(self.bounds.width)
            && u32::from(y) < u32::from(self.bounds.y) + u32::from(self.bounds.height)
    }
}
