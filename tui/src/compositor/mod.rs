//! Layered Compositor
//!
//! Manages z-ordered layers for rendering. Every card on the wall gets its
//! own layer, as do the status line and the compose form. Layers can be
//! moved, resized and restacked independently.
//!
//! The compositor composites all visible layers into a final output buffer.

mod layer;

use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

pub use layer::Layer;

/// Unique identifier for a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u32);

/// The compositor manages all layers and composites them together
pub struct Compositor {
    /// All layers by ID
    layers: HashMap<LayerId, Layer>,
    /// Layers sorted by z-index for rendering
    render_order: Vec<LayerId>,
    /// Next layer ID to assign
    next_id: u32,
    /// Output buffer (composited result)
    output: Buffer,
    /// Total area
    area: Rect,
}

impl Compositor {
    /// Create a new compositor for the given area
    pub fn new(area: Rect) -> Self {
        Self {
            layers: HashMap::new(),
            render_order: Vec::new(),
            next_id: 0,
            output: Buffer::empty(area),
            area,
        }
    }

    /// Create a new layer and return its ID
    pub fn create_layer(&mut self, bounds: Rect, z_index: i32) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;

        let layer = Layer::new(id, bounds, z_index);
        self.layers.insert(id, layer);
        self.update_render_order();

        id
    }

    /// Remove a layer entirely
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let removed = self.layers.remove(&id).is_some();
        if removed {
            self.render_order.retain(|other| *other != id);
        }
        removed
    }

    /// Number of layers
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether there are no layers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Look up a layer
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Get mutable access to a layer's buffer for rendering
    pub fn layer_buffer_mut(&mut self, id: LayerId) -> Option<&mut Buffer> {
        self.layers.get_mut(&id).map(|l| &mut l.buffer)
    }

    /// Set a layer's z-index
    pub fn set_z_index(&mut self, id: LayerId, z_index: i32) {
        if let Some(layer) = self.layers.get_mut(&id) {
            if layer.z_index != z_index {
                layer.z_index = z_index;
                self.update_render_order();
            }
        }
    }

    /// Move a layer to a new position
    pub fn move_layer(&mut self, id: LayerId, x: u16, y: u16) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.bounds.x = x;
            layer.bounds.y = y;
        }
    }

    /// Resize a layer, clearing its contents when the size changes
    pub fn resize_layer(&mut self, id: LayerId, width: u16, height: u16) {
        if let Some(layer) = self.layers.get_mut(&id) {
            if layer.bounds.width == width && layer.bounds.height == height {
                return;
            }
            layer.bounds.width = width;
            layer.bounds.height = height;
            // Buffer uses origin coordinates
            layer.buffer = Buffer::empty(Rect::new(0, 0, width, height));
        }
    }

    /// Set layer visibility
    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.visible = visible;
        }
    }

    /// Make a layer cover everything beneath it
    pub fn set_opaque(&mut self, id: LayerId, opaque: bool) {
        if let Some(layer) = self.layers.get_mut(&id) {
            layer.opaque = opaque;
        }
    }

    /// Resize the entire compositor
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.output = Buffer::empty(area);
    }

    /// Composite all visible layers into the output buffer
    pub fn composite(&mut self) -> &Buffer {
        self.output.reset();

        // Back to front
        for id in &self.render_order {
            if let Some(layer) = self.layers.get(id) {
                if layer.visible {
                    Self::blit_layer(&mut self.output, &self.area, layer);
                }
            }
        }

        &self.output
    }

    /// Blit a layer onto the output buffer
    fn blit_layer(output: &mut Buffer, area: &Rect, layer: &Layer) {
        let lb = &layer.bounds;

        for ly in 0..lb.height {
            for lx in 0..lb.width {
                let (Some(dst_x), Some(dst_y)) = (lb.x.checked_add(lx), lb.y.checked_add(ly)) else {
                    continue;
                };
                if dst_x >= area.width || dst_y >= area.height {
                    continue;
                }

                let Some(src_cell) = layer.buffer.cell((lx, ly)) else {
                    continue;
                };

                // Transparent layers let spaces show through
                if layer.opaque || src_cell.symbol() != " " {
                    if let Some(dst) = output.cell_mut((dst_x, dst_y)) {
                        *dst = src_cell.clone();
                    }
                }
            }
        }
    }

    /// Find the topmost layer at a given position (for mouse events)
    #[must_use]
    pub fn layer_at(&self, x: u16, y: u16) -> Option<LayerId> {
        // Front to back
        for &id in self.render_order.iter().rev() {
            if let Some(layer) = self.layers.get(&id) {
                if layer.visible && layer.contains(x, y) {
                    return Some(id);
                }
            }
        }
        None
    }

    /// Update render order based on z-indices
    fn update_render_order(&mut self) {
        self.render_order = self.layers.keys().copied().collect();
        self.render_order.sort_by_key(|id| {
            (self.layers.get(id).map_or(0, |l| l.z_index), *id)
        });
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Style;

    use super::*;

    #[test]
    fn test_layer_at_prefers_top() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 40, 10));
        let low = compositor.create_layer(Rect::new(0, 0, 10, 5), 0);
        let high = compositor.create_layer(Rect::new(5, 2, 10, 5), 1);

        assert_eq!(compositor.layer_at(6, 3), Some(high));
        assert_eq!(compositor.layer_at(1, 1), Some(low));
        assert_eq!(compositor.layer_at(30, 9), None);

        compositor.set_z_index(low, 5);
        assert_eq!(compositor.layer_at(6, 3), Some(low));

        compositor.set_visible(low, false);
        assert_eq!(compositor.layer_at(6, 3), Some(high));
    }

    #[test]
    fn test_transparent_and_opaque_blit() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 10, 1));
        let back = compositor.create_layer(Rect::new(0, 0, 10, 1), 0);
        let front = compositor.create_layer(Rect::new(0, 0, 10, 1), 1);

        compositor
            .layer_buffer_mut(back)
            .unwrap()
            .set_string(0, 0, "abcdefghij", Style::default());
        compositor
            .layer_buffer_mut(front)
            .unwrap()
            .set_string(0, 0, "X X", Style::default());

        let out = compositor.composite();
        assert_eq!(out.cell((0, 0)).unwrap().symbol(), "X");
        assert_eq!(out.cell((1, 0)).unwrap().symbol(), "b");

        compositor.set_opaque(front, true);
        let out = compositor.composite();
        assert_eq!(out.cell((1, 0)).unwrap().symbol(), " ");
        assert_eq!(out.cell((5, 0)).unwrap().symbol(), " ");
    }

    #[test]
    fn test_layers_clip_at_edge() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 5, 2));
        let layer = compositor.create_layer(Rect::new(3, 1, 4, 3), 0);
        compositor
            .layer_buffer_mut(layer)
            .unwrap()
            .set_string(0, 0, "wxyz", Style::default());

        let out = compositor.composite();
        assert_eq!(out.cell((3, 1)).unwrap().symbol(), "w");
        assert_eq!(out.cell((4, 1)).unwrap().symbol(), "x");
    }

    #[test]
    fn test_remove_layer() {
        let mut compositor = Compositor::new(Rect::new(0, 0, 10, 10));
        let id = compositor.create_layer(Rect::new(0, 0, 3, 3), 0);
        assert!(compositor.remove_layer(id));
        assert!(!compositor.remove_layer(id));
        assert!(compositor.is_empty());
        assert_eq!(compositor.layer_at(1, 1), None);
    }
}
