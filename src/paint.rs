// Pointer-driven painting: a live brush preview on the cursor layer, and filled
// circles committed into the mask while a button is held.
//
// Idle    -- move, no buttons -->  Hover     (cursor redrawn only)
// Hover   -- move, any button -->  Painting  (cursor redrawn + mask dab)
// Painting -- move, no buttons --> Hover     (no more mask writes)
// any     -- leave            -->  Idle      (cursor cleared)

use crate::color::Rgb;
use crate::error::Error;
use crate::input::Pointer;
use crate::layers::LayerStack;
use crate::raster::Raster;

/// Fill alpha of the brush preview (0x88 ≈ 53%).
pub const CURSOR_FILL_ALPHA: u8 = 0x88;
/// Outline alpha of the brush preview.
pub const CURSOR_STROKE_ALPHA: u8 = 0xFF;
/// Alpha of committed mask paint.
pub const MASK_PAINT_ALPHA: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintPhase {
    #[default]
    Idle,
    Hover,
    Painting,
}

/// Color written into the mask for this pointer state. Secondary button or
/// shift erases back to white, whatever the mask color is.
#[inline]
pub fn paint_color(pointer: &Pointer, mask_color: Rgb) -> Rgb {
    if pointer.erasing() { Rgb::WHITE } else { mask_color }
}

/// Clear the cursor layer and draw the translucent brush disc with a solid rim.
pub fn draw_cursor(cursor: &mut Raster, x: i32, y: i32, radius: u32, color: Rgb) {
    cursor.clear();
    cursor.draw_filled_circle(x, y, radius, color, CURSOR_FILL_ALPHA);
    cursor.stroke_circle(x, y, radius, color, CURSOR_STROKE_ALPHA);
}

#[derive(Debug, Default)]
pub struct PaintEngine {
    phase: PaintPhase,
    last: Option<(i32, i32)>,
}

impl PaintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PaintPhase {
        self.phase
    }

    /// Where the pointer was last seen over the surface.
    pub fn last_position(&self) -> Option<(i32, i32)> {
        self.last
    }

    /// Handle one pointer move (or press/release, which carry the same state).
    /// The cursor is always redrawn; the mask is only touched while a button is held.
    pub fn pointer_moved(
        &mut self,
        layers: &mut LayerStack,
        pointer: &Pointer,
        radius: u32,
        mask_color: Rgb,
    ) -> Result<PaintPhase, Error> {
        let radius = radius.max(1);
        self.last = Some((pointer.x, pointer.y));
        draw_cursor(layers.cursor_mut(), pointer.x, pointer.y, radius, mask_color);

        if !pointer.buttons.any() {
            self.phase = PaintPhase::Hover;
            return Ok(self.phase);
        }

        self.phase = PaintPhase::Painting;
        let color = paint_color(pointer, mask_color);
        layers
            .mask_mut()?
            .draw_filled_circle(pointer.x, pointer.y, radius, color, MASK_PAINT_ALPHA);
        log::trace!("dab at ({}, {}) r={radius} color={color}", pointer.x, pointer.y);
        Ok(self.phase)
    }

    /// Redraw the preview at the last position, e.g. right after a size change.
    /// Returns false when the pointer is not over the surface.
    pub fn refresh_cursor(&self, layers: &mut LayerStack, radius: u32, color: Rgb) -> bool {
        match self.last {
            Some((x, y)) => {
                draw_cursor(layers.cursor_mut(), x, y, radius.max(1), color);
                true
            }
            None => false,
        }
    }

    /// Pointer left the surface: hide the preview.
    pub fn pointer_left(&mut self, layers: &mut LayerStack) {
        layers.cursor_mut().clear();
        self.last = None;
        self.phase = PaintPhase::Idle;
    }

    /// New layers (after a load): forget the position, start Idle.
    pub fn reset(&mut self) {
        self.last = None;
        self.phase = PaintPhase::Idle;
    }
}
