// Construction-time options for `MaskPainter`.
// Out-of-range values are clamped here, never rejected.

use crate::brush::SizeObserver;
use crate::composite::BlendMode;
use crate::layers::MaskHandle;
use crate::recolor::Discriminator;
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_BRUSH_RADIUS: u32 = 10;
pub const DEFAULT_MASK_OPACITY: f32 = 0.75;
pub const DEFAULT_MASK_COLOR: &str = "#23272d";

/// Slot an owner passes in to receive the live mask handle once the painter exists.
pub type MaskSlot = Rc<RefCell<Option<MaskHandle>>>;

pub struct PainterConfig {
    /// Image to load as the base layer (path or `file://` URL).
    pub source: Option<String>,
    pub brush_radius: u32,
    /// Enables wheel sizing; called with each proposed radius.
    pub on_brush_size_change: Option<SizeObserver>,
    /// Mask layer alpha when compositing, 0..=1. Pixel content is unaffected.
    pub mask_opacity: f32,
    /// Hex color for painted mask pixels.
    pub mask_color: String,
    pub mask_blend_mode: BlendMode,
    /// When set, the painter stores its mask handle here.
    pub expose_mask: Option<MaskSlot>,
    pub discriminator: Discriminator,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            source: None,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            on_brush_size_change: None,
            mask_opacity: DEFAULT_MASK_OPACITY,
            mask_color: DEFAULT_MASK_COLOR.to_string(),
            mask_blend_mode: BlendMode::Normal,
            expose_mask: None,
            discriminator: Discriminator::default(),
        }
    }
}

impl std::fmt::Debug for PainterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PainterConfig")
            .field("source", &self.source)
            .field("brush_radius", &self.brush_radius)
            .field("on_brush_size_change", &self.on_brush_size_change.is_some())
            .field("mask_opacity", &self.mask_opacity)
            .field("mask_color", &self.mask_color)
            .field("mask_blend_mode", &self.mask_blend_mode)
            .field("expose_mask", &self.expose_mask.is_some())
            .field("discriminator", &self.discriminator)
            .finish()
    }
}

impl PainterConfig {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_brush_radius(mut self, radius: u32) -> Self {
        self.brush_radius = radius;
        self
    }

    pub fn with_size_observer(mut self, observer: impl FnMut(u32) + 'static) -> Self {
        self.on_brush_size_change = Some(Box::new(observer));
        self
    }

    pub fn with_mask_opacity(mut self, opacity: f32) -> Self {
        self.mask_opacity = opacity;
        self
    }

    pub fn with_mask_color(mut self, hex: impl Into<String>) -> Self {
        self.mask_color = hex.into();
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.mask_blend_mode = mode;
        self
    }

    pub fn with_mask_slot(mut self, slot: MaskSlot) -> Self {
        self.expose_mask = Some(slot);
        self
    }

    pub fn with_discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = discriminator;
        self
    }

    /// Radius ≥ 1, opacity in [0,1] (NaN becomes the default).
    pub(crate) fn clamped(mut self) -> Self {
        self.brush_radius = self.brush_radius.max(1);
        self.mask_opacity = clamp_opacity(self.mask_opacity);
        self
    }
}

pub(crate) fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() { DEFAULT_MASK_OPACITY } else { opacity.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PainterConfig::default();
        assert_eq!(c.brush_radius, 10);
        assert_eq!(c.mask_color, "#23272d");
        assert_eq!(c.mask_blend_mode, BlendMode::Normal);
        assert!(c.on_brush_size_change.is_none());
        assert!((c.mask_opacity - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn clamping() {
        let c = PainterConfig::default().with_brush_radius(0).with_mask_opacity(3.0).clamped();
        assert_eq!(c.brush_radius, 1);
        assert_eq!(c.mask_opacity, 1.0);
        assert_eq!(clamp_opacity(-0.5), 0.0);
        assert_eq!(clamp_opacity(f32::NAN), DEFAULT_MASK_OPACITY);
    }
}
