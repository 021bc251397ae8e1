// Mask recoloring: translate the painted/unpainted classification into display colors.
//
// The mask carries its meaning in the pixels themselves. A pixel is "unpainted"
// when the discriminator says so (by default: red channel == 255). Recoloring
// rewrites RGB only; alpha is left exactly as painted.

use crate::color::{Rgb, hex_to_rgb};
use crate::raster::Raster;

/// How a mask pixel is classified as unpainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discriminator {
    /// Unpainted iff red == 255. Compatible encoding; a mask color whose red
    /// channel is 255 is indistinguishable from unpainted after a recolor.
    #[default]
    RedChannel,
    /// Unpainted iff RGB == (255,255,255).
    White,
}

impl Discriminator {
    #[inline]
    pub fn is_unpainted(self, px: &[u8]) -> bool {
        match self {
            Discriminator::RedChannel => px[0] == 255,
            Discriminator::White => px[0] == 255 && px[1] == 255 && px[2] == 255,
        }
    }
}

/// Full-buffer recolor with the default discriminator.
pub fn recolor(mask: &mut Raster, target_hex: &str, invert: bool) {
    recolor_with(mask, hex_to_rgb(target_hex), invert, Discriminator::default());
}

/// Unpainted pixels (after the optional invert) become white, painted ones `color`.
pub fn recolor_with(mask: &mut Raster, color: Rgb, invert: bool, discriminator: Discriminator) {
    let mut painted = 0usize;
    for px in mask.pixels_mut().chunks_exact_mut(4) {
        let unpainted = discriminator.is_unpainted(px) != invert;
        let rgb = if unpainted { Rgb::WHITE } else { color };
        if !unpainted {
            painted += 1;
        }
        px[0] = rgb.r;
        px[1] = rgb.g;
        px[2] = rgb.b;
    }
    log::debug!(
        "recolored {}x{} mask to {color} (invert={invert}, painted={painted})",
        mask.width(),
        mask.height()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: Rgb = Rgb::new(0, 255, 0);
    const NAVY: Rgb = Rgb::new(0x23, 0x27, 0x2d);

    fn sample_mask() -> Raster {
        let mut m = Raster::filled(4, 1, [255, 255, 255, 255]);
        m.put_pixel(1, 0, [10, 20, 30, 128]);
        m.put_pixel(2, 0, [0, 255, 0, 255]);
        m
    }

    fn classes(m: &Raster, d: Discriminator) -> Vec<bool> {
        m.read_all().chunks_exact(4).map(|p| d.is_unpainted(p)).collect()
    }

    #[test]
    fn painted_pixels_take_target_color_and_keep_alpha() {
        let mut m = sample_mask();
        recolor(&mut m, "#23272d", false);
        assert_eq!(m.pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(m.pixel(1, 0), Some([0x23, 0x27, 0x2d, 128]));
        assert_eq!(m.pixel(2, 0), Some([0x23, 0x27, 0x2d, 255]));
    }

    #[test]
    fn invert_swaps_classification() {
        let mut m = sample_mask();
        recolor_with(&mut m, GREEN, true, Discriminator::RedChannel);
        assert_eq!(m.pixel(0, 0), Some([0, 255, 0, 255]));
        assert_eq!(m.pixel(1, 0), Some([255, 255, 255, 128]));
    }

    #[test]
    fn same_color_twice_is_idempotent() {
        let mut once = sample_mask();
        recolor_with(&mut once, NAVY, false, Discriminator::RedChannel);
        let mut twice = once.clone();
        recolor_with(&mut twice, NAVY, false, Discriminator::RedChannel);
        assert_eq!(once, twice);
    }

    #[test]
    fn double_invert_restores_classification() {
        let original = sample_mask();
        let mut m = original.clone();
        recolor_with(&mut m, GREEN, true, Discriminator::RedChannel);
        recolor_with(&mut m, GREEN, true, Discriminator::RedChannel);
        assert_eq!(
            classes(&m, Discriminator::RedChannel),
            classes(&original, Discriminator::RedChannel)
        );
    }

    #[test]
    fn red_channel_sentinel_swallows_red_paint() {
        let mut m = Raster::filled(2, 1, [255, 255, 255, 255]);
        m.put_pixel(0, 0, [255, 0, 0, 255]);
        recolor_with(&mut m, GREEN, false, Discriminator::RedChannel);
        assert_eq!(m.pixel(0, 0), Some([255, 255, 255, 255]));

        let mut m = Raster::filled(2, 1, [255, 255, 255, 255]);
        m.put_pixel(0, 0, [255, 0, 0, 255]);
        recolor_with(&mut m, GREEN, false, Discriminator::White);
        assert_eq!(m.pixel(0, 0), Some([0, 255, 0, 255]));
        assert_eq!(m.pixel(1, 0), Some([255, 255, 255, 255]));
    }
}
