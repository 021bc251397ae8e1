// Compose base ⊕ mask ⊕ cursor into the frame the host window shows.
//
// Base sits on an opaque white backdrop. The mask is blended over it with the
// configured blend mode at `opacity * mask_alpha`. The cursor goes on top with
// plain source-over. Pixel content of the layers is never modified here.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::layers::LayerStack;
use crate::types::FrameBuffer;

/// Standard compositing blend modes, named as in CSS `mix-blend-mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    pub fn all() -> &'static [BlendMode] {
        &[
            BlendMode::Normal,
            BlendMode::Multiply,
            BlendMode::Screen,
            BlendMode::Overlay,
            BlendMode::Darken,
            BlendMode::Lighten,
            BlendMode::ColorDodge,
            BlendMode::ColorBurn,
            BlendMode::HardLight,
            BlendMode::SoftLight,
            BlendMode::Difference,
            BlendMode::Exclusion,
            BlendMode::Hue,
            BlendMode::Saturation,
            BlendMode::Color,
            BlendMode::Luminosity,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }

    /// Blend one backdrop color `b` with one source color `s`, channels in [0,1].
    pub fn blend(self, b: [f32; 3], s: [f32; 3]) -> [f32; 3] {
        let per = |f: fn(f32, f32) -> f32| [f(b[0], s[0]), f(b[1], s[1]), f(b[2], s[2])];
        match self {
            BlendMode::Normal => s,
            BlendMode::Multiply => per(|b, s| b * s),
            BlendMode::Screen => per(screen_channel),
            BlendMode::Overlay => per(|b, s| hard_light_channel(s, b)),
            BlendMode::Darken => per(f32::min),
            BlendMode::Lighten => per(f32::max),
            BlendMode::ColorDodge => per(color_dodge_channel),
            BlendMode::ColorBurn => per(color_burn_channel),
            BlendMode::HardLight => per(hard_light_channel),
            BlendMode::SoftLight => per(soft_light_channel),
            BlendMode::Difference => per(|b, s| (b - s).abs()),
            BlendMode::Exclusion => per(|b, s| b + s - 2.0 * b * s),
            BlendMode::Hue => set_lum(set_sat(s, sat(b)), lum(b)),
            BlendMode::Saturation => set_lum(set_sat(b, sat(s)), lum(b)),
            BlendMode::Color => set_lum(s, lum(b)),
            BlendMode::Luminosity => set_lum(b, lum(s)),
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        BlendMode::all()
            .iter()
            .copied()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| format!("unknown blend mode {s:?}"))
    }
}

// ---------------------------- separable channel helpers ----------------------------

fn screen_channel(b: f32, s: f32) -> f32 {
    b + s - b * s
}

fn hard_light_channel(b: f32, s: f32) -> f32 {
    if s <= 0.5 { b * 2.0 * s } else { screen_channel(b, 2.0 * s - 1.0) }
}

fn color_dodge_channel(b: f32, s: f32) -> f32 {
    if b == 0.0 {
        0.0
    } else if s >= 1.0 {
        1.0
    } else {
        (b / (1.0 - s)).min(1.0)
    }
}

fn color_burn_channel(b: f32, s: f32) -> f32 {
    if b >= 1.0 {
        1.0
    } else if s <= 0.0 {
        0.0
    } else {
        1.0 - ((1.0 - b) / s).min(1.0)
    }
}

fn soft_light_channel(b: f32, s: f32) -> f32 {
    if s <= 0.5 {
        b - (1.0 - 2.0 * s) * b * (1.0 - b)
    } else {
        let d = if b <= 0.25 { ((16.0 * b - 12.0) * b + 4.0) * b } else { b.sqrt() };
        b + (2.0 * s - 1.0) * (d - b)
    }
}

// ---------------------------- non-separable helpers ----------------------------

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    // Order channel indices by value: min, mid, max.
    let mut idx = [0usize, 1, 2];
    idx.sort_by(|&a, &b| c[a].total_cmp(&c[b]));
    let (lo, mid, hi) = (idx[0], idx[1], idx[2]);
    let mut out = [0.0f32; 3];
    if c[hi] > c[lo] {
        out[mid] = (c[mid] - c[lo]) * s / (c[hi] - c[lo]);
        out[hi] = s;
    }
    out
}

// ---------------------------- pixel compositing ----------------------------

#[inline]
fn unit(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn to_u8(v: f32) -> u32 {
    (v * 255.0).round().clamp(0.0, 255.0) as u32
}

/// Source-over of `top` (alpha `a`) on an opaque backdrop.
#[inline]
fn over(back: [f32; 3], top: [f32; 3], a: f32) -> [f32; 3] {
    let inv = 1.0 - a;
    [top[0] * a + back[0] * inv, top[1] * a + back[1] * inv, top[2] * a + back[2] * inv]
}

/// Compose all layers into `frame`, which must already match the layer size.
pub fn composite(
    layers: &LayerStack,
    mask_opacity: f32,
    blend: BlendMode,
    frame: &mut FrameBuffer,
) -> Result<(), Error> {
    let size = layers.size();
    if frame.width != size.x as usize || frame.height != size.y as usize {
        return Err(Error::FrameSize(format!(
            "composite: frame {}x{} vs layers {}x{}",
            frame.width, frame.height, size.x, size.y
        )));
    }
    let handle = layers.mask_handle();
    let mask = handle.try_borrow()?;
    if mask.size() != size {
        return Err(Error::FrameSize(format!(
            "composite: mask {}x{} vs layers {}x{}",
            mask.width(),
            mask.height(),
            size.x,
            size.y
        )));
    }
    let opacity = mask_opacity.clamp(0.0, 1.0);

    let base = layers.base().read_all().chunks_exact(4);
    let cursor = layers.cursor().read_all().chunks_exact(4);
    for (((out, b), m), c) in frame.pixels.iter_mut().zip(base).zip(mask.read_all().chunks_exact(4)).zip(cursor) {
        let white = [1.0f32; 3];
        let mut px = over(white, [unit(b[0]), unit(b[1]), unit(b[2])], unit(b[3]));

        let ma = unit(m[3]) * opacity;
        if ma > 0.0 {
            let blended = blend.blend(px, [unit(m[0]), unit(m[1]), unit(m[2])]);
            px = over(px, blended, ma);
        }

        if c[3] > 0 {
            px = over(px, [unit(c[0]), unit(c[1]), unit(c[2])], unit(c[3]));
        }

        *out = (to_u8(px[0]) << 16) | (to_u8(px[1]) << 8) | to_u8(px[2]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::loader::DecodedImage;
    use crate::types::Size;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    // ── blend math ────────────────────────────────────────────────────────

    #[test]
    fn every_mode_round_trips_its_name() {
        for m in BlendMode::all() {
            assert_eq!(m.name().parse::<BlendMode>().unwrap(), *m);
        }
        assert_eq!("Color_Dodge".parse::<BlendMode>().unwrap(), BlendMode::ColorDodge);
        assert!("plus-lighter".parse::<BlendMode>().is_err());
        assert_eq!(BlendMode::all().len(), 16);
    }

    #[test]
    fn separable_modes_on_known_values() {
        let b = [0.2, 0.5, 0.8];
        let s = [0.5, 0.5, 0.5];
        assert!(close(BlendMode::Normal.blend(b, s), s));
        assert!(close(BlendMode::Multiply.blend(b, s), [0.1, 0.25, 0.4]));
        assert!(close(BlendMode::Screen.blend(b, s), [0.6, 0.75, 0.9]));
        assert!(close(BlendMode::Darken.blend(b, s), [0.2, 0.5, 0.5]));
        assert!(close(BlendMode::Lighten.blend(b, s), [0.5, 0.5, 0.8]));
        assert!(close(BlendMode::Difference.blend(b, s), [0.3, 0.0, 0.3]));
        assert!(close(BlendMode::Exclusion.blend(b, s), [0.5, 0.5, 0.5]));
        assert!(close(BlendMode::HardLight.blend(b, s), b));
        assert!(close(BlendMode::SoftLight.blend(b, s), b));
    }

    #[test]
    fn overlay_picks_multiply_or_screen_by_backdrop() {
        let b = [0.2, 0.5, 0.8];
        let s = [0.4, 0.4, 0.4];
        // 2·b·s for b ≤ 0.5, screen(s, 2b-1) above.
        assert!(close(BlendMode::Overlay.blend(b, s), [0.16, 0.4, 0.76]));
    }

    #[test]
    fn dodge_and_burn_interior_values() {
        let b = [0.2, 0.5, 0.8];
        // b / (1 - s), capped at 1.
        assert!(close(BlendMode::ColorDodge.blend(b, [0.5; 3]), [0.4, 1.0, 1.0]));
        // 1 - (1 - b) / s, floored at 0.
        assert!(close(BlendMode::ColorBurn.blend(b, [0.8; 3]), [0.0, 0.375, 0.75]));
    }

    #[test]
    fn soft_light_dark_backdrop_uses_polynomial() {
        let b = [0.2, 0.5, 0.8];
        // b = 0.2 takes the ((16b - 12)b + 4)b branch; the rest use sqrt(b).
        let out = BlendMode::SoftLight.blend(b, [1.0; 3]);
        assert!(close(out, [0.448, 0.5f32.sqrt(), 0.8f32.sqrt()]));
        let out = BlendMode::SoftLight.blend(b, [0.25; 3]);
        assert!(close(out, [0.12, 0.375, 0.72]));
    }

    #[test]
    fn white_source_edge_cases() {
        let b = [0.0, 0.5, 1.0];
        let w = [1.0, 1.0, 1.0];
        assert!(close(BlendMode::Multiply.blend(b, w), b));
        assert!(close(BlendMode::ColorDodge.blend(b, w), [0.0, 1.0, 1.0]));
        assert!(close(BlendMode::ColorBurn.blend(b, [0.0; 3]), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn luminosity_keeps_source_lum() {
        let b = [0.9, 0.1, 0.1];
        let s = [0.5, 0.5, 0.5];
        let out = BlendMode::Luminosity.blend(b, s);
        assert!((lum(out) - 0.5).abs() < 1e-4);
        let out = BlendMode::Color.blend(s, b);
        assert!((lum(out) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn gray_source_hue_and_saturation_desaturate() {
        let b = [0.9, 0.1, 0.1];
        let gray = [0.5, 0.5, 0.5];
        let out = BlendMode::Saturation.blend(b, gray);
        assert!(sat(out) < 1e-4);
        assert!((lum(out) - lum(b)).abs() < 1e-4);
        let out = BlendMode::Hue.blend(b, gray);
        assert!(sat(out) < 1e-4);
    }

    // ── layer compositing ─────────────────────────────────────────────────

    fn stack_with_base(rgba: [u8; 4]) -> LayerStack {
        let mut layers = LayerStack::new(Size::new(2, 1));
        let img = DecodedImage { width: 2, height: 1, pixels: rgba.repeat(2) };
        layers.on_base_image_loaded(&img).unwrap();
        layers
    }

    #[test]
    fn unpainted_mask_under_normal_blend_whitens_by_opacity() {
        let layers = stack_with_base([0, 0, 0, 255]);
        let mut frame = FrameBuffer::new(2, 1);
        composite(&layers, 0.0, BlendMode::Normal, &mut frame).unwrap();
        assert_eq!(frame.rgb_at(0, 0), (0, 0, 0));
        composite(&layers, 1.0, BlendMode::Normal, &mut frame).unwrap();
        assert_eq!(frame.rgb_at(0, 0), (255, 255, 255));
        composite(&layers, 1.0, BlendMode::Multiply, &mut frame).unwrap();
        assert_eq!(frame.rgb_at(0, 0), (0, 0, 0));
    }

    #[test]
    fn partial_opacity_scales_mask_alpha() {
        let layers = stack_with_base([0, 0, 0, 255]);
        {
            let mut mask = layers.mask_mut().unwrap();
            mask.put_pixel(0, 0, [255, 255, 255, 128]);
        }
        let mut frame = FrameBuffer::new(2, 1);
        composite(&layers, 0.5, BlendMode::Normal, &mut frame).unwrap();
        // 128/255 · 0.5 of white over black.
        assert_eq!(frame.rgb_at(0, 0), (64, 64, 64));
        // Opaque mask pixel at half opacity.
        assert_eq!(frame.rgb_at(1, 0), (128, 128, 128));

        layers.mask_mut().unwrap().put_pixel(0, 0, [255, 255, 255, 0]);
        composite(&layers, 0.5, BlendMode::Normal, &mut frame).unwrap();
        assert_eq!(frame.rgb_at(0, 0), (0, 0, 0));
    }

    #[test]
    fn mask_of_wrong_size_is_refused() {
        let layers = LayerStack::new(Size::new(4, 4));
        layers.mask_mut().unwrap().reallocate(Size::new(3, 3));
        let mut frame = FrameBuffer::new(4, 4);
        assert!(matches!(
            composite(&layers, 1.0, BlendMode::Normal, &mut frame),
            Err(Error::FrameSize(_))
        ));
    }

    #[test]
    fn painted_mask_and_cursor_show_up() {
        let mut layers = stack_with_base([255, 255, 255, 255]);
        layers.mask_mut().unwrap().put_pixel(1, 0, Rgb::new(0, 0, 255).with_alpha(255));
        let mut frame = FrameBuffer::new(2, 1);
        composite(&layers, 1.0, BlendMode::Multiply, &mut frame).unwrap();
        assert_eq!(frame.rgb_at(1, 0), (0, 0, 255));
        assert_eq!(frame.rgb_at(0, 0), (255, 255, 255));

        layers.cursor_mut().put_pixel(0, 0, [255, 0, 0, 255]);
        composite(&layers, 1.0, BlendMode::Multiply, &mut frame).unwrap();
        assert_eq!(frame.rgb_at(0, 0), (255, 0, 0));
    }

    #[test]
    fn frame_size_mismatch_is_an_error() {
        let layers = LayerStack::new(Size::new(3, 3));
        let mut frame = FrameBuffer::new(2, 2);
        assert!(matches!(
            composite(&layers, 1.0, BlendMode::Normal, &mut frame),
            Err(Error::FrameSize(_))
        ));
    }
}
