// RGBA pixel buffer used for all three layers (base, mask, cursor).
// Every coordinate write is clipped to the buffer; nothing here can index out of bounds.

use crate::color::Rgb;
use crate::error::Error;
use crate::types::Size;

/// Dense `width * height` RGBA8 buffer, row-major, 4 bytes per pixel.
///
/// Invariant: `pixels.len() == 4 * width * height`.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    size: Size,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.size.x)
            .field("height", &self.size.y)
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// Fully transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let size = Size::new(width, height);
        Self { size, pixels: vec![0u8; size.pixel_count() * 4] }
    }

    /// Buffer where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut r = Self::new(width, height);
        r.fill(rgba);
        r
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.y
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Reallocate at a new size. Old content is dropped; the caller re-initializes it.
    /// Only the layer stack resizes layers, so all three always move together.
    pub(crate) fn reallocate(&mut self, size: Size) {
        self.size = size;
        self.pixels = vec![0u8; size.pixel_count() * 4];
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        Some((y as usize * self.size.x as usize + x as usize) * 4)
    }

    /// Read one pixel; `None` outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let i = self.index(x, y)?;
        let p = &self.pixels[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Put a pixel if (x,y) is inside bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&rgba);
        }
    }

    /// Overwrite every pixel.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Transparent black everywhere.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Fill the rectangle `[x, x+w) × [y, y+h)`, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, rgba: [u8; 4]) {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + w as i64).min(self.size.x as i64);
        let y1 = (y as i64 + h as i64).min(self.size.y as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.size.x as usize * 4;
        for row in y0 as usize..y1 as usize {
            let start = row * stride + x0 as usize * 4;
            let end = row * stride + x1 as usize * 4;
            for px in self.pixels[start..end].chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }

    /// The whole buffer, row-major RGBA.
    pub fn read_all(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable view of the whole buffer; the length cannot change through it.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Replace the whole buffer. The length must be exactly `4 * w * h`.
    pub fn write_all(&mut self, buffer: &[u8]) -> Result<(), Error> {
        if buffer.len() != self.pixels.len() {
            return Err(Error::BufferSize(format!(
                "write_all: expected {} bytes for {}x{}, got {}",
                self.pixels.len(),
                self.size.x,
                self.size.y,
                buffer.len()
            )));
        }
        self.pixels.copy_from_slice(buffer);
        Ok(())
    }

    /// Set every pixel with `(x-cx)² + (y-cy)² ≤ r²` to `color` with the given alpha.
    /// Writes overwrite; they do not blend with what was there.
    pub fn draw_filled_circle(&mut self, cx: i32, cy: i32, r: u32, color: Rgb, alpha: u8) {
        let rgba = color.with_alpha(alpha);
        self.scan_disc(cx, cy, r, |d2, r2| d2 <= r2, rgba);
    }

    /// One-pixel ring on the disc boundary: inside the disc but outside the disc of radius r-1.
    pub fn stroke_circle(&mut self, cx: i32, cy: i32, r: u32, color: Rgb, alpha: u8) {
        let rgba = color.with_alpha(alpha);
        let inner = r.saturating_sub(1) as i128;
        let inner2 = inner * inner;
        self.scan_disc(cx, cy, r, |d2, r2| d2 <= r2 && (inner == 0 || d2 > inner2), rgba);
    }

    // Scan just the bounding box, clipped to the buffer, and write where `keep` says so.
    // Squares are taken in i128: a u32 radius squared does not fit in i64.
    fn scan_disc(&mut self, cx: i32, cy: i32, r: u32, keep: impl Fn(i128, i128) -> bool, rgba: [u8; 4]) {
        let r2 = r as i128 * r as i128;
        let r = r as i64;
        let (cx, cy) = (cx as i64, cy as i64);
        let x0 = (cx - r).max(0);
        let y0 = (cy - r).max(0);
        let x1 = (cx + r).min(self.size.x as i64 - 1);
        let y1 = (cy + r).min(self.size.y as i64 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x - cx) as i128;
                let dy = (y - cy) as i128;
                if keep(dx * dx + dy * dy, r2) {
                    self.put_pixel(x as i32, y as i32, rgba);
                }
            }
        }
    }
}
