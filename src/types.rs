// Small shared types: layer dimensions and the display frame the host presents.

/// Layer dimensions in pixels. All three layers share one `Size` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub x: u32,
    pub y: u32,
}

impl Size {
    /// Placeholder used until the first base image finishes loading.
    pub const PLACEHOLDER: Size = Size { x: 256, y: 256 };

    /// Dimensions are positive; zero is bumped to 1.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x: x.max(1), y: y.max(1) }
    }

    #[inline]
    pub fn pixel_count(self) -> usize {
        self.x as usize * self.y as usize
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::PLACEHOLDER
    }
}

/// What the host window shows each frame.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Match the frame to the layer size, reallocating only when it changed.
    pub fn fit(&mut self, size: Size) {
        let (w, h) = (size.x as usize, size.y as usize);
        if self.width != w || self.height != h {
            *self = Self::new(w, h);
        }
    }

    #[inline]
    pub fn rgb_at(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let px = self.pixels[y * self.width + x];
        (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
    }
}
