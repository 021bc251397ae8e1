// The three layers (base image, mask, cursor preview) and the one place they get resized.
//
// All three rasters share a single `Size`. Resizing is a single transaction:
// validate first, then reallocate everything, so a failed load never leaves
// the layers at mismatched sizes.

use std::cell::{Ref, RefCell, RefMut};
use std::ops::Deref;
use std::rc::Rc;

use crate::color::Rgb;
use crate::error::Error;
use crate::loader::DecodedImage;
use crate::raster::Raster;
use crate::recolor::{Discriminator, recolor_with};
use crate::types::Size;

/// Fully unpainted mask pixel: opaque white.
pub const UNPAINTED: [u8; 4] = [255, 255, 255, 255];

/// Shared handle to the live mask. Single-threaded (`Rc`).
///
/// Holders may read and rewrite pixels but never swap in a raster of another
/// size; only [`LayerStack::resize`] changes the mask's dimensions.
///
/// ```compile_fail
/// use mask_painter::{MaskPainter, PainterConfig, Raster};
///
/// let painter = MaskPainter::new(PainterConfig::default());
/// let handle = painter.mask_handle();
/// *handle.edit().unwrap() = Raster::new(3, 3);
/// ```
#[derive(Clone)]
pub struct MaskHandle(Rc<RefCell<Raster>>);

impl std::fmt::Debug for MaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.try_borrow() {
            Ok(mask) => write!(f, "MaskHandle({}x{})", mask.width(), mask.height()),
            Err(_) => f.write_str("MaskHandle(<editing>)"),
        }
    }
}

impl MaskHandle {
    fn new(raster: Raster) -> Self {
        Self(Rc::new(RefCell::new(raster)))
    }

    /// Read the mask. Panics while a [`MaskEdit`] is alive, like `RefCell::borrow`.
    pub fn borrow(&self) -> Ref<'_, Raster> {
        self.0.borrow()
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, Raster>, Error> {
        self.0
            .try_borrow()
            .map_err(|_| Error::MaskBusy("mask is being edited".into()))
    }

    /// Pixel-level write access. Fails while anyone else holds the mask.
    pub fn edit(&self) -> Result<MaskEdit<'_>, Error> {
        self.0
            .try_borrow_mut()
            .map(MaskEdit)
            .map_err(|_| Error::MaskBusy("mask is borrowed through another handle".into()))
    }

    pub fn ptr_eq(&self, other: &MaskHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Write access to the mask pixels. Reads go through `Deref<Target = Raster>`.
/// No `DerefMut`: the raster cannot be replaced or resized through an edit.
pub struct MaskEdit<'a>(RefMut<'a, Raster>);

impl Deref for MaskEdit<'_> {
    type Target = Raster;

    fn deref(&self) -> &Raster {
        &self.0
    }
}

impl MaskEdit<'_> {
    pub fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        self.0.put_pixel(x, y, rgba);
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        self.0.fill(rgba);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, rgba: [u8; 4]) {
        self.0.fill_rect(x, y, w, h, rgba);
    }

    pub fn draw_filled_circle(&mut self, cx: i32, cy: i32, r: u32, color: Rgb, alpha: u8) {
        self.0.draw_filled_circle(cx, cy, r, color, alpha);
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.0.pixels_mut()
    }

    pub fn write_all(&mut self, buffer: &[u8]) -> Result<(), Error> {
        self.0.write_all(buffer)
    }

    pub fn recolor(&mut self, color: Rgb, invert: bool, discriminator: Discriminator) {
        recolor_with(&mut *self.0, color, invert, discriminator);
    }
}

pub struct LayerStack {
    size: Size,
    base: Raster,
    mask: MaskHandle,
    cursor: Raster,
}

impl LayerStack {
    /// Three layers at `size`: empty base, unpainted mask, clear cursor.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            base: Raster::new(size.x, size.y),
            mask: MaskHandle::new(Raster::filled(size.x, size.y, UNPAINTED)),
            cursor: Raster::new(size.x, size.y),
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn base(&self) -> &Raster {
        &self.base
    }

    pub fn cursor(&self) -> &Raster {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Raster {
        &mut self.cursor
    }

    /// Another handle to the same live mask.
    pub fn mask_handle(&self) -> MaskHandle {
        self.mask.clone()
    }

    /// Borrow the mask mutably, failing instead of panicking if an outside
    /// holder of the handle still has it borrowed.
    pub(crate) fn mask_mut(&self) -> Result<RefMut<'_, Raster>, Error> {
        self.mask
            .0
            .try_borrow_mut()
            .map_err(|_| Error::MaskBusy("mask is borrowed through its external handle".into()))
    }

    /// Reallocate all three layers at `size`: base transparent, mask unpainted, cursor clear.
    pub fn resize(&mut self, size: Size) -> Result<(), Error> {
        let mut mask = self.mask_mut()?;
        mask.reallocate(size);
        mask.fill(UNPAINTED);
        drop(mask);
        self.base.reallocate(size);
        self.cursor.reallocate(size);
        self.size = size;
        log::debug!("layers resized to {}x{}", size.x, size.y);
        Ok(())
    }

    /// A base image finished decoding: resize everything to it, copy its pixels
    /// into the base layer, and reset mask and cursor.
    pub fn on_base_image_loaded(&mut self, image: &DecodedImage) -> Result<(), Error> {
        if image.width == 0 || image.height == 0 {
            return Err(Error::ImageLoad(format!(
                "image has zero area ({}x{})",
                image.width, image.height
            )));
        }
        let size = Size::new(image.width, image.height);
        if image.pixels.len() != size.pixel_count() * 4 {
            return Err(Error::BufferSize(format!(
                "decoded image {}x{} carries {} bytes",
                image.width,
                image.height,
                image.pixels.len()
            )));
        }
        // Fails before anything is touched if the mask is held elsewhere.
        self.resize(size)?;
        self.base.write_all(&image.pixels)?;
        Ok(())
    }

    /// Back to the fully unpainted state without resizing.
    pub fn reset_mask(&self) -> Result<(), Error> {
        self.mask_mut()?.fill(UNPAINTED);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn all_unpainted(r: &Raster) -> bool {
        r.read_all().chunks_exact(4).all(|p| p == UNPAINTED)
    }

    fn image(w: u32, h: u32, rgba: [u8; 4]) -> DecodedImage {
        DecodedImage { width: w, height: h, pixels: rgba.repeat((w * h) as usize) }
    }

    #[test]
    fn new_stack_has_unpainted_mask() {
        for (w, h) in [(1, 1), (3, 7), (64, 2)] {
            let layers = LayerStack::new(Size::new(w, h));
            let mask = layers.mask_handle();
            assert!(all_unpainted(&mask.borrow()));
            assert_eq!(mask.borrow().size(), Size::new(w, h));
        }
    }

    #[test]
    fn load_resizes_every_layer_and_resets_mask() {
        let mut layers = LayerStack::new(Size::new(4, 4));
        layers.mask_mut().unwrap().draw_filled_circle(1, 1, 1, Rgb::BLACK, 255);
        layers.cursor_mut().fill([1, 2, 3, 4]);

        layers.on_base_image_loaded(&image(6, 3, [9, 8, 7, 255])).unwrap();

        assert_eq!(layers.size(), Size::new(6, 3));
        assert_eq!(layers.base().size(), Size::new(6, 3));
        assert_eq!(layers.cursor().size(), Size::new(6, 3));
        let mask = layers.mask_handle();
        assert_eq!(mask.borrow().size(), Size::new(6, 3));
        assert!(all_unpainted(&mask.borrow()));
        assert!(layers.cursor().read_all().iter().all(|&b| b == 0));
        assert_eq!(layers.base().pixel(5, 2), Some([9, 8, 7, 255]));
    }

    #[test]
    fn bad_image_leaves_layers_untouched() {
        let mut layers = LayerStack::new(Size::new(4, 4));
        layers.mask_mut().unwrap().put_pixel(0, 0, [0, 0, 0, 255]);

        let short = DecodedImage { width: 5, height: 5, pixels: vec![0; 10] };
        assert!(layers.on_base_image_loaded(&short).is_err());
        let empty = DecodedImage { width: 0, height: 5, pixels: vec![] };
        assert!(matches!(layers.on_base_image_loaded(&empty), Err(Error::ImageLoad(_))));

        assert_eq!(layers.size(), Size::new(4, 4));
        assert_eq!(layers.mask_handle().borrow().pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn busy_mask_blocks_resize_without_partial_update() {
        let mut layers = LayerStack::new(Size::new(2, 2));
        let handle = layers.mask_handle();
        let held = handle.borrow();
        assert!(matches!(
            layers.on_base_image_loaded(&image(3, 3, [0; 4])),
            Err(Error::MaskBusy(_))
        ));
        drop(held);
        assert_eq!(layers.size(), Size::new(2, 2));
        assert_eq!(layers.base().size(), Size::new(2, 2));
    }

    #[test]
    fn external_handle_sees_live_mask_after_resize() {
        let mut layers = LayerStack::new(Size::new(2, 2));
        let handle = layers.mask_handle();
        layers.on_base_image_loaded(&image(5, 4, [0; 4])).unwrap();
        assert_eq!(handle.borrow().size(), Size::new(5, 4));
    }
}
