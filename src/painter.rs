// The embeddable mask painter: owns the layers, routes input to the brush and
// paint engine, keeps the mask's display color in sync with the configuration,
// and composes the visible frame.
//
// Everything runs on the caller's thread. The only deferred work is image
// decoding, whose completions are applied in `MaskPainter::poll_loads`
// between events, so a resize can never interleave with a pointer event.

use std::time::Duration;

use crate::brush::{BrushController, SizeObserver, WheelOutcome};
use crate::color::{Rgb, hex_to_rgb};
use crate::composite::{BlendMode, composite};
use crate::config::{PainterConfig, clamp_opacity};
use crate::error::Error;
use crate::input::{Attachment, EventResponse, InputEvent, ListenerGuard};
use crate::layers::{LayerStack, MaskHandle};
use crate::loader::{ImageLoader, LoadCompletion, decode_image};
use crate::paint::{PaintEngine, PaintPhase};
use crate::recolor::{Discriminator, recolor_with};
use crate::types::{FrameBuffer, Size};

pub struct MaskPainter {
    layers: LayerStack,
    brush: BrushController,
    engine: PaintEngine,
    loader: ImageLoader,
    attachment: Attachment,
    source: Option<String>,
    mask_color: String,
    mask_rgb: Rgb,
    mask_opacity: f32,
    blend: BlendMode,
    discriminator: Discriminator,
}

impl MaskPainter {
    pub fn new(config: PainterConfig) -> Self {
        let config = config.clamped();
        let layers = LayerStack::new(Size::PLACEHOLDER);

        if let Some(slot) = &config.expose_mask {
            *slot.borrow_mut() = Some(layers.mask_handle());
        }

        let mut painter = Self {
            layers,
            brush: BrushController::new(config.brush_radius, config.on_brush_size_change),
            engine: PaintEngine::new(),
            loader: ImageLoader::new(),
            attachment: Attachment::default(),
            source: None,
            mask_rgb: hex_to_rgb(&config.mask_color),
            mask_color: config.mask_color,
            mask_opacity: config.mask_opacity,
            blend: config.mask_blend_mode,
            discriminator: config.discriminator,
        };
        if let Some(source) = config.source {
            painter.set_source(source);
        }
        painter
    }

    // ------------------------------ input ------------------------------

    /// Register the painter's input handlers for as long as the guard lives.
    pub fn attach(&self) -> ListenerGuard {
        log::debug!("input listeners attached");
        self.attachment.guard()
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_attached()
    }

    /// Feed one host event. Each call runs to completion before returning.
    pub fn handle_event(&mut self, event: InputEvent) -> EventResponse {
        if !self.attachment.is_attached() {
            // Detached since the last event: take the stale preview down once.
            if self.engine.last_position().is_some() {
                self.engine.pointer_left(&mut self.layers);
                return EventResponse::repaint();
            }
            return EventResponse::IGNORED;
        }

        match event {
            InputEvent::PointerMove(p) | InputEvent::PointerDown(p) | InputEvent::PointerUp(p) => {
                let radius = self.brush.radius();
                if let Err(e) = self.engine.pointer_moved(&mut self.layers, &p, radius, self.mask_rgb) {
                    log::warn!("paint skipped: {e}");
                }
                EventResponse::repaint()
            }
            InputEvent::PointerLeave => {
                self.engine.pointer_left(&mut self.layers);
                EventResponse::repaint()
            }
            InputEvent::Wheel { delta } => match self.brush.on_scroll(delta) {
                WheelOutcome::PassThrough => EventResponse::IGNORED,
                WheelOutcome::Resized(_) => {
                    self.engine.refresh_cursor(&mut self.layers, self.brush.radius(), self.mask_rgb);
                    EventResponse::consumed()
                }
            },
        }
    }

    pub fn phase(&self) -> PaintPhase {
        self.engine.phase()
    }

    // ------------------------------ brush ------------------------------

    pub fn brush_radius(&self) -> u32 {
        self.brush.radius()
    }

    /// Pin the radius from outside (controlled), or release it with `None`.
    /// The preview is redrawn at once.
    pub fn set_brush_radius(&mut self, radius: Option<u32>) {
        self.brush.set_external_radius(radius);
        self.engine.refresh_cursor(&mut self.layers, self.brush.radius(), self.mask_rgb);
    }

    /// Install or remove the size observer; without one the wheel passes through.
    pub fn set_size_observer(&mut self, observer: Option<SizeObserver>) {
        self.brush.set_observer(observer);
    }

    // ------------------------------ loading ------------------------------

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Start loading a new base image in the background. Returns its generation.
    pub fn set_source(&mut self, reference: impl Into<String>) -> u64 {
        let reference = reference.into();
        self.source = Some(reference.clone());
        self.loader.request(reference)
    }

    /// Decode and apply on this thread.
    pub fn load_now(&mut self, reference: &str) -> Result<(), Error> {
        self.source = Some(reference.to_string());
        let image = decode_image(reference)?;
        self.layers.on_base_image_loaded(&image)?;
        self.engine.reset();
        log::info!("base image {reference} applied ({}x{})", image.width, image.height);
        Ok(())
    }

    pub fn load_pending(&self) -> bool {
        self.loader.pending()
    }

    fn apply(&mut self, done: LoadCompletion) -> Result<(), Error> {
        let image = done.result?;
        self.layers.on_base_image_loaded(&image)?;
        self.engine.reset();
        log::info!(
            "base image #{} {} applied ({}x{})",
            done.generation,
            done.reference,
            image.width,
            image.height
        );
        Ok(())
    }

    /// Apply finished loads. Returns true when the layers changed.
    /// Failed loads are logged and leave the layers as they were.
    pub fn poll_loads(&mut self) -> bool {
        let mut changed = false;
        for done in self.loader.poll() {
            let generation = done.generation;
            match self.apply(done) {
                Ok(()) => changed = true,
                Err(e) => log::error!("load #{generation} failed: {e}"),
            }
        }
        changed
    }

    /// Block up to `timeout` for the next load and apply it.
    /// `Ok(false)` means nothing finished in time.
    pub fn wait_for_load(&mut self, timeout: Duration) -> Result<bool, Error> {
        match self.loader.wait(timeout) {
            Some(done) => self.apply(done).map(|()| true),
            None => Ok(false),
        }
    }

    // ------------------------------ mask ------------------------------

    pub fn mask_color(&self) -> &str {
        &self.mask_color
    }

    /// Change the mask color; painted pixels are recolored right away.
    pub fn set_mask_color(&mut self, hex: impl Into<String>) -> Result<(), Error> {
        let hex = hex.into();
        if hex == self.mask_color {
            return Ok(());
        }
        let rgb = hex_to_rgb(&hex);
        recolor_with(&mut *self.layers.mask_mut()?, rgb, false, self.discriminator);
        self.mask_color = hex;
        self.mask_rgb = rgb;
        self.engine.refresh_cursor(&mut self.layers, self.brush.radius(), rgb);
        Ok(())
    }

    /// Swap painted and unpainted regions.
    pub fn invert_mask(&mut self) -> Result<(), Error> {
        recolor_with(&mut *self.layers.mask_mut()?, self.mask_rgb, true, self.discriminator);
        Ok(())
    }

    /// Back to fully unpainted, same size.
    pub fn clear_mask(&mut self) -> Result<(), Error> {
        self.layers.reset_mask()
    }

    /// Live mask, readable and writable by the caller between events.
    pub fn mask_handle(&self) -> MaskHandle {
        self.layers.mask_handle()
    }

    // ------------------------------ display ------------------------------

    pub fn mask_opacity(&self) -> f32 {
        self.mask_opacity
    }

    pub fn set_mask_opacity(&mut self, opacity: f32) {
        self.mask_opacity = clamp_opacity(opacity);
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    pub fn size(&self) -> Size {
        self.layers.size()
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Compose the visible image into `frame`, resizing it to the layers first.
    pub fn compose(&self, frame: &mut FrameBuffer) -> Result<(), Error> {
        frame.fit(self.layers.size());
        composite(&self.layers, self.mask_opacity, self.blend, frame)
    }
}
