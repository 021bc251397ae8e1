// What you SEE:
// • The base image in a window, with the mask painted over it.
// • Move the mouse: a translucent brush disc follows it.
// • Hold Left Mouse: paint the mask. Right Mouse or Shift: erase.
// • Mouse wheel: grow/shrink the brush (unless --no-resize-observer).
// • C clears the mask, I inverts it, S saves it (with --save-mask). ESC quits.

mod window;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::Parser;
use minifb::Key;

use mask_painter::{
    BlendMode, Error, FrameBuffer, LoggingConfig, MaskPainter, MaskSlot, PainterConfig, init_logging,
    to_rgba_image,
};
use window::HostWindow;

/// Paint a mask over an image.
#[derive(Parser, Debug)]
#[command(name = "mask-painter", about = "Paint a binary mask over an image")]
struct Args {
    /// Base image (path or file:// URL).
    image: String,

    /// Initial brush radius in pixels.
    #[arg(short, long, default_value_t = 10)]
    radius: u32,

    /// Mask color as hex (#RRGGBB).
    #[arg(short, long, default_value = "#23272d")]
    color: String,

    /// Mask layer opacity, 0..1.
    #[arg(short, long, default_value_t = 0.75)]
    opacity: f32,

    /// Blend mode for the mask layer (normal, multiply, screen, ...).
    #[arg(short, long, default_value = "normal")]
    blend: BlendMode,

    /// Leave the mouse wheel alone instead of using it for brush size.
    #[arg(long)]
    no_resize_observer: bool,

    /// Where S writes the mask as PNG.
    #[arg(long, value_name = "FILE")]
    save_mask: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "mask_painter=trace".
    #[arg(long)]
    log: Option<String>,
}

fn save_mask(slot: &MaskSlot, path: &Path) -> Result<(), Error> {
    let Some(handle) = slot.borrow().clone() else {
        return Err(Error::MaskBusy("mask handle was never exposed".into()));
    };
    let image = to_rgba_image(&*handle.try_borrow()?)
        .ok_or_else(|| Error::BufferSize("mask buffer does not match its size".into()))?;
    image.save(path)?;
    log::info!("mask saved to {}", path.display());
    Ok(())
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(LoggingConfig::with_filter(args.log.clone()));

    /* --- Painter setup ---
       Visual: nothing yet; the image decodes in the background. */
    let slot: MaskSlot = Rc::new(RefCell::new(None));
    let mut config = PainterConfig::default()
        .with_source(args.image.clone())
        .with_brush_radius(args.radius)
        .with_mask_color(args.color.clone())
        .with_mask_opacity(args.opacity)
        .with_blend_mode(args.blend)
        .with_mask_slot(Rc::clone(&slot));
    if !args.no_resize_observer {
        config = config.with_size_observer(|r| log::debug!("brush radius {r}"));
    }
    let mut painter = MaskPainter::new(config);
    let _listening = painter.attach();

    /* --- Window + reusable screen buffer ---
       Visual: a placeholder-sized window until the image arrives. */
    let mut window = HostWindow::new("Mask Painter", painter.size())?;
    let mut screen = FrameBuffer::new(painter.size().x as usize, painter.size().y as usize);
    let mut status = String::new();

    /* ------------------------------ Main loop ------------------------------ */
    while window.is_open() && !window.esc_pressed() {
        // 1) Finished loads resize all layers before any input of this frame.
        if painter.poll_loads() {
            window.ensure_size(painter.size())?;
        }

        // 2) Pointer + wheel.
        for event in window.poll_input() {
            painter.handle_event(event);
        }

        // 3) Keys.
        if window.pressed_once(Key::C) {
            if let Err(e) = painter.clear_mask() {
                log::warn!("clear failed: {e}");
            }
        }
        if window.pressed_once(Key::I) {
            if let Err(e) = painter.invert_mask() {
                log::warn!("invert failed: {e}");
            }
        }
        if window.pressed_once(Key::S) {
            match &args.save_mask {
                Some(path) => {
                    if let Err(e) = save_mask(&slot, path) {
                        log::error!("{e}");
                    }
                }
                None => log::warn!("no --save-mask path given"),
            }
        }

        // 4) Title shows brush size and blend mode.
        let next = format!("r={} | {} | {}", painter.brush_radius(), painter.blend_mode(), painter.mask_color());
        if next != status {
            window.set_status(&next);
            status = next;
        }

        // 5) Compose and present.
        painter.compose(&mut screen)?;
        window.present(&screen)?;
    }

    Ok(())
}
