//! Paint a mask over an image.
//!
//! Three same-sized RGBA layers: the base image, the mask the user paints,
//! and a cursor layer showing the brush. Pointer moves draw the brush preview;
//! holding a button commits discs into the mask (secondary button or shift
//! erases); the wheel resizes the brush when someone observes size changes.
//! Changing the mask color recolors everything painted so far.
//!
//! ```no_run
//! use mask_painter::{InputEvent, MaskPainter, PainterConfig, Pointer, PointerButtons};
//!
//! let mut painter = MaskPainter::new(PainterConfig::default().with_brush_radius(8));
//! painter.load_now("photo.png")?;
//! let _listening = painter.attach();
//! painter.handle_event(InputEvent::PointerMove(
//!     Pointer::at(40, 30).with_buttons(PointerButtons::PRIMARY),
//! ));
//! let mask = painter.mask_handle();
//! assert_eq!(mask.borrow().width(), painter.size().x);
//! # Ok::<(), mask_painter::Error>(())
//! ```

pub mod brush;
pub mod color;
pub mod composite;
pub mod config;
pub mod error;
pub mod input;
pub mod layers;
pub mod loader;
pub mod logging;
pub mod paint;
pub mod painter;
pub mod raster;
pub mod recolor;
pub mod types;

pub use brush::{BrushController, SizeObserver, WheelOutcome, next_radius};
pub use color::{Rgb, hex_to_rgb, rgb_to_hex};
pub use composite::{BlendMode, composite};
pub use config::{MaskSlot, PainterConfig};
pub use error::Error;
pub use input::{EventResponse, InputEvent, ListenerGuard, Pointer, PointerButtons};
pub use layers::{LayerStack, MaskEdit, MaskHandle};
pub use loader::{DecodedImage, ImageLoader, decode_image, to_rgba_image};
pub use logging::{LoggingConfig, init_logging};
pub use paint::{PaintEngine, PaintPhase, paint_color};
pub use painter::MaskPainter;
pub use raster::Raster;
pub use recolor::{Discriminator, recolor, recolor_with};
pub use types::{FrameBuffer, Size};
