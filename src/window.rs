// Host window for the painter binary.
// Visual effects provided here:
// 1) A window sized to the loaded image that shows the composited layers.
// 2) Mouse/keyboard state turned into the painter's input events.

use mask_painter::{Error, FrameBuffer, InputEvent, Pointer, PointerButtons, Size};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct HostWindow {
    window: Window, // the on-screen window you see
    title: String,
    size: Size,
    last_pointer: Option<Pointer>,
}

impl HostWindow {
    /// Create a window sized to the layers.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, size: Size) -> Result<Self, Error> {
        Ok(Self {
            window: open(title, size)?,
            title: title.to_string(),
            size,
            last_pointer: None,
        })
    }

    /// Recreate the window when a newly loaded image changed the layer size.
    /// Visual: the window snaps to the new image dimensions.
    pub fn ensure_size(&mut self, size: Size) -> Result<(), Error> {
        if size != self.size {
            self.window = open(&self.title, size)?;
            self.size = size;
            self.last_pointer = None;
        }
        Ok(())
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, frame: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&frame.pixels, frame.width, frame.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    pub fn set_status(&mut self, status: &str) {
        self.window.set_title(&format!("{} | {status}", self.title));
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we'll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    fn buttons(&self) -> PointerButtons {
        PointerButtons {
            primary: self.window.get_mouse_down(MouseButton::Left),
            secondary: self.window.get_mouse_down(MouseButton::Right),
            middle: self.window.get_mouse_down(MouseButton::Middle),
        }
    }

    fn shift(&self) -> bool {
        self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift)
    }

    /// Translate what changed since the last call into input events.
    /// Visual: nothing by itself; the painter draws in response.
    pub fn poll_input(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        let pos = self.window.get_mouse_pos(MouseMode::Discard);
        let Some((mx, my)) = pos else {
            if self.last_pointer.take().is_some() {
                events.push(InputEvent::PointerLeave);
            }
            return events;
        };

        let now = Pointer::at(mx as i32, my as i32)
            .with_buttons(self.buttons())
            .with_shift(self.shift());

        match self.last_pointer {
            Some(prev) if prev.buttons != now.buttons => {
                let pressed = (now.buttons.primary && !prev.buttons.primary)
                    || (now.buttons.secondary && !prev.buttons.secondary)
                    || (now.buttons.middle && !prev.buttons.middle);
                events.push(if pressed { InputEvent::PointerDown(now) } else { InputEvent::PointerUp(now) });
            }
            Some(prev) if prev == now => {}
            None if now.buttons.any() => events.push(InputEvent::PointerDown(now)),
            _ => events.push(InputEvent::PointerMove(now)),
        }
        self.last_pointer = Some(now);

        if let Some((_, dy)) = self.window.get_scroll_wheel() {
            if dy != 0.0 {
                events.push(InputEvent::Wheel { delta: dy });
            }
        }
        events
    }
}

fn open(title: &str, size: Size) -> Result<Window, Error> {
    let mut window = Window::new(title, size.x as usize, size.y as usize, WindowOptions::default())
        .map_err(|e| Error::WindowInit(e.to_string()))?;
    window.set_target_fps(60);
    Ok(window)
}
